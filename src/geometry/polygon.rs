//! Scanline polygon rasterisation.

use super::{Bounds, Point};

/// Pixels covered by a polygon on a raster.
#[derive(Debug, Clone, Default)]
pub struct RasterizedPolygon {
    /// Row-major pixel indices, in scan order.
    pub indices: Vec<usize>,
    /// Inclusive bounds of the covered pixels; empty if nothing is covered.
    pub bounds: Bounds,
}

/// Rasterise a polygon onto a `width` x `height` grid.
///
/// A pixel is covered when its centre lies inside the polygon under the
/// even-odd rule. Centres exactly on a left edge are inside, on a right edge
/// outside, so adjacent polygons never share a pixel. Pixels outside the grid
/// are dropped.
pub fn rasterize_polygon(polygon: &[Point], width: u32, height: u32) -> RasterizedPolygon {
    let mut result = RasterizedPolygon::default();

    if polygon.len() < 3 || width == 0 || height == 0 {
        return result;
    }

    let (min_y, max_y) = polygon
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    if !min_y.is_finite() || !max_y.is_finite() {
        return result;
    }

    let row_start = (min_y.floor() as i64).max(0);
    let row_end = (max_y.ceil() as i64).min(i64::from(height) - 1);
    let stride = width as usize;

    let mut crossings: Vec<f64> = Vec::with_capacity(polygon.len());

    for y in row_start..=row_end {
        let center_y = y as f64 + 0.5;

        crossings.clear();
        let mut j = polygon.len() - 1;
        for i in 0..polygon.len() {
            let (a, b) = (polygon[i], polygon[j]);
            if (a.y > center_y) != (b.y > center_y) {
                crossings.push(a.x + (center_y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
            j = i;
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            // Pixel x is inside when span[0] <= x + 0.5 < span[1].
            let x_start = ((span[0] - 0.5).ceil() as i64).max(0);
            let x_end = ((span[1] - 0.5).ceil() as i64).min(i64::from(width));

            for x in x_start..x_end {
                result.indices.push(y as usize * stride + x as usize);
                result.bounds.include(x, y);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covered(polygon: &[Point], width: u32, height: u32) -> Vec<u8> {
        let mut grid = vec![0u8; (width * height) as usize];
        for index in rasterize_polygon(polygon, width, height).indices {
            grid[index] = 1;
        }
        grid
    }

    #[test]
    fn test_axis_aligned_square() {
        let square = [
            Point::new(1.0, 1.0),
            Point::new(3.0, 1.0),
            Point::new(3.0, 3.0),
            Point::new(1.0, 3.0),
        ];
        #[rustfmt::skip]
        let expected = vec![
            0, 0, 0, 0,
            0, 1, 1, 0,
            0, 1, 1, 0,
            0, 0, 0, 0,
        ];
        assert_eq!(covered(&square, 4, 4), expected);

        let result = rasterize_polygon(&square, 4, 4);
        assert_eq!(result.bounds, Bounds::from_corners(1, 1, 2, 2));
    }

    #[test]
    fn test_slanted_quad() {
        // The quad linking two radius-1 tips at (2.5, 2.5) and (4.5, 5.5).
        let quad = [
            Point::new(1.667_949_705_662_156_4, 3.054_700_196_225_229_4),
            Point::new(3.332_050_294_337_843_6, 1.945_299_803_774_770_9),
            Point::new(5.332_050_294_337_844, 4.945_299_803_774_771),
            Point::new(3.667_949_705_662_156_4, 6.054_700_196_225_229),
        ];
        #[rustfmt::skip]
        let expected = vec![
            0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0,
            0, 0, 1, 1, 0, 0,
            0, 0, 1, 1, 0, 0,
            0, 0, 0, 1, 1, 0,
            0, 0, 0, 1, 0, 0,
        ];
        assert_eq!(covered(&quad, 6, 6), expected);
    }

    #[test]
    fn test_clipped_to_grid() {
        let large = [
            Point::new(-5.0, -5.0),
            Point::new(10.0, -5.0),
            Point::new(10.0, 10.0),
            Point::new(-5.0, 10.0),
        ];
        let result = rasterize_polygon(&large, 3, 2);
        assert_eq!(result.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(result.bounds, Bounds::from_corners(0, 0, 2, 1));
    }

    #[test]
    fn test_degenerate_polygon() {
        let line = [Point::new(0.0, 0.0), Point::new(3.0, 3.0)];
        let result = rasterize_polygon(&line, 4, 4);
        assert!(result.indices.is_empty());
        assert!(result.bounds.is_empty());
    }
}
