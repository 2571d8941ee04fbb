//! Points, rectangles and bounding boxes in image space.

use serde::{Deserialize, Serialize};

/// A sub-pixel position in image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An integer pixel coordinate. May lie outside the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

impl PixelPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// An inclusive pixel rectangle that grows as points are added.
///
/// A fresh `Bounds` starts at the empty sentinel: the top left corner sits at
/// the largest coordinate and the bottom right corner at the smallest, so any
/// point included afterwards replaces both. Callers must check
/// [`Bounds::is_empty`] before using the corners of a bounds that may never
/// have seen a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub top_left: PixelPoint,
    pub bottom_right: PixelPoint,
}

impl Bounds {
    /// Bounds containing no pixels.
    pub const EMPTY: Bounds = Bounds {
        top_left: PixelPoint::new(i64::MAX, i64::MAX),
        bottom_right: PixelPoint::new(i64::MIN, i64::MIN),
    };

    /// Bounds spanning the inclusive rectangle between two corners.
    pub const fn from_corners(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        Self {
            top_left: PixelPoint::new(min_x, min_y),
            bottom_right: PixelPoint::new(max_x, max_y),
        }
    }

    /// Whether no pixel has been included yet.
    pub fn is_empty(&self) -> bool {
        self.top_left.x > self.bottom_right.x || self.top_left.y > self.bottom_right.y
    }

    /// Grow to include the pixel at `(x, y)`.
    pub fn include(&mut self, x: i64, y: i64) {
        self.top_left.x = self.top_left.x.min(x);
        self.top_left.y = self.top_left.y.min(y);
        self.bottom_right.x = self.bottom_right.x.max(x);
        self.bottom_right.y = self.bottom_right.y.max(y);
    }

    /// Grow to include another bounds. Empty bounds change nothing.
    pub fn union(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.include(other.top_left.x, other.top_left.y);
        self.include(other.bottom_right.x, other.bottom_right.y);
    }

    /// Intersect with a `width` x `height` raster.
    ///
    /// Returns `None` if the bounds are empty or entirely outside.
    pub fn clip(&self, width: u32, height: u32) -> Option<Region> {
        if self.is_empty() || width == 0 || height == 0 {
            return None;
        }

        let x_min = self.top_left.x.max(0);
        let y_min = self.top_left.y.max(0);
        let x_max = self.bottom_right.x.min(i64::from(width) - 1);
        let y_max = self.bottom_right.y.min(i64::from(height) - 1);

        if x_min > x_max || y_min > y_max {
            return None;
        }

        // All four values are now within [0, u32::MAX).
        Some(Region {
            x_min: x_min as u32,
            x_max: x_max as u32,
            y_min: y_min as u32,
            y_max: y_max as u32,
        })
    }

    /// Convert to a bounding box, if not empty.
    pub fn to_bounding_box(&self) -> Option<BoundingBox> {
        if self.is_empty() || self.top_left.x < 0 || self.top_left.y < 0 {
            return None;
        }
        Some(BoundingBox {
            x: self.top_left.x as u32,
            y: self.top_left.y as u32,
            w: (self.bottom_right.x - self.top_left.x + 1) as u32,
            h: (self.bottom_right.y - self.top_left.y + 1) as u32,
        })
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<Region> for Bounds {
    fn from(region: Region) -> Self {
        Bounds::from_corners(
            i64::from(region.x_min),
            i64::from(region.y_min),
            i64::from(region.x_max),
            i64::from(region.y_max),
        )
    }
}

/// An inclusive pixel rectangle known to lie inside a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl Region {
    /// The whole of a `width` x `height` raster, or `None` if it has no pixels.
    pub fn full(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            x_min: 0,
            x_max: width - 1,
            y_min: 0,
            y_max: height - 1,
        })
    }

    pub fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    /// Smallest region covering both.
    pub fn union(&self, other: &Region) -> Region {
        Region {
            x_min: self.x_min.min(other.x_min),
            x_max: self.x_max.max(other.x_max),
            y_min: self.y_min.min(other.y_min),
            y_max: self.y_max.max(other.y_max),
        }
    }

    pub fn to_bounding_box(&self) -> BoundingBox {
        BoundingBox {
            x: self.x_min,
            y: self.y_min,
            w: self.width(),
            h: self.height(),
        }
    }
}

/// Image-space rectangle as stored in annotation payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Inclusive pixel bounds covered by the box. Empty when `w` or `h` is zero.
    pub fn to_bounds(&self) -> Bounds {
        if self.w == 0 || self.h == 0 {
            return Bounds::EMPTY;
        }
        Bounds::from_corners(
            i64::from(self.x),
            i64::from(self.y),
            i64::from(self.x) + i64::from(self.w) - 1,
            i64::from(self.y) + i64::from(self.h) - 1,
        )
    }

    /// The part of the box inside a `width` x `height` raster.
    pub fn clip(&self, width: u32, height: u32) -> Option<Region> {
        self.to_bounds().clip(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bounds_take_first_point() {
        let mut bounds = Bounds::EMPTY;
        assert!(bounds.is_empty());

        bounds.include(3, 4);
        assert!(!bounds.is_empty());
        assert_eq!(bounds.top_left, PixelPoint::new(3, 4));
        assert_eq!(bounds.bottom_right, PixelPoint::new(3, 4));
    }

    #[test]
    fn test_union_ignores_empty() {
        let mut bounds = Bounds::from_corners(1, 1, 2, 2);
        bounds.union(&Bounds::EMPTY);
        assert_eq!(bounds, Bounds::from_corners(1, 1, 2, 2));

        bounds.union(&Bounds::from_corners(-3, 0, 0, 5));
        assert_eq!(bounds, Bounds::from_corners(-3, 0, 2, 5));
    }

    #[test]
    fn test_clip_to_raster() {
        let bounds = Bounds::from_corners(-2, 1, 7, 4);
        let region = bounds.clip(6, 6).unwrap();
        assert_eq!(
            region,
            Region {
                x_min: 0,
                x_max: 5,
                y_min: 1,
                y_max: 4
            }
        );

        assert!(Bounds::from_corners(6, 0, 9, 3).clip(6, 6).is_none());
        assert!(Bounds::EMPTY.clip(6, 6).is_none());
    }

    #[test]
    fn test_bounding_box_conversions() {
        let bbox = BoundingBox::new(2, 1, 3, 4);
        let bounds = bbox.to_bounds();
        assert_eq!(bounds, Bounds::from_corners(2, 1, 4, 4));
        assert_eq!(bounds.to_bounding_box(), Some(bbox));
        assert!(BoundingBox::new(0, 0, 0, 3).to_bounds().is_empty());
    }

    #[test]
    fn test_bounding_box_wire_shape() {
        let json = serde_json::to_string(&BoundingBox::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, r#"{"x":1,"y":2,"w":3,"h":4}"#);
    }
}
