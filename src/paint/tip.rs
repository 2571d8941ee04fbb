//! Brush tip geometry.

use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};

use crate::constants::MIN_PIXEL_DISTANCE_TO_INTERPOLATE;
use crate::geometry::{Bounds, Point};

/// Shape of the brush tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipShape {
    /// Disc of the given radius.
    #[default]
    Round,
    /// Axis-aligned square inscribed in the disc of the given radius.
    Squared,
}

/// One sample of a stroke: where the tip was and how big it was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct StrokePoint {
    pub center: Point,
    pub radius: f64,
    pub shape: TipShape,
}

impl StrokePoint {
    pub fn new(center: Point, radius: f64, shape: TipShape) -> Self {
        Self {
            center,
            radius,
            shape,
        }
    }

    /// Distance from the centre to the edge of the tip along an axis.
    fn half_extent(&self) -> f64 {
        match self.shape {
            TipShape::Round => self.radius,
            TipShape::Squared => self.radius / SQRT_2,
        }
    }

    /// Pixels the tip may touch. Not clipped to any raster.
    pub fn footprint_range(&self) -> Bounds {
        let half = self.half_extent();
        Bounds::from_corners(
            (self.center.x - half).floor() as i64,
            (self.center.y - half).floor() as i64,
            (self.center.x + half).ceil() as i64,
            (self.center.y + half).ceil() as i64,
        )
    }

    /// Whether the tip paints the pixel at `(x, y)`, which must lie in the
    /// footprint range.
    pub fn covers(&self, x: i64, y: i64) -> bool {
        match self.shape {
            TipShape::Squared => true,
            TipShape::Round => {
                let pixel_center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                pixel_center.distance(&self.center) < self.radius
            }
        }
    }

    /// Corners of a square tip: bottom left, bottom right, top right, top left.
    pub fn square_corners(&self) -> [Point; 4] {
        let half = self.half_extent();
        let Point { x, y } = self.center;
        [
            Point::new(x - half, y + half),
            Point::new(x + half, y + half),
            Point::new(x + half, y - half),
            Point::new(x - half, y - half),
        ]
    }

    /// The corner of a square tip closest to `point`. Ties go to the corner
    /// listed first.
    fn nearest_corner(&self, point: Point) -> Point {
        let corners = self.square_corners();
        let mut nearest = corners[0];
        let mut nearest_distance = point.distance(&nearest);
        for corner in &corners[1..] {
            let distance = point.distance(corner);
            if distance < nearest_distance {
                nearest = *corner;
                nearest_distance = distance;
            }
        }
        nearest
    }
}

/// Whether the gap between two samples is wide enough to need filling.
pub(crate) fn needs_interpolation(previous: &StrokePoint, current: &StrokePoint) -> bool {
    (current.center.x - previous.center.x).abs() >= MIN_PIXEL_DISTANCE_TO_INTERPOLATE
        || (current.center.y - previous.center.y).abs() >= MIN_PIXEL_DISTANCE_TO_INTERPOLATE
}

/// The quad joining two tips along the stroke direction.
///
/// Each tip contributes two vertices offset perpendicular to the stroke by
/// its radius. For square tips the vertices are moved onto the nearest
/// corner of their own square.
pub(crate) fn interpolation_quad(previous: &StrokePoint, current: &StrokePoint) -> [Point; 4] {
    let dx = current.center.x - previous.center.x;
    let dy = current.center.y - previous.center.y;
    let length = dx.hypot(dy);
    if length == 0.0 {
        return [previous.center; 4];
    }

    let (nx, ny) = (-dy / length, dx / length);
    let offset = |tip: &StrokePoint, sign: f64| {
        Point::new(
            tip.center.x + sign * nx * tip.radius,
            tip.center.y + sign * ny * tip.radius,
        )
    };

    let quad = [
        offset(previous, 1.0),
        offset(previous, -1.0),
        offset(current, -1.0),
        offset(current, 1.0),
    ];

    match (previous.shape, current.shape) {
        (TipShape::Round, TipShape::Round) => quad,
        _ => [
            snap(previous, quad[0]),
            snap(previous, quad[1]),
            snap(current, quad[2]),
            snap(current, quad[3]),
        ],
    }
}

fn snap(tip: &StrokePoint, point: Point) -> Point {
    match tip.shape {
        TipShape::Round => point,
        TipShape::Squared => tip.nearest_corner(point),
    }
}
