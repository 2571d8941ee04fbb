//! Editing rasters: brush strokes and polygon fills.

mod brush;
mod polygon;
mod shared;
mod tip;

pub use brush::{BrushPainter, StrokeOutcome};
pub use polygon::draw_polygon_to_raster;
pub use tip::TipShape;
