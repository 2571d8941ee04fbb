//! Image-space geometry shared by the codecs, the raster and the painters.

mod bounds;
mod polygon;

pub use bounds::{BoundingBox, Bounds, PixelPoint, Point, Region};
pub use polygon::{RasterizedPolygon, rasterize_polygon};
