//! rastermask - raster mask engine for image annotation.
//!
//! Stores a per-image labelmap shared by several mask annotations, moves it
//! over the wire as dense or sparse run-length encodings, composites it into
//! an RGBA surface and lets a brush paint or erase it.

pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod model;
pub mod paint;
pub mod raster;
pub mod render;
pub mod rle;

pub use config::{LogLevel, MaskConfig, RenderSettings};
pub use error::{BrushError, ConfigError, ManagerError, RasterError, RleError};
pub use geometry::{BoundingBox, Bounds, PixelPoint, Point, Region};
pub use model::{
    Annotation, AnnotationData, AnnotationId, AnnotationManager, ClassId, InMemoryAnnotations,
    MaskData, RasterLayerData, Rgb,
};
pub use paint::{BrushPainter, StrokeOutcome, TipShape, draw_polygon_to_raster};
pub use raster::{PendingMask, Raster, RasterId, RasterManager};
pub use render::{
    Compositor, ImageCompositor, MaskRenderer, RasterTypeRenderer, RendererRegistry, TargetRect,
    Viewport,
};
