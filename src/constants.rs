//! Global constants for the raster mask engine

/// Label index reserved for unlabelled pixels.
pub const BACKGROUND_LABEL: u8 = 0;

/// Number of label slots in an 8-bit labelmap (including background).
pub const LABEL_SLOTS: usize = 256;

/// Upper bound (exclusive) used when allocating label indices.
///
/// Labels are stored one byte per pixel, so a raster holds at most this
/// many segments. Going beyond it would need two bytes per pixel.
pub const MAX_LABELS: u8 = 255;

/// Opacity of ordinary mask pixels.
pub const DEFAULT_INTERIOR_ALPHA: f32 = 0.6;

/// Opacity of mask pixels on a segment edge, when edge rendering is on.
pub const DEFAULT_OUTLINE_ALPHA: f32 = 0.3;

/// Edge highlighting is implemented but disabled unless configured.
pub const EDGE_RENDERING_DEFAULT: bool = false;

/// Minimum distance (per axis, in pixels) between two stroke points before
/// the gap is filled by interpolation. A distance of one pixel would only
/// produce sub-pixel fills that never change the raster.
pub const MIN_PIXEL_DISTANCE_TO_INTERPOLATE: f64 = 2.0;

/// Colour used for in-progress masks when the class has no known colour.
pub const DEFAULT_CLASS_COLOR: [u8; 3] = [255, 255, 255];

/// Zoom range of the render viewport.
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 10.0;
