//! Turning rasters into pixels on screen.
//!
//! A [`MaskRenderer`] keeps each raster's coloured surface up to date and
//! draws it onto a [`Compositor`] with nearest-neighbour sampling, so label
//! boundaries stay sharp at any zoom.

mod compositor;
mod lut;
mod mask;
mod registry;

pub use compositor::{Compositor, ImageCompositor, TargetRect, Viewport};
pub use mask::MaskRenderer;
pub use registry::{RasterTypeRenderer, RendererRegistry};
