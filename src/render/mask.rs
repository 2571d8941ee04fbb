//! Mask rendering: labelmap to RGBA surface, surface to display.

use image::imageops;
use image::{Rgba, RgbaImage};

use crate::config::RenderSettings;
use crate::constants::BACKGROUND_LABEL;
use crate::geometry::Region;
use crate::model::Annotation;
use crate::raster::Raster;

use super::compositor::{Compositor, Viewport};
use super::lut::ColorLut;
use super::registry::RasterTypeRenderer;

/// Draws the masks of a raster.
///
/// The raster keeps a full-size RGBA surface between frames; only the
/// invalidated region is recoloured, after which the raster is clean.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskRenderer {
    settings: RenderSettings,
}

impl MaskRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// The coloured labelmap of `raster`, brought up to date.
    ///
    /// `annotations` is the live annotation list; a mapped label whose
    /// annotation is missing from it is drawn transparent.
    pub fn labelmap_surface<'r>(
        &self,
        raster: &'r mut Raster,
        annotations: &[Annotation],
    ) -> &'r RgbaImage {
        if let Some(region) = raster.invalidated_region() {
            let lut = ColorLut::build(raster, annotations, &self.settings);
            let block = self.paint_block(raster, &lut, region);

            imageops::replace(
                raster.surface_mut(),
                &block,
                i64::from(region.x_min),
                i64::from(region.y_min),
            );
            raster.clear_invalidation();

            log::trace!(
                "Raster {}: redrew {}x{} block at ({}, {})",
                raster.id(),
                region.width(),
                region.height(),
                region.x_min,
                region.y_min
            );
        }

        raster.surface_mut()
    }

    /// Clear `compositor` and draw the raster's masks onto it.
    pub fn render(
        &self,
        raster: &mut Raster,
        annotations: &[Annotation],
        compositor: &mut dyn Compositor,
        viewport: &Viewport,
    ) {
        compositor.clear();
        let target = viewport.target_rect(raster.width(), raster.height());
        let surface = self.labelmap_surface(raster, annotations);
        // Smoothing would blend neighbouring labels into colours no mask has.
        compositor.draw_image(surface, target, true);
    }

    fn paint_block(&self, raster: &Raster, lut: &ColorLut, region: Region) -> RgbaImage {
        let edges = self.settings.edge_rendering;
        RgbaImage::from_fn(region.width(), region.height(), |bx, by| {
            let (x, y) = (region.x_min + bx, region.y_min + by);
            let label = raster.buffer()[raster.index(x, y)];
            if edges && label != BACKGROUND_LABEL && is_edge(raster, x, y, label) {
                Rgba(lut.edge(label))
            } else {
                Rgba(lut.interior(label))
            }
        })
    }
}

/// Whether a 4-neighbour of `(x, y)` holds another label. Neighbours outside
/// the raster count as another label.
fn is_edge(raster: &Raster, x: u32, y: u32, label: u8) -> bool {
    let differs = |nx: Option<u32>, ny: Option<u32>| match (nx, ny) {
        (Some(nx), Some(ny)) => raster.label_at(nx, ny) != Some(label),
        _ => true,
    };

    differs(x.checked_sub(1), Some(y))
        || differs(x.checked_add(1), Some(y))
        || differs(Some(x), y.checked_sub(1))
        || differs(Some(x), y.checked_add(1))
}

impl RasterTypeRenderer for MaskRenderer {
    fn type_name(&self) -> &'static str {
        "mask"
    }

    fn render(
        &self,
        raster: &mut Raster,
        annotations: &[Annotation],
        compositor: &mut dyn Compositor,
        viewport: &Viewport,
    ) {
        MaskRenderer::render(self, raster, annotations, compositor, viewport);
    }
}
