//! Renderer registry for drawing rasters by annotation type.

use std::collections::HashMap;

use crate::config::RenderSettings;
use crate::model::Annotation;
use crate::raster::Raster;

use super::compositor::{Compositor, Viewport};
use super::mask::MaskRenderer;

/// Draws one annotation type that lives on a raster.
pub trait RasterTypeRenderer {
    /// Annotation type name this renderer handles (e.g. "mask").
    fn type_name(&self) -> &'static str;

    /// Clear `compositor` and draw the raster onto it.
    fn render(
        &self,
        raster: &mut Raster,
        annotations: &[Annotation],
        compositor: &mut dyn Compositor,
        viewport: &Viewport,
    );
}

/// Registry of raster renderers keyed by annotation type name.
///
/// Built-in renderers are registered on creation.
pub struct RendererRegistry {
    renderers: HashMap<&'static str, Box<dyn RasterTypeRenderer>>,
}

impl RendererRegistry {
    /// Create a registry with the built-in renderers using default settings.
    pub fn new() -> Self {
        Self::with_settings(RenderSettings::default())
    }

    /// Create a registry with the built-in renderers using `settings`.
    pub fn with_settings(settings: RenderSettings) -> Self {
        let mut registry = Self {
            renderers: HashMap::new(),
        };

        registry.register(Box::new(MaskRenderer::new(settings)));

        registry
    }

    /// Register a renderer, replacing any for the same type.
    pub fn register(&mut self, renderer: Box<dyn RasterTypeRenderer>) {
        self.renderers.insert(renderer.type_name(), renderer);
    }

    /// Get the renderer for an annotation type.
    pub fn get(&self, type_name: &str) -> Option<&dyn RasterTypeRenderer> {
        self.renderers.get(type_name).map(|r| r.as_ref())
    }

    /// Get the renderer for an annotation.
    pub fn for_annotation(&self, annotation: &Annotation) -> Option<&dyn RasterTypeRenderer> {
        self.get(annotation.type_name())
    }

    /// Get all registered type names.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.renderers.keys().copied().collect()
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationData, MaskData};
    use crate::render::ImageCompositor;

    struct Blank;

    impl RasterTypeRenderer for Blank {
        fn type_name(&self) -> &'static str {
            "mask"
        }

        fn render(
            &self,
            _raster: &mut Raster,
            _annotations: &[Annotation],
            compositor: &mut dyn Compositor,
            _viewport: &Viewport,
        ) {
            compositor.clear();
        }
    }

    #[test]
    fn test_builtin_renderers() {
        let registry = RendererRegistry::new();
        assert!(registry.get("mask").is_some());
        assert!(registry.get("polygon").is_none());
        assert_eq!(registry.type_names(), vec!["mask"]);

        let annotation = Annotation::new(1, 1, [0, 0, 0], AnnotationData::Mask(MaskData::default()));
        assert_eq!(
            registry.for_annotation(&annotation).map(|r| r.type_name()),
            Some("mask")
        );
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = RendererRegistry::new();
        registry.register(Box::new(Blank));
        assert_eq!(registry.type_names().len(), 1);

        // The replacement leaves the raster invalidated.
        let mut raster = Raster::new(1, "image-1", 2, 2);
        let mut compositor = ImageCompositor::new(2, 2);
        let renderer = registry.get("mask").unwrap();
        renderer.render(&mut raster, &[], &mut compositor, &Viewport::new());
        assert!(raster.is_invalidated());
    }
}
