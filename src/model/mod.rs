//! Annotation data model and the annotation store interface.

mod annotation;
mod manager;

pub use annotation::{
    Annotation, AnnotationData, AnnotationId, ClassId, MaskData, RasterLayerData, Rgb,
};
pub use manager::{AnnotationManager, InMemoryAnnotations};
