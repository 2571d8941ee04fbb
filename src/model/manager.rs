//! The annotation store the raster engine reports to.

use std::collections::HashMap;

use crate::constants::DEFAULT_CLASS_COLOR;
use crate::error::ManagerError;

use super::{Annotation, AnnotationData, AnnotationId, ClassId, Rgb};

/// Reads and writes annotations on behalf of raster operations.
///
/// Raster pixels are changed before these calls are made and are not
/// restored when they fail.
pub trait AnnotationManager {
    /// Look up an annotation by id.
    fn annotation(&self, id: AnnotationId) -> Option<&Annotation>;

    /// Display colour of a class.
    fn class_color(&self, _class_id: ClassId) -> Rgb {
        DEFAULT_CLASS_COLOR
    }

    /// Create an annotation and return its id.
    fn create_annotation(
        &mut self,
        class_id: ClassId,
        data: AnnotationData,
    ) -> Result<AnnotationId, ManagerError>;

    /// Replace the payload of an existing annotation.
    fn update_annotation_data(
        &mut self,
        id: AnnotationId,
        data: AnnotationData,
    ) -> Result<(), ManagerError>;

    /// Delete an annotation.
    fn delete_annotation(&mut self, id: AnnotationId) -> Result<(), ManagerError>;
}

/// Annotation store held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAnnotations {
    annotations: Vec<Annotation>,
    class_colors: HashMap<ClassId, Rgb>,
    next_id: AnnotationId,
}

impl InMemoryAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from existing annotations.
    pub fn from_annotations(annotations: Vec<Annotation>) -> Self {
        let next_id = annotations.iter().map(|a| a.id + 1).max().unwrap_or(0);
        let mut class_colors = HashMap::new();
        for annotation in &annotations {
            class_colors
                .entry(annotation.class_id)
                .or_insert(annotation.color);
        }
        Self {
            annotations,
            class_colors,
            next_id,
        }
    }

    /// Set the colour used for new annotations of a class.
    pub fn set_class_color(&mut self, class_id: ClassId, color: Rgb) {
        self.class_colors.insert(class_id, color);
    }

    /// All annotations, in creation order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    fn position(&self, id: AnnotationId) -> Result<usize, ManagerError> {
        self.annotations
            .iter()
            .position(|a| a.id == id)
            .ok_or(ManagerError::NotFound { id })
    }
}

impl AnnotationManager for InMemoryAnnotations {
    fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    fn class_color(&self, class_id: ClassId) -> Rgb {
        self.class_colors
            .get(&class_id)
            .copied()
            .unwrap_or(DEFAULT_CLASS_COLOR)
    }

    fn create_annotation(
        &mut self,
        class_id: ClassId,
        data: AnnotationData,
    ) -> Result<AnnotationId, ManagerError> {
        let id = self.next_id;
        self.next_id += 1;

        let color = self.class_color(class_id);
        self.annotations
            .push(Annotation::new(id, class_id, color, data));
        log::debug!("Created annotation {} of class {}", id, class_id);
        Ok(id)
    }

    fn update_annotation_data(
        &mut self,
        id: AnnotationId,
        data: AnnotationData,
    ) -> Result<(), ManagerError> {
        let index = self.position(id)?;
        self.annotations[index].data = data;
        Ok(())
    }

    fn delete_annotation(&mut self, id: AnnotationId) -> Result<(), ManagerError> {
        let index = self.position(id)?;
        self.annotations.remove(index);
        log::debug!("Deleted annotation {}", id);
        Ok(())
    }
}
