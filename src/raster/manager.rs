//! Owns the rasters of a view.

use crate::error::RasterError;
use crate::model::Annotation;

use super::{Raster, RasterId};

/// The rasters of one view, in creation order.
#[derive(Debug, Default)]
pub struct RasterManager {
    rasters: Vec<Raster>,
    next_id: RasterId,
}

impl RasterManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty raster under a caller-chosen id.
    pub fn create_raster(
        &mut self,
        id: RasterId,
        image_key: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Result<&mut Raster, RasterError> {
        if self.has_raster(id) {
            return Err(RasterError::DuplicateRaster { id });
        }
        self.next_id = self.next_id.max(id.saturating_add(1));

        let raster = Raster::new(id, image_key, width, height);
        log::debug!(
            "Created raster {} ({}x{}) for image '{}'",
            id,
            width,
            height,
            raster.image_key()
        );
        self.rasters.push(raster);
        Ok(self.last_mut())
    }

    pub fn has_raster(&self, id: RasterId) -> bool {
        self.rasters.iter().any(|r| r.id() == id)
    }

    pub fn raster(&self, id: RasterId) -> Option<&Raster> {
        self.rasters.iter().find(|r| r.id() == id)
    }

    pub fn raster_mut(&mut self, id: RasterId) -> Option<&mut Raster> {
        self.rasters.iter_mut().find(|r| r.id() == id)
    }

    pub fn raster_for_image(&self, image_key: &str) -> Option<&Raster> {
        self.rasters.iter().find(|r| r.image_key() == image_key)
    }

    pub fn raster_for_image_mut(&mut self, image_key: &str) -> Option<&mut Raster> {
        self.rasters.iter_mut().find(|r| r.image_key() == image_key)
    }

    /// The raster of an image, created empty on first request.
    pub fn get_or_create_raster_for_image(
        &mut self,
        image_key: &str,
        width: u32,
        height: u32,
    ) -> &mut Raster {
        match self.rasters.iter().position(|r| r.image_key() == image_key) {
            Some(index) => &mut self.rasters[index],
            None => {
                let id = self.allocate_id();
                self.rasters.push(Raster::new(id, image_key, width, height));
                log::debug!("Created raster {} for image '{}'", id, image_key);
                self.last_mut()
            }
        }
    }

    /// Next unused id. Wraps around once `RasterId::MAX` has been handed out.
    fn allocate_id(&mut self) -> RasterId {
        let mut id = self.next_id;
        while self.has_raster(id) {
            id = id.wrapping_add(1);
        }
        self.next_id = id.wrapping_add(1);
        id
    }

    /// All rasters, in creation order.
    pub fn rasters(&self) -> &[Raster] {
        &self.rasters
    }

    /// Store a raster, replacing the one with the same id if any.
    pub fn update_raster(&mut self, raster: Raster) {
        match self.rasters.iter().position(|r| r.id() == raster.id()) {
            Some(index) => self.rasters[index] = raster,
            None => {
                self.next_id = self.next_id.max(raster.id().saturating_add(1));
                self.rasters.push(raster);
            }
        }
    }

    pub fn delete_raster(&mut self, id: RasterId) -> Option<Raster> {
        let index = self.rasters.iter().position(|r| r.id() == id)?;
        Some(self.rasters.remove(index))
    }

    pub fn delete_rasters(&mut self, ids: &[RasterId]) {
        self.rasters.retain(|r| !ids.contains(&r.id()));
    }

    /// Erase a deleted mask annotation from whichever raster holds it.
    ///
    /// Pixels of its label are cleared inside its bounding box, or across the
    /// whole raster when it has none, and the mapping is removed. Returns the
    /// id of the raster that changed.
    pub fn remove_annotation_from_raster(
        &mut self,
        annotation: &Annotation,
    ) -> Result<RasterId, RasterError> {
        let raster = self
            .rasters
            .iter_mut()
            .find(|r| r.get_label_index_for_annotation_id(annotation.id).is_some())
            .ok_or(RasterError::UnmappedAnnotation { id: annotation.id })?;

        let label = raster
            .delete_annotation_mapping(annotation.id)
            .ok_or(RasterError::UnmappedAnnotation { id: annotation.id })?;

        let bbox = annotation
            .data
            .as_mask()
            .and_then(|mask| mask.bounding_box);
        let region = match bbox {
            Some(bbox) => bbox.clip(raster.width(), raster.height()),
            None => raster.full_region(),
        };

        if let Some(region) = region {
            let cleared = raster.clear_label_within(label, region);
            raster.mark_region_invalidated(region);
            log::debug!(
                "Raster {}: cleared {} pixels of annotation {}",
                raster.id(),
                cleared,
                annotation.id
            );
        }

        Ok(raster.id())
    }

    fn last_mut(&mut self) -> &mut Raster {
        let index = self.rasters.len() - 1;
        &mut self.rasters[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Region};
    use crate::model::{AnnotationData, MaskData};

    fn mask_annotation(id: u32, bbox: Option<BoundingBox>) -> Annotation {
        Annotation::new(
            id,
            1,
            [255, 0, 0],
            AnnotationData::Mask(MaskData::new(Vec::new(), bbox)),
        )
    }

    #[test]
    fn test_create_and_lookup() {
        let mut manager = RasterManager::new();
        manager.create_raster(4, "a", 2, 2).unwrap();
        manager.create_raster(2, "b", 3, 3).unwrap();

        assert!(manager.has_raster(4));
        assert_eq!(manager.raster_for_image("b").map(|r| r.id()), Some(2));
        assert_eq!(
            manager.create_raster(4, "c", 1, 1).unwrap_err(),
            RasterError::DuplicateRaster { id: 4 }
        );

        let ids: Vec<_> = manager.rasters().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![4, 2]);
    }

    #[test]
    fn test_largest_id_does_not_overflow() {
        let mut manager = RasterManager::new();
        manager.create_raster(RasterId::MAX, "a", 1, 1).unwrap();

        let id = manager.get_or_create_raster_for_image("b", 1, 1).id();
        assert_ne!(id, RasterId::MAX);
        assert_eq!(manager.rasters().len(), 2);

        manager.update_raster(Raster::new(RasterId::MAX - 1, "c", 1, 1));
        assert!(manager.has_raster(RasterId::MAX - 1));
    }

    #[test]
    fn test_get_or_create_reuses_raster() {
        let mut manager = RasterManager::new();
        manager.create_raster(7, "a", 2, 2).unwrap();

        let id = manager.get_or_create_raster_for_image("b", 5, 5).id();
        assert_eq!(id, 8);
        assert_eq!(manager.get_or_create_raster_for_image("b", 5, 5).id(), 8);
        assert_eq!(manager.get_or_create_raster_for_image("a", 2, 2).id(), 7);
        assert_eq!(manager.rasters().len(), 2);
    }

    #[test]
    fn test_update_and_delete() {
        let mut manager = RasterManager::new();
        manager.create_raster(1, "a", 2, 2).unwrap();
        manager.create_raster(2, "b", 2, 2).unwrap();
        manager.create_raster(3, "c", 2, 2).unwrap();

        manager.update_raster(Raster::new(1, "a", 4, 4));
        assert_eq!(manager.raster(1).map(|r| r.width()), Some(4));

        assert!(manager.delete_raster(2).is_some());
        assert!(manager.delete_raster(2).is_none());
        manager.delete_rasters(&[1, 3]);
        assert!(manager.rasters().is_empty());
    }

    #[test]
    fn test_remove_annotation_clears_pixels() {
        let mut manager = RasterManager::new();
        let raster = manager.create_raster(1, "a", 4, 4).unwrap();
        #[rustfmt::skip]
        let buffer = vec![
            1, 1, 0, 0,
            1, 1, 2, 2,
            0, 0, 2, 2,
            0, 0, 0, 0,
        ];
        raster.replace_buffer(buffer).unwrap();
        raster.set_annotation_mapping(1, 10);
        raster.set_annotation_mapping(2, 20);
        raster.clear_invalidation();

        let annotation = mask_annotation(20, Some(BoundingBox::new(2, 1, 2, 2)));
        assert_eq!(manager.remove_annotation_from_raster(&annotation), Ok(1));

        let raster = manager.raster(1).unwrap();
        assert_eq!(raster.label_pixel_count(2), 0);
        assert_eq!(raster.label_pixel_count(1), 4);
        assert!(raster.get_label_index_for_annotation_id(20).is_none());
        assert_eq!(
            raster.invalidated_region(),
            Some(Region {
                x_min: 2,
                x_max: 3,
                y_min: 1,
                y_max: 2
            })
        );
    }

    #[test]
    fn test_remove_annotation_without_box_scans_raster() {
        let mut manager = RasterManager::new();
        let raster = manager.create_raster(1, "a", 3, 1).unwrap();
        raster.replace_buffer(vec![1, 0, 1]).unwrap();
        raster.set_annotation_mapping(1, 10);

        manager
            .remove_annotation_from_raster(&mask_annotation(10, None))
            .unwrap();
        assert_eq!(manager.raster(1).unwrap().buffer(), &[0, 0, 0]);
    }

    #[test]
    fn test_remove_unmapped_annotation_fails() {
        let mut manager = RasterManager::new();
        manager.create_raster(1, "a", 2, 2).unwrap();
        assert_eq!(
            manager.remove_annotation_from_raster(&mask_annotation(5, None)),
            Err(RasterError::UnmappedAnnotation { id: 5 })
        );
    }
}
