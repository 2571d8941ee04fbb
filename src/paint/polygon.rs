//! Filling a polygon into a class mask.

use std::collections::BTreeSet;

use crate::error::BrushError;
use crate::geometry::{Point, rasterize_polygon};
use crate::model::{AnnotationData, AnnotationId, AnnotationManager, ClassId};
use crate::raster::{PendingMask, Raster};

use super::shared::{
    apply_to_pixel, find_mask_annotation_for_class, mask_bounding_box, remove_empty_masks,
    search_region, update_shrunk_masks,
};

/// Paint the inside of `polygon` with the mask of `class_id`.
///
/// The class mask is created if the raster has none, otherwise extended.
/// Masks of other classes that the polygon covers completely are deleted,
/// and those it covers in part are re-encoded.
/// Returns the class mask's id, or `None` when the polygon covers no pixel.
pub fn draw_polygon_to_raster(
    raster: &mut Raster,
    manager: &mut impl AnnotationManager,
    polygon: &[Point],
    class_id: ClassId,
) -> Result<Option<AnnotationId>, BrushError> {
    let filled = rasterize_polygon(polygon, raster.width(), raster.height());
    if filled.indices.is_empty() {
        return Ok(None);
    }

    let existing = find_mask_annotation_for_class(raster, &*manager, class_id);
    let label = match existing {
        Some((_, label)) => label,
        None => raster.reserve_label(PendingMask {
            class_id,
            color: manager.class_color(class_id),
        })?,
    };

    let mut overwritten = BTreeSet::new();
    let buffer = raster.buffer_mut();
    for &index in &filled.indices {
        apply_to_pixel(&mut buffer[index], label, false, &mut overwritten);
    }
    raster.mark_invalidated(&filled.bounds);

    remove_empty_masks(raster, manager, &overwritten);
    update_shrunk_masks(raster, manager, &overwritten, &filled.bounds)?;

    match existing {
        Some((annotation_id, _)) => {
            let previous_box = mask_bounding_box(&*manager, annotation_id);
            if let Some(region) = search_region(raster, previous_box, &filled.bounds) {
                let mask = raster.encode_label(label, region);
                manager.update_annotation_data(annotation_id, AnnotationData::Mask(mask))?;
            }
            Ok(Some(annotation_id))
        }
        None => {
            let mask = match filled.bounds.clip(raster.width(), raster.height()) {
                Some(region) => raster.encode_label(label, region),
                None => Default::default(),
            };
            let annotation_id = manager.create_annotation(class_id, AnnotationData::Mask(mask))?;
            raster.set_annotation_mapping(label, annotation_id);
            log::debug!(
                "Raster {}: polygon created mask {} with label {}",
                raster.id(),
                annotation_id,
                label
            );
            Ok(Some(annotation_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::model::InMemoryAnnotations;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    #[test]
    fn test_polygon_creates_mask() {
        let mut store = InMemoryAnnotations::new();
        let mut raster = Raster::new(1, "image-1", 5, 5);

        let id = draw_polygon_to_raster(&mut raster, &mut store, &rect(1.0, 1.0, 3.0, 4.0), 2)
            .unwrap()
            .unwrap();

        assert_eq!(raster.label_pixel_count(1), 6);
        assert_eq!(raster.get_annotation_mapping(1), Some(id));
        let mask = store.annotation(id).and_then(|a| a.data.as_mask()).unwrap();
        assert_eq!(mask.bounding_box, Some(BoundingBox::new(1, 1, 2, 3)));
        assert_eq!(mask.sparse_rle, vec![6, 2, 11, 2, 16, 2]);
    }

    #[test]
    fn test_second_polygon_extends_mask() {
        let mut store = InMemoryAnnotations::new();
        let mut raster = Raster::new(1, "image-1", 5, 5);

        let first = draw_polygon_to_raster(&mut raster, &mut store, &rect(0.0, 0.0, 1.0, 1.0), 2)
            .unwrap();
        let second = draw_polygon_to_raster(&mut raster, &mut store, &rect(4.0, 4.0, 5.0, 5.0), 2)
            .unwrap();
        assert_eq!(first, second);

        let id = second.unwrap();
        let mask = store.annotation(id).and_then(|a| a.data.as_mask()).unwrap();
        assert_eq!(mask.bounding_box, Some(BoundingBox::new(0, 0, 5, 5)));
        assert_eq!(mask.sparse_rle, vec![0, 1, 24, 1]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_covering_polygon_deletes_other_class() {
        let mut store = InMemoryAnnotations::new();
        let mut raster = Raster::new(1, "image-1", 4, 4);

        let small = draw_polygon_to_raster(&mut raster, &mut store, &rect(1.0, 1.0, 2.0, 2.0), 1)
            .unwrap()
            .unwrap();
        let large = draw_polygon_to_raster(&mut raster, &mut store, &rect(0.0, 0.0, 4.0, 4.0), 2)
            .unwrap()
            .unwrap();

        assert!(store.annotation(small).is_none());
        assert_eq!(raster.annotation_ids_on_raster(), vec![large]);
        assert_eq!(raster.label_pixel_count(2), 16);
    }

    #[test]
    fn test_partly_covered_class_is_reencoded() {
        let mut store = InMemoryAnnotations::new();
        let mut raster = Raster::new(1, "image-1", 4, 4);

        let under = draw_polygon_to_raster(&mut raster, &mut store, &rect(0.0, 0.0, 4.0, 2.0), 1)
            .unwrap()
            .unwrap();
        draw_polygon_to_raster(&mut raster, &mut store, &rect(2.0, 0.0, 4.0, 4.0), 2).unwrap();

        let stored = store.annotation(under).and_then(|a| a.data.as_mask()).unwrap();
        assert_eq!(Some(stored), raster.mask_data(under).as_ref());
        assert_eq!(stored.sparse_rle, vec![0, 2, 4, 2]);
        assert_eq!(stored.bounding_box, Some(BoundingBox::new(0, 0, 2, 2)));
    }

    #[test]
    fn test_polygon_outside_raster() {
        let mut store = InMemoryAnnotations::new();
        let mut raster = Raster::new(1, "image-1", 4, 4);

        let result =
            draw_polygon_to_raster(&mut raster, &mut store, &rect(10.0, 10.0, 12.0, 12.0), 1);
        assert_eq!(result, Ok(None));
        assert!(raster.labels_on_raster().is_empty());
    }
}
