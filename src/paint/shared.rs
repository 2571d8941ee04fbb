//! Helpers shared by the brush and the polygon fill.

use std::collections::BTreeSet;

use crate::constants::BACKGROUND_LABEL;
use crate::error::BrushError;
use crate::geometry::{BoundingBox, Bounds, Region};
use crate::model::{AnnotationData, AnnotationId, AnnotationManager, ClassId};
use crate::raster::Raster;

/// The mask annotation of `class_id` on the raster, with its label.
pub(crate) fn find_mask_annotation_for_class(
    raster: &Raster,
    manager: &impl AnnotationManager,
    class_id: ClassId,
) -> Option<(AnnotationId, u8)> {
    raster.mappings().into_iter().find(|&(id, _)| {
        manager
            .annotation(id)
            .is_some_and(|a| a.class_id == class_id && a.data.is_mask())
    })
}

/// Cached bounding box of a mask annotation.
pub(crate) fn mask_bounding_box(
    manager: &impl AnnotationManager,
    annotation_id: AnnotationId,
) -> Option<BoundingBox> {
    manager
        .annotation(annotation_id)
        .and_then(|a| a.data.as_mask())
        .and_then(|mask| mask.bounding_box)
}

/// Where to look for the pixels of an existing mask after an edit.
///
/// Without a cached box the whole raster is searched.
pub(crate) fn search_region(
    raster: &Raster,
    previous_box: Option<BoundingBox>,
    edit_range: &Bounds,
) -> Option<Region> {
    match previous_box {
        Some(bbox) => {
            let mut bounds = bbox.to_bounds();
            bounds.union(edit_range);
            bounds.clip(raster.width(), raster.height())
        }
        None => raster.full_region(),
    }
}

/// Write `label` into one pixel, or erase it.
///
/// Erasing only clears pixels that hold `label`. Painting records any other
/// non-background label it replaces in `overwritten`.
#[inline]
pub(crate) fn apply_to_pixel(
    pixel: &mut u8,
    label: u8,
    erasing: bool,
    overwritten: &mut BTreeSet<u8>,
) {
    if erasing {
        if *pixel == label {
            *pixel = BACKGROUND_LABEL;
        }
    } else if *pixel != label {
        if *pixel != BACKGROUND_LABEL {
            overwritten.insert(*pixel);
        }
        *pixel = label;
    }
}

/// Delete the annotations of `candidates` that have no pixels left.
///
/// Each label is handled once. A failed deletion is logged and the mapping
/// kept. Returns the ids that were deleted.
pub(crate) fn remove_empty_masks(
    raster: &mut Raster,
    manager: &mut impl AnnotationManager,
    candidates: &BTreeSet<u8>,
) -> Vec<AnnotationId> {
    let mut deleted = Vec::new();

    for &label in candidates {
        if raster.contains_label(label) {
            continue;
        }
        let Some(annotation_id) = raster.get_annotation_mapping(label) else {
            continue;
        };

        match manager.delete_annotation(annotation_id) {
            Ok(()) => {
                raster.delete_annotation_mapping(annotation_id);
                deleted.push(annotation_id);
                log::debug!(
                    "Raster {}: mask {} (label {}) emptied and deleted",
                    raster.id(),
                    annotation_id,
                    label
                );
            }
            Err(e) => {
                log::warn!(
                    "Raster {}: failed to delete emptied mask {}: {}",
                    raster.id(),
                    annotation_id,
                    e
                );
            }
        }
    }

    deleted
}

/// Re-encode the masks of `overwritten` labels that lost some pixels but
/// still have others.
///
/// Each mask is searched within its previous box joined with `edit_range`.
/// Returns the ids whose payload was replaced.
pub(crate) fn update_shrunk_masks(
    raster: &Raster,
    manager: &mut impl AnnotationManager,
    overwritten: &BTreeSet<u8>,
    edit_range: &Bounds,
) -> Result<Vec<AnnotationId>, BrushError> {
    let mut updated = Vec::new();

    for &label in overwritten {
        if !raster.contains_label(label) {
            continue;
        }
        let Some(annotation_id) = raster.get_annotation_mapping(label) else {
            continue;
        };
        if !manager
            .annotation(annotation_id)
            .is_some_and(|a| a.data.is_mask())
        {
            continue;
        }

        let previous_box = mask_bounding_box(&*manager, annotation_id);
        let Some(region) = search_region(raster, previous_box, edit_range) else {
            continue;
        };
        let mask = raster.encode_label(label, region);
        manager.update_annotation_data(annotation_id, AnnotationData::Mask(mask))?;
        updated.push(annotation_id);
        log::debug!(
            "Raster {}: mask {} (label {}) partly overwritten",
            raster.id(),
            annotation_id,
            label
        );
    }

    Ok(updated)
}
