//! Brush stroke sessions.

use std::collections::BTreeSet;

use crate::error::BrushError;
use crate::geometry::{BoundingBox, Bounds, Point, rasterize_polygon};
use crate::model::{AnnotationData, AnnotationId, AnnotationManager, ClassId};
use crate::raster::{PendingMask, Raster};

use super::shared::{
    apply_to_pixel, find_mask_annotation_for_class, mask_bounding_box, remove_empty_masks,
    search_region, update_shrunk_masks,
};
use super::tip::{StrokePoint, TipShape, interpolation_quad, needs_interpolation};

/// What a finished stroke did to the annotation store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrokeOutcome {
    /// Mask annotation created for the stroke's class.
    pub created: Option<AnnotationId>,
    /// Existing mask annotations whose payload was replaced: masks of other
    /// classes the stroke painted over, then the stroke's own mask.
    pub updated: Vec<AnnotationId>,
    /// Mask annotations left without pixels and deleted.
    pub deleted: Vec<AnnotationId>,
}

impl StrokeOutcome {
    /// Whether the stroke changed no annotation.
    pub fn is_empty(&self) -> bool {
        self.created.is_none() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

/// The label a session paints, and the annotation behind it if any.
#[derive(Debug, Clone, Copy)]
struct StrokeTarget {
    label: u8,
    /// `None` while the mask is new and only reserved on the raster.
    annotation: Option<AnnotationId>,
    previous_box: Option<BoundingBox>,
}

/// One brush stroke on a raster, from the first point to `end_stroke`.
///
/// Pixels change as points arrive. Annotations are created, updated and
/// deleted only when the stroke ends.
pub struct BrushPainter<'r> {
    raster: &'r mut Raster,
    class_id: ClassId,
    tip_shape: TipShape,
    erasing: bool,
    target: Option<StrokeTarget>,
    labels_being_overwritten: BTreeSet<u8>,
    edit_range: Bounds,
    previous: Option<StrokePoint>,
}

impl<'r> BrushPainter<'r> {
    /// Start a stroke that paints (or erases) the mask of `class_id`.
    ///
    /// When painting a class with no mask on the raster yet, a label is
    /// reserved for it. When erasing such a class the stroke does nothing.
    pub fn new(
        raster: &'r mut Raster,
        manager: &impl AnnotationManager,
        class_id: ClassId,
        tip_shape: TipShape,
        erasing: bool,
    ) -> Result<Self, BrushError> {
        let target = match find_mask_annotation_for_class(raster, manager, class_id) {
            Some((annotation_id, label)) => Some(StrokeTarget {
                label,
                annotation: Some(annotation_id),
                previous_box: mask_bounding_box(manager, annotation_id),
            }),
            None if erasing => None,
            None => {
                let label = raster.reserve_label(PendingMask {
                    class_id,
                    color: manager.class_color(class_id),
                })?;
                Some(StrokeTarget {
                    label,
                    annotation: None,
                    previous_box: None,
                })
            }
        };

        Ok(Self {
            raster,
            class_id,
            tip_shape,
            erasing,
            target,
            labels_being_overwritten: BTreeSet::new(),
            edit_range: Bounds::EMPTY,
            previous: None,
        })
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    pub fn is_erasing(&self) -> bool {
        self.erasing
    }

    /// Label painted by this stroke, if it has one.
    pub fn target_label(&self) -> Option<u8> {
        self.target.map(|t| t.label)
    }

    /// Whether at least one point has been stroked.
    pub fn is_stroking(&self) -> bool {
        self.previous.is_some()
    }

    /// Pixels touched so far.
    pub fn edit_range(&self) -> Bounds {
        self.edit_range
    }

    /// Apply the tip at `point` and fill the gap from the previous point.
    pub fn stroke(&mut self, point: Point, radius: f64) {
        let Some(target) = self.target else {
            return;
        };
        let tip = StrokePoint::new(point, radius, self.tip_shape);

        self.paint_tip(&tip, target.label);

        if let Some(previous) = self.previous {
            if needs_interpolation(&previous, &tip) {
                let quad = interpolation_quad(&previous, &tip);
                self.paint_polygon(&quad, target.label);
            }
        }

        self.previous = Some(tip);
    }

    fn paint_tip(&mut self, tip: &StrokePoint, label: u8) {
        let Some(region) = tip
            .footprint_range()
            .clip(self.raster.width(), self.raster.height())
        else {
            return;
        };

        for y in region.y_min..=region.y_max {
            for x in region.x_min..=region.x_max {
                if tip.covers(i64::from(x), i64::from(y)) {
                    let index = self.raster.index(x, y);
                    apply_to_pixel(
                        &mut self.raster.buffer_mut()[index],
                        label,
                        self.erasing,
                        &mut self.labels_being_overwritten,
                    );
                }
            }
        }

        self.edit_range.union(&Bounds::from(region));
        self.raster.mark_region_invalidated(region);
    }

    fn paint_polygon(&mut self, polygon: &[Point], label: u8) {
        let filled = rasterize_polygon(polygon, self.raster.width(), self.raster.height());

        let buffer = self.raster.buffer_mut();
        for index in filled.indices {
            apply_to_pixel(
                &mut buffer[index],
                label,
                self.erasing,
                &mut self.labels_being_overwritten,
            );
        }

        self.edit_range.union(&filled.bounds);
        self.raster.mark_invalidated(&filled.bounds);
    }

    /// Finish the stroke and bring the annotation store in line with the
    /// raster.
    ///
    /// Masks emptied by the stroke are deleted first, and masks it only
    /// partly painted over are re-encoded. Then the painted mask is created
    /// or its payload replaced. Pixel changes are kept when the manager
    /// fails, and a reserved label stays reserved.
    pub fn end_stroke(
        self,
        manager: &mut impl AnnotationManager,
    ) -> Result<StrokeOutcome, BrushError> {
        let mut outcome = StrokeOutcome::default();
        let Some(target) = self.target else {
            return Ok(outcome);
        };
        let raster = self.raster;

        let target_empty = !raster.contains_label(target.label);
        let mut candidates = self.labels_being_overwritten;
        if target.annotation.is_some() && target_empty && self.erasing {
            candidates.insert(target.label);
        }

        outcome.deleted = remove_empty_masks(raster, manager, &candidates);
        outcome.updated = update_shrunk_masks(raster, manager, &candidates, &self.edit_range)?;

        match target.annotation {
            None if target_empty => {
                raster.release_label(target.label);
            }
            None => {
                let search = self.edit_range.clip(raster.width(), raster.height());
                let mask = match search {
                    Some(region) => raster.encode_label(target.label, region),
                    None => Default::default(),
                };
                let annotation_id =
                    manager.create_annotation(self.class_id, AnnotationData::Mask(mask))?;
                raster.set_annotation_mapping(target.label, annotation_id);
                outcome.created = Some(annotation_id);
                log::debug!(
                    "Raster {}: stroke created mask {} with label {}",
                    raster.id(),
                    annotation_id,
                    target.label
                );
            }
            Some(annotation_id) if !target_empty => {
                if let Some(region) = search_region(raster, target.previous_box, &self.edit_range)
                {
                    let mask = raster.encode_label(target.label, region);
                    manager.update_annotation_data(annotation_id, AnnotationData::Mask(mask))?;
                    outcome.updated.push(annotation_id);
                }
            }
            // Erased to nothing; handled with the other emptied masks.
            Some(_) => {}
        }

        Ok(outcome)
    }
}
