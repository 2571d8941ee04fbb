//! Moving rasters and single masks in and out of annotation payloads.

use std::collections::{BTreeMap, HashMap};

use crate::constants::BACKGROUND_LABEL;
use crate::error::RasterError;
use crate::geometry::{Bounds, Region};
use crate::model::{AnnotationId, MaskData, RasterLayerData};
use crate::rle::{SparseBounds, dense, sparse};

use super::Raster;

impl Raster {
    /// Replace the raster's content with a `raster_layer` payload.
    ///
    /// Mappings are rebuilt from the payload and everything is invalidated.
    /// Returns the bounds of each mapped annotation, empty for annotations
    /// whose label does not occur.
    pub fn load_raster_layer(
        &mut self,
        layer: &RasterLayerData,
    ) -> Result<HashMap<AnnotationId, Bounds>, RasterError> {
        let expected = self.total_pixels();
        if layer.total_pixels != expected {
            return Err(RasterError::TotalPixelsMismatch {
                expected,
                found: layer.total_pixels,
            });
        }

        let decoded = dense::decode(&layer.dense_rle, expected, self.width() as usize)?;
        self.replace_buffer(decoded.buffer)?;
        self.clear_annotation_mappings();

        let mut bounds = HashMap::with_capacity(layer.mask_annotation_ids_mapping.len());
        for (&annotation_id, &label) in &layer.mask_annotation_ids_mapping {
            if label == BACKGROUND_LABEL {
                log::warn!(
                    "Raster {}: ignoring annotation {} mapped to the background label",
                    self.id(),
                    annotation_id
                );
                continue;
            }
            self.set_annotation_mapping(label, annotation_id);
            let label_bounds = decoded
                .bounds_per_label
                .get(label)
                .copied()
                .unwrap_or(Bounds::EMPTY);
            bounds.insert(annotation_id, label_bounds);
        }

        log::info!(
            "Raster {}: loaded {} masks from raster layer",
            self.id(),
            bounds.len()
        );
        Ok(bounds)
    }

    /// Export the whole raster as a `raster_layer` payload.
    pub fn to_raster_layer(&self) -> RasterLayerData {
        let mask_annotation_ids_mapping: BTreeMap<AnnotationId, u8> =
            self.mappings().into_iter().collect();
        RasterLayerData {
            mask_annotation_ids_mapping,
            total_pixels: self.total_pixels(),
            dense_rle: dense::encode(self.buffer()),
        }
    }

    /// The `mask` payload of one mapped annotation.
    pub fn mask_data(&self, annotation_id: AnnotationId) -> Option<MaskData> {
        let label = self.get_label_index_for_annotation_id(annotation_id)?;
        let full = self.full_region()?;
        Some(self.encode_label(label, full))
    }

    /// Sparse-encode `label` using the tight bounds found inside `search`.
    pub(crate) fn encode_label(&self, label: u8, search: Region) -> MaskData {
        let bounds = self.label_bounds_within(label, search);
        if bounds.is_empty() {
            return MaskData::default();
        }
        let sparse_bounds = SparseBounds::new(self.width() as usize, &bounds);
        MaskData::new(
            sparse::encode(self.buffer(), label, Some(&sparse_bounds)),
            bounds.to_bounding_box(),
        )
    }

    /// Write a `mask` payload onto the raster for `annotation_id`.
    ///
    /// The payload is validated before anything changes. Pixels the
    /// annotation had before are cleared first; an unmapped annotation gets
    /// the next free label. Returns the label used.
    pub fn apply_mask_data(
        &mut self,
        annotation_id: AnnotationId,
        mask: &MaskData,
    ) -> Result<u8, RasterError> {
        sparse::validate(&mask.sparse_rle, self.total_pixels())?;

        let label = match self.get_label_index_for_annotation_id(annotation_id) {
            Some(label) => label,
            None => self.next_available_label_index()?,
        };

        if let Some(full) = self.full_region() {
            let previous = self.label_bounds_within(label, full);
            if let Some(region) = previous.clip(self.width(), self.height()) {
                self.clear_label_within(label, region);
                self.mark_region_invalidated(region);
            }
        }

        sparse::decode(&mask.sparse_rle, self.buffer_mut(), label)?;
        self.set_annotation_mapping(label, annotation_id);

        match mask.bounding_box {
            Some(bbox) => self.mark_invalidated(&bbox.to_bounds()),
            None => self.invalidate_all(),
        }

        Ok(label)
    }
}
