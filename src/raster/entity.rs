//! The raster: one labelmap shared by every mask annotation of an image.

use std::collections::{BTreeSet, HashMap};

use image::RgbaImage;

use crate::constants::{BACKGROUND_LABEL, MAX_LABELS};
use crate::error::RasterError;
use crate::geometry::{Bounds, Region};
use crate::model::{AnnotationId, ClassId, Rgb};

/// Unique identifier for a raster.
pub type RasterId = u64;

/// A mask that has a label on the raster but no annotation yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMask {
    /// Class the mask will be created with.
    pub class_id: ClassId,
    /// Colour to draw it with until it exists.
    pub color: Rgb,
}

/// A per-image labelmap.
///
/// Each pixel holds a label index. Label 0 is background; every other label
/// present in the buffer belongs to exactly one mask annotation, except for
/// a label reserved by a stroke that has not finished yet.
#[derive(Debug)]
pub struct Raster {
    id: RasterId,
    image_key: String,
    width: u32,
    height: u32,
    buffer: Vec<u8>,
    /// Pixels whose rendering is stale. `None` when clean.
    invalidated: Option<Region>,
    label_to_annotation: HashMap<u8, AnnotationId>,
    annotation_to_label: HashMap<AnnotationId, u8>,
    /// Labels that are mapped or reserved.
    labels_on_raster: BTreeSet<u8>,
    pending: HashMap<u8, PendingMask>,
    cached_surface: Option<RgbaImage>,
}

impl Raster {
    /// Create an all-background raster. It starts fully invalidated.
    pub fn new(id: RasterId, image_key: impl Into<String>, width: u32, height: u32) -> Self {
        let total = width as usize * height as usize;
        Self {
            id,
            image_key: image_key.into(),
            width,
            height,
            buffer: vec![BACKGROUND_LABEL; total],
            invalidated: Region::full(width, height),
            label_to_annotation: HashMap::new(),
            annotation_to_label: HashMap::new(),
            labels_on_raster: BTreeSet::new(),
            pending: HashMap::new(),
            cached_surface: None,
        }
    }

    pub fn id(&self) -> RasterId {
        self.id
    }

    /// Key of the image (or video slot) the raster belongs to.
    pub fn image_key(&self) -> &str {
        &self.image_key
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn total_pixels(&self) -> usize {
        self.buffer.len()
    }

    /// The whole raster, or `None` if it has no pixels.
    pub fn full_region(&self) -> Option<Region> {
        Region::full(self.width, self.height)
    }

    /// Row-major label indices.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Mutable access to the label indices.
    ///
    /// Callers are responsible for marking what they change as invalidated.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Swap in a new labelmap of the same size and invalidate everything.
    pub fn replace_buffer(&mut self, buffer: Vec<u8>) -> Result<(), RasterError> {
        if buffer.len() != self.buffer.len() {
            return Err(RasterError::BufferSizeMismatch {
                expected: self.buffer.len(),
                found: buffer.len(),
            });
        }
        self.buffer = buffer;
        self.invalidate_all();
        Ok(())
    }

    pub fn label_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.buffer.get(self.index(x, y)).copied()
    }

    #[inline]
    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    // Invalidation

    /// Add `bounds` to the stale region. Parts outside the raster are dropped.
    pub fn mark_invalidated(&mut self, bounds: &Bounds) {
        if let Some(region) = bounds.clip(self.width, self.height) {
            self.union_invalidated(region);
        }
    }

    /// Add a region of pixels, clipped to the raster.
    pub(crate) fn mark_region_invalidated(&mut self, region: Region) {
        self.mark_invalidated(&Bounds::from(region));
    }

    fn union_invalidated(&mut self, region: Region) {
        self.invalidated = Some(match self.invalidated {
            Some(current) => current.union(&region),
            None => region,
        });
    }

    pub fn invalidate_all(&mut self) {
        self.invalidated = self.full_region();
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated.is_some()
    }

    pub fn invalidated_region(&self) -> Option<Region> {
        self.invalidated
    }

    pub fn clear_invalidation(&mut self) {
        self.invalidated = None;
    }

    // Label mapping

    /// Map `label` to an annotation, replacing stale entries on either side.
    ///
    /// A reservation for `label` ends here.
    ///
    /// # Panics
    ///
    /// Panics when `label` is the background label.
    pub fn set_annotation_mapping(&mut self, label: u8, annotation_id: AnnotationId) {
        assert_ne!(
            label, BACKGROUND_LABEL,
            "background label cannot be mapped to an annotation"
        );

        if let Some(previous_id) = self.label_to_annotation.insert(label, annotation_id) {
            if previous_id != annotation_id {
                self.annotation_to_label.remove(&previous_id);
            }
        }
        if let Some(previous_label) = self.annotation_to_label.insert(annotation_id, label) {
            if previous_label != label {
                self.label_to_annotation.remove(&previous_label);
                if !self.pending.contains_key(&previous_label) {
                    self.labels_on_raster.remove(&previous_label);
                }
            }
        }

        self.pending.remove(&label);
        self.labels_on_raster.insert(label);
    }

    pub fn get_annotation_mapping(&self, label: u8) -> Option<AnnotationId> {
        self.label_to_annotation.get(&label).copied()
    }

    pub fn get_label_index_for_annotation_id(&self, annotation_id: AnnotationId) -> Option<u8> {
        self.annotation_to_label.get(&annotation_id).copied()
    }

    /// Labels in use, mapped or reserved.
    pub fn labels_on_raster(&self) -> &BTreeSet<u8> {
        &self.labels_on_raster
    }

    /// `(annotation, label)` pairs, ordered by label.
    pub fn mappings(&self) -> Vec<(AnnotationId, u8)> {
        let mut mappings: Vec<_> = self
            .annotation_to_label
            .iter()
            .map(|(&id, &label)| (id, label))
            .collect();
        mappings.sort_by_key(|&(_, label)| label);
        mappings
    }

    /// Annotations with a label on this raster, ordered by label.
    pub fn annotation_ids_on_raster(&self) -> Vec<AnnotationId> {
        self.mappings().into_iter().map(|(id, _)| id).collect()
    }

    /// Remove an annotation's mapping and return the label it had.
    pub fn delete_annotation_mapping(&mut self, annotation_id: AnnotationId) -> Option<u8> {
        let label = self.annotation_to_label.remove(&annotation_id)?;
        self.label_to_annotation.remove(&label);
        if !self.pending.contains_key(&label) {
            self.labels_on_raster.remove(&label);
        }
        Some(label)
    }

    /// Forget every mapping and reservation. Pixels are left as they are.
    pub fn clear_annotation_mappings(&mut self) {
        self.label_to_annotation.clear();
        self.annotation_to_label.clear();
        self.pending.clear();
        self.labels_on_raster.clear();
    }

    /// Lowest label that is neither mapped nor reserved.
    pub fn next_available_label_index(&self) -> Result<u8, RasterError> {
        (1..MAX_LABELS)
            .find(|label| !self.labels_on_raster.contains(label))
            .ok_or(RasterError::LabelsExhausted { max: MAX_LABELS })
    }

    // In-progress masks

    /// Reserve the next free label for a mask that does not exist yet.
    pub fn reserve_label(&mut self, pending: PendingMask) -> Result<u8, RasterError> {
        let label = self.next_available_label_index()?;
        self.pending.insert(label, pending);
        self.labels_on_raster.insert(label);
        log::debug!(
            "Raster {}: reserved label {} for class {}",
            self.id,
            label,
            pending.class_id
        );
        Ok(label)
    }

    pub fn pending_mask(&self, label: u8) -> Option<&PendingMask> {
        self.pending.get(&label)
    }

    /// Drop a reservation. Pixels are left as they are.
    pub fn release_label(&mut self, label: u8) {
        if self.pending.remove(&label).is_some() && !self.label_to_annotation.contains_key(&label)
        {
            self.labels_on_raster.remove(&label);
        }
    }

    // Pixel queries

    pub fn label_pixel_count(&self, label: u8) -> usize {
        self.buffer.iter().filter(|&&value| value == label).count()
    }

    pub fn contains_label(&self, label: u8) -> bool {
        self.buffer.contains(&label)
    }

    /// Tight bounds of `label` inside `region`. Empty when it does not occur.
    pub fn label_bounds_within(&self, label: u8, region: Region) -> Bounds {
        let mut bounds = Bounds::EMPTY;
        for y in region.y_min..=region.y_max.min(self.height.saturating_sub(1)) {
            let row = self.index(0, y);
            for x in region.x_min..=region.x_max.min(self.width.saturating_sub(1)) {
                if self.buffer[row + x as usize] == label {
                    bounds.include(i64::from(x), i64::from(y));
                }
            }
        }
        bounds
    }

    /// Set pixels of `label` inside `region` to background. Returns how many
    /// pixels changed.
    pub fn clear_label_within(&mut self, label: u8, region: Region) -> usize {
        let mut cleared = 0;
        for y in region.y_min..=region.y_max.min(self.height.saturating_sub(1)) {
            let row = self.index(0, y);
            for x in region.x_min..=region.x_max.min(self.width.saturating_sub(1)) {
                let pixel = &mut self.buffer[row + x as usize];
                if *pixel == label {
                    *pixel = BACKGROUND_LABEL;
                    cleared += 1;
                }
            }
        }
        cleared
    }

    // Rendering cache

    /// The raster-sized RGBA surface, created transparent on first use.
    pub fn surface_mut(&mut self) -> &mut RgbaImage {
        let (width, height) = (self.width, self.height);
        self.cached_surface
            .get_or_insert_with(|| RgbaImage::new(width, height))
    }

    pub fn cached_surface(&self) -> Option<&RgbaImage> {
        self.cached_surface.as_ref()
    }

    /// Drop the cached surface. The next render rebuilds all of it.
    pub fn free_memory(&mut self) {
        self.cached_surface = None;
        self.invalidate_all();
    }
}
