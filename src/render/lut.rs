//! Label to colour lookup tables.

use crate::config::RenderSettings;
use crate::constants::LABEL_SLOTS;
use crate::model::{Annotation, Rgb};
use crate::raster::Raster;

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// RGBA colour of every label, for interior and edge pixels.
///
/// Labels with no annotation and no reservation stay transparent.
pub(crate) struct ColorLut {
    interior: [[u8; 4]; LABEL_SLOTS],
    edge: [[u8; 4]; LABEL_SLOTS],
}

impl ColorLut {
    pub(crate) fn build(
        raster: &Raster,
        annotations: &[Annotation],
        settings: &RenderSettings,
    ) -> Self {
        let interior_alpha = alpha_byte(settings.interior_alpha);
        let edge_alpha = alpha_byte(settings.outline_alpha);

        let mut lut = Self {
            interior: [TRANSPARENT; LABEL_SLOTS],
            edge: [TRANSPARENT; LABEL_SLOTS],
        };

        for &label in raster.labels_on_raster() {
            let Some([r, g, b]) = label_color(raster, annotations, label) else {
                continue;
            };
            let slot = usize::from(label);
            lut.interior[slot] = [r, g, b, interior_alpha];
            lut.edge[slot] = [r, g, b, edge_alpha];
        }

        lut
    }

    #[inline]
    pub(crate) fn interior(&self, label: u8) -> [u8; 4] {
        self.interior[usize::from(label)]
    }

    #[inline]
    pub(crate) fn edge(&self, label: u8) -> [u8; 4] {
        self.edge[usize::from(label)]
    }
}

/// Colour of the annotation holding `label`, falling back to the mask being
/// drawn under that label.
fn label_color(raster: &Raster, annotations: &[Annotation], label: u8) -> Option<Rgb> {
    raster
        .get_annotation_mapping(label)
        .and_then(|id| annotations.iter().find(|a| a.id == id))
        .map(|annotation| annotation.color)
        .or_else(|| raster.pending_mask(label).map(|pending| pending.color))
}

fn alpha_byte(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).floor() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationData, MaskData};
    use crate::raster::PendingMask;

    #[test]
    fn test_colors_from_annotations_and_reservations() {
        let mut raster = Raster::new(1, "image-1", 2, 2);
        raster.set_annotation_mapping(1, 10);
        raster.set_annotation_mapping(2, 20);
        let pending = raster
            .reserve_label(PendingMask {
                class_id: 3,
                color: [0, 0, 255],
            })
            .unwrap();

        // Annotation 20 is not in the live list.
        let annotations = vec![Annotation::new(
            10,
            1,
            [255, 0, 0],
            AnnotationData::Mask(MaskData::default()),
        )];
        let lut = ColorLut::build(&raster, &annotations, &RenderSettings::default());

        assert_eq!(lut.interior(1), [255, 0, 0, 153]);
        assert_eq!(lut.edge(1), [255, 0, 0, 76]);
        assert_eq!(lut.interior(2), TRANSPARENT);
        assert_eq!(lut.interior(pending), [0, 0, 255, 153]);
        assert_eq!(lut.interior(0), TRANSPARENT);
    }

    #[test]
    fn test_alpha_byte() {
        assert_eq!(alpha_byte(1.0), 255);
        assert_eq!(alpha_byte(0.5), 127);
        assert_eq!(alpha_byte(-1.0), 0);
    }
}
