//! Annotation records and the payloads raster masks exchange with the backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// Unique identifier for an annotation.
pub type AnnotationId = u32;

/// Identifier of the class (category) an annotation belongs to.
pub type ClassId = u32;

/// An RGB colour.
pub type Rgb = [u8; 3];

/// An annotation as seen by the raster engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique identifier for this annotation.
    pub id: AnnotationId,
    /// Class this annotation belongs to.
    pub class_id: ClassId,
    /// Display colour of the class.
    pub color: Rgb,
    /// Type specific payload.
    pub data: AnnotationData,
}

impl Annotation {
    pub fn new(id: AnnotationId, class_id: ClassId, color: Rgb, data: AnnotationData) -> Self {
        Self {
            id,
            class_id,
            color,
            data,
        }
    }

    /// Name of the annotation type, used to pick a renderer.
    pub fn type_name(&self) -> &'static str {
        self.data.type_name()
    }
}

/// Payload of an annotation, keyed by its type name on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationData {
    /// One segment of a raster, stored as sparse RLE.
    Mask(MaskData),
    /// A whole raster, stored as dense RLE.
    RasterLayer(RasterLayerData),
    /// Any other annotation type. Not drawn by the raster engine.
    #[serde(untagged)]
    Other(serde_json::Value),
}

impl AnnotationData {
    /// Wire name of the payload type.
    pub fn type_name(&self) -> &'static str {
        match self {
            AnnotationData::Mask(_) => "mask",
            AnnotationData::RasterLayer(_) => "raster_layer",
            AnnotationData::Other(_) => "other",
        }
    }

    pub fn as_mask(&self) -> Option<&MaskData> {
        match self {
            AnnotationData::Mask(mask) => Some(mask),
            _ => None,
        }
    }

    pub fn is_mask(&self) -> bool {
        matches!(self, AnnotationData::Mask(_))
    }
}

/// Payload of a mask annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskData {
    /// `[start, length]` pairs with absolute pixel indices.
    pub sparse_rle: Vec<u32>,
    /// Tight box around the mask, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl MaskData {
    pub fn new(sparse_rle: Vec<u32>, bounding_box: Option<BoundingBox>) -> Self {
        Self {
            sparse_rle,
            bounding_box,
        }
    }

    /// Whether the mask covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.sparse_rle.len() < 2
    }
}

/// Payload of a raster layer: the full labelmap of one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterLayerData {
    /// Label index of every mask annotation on the raster.
    pub mask_annotation_ids_mapping: BTreeMap<AnnotationId, u8>,
    /// `width * height` of the image.
    pub total_pixels: usize,
    /// `[value, length]` pairs covering every pixel.
    pub dense_rle: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_payload_wire_shape() {
        let data = AnnotationData::Mask(MaskData::new(
            vec![0, 2, 6, 1],
            Some(BoundingBox::new(0, 0, 3, 2)),
        ));
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "mask": {
                    "sparse_rle": [0, 2, 6, 1],
                    "bounding_box": { "x": 0, "y": 0, "w": 3, "h": 2 }
                }
            })
        );
    }

    #[test]
    fn test_mask_without_box() {
        let data: AnnotationData =
            serde_json::from_str(r#"{ "mask": { "sparse_rle": [4, 1] } }"#).unwrap();
        let mask = data.as_mask().unwrap();
        assert_eq!(mask.sparse_rle, vec![4, 1]);
        assert!(mask.bounding_box.is_none());
    }

    #[test]
    fn test_raster_layer_payload() {
        let json = r#"{
            "raster_layer": {
                "mask_annotation_ids_mapping": { "7": 1, "9": 2 },
                "total_pixels": 4,
                "dense_rle": [1, 2, 2, 2]
            }
        }"#;
        let data: AnnotationData = serde_json::from_str(json).unwrap();
        assert_eq!(data.type_name(), "raster_layer");

        let AnnotationData::RasterLayer(layer) = data else {
            panic!("expected a raster layer");
        };
        assert_eq!(layer.mask_annotation_ids_mapping.get(&7), Some(&1));
        assert_eq!(layer.mask_annotation_ids_mapping.get(&9), Some(&2));
        assert_eq!(layer.total_pixels, 4);
    }

    #[test]
    fn test_unknown_type_is_kept() {
        let data: AnnotationData =
            serde_json::from_str(r#"{ "polygon": { "points": [[0, 0], [1, 1]] } }"#).unwrap();
        assert_eq!(data.type_name(), "other");
        assert!(data.as_mask().is_none());
    }
}
