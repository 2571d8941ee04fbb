//! Sparse RLE: the pixels of one label as `(startPixelIndex, runLength)` pairs.

use crate::error::{RleError, RleKind};
use crate::geometry::{Bounds, PixelPoint};

/// Restricts sparse encoding to an inclusive rectangle of the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparseBounds {
    /// Row length of the full mask.
    pub mask_width: usize,
    pub top_left: PixelPoint,
    pub bottom_right: PixelPoint,
}

impl SparseBounds {
    /// Restrict encoding to `bounds` of a mask with rows of `mask_width`.
    pub fn new(mask_width: usize, bounds: &Bounds) -> Self {
        Self {
            mask_width,
            top_left: bounds.top_left,
            bottom_right: bounds.bottom_right,
        }
    }
}

/// Accumulates `[start, length]` pairs while pixels are visited in order.
struct RunCollector {
    pairs: Vec<u32>,
    run_start: Option<usize>,
}

impl RunCollector {
    fn new() -> Self {
        Self {
            pairs: Vec::new(),
            run_start: None,
        }
    }

    fn visit(&mut self, index: usize, matches: bool) {
        match (self.run_start, matches) {
            (None, true) => self.run_start = Some(index),
            (Some(_), false) => self.close(index),
            _ => {}
        }
    }

    /// End the open run, if any, just before `end`.
    fn close(&mut self, end: usize) {
        if let Some(start) = self.run_start.take() {
            self.pairs.push(start as u32);
            self.pairs.push((end - start) as u32);
        }
    }
}

/// Encode the pixels equal to `class_id` as sparse RLE.
///
/// Without `bounds` the whole mask is scanned and runs may continue across
/// rows. With `bounds` only the rectangle is scanned, row by row, and a run
/// always ends at the rectangle's right edge. Start indices are absolute
/// positions in the full mask. Returns an empty array when the value does
/// not occur.
pub fn encode(mask: &[u8], class_id: u8, bounds: Option<&SparseBounds>) -> Vec<u32> {
    let mut runs = RunCollector::new();

    let Some(bounds) = bounds else {
        for (index, &value) in mask.iter().enumerate() {
            runs.visit(index, value == class_id);
        }
        runs.close(mask.len());
        return runs.pairs;
    };

    let width = bounds.mask_width;
    if width == 0 {
        return runs.pairs;
    }
    let height = mask.len() / width;

    let x_min = bounds.top_left.x.max(0);
    let y_min = bounds.top_left.y.max(0);
    let x_max = bounds.bottom_right.x.min(width as i64 - 1);
    let y_max = bounds.bottom_right.y.min(height as i64 - 1);

    if x_min > x_max || y_min > y_max {
        return runs.pairs;
    }

    for y in y_min as usize..=y_max as usize {
        let row = y * width;
        for x in x_min as usize..=x_max as usize {
            let index = row + x;
            runs.visit(index, mask[index] == class_id);
        }
        runs.close(row + x_max as usize + 1);
    }

    runs.pairs
}

/// Check that `pairs` can be written into a mask of `mask_length` pixels.
///
/// Fewer than one full pair is a valid, empty encoding.
pub fn validate(pairs: &[u32], mask_length: usize) -> Result<(), RleError> {
    if pairs.len() % 2 != 0 {
        return Err(RleError::malformed(RleKind::Sparse));
    }

    for pair in pairs.chunks_exact(2) {
        let (start, length) = (pair[0] as usize, pair[1] as usize);
        match start.checked_add(length) {
            Some(end) if end <= mask_length => {}
            end => {
                return Err(RleError::OutOfRange {
                    end: end.unwrap_or(usize::MAX),
                    mask_length,
                });
            }
        }
    }

    Ok(())
}

/// Write `class_id` over every run in `pairs`.
///
/// The whole encoding is validated first; on error `target` is unchanged.
/// Pixels outside the runs are left as they were.
pub fn decode(pairs: &[u32], target: &mut [u8], class_id: u8) -> Result<(), RleError> {
    validate(pairs, target.len())?;

    for pair in pairs.chunks_exact(2) {
        let start = pair[0] as usize;
        let end = start + pair[1] as usize;
        target[start..end].fill(class_id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASK_LENGTH: usize = 16;

    #[rustfmt::skip]
    const MASK: [u8; MASK_LENGTH] = [
        1, 1, 0, 2,
        2, 2, 1, 0,
        3, 3, 2, 2,
        1, 1, 1, 1,
    ];

    const SPARSE_RLE_CLASS_1: [u32; 6] = [0, 2, 6, 1, 12, 4];

    #[test]
    fn test_encode_class() {
        assert_eq!(encode(&MASK, 1, None), SPARSE_RLE_CLASS_1.to_vec());
    }

    #[test]
    fn test_encode_with_bounding_box() {
        #[rustfmt::skip]
        let mask: [u8; 25] = [
            0, 0, 0, 0, 0,
            0, 0, 0, 1, 1,
            0, 0, 1, 1, 1,
            0, 0, 1, 1, 1,
            0, 0, 0, 0, 0,
        ];
        let bounds = SparseBounds {
            mask_width: 5,
            top_left: PixelPoint::new(2, 1),
            bottom_right: PixelPoint::new(4, 4),
        };

        assert_eq!(encode(&mask, 1, Some(&bounds)), vec![8, 2, 12, 3, 17, 3]);
    }

    #[test]
    fn test_box_edge_ends_run() {
        // The same runs span the box edge in the full-width mask.
        #[rustfmt::skip]
        let mask: [u8; 12] = [
            1, 1, 1, 1,
            1, 1, 1, 1,
            0, 0, 0, 0,
        ];
        let bounds = SparseBounds {
            mask_width: 4,
            top_left: PixelPoint::new(1, 0),
            bottom_right: PixelPoint::new(2, 1),
        };

        assert_eq!(encode(&mask, 1, Some(&bounds)), vec![1, 2, 5, 2]);
        assert_eq!(encode(&mask, 1, None), vec![0, 8]);
    }

    #[test]
    fn test_box_is_clipped_to_mask() {
        let bounds = SparseBounds {
            mask_width: 4,
            top_left: PixelPoint::new(-3, -3),
            bottom_right: PixelPoint::new(10, 10),
        };
        let full = encode(&MASK, 2, None);
        let boxed = encode(&MASK, 2, Some(&bounds));

        let mut from_full = vec![0u8; MASK_LENGTH];
        let mut from_boxed = vec![0u8; MASK_LENGTH];
        decode(&full, &mut from_full, 2).unwrap();
        decode(&boxed, &mut from_boxed, 2).unwrap();
        assert_eq!(from_full, from_boxed);
    }

    #[test]
    fn test_absent_class_is_empty() {
        assert!(encode(&MASK, 100, None).is_empty());
    }

    #[test]
    fn test_decode_into_mask() {
        let mut target = vec![0u8; MASK_LENGTH];
        decode(&SPARSE_RLE_CLASS_1, &mut target, 1).unwrap();

        for (index, &value) in MASK.iter().enumerate() {
            assert_eq!(target[index] == 1, value == 1, "pixel {index}");
        }
    }

    #[test]
    fn test_decode_leaves_other_pixels() {
        let mut target = MASK.map(|v| if v == 1 { 0 } else { v }).to_vec();
        decode(&encode(&MASK, 1, None), &mut target, 1).unwrap();
        assert_eq!(target, MASK.to_vec());
    }

    #[test]
    fn test_decode_empty_is_noop() {
        let mut target = vec![7u8; 4];
        decode(&[], &mut target, 1).unwrap();
        assert_eq!(target, vec![7; 4]);
    }

    #[test]
    fn test_decode_odd_length_fails() {
        let mut target = vec![0u8; MASK_LENGTH];
        let err = decode(&[0, 2, 6, 1, 12], &mut target, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sparse RLE length must by a multiple of 2 (encoded in pairs)"
        );
    }

    #[test]
    fn test_decode_past_end_fails_without_writing() {
        let mut target = vec![0u8; 12];
        let err = decode(&SPARSE_RLE_CLASS_1, &mut target, 1).unwrap_err();
        assert_eq!(err.to_string(), "Encoded data exceeds mask length.");
        assert_eq!(target, vec![0; 12]);
    }
}
