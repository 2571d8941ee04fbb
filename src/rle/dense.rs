//! Dense RLE: a whole labelmap as `(value, runLength)` pairs.

use crate::constants::{BACKGROUND_LABEL, LABEL_SLOTS};
use crate::error::{RleError, RleKind};
use crate::geometry::Bounds;

/// Per-label bounds, indexed directly by label value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelBounds {
    slots: Vec<Bounds>,
}

impl LabelBounds {
    fn new() -> Self {
        Self {
            slots: vec![Bounds::EMPTY; LABEL_SLOTS],
        }
    }

    /// Bounds of `label`, or `None` if the label never occurred.
    pub fn get(&self, label: u8) -> Option<&Bounds> {
        self.slots
            .get(usize::from(label))
            .filter(|bounds| !bounds.is_empty())
    }

    /// Labels that occurred, with their bounds, in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Bounds)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, bounds)| !bounds.is_empty())
            .map(|(label, bounds)| (label as u8, bounds))
    }

    /// Union of all label bounds. Stays at the empty sentinel when no
    /// non-zero label occurred.
    pub fn total(&self) -> Bounds {
        let mut total = Bounds::EMPTY;
        for (_, bounds) in self.iter() {
            total.union(bounds);
        }
        total
    }

    /// Extend `label`'s bounds with the run covering `start..=end`.
    ///
    /// Only the run's end points are considered, plus the row ends when the
    /// run wraps onto later rows. A wrapping run covers every column of the
    /// rows between, and those two row-end points already reach the first
    /// and last column, so the result matches a full pixel scan.
    fn include_run(&mut self, label: u8, start: usize, end: usize, image_width: usize) {
        let bounds = &mut self.slots[usize::from(label)];

        let (start_x, start_y) = (start % image_width, start / image_width);
        let (end_x, end_y) = (end % image_width, end / image_width);

        bounds.include(start_x as i64, start_y as i64);
        bounds.include(end_x as i64, end_y as i64);

        if start_y != end_y {
            bounds.include(image_width as i64 - 1, start_y as i64);
            bounds.include(0, end_y as i64);
        }
    }
}

/// Result of decoding a dense RLE labelmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLabelmap {
    /// Row-major label indices.
    pub buffer: Vec<u8>,
    /// Bounds of every non-zero label found.
    pub bounds_per_label: LabelBounds,
    /// Union of all label bounds; empty sentinel when the map is all background.
    pub total_bounds: Bounds,
}

/// Encode a labelmap as dense RLE.
///
/// Every maximal run of identical values becomes a `[value, runLength]` pair.
/// An empty buffer encodes to an empty array.
pub fn encode(buffer: &[u8]) -> Vec<u32> {
    let mut pairs = Vec::new();

    let Some(&first) = buffer.first() else {
        return pairs;
    };

    let mut run_value = first;
    let mut run_start = 0;

    for (index, &value) in buffer.iter().enumerate().skip(1) {
        if value != run_value {
            pairs.push(u32::from(run_value));
            pairs.push((index - run_start) as u32);
            run_value = value;
            run_start = index;
        }
    }

    pairs.push(u32::from(run_value));
    pairs.push((buffer.len() - run_start) as u32);

    pairs
}

/// Decode dense RLE into a labelmap of `total_pixels` pixels.
///
/// `image_width` gives the row length so that per-label bounds can be
/// derived from the runs themselves, without scanning the decoded pixels.
pub fn decode(
    pairs: &[u32],
    total_pixels: usize,
    image_width: usize,
) -> Result<DecodedLabelmap, RleError> {
    if pairs.len() % 2 != 0 {
        return Err(RleError::malformed(RleKind::Dense));
    }

    if image_width == 0 || total_pixels % image_width != 0 {
        return Err(RleError::InvalidWidth {
            total_pixels,
            image_width,
        });
    }

    let mut buffer = vec![BACKGROUND_LABEL; total_pixels];
    let mut bounds_per_label = LabelBounds::new();
    let mut pixel_index = 0usize;

    for pair in pairs.chunks_exact(2) {
        let (value, run_length) = (pair[0], pair[1] as usize);

        let label = u8::try_from(value).map_err(|_| RleError::InvalidLabel { value })?;

        let run_end = pixel_index
            .checked_add(run_length)
            .filter(|&end| end <= total_pixels)
            .ok_or(RleError::Overflow { total_pixels })?;

        buffer[pixel_index..run_end].fill(label);

        if label != BACKGROUND_LABEL && run_length > 0 {
            bounds_per_label.include_run(label, pixel_index, run_end - 1, image_width);
        }

        pixel_index = run_end;
    }

    if pixel_index != total_pixels {
        return Err(RleError::Truncated {
            written: pixel_index,
            total_pixels,
        });
    }

    let total_bounds = bounds_per_label.total();

    Ok(DecodedLabelmap {
        buffer,
        bounds_per_label,
        total_bounds,
    })
}
