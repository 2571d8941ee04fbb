//! Run-length encodings of labelmaps.
//!
//! Two encodings are used on the wire:
//!
//! - **Dense RLE** covers a whole labelmap as alternating `(value, runLength)`
//!   pairs. It is used to ingest or export the full raster of an image.
//! - **Sparse RLE** covers the pixels of a single label as
//!   `(startPixelIndex, runLength)` pairs. It is the payload of one mask
//!   annotation.
//!
//! Encoders never fail. Decoders check the structure of their input and
//! return an [`RleError`](crate::error::RleError) before touching any output
//! they cannot fill completely.

pub mod dense;
pub mod sparse;

pub use dense::{DecodedLabelmap, LabelBounds};
pub use sparse::SparseBounds;
