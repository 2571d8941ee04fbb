//! Error types for the raster mask engine.

use std::fmt;

use thiserror::Error;

use crate::model::AnnotationId;
use crate::raster::RasterId;

/// Which run-length encoding an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RleKind {
    /// Whole-labelmap `(value, runLength)` pairs.
    Dense,
    /// Single-label `(startPixelIndex, runLength)` pairs.
    Sparse,
}

impl fmt::Display for RleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RleKind::Dense => write!(f, "dense"),
            RleKind::Sparse => write!(f, "sparse"),
        }
    }
}

/// Errors raised while decoding dense or sparse RLE payloads.
///
/// The display strings are part of the payload contract and are matched
/// verbatim by existing consumers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RleError {
    /// The pair array has an odd length
    #[error("{encoding} RLE length must by a multiple of 2 (encoded in pairs)")]
    MalformedEncoding {
        /// Encoding that was being decoded
        encoding: RleKind,
    },

    /// The pixel count does not describe whole rows of the image
    #[error("totalPixels is not an integer multiple of the imageWidth")]
    InvalidWidth {
        /// Number of pixels requested
        total_pixels: usize,
        /// Width of the image
        image_width: usize,
    },

    /// The runs describe more pixels than requested
    #[error("Encoded data exceeds totalPixels given.")]
    Overflow {
        /// Number of pixels requested
        total_pixels: usize,
    },

    /// The runs describe fewer pixels than requested
    #[error("Not all pixels filled, incorrectly formatted dense RLE encoding.")]
    Truncated {
        /// Pixels actually written
        written: usize,
        /// Number of pixels requested
        total_pixels: usize,
    },

    /// A sparse run ends past the end of the target mask
    #[error("Encoded data exceeds mask length.")]
    OutOfRange {
        /// Exclusive end index of the offending run
        end: usize,
        /// Length of the target mask
        mask_length: usize,
    },

    /// A dense run carries a value that cannot be stored in one byte
    #[error("label value {value} does not fit in an 8-bit labelmap")]
    InvalidLabel {
        /// The offending value
        value: u32,
    },
}

impl RleError {
    /// Create a malformed-encoding error for the given encoding.
    pub fn malformed(encoding: RleKind) -> Self {
        Self::MalformedEncoding { encoding }
    }
}

/// Errors raised by raster and raster manager operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// Decoding a payload failed
    #[error(transparent)]
    Rle(#[from] RleError),

    /// Every label slot is in use
    #[error("Reached max available segments, currently support {max}")]
    LabelsExhausted {
        /// Number of supported labels
        max: u8,
    },

    /// A replacement buffer has the wrong length
    #[error("buffer length {found} does not match raster size {expected}")]
    BufferSizeMismatch {
        /// `width * height` of the raster
        expected: usize,
        /// Length that was supplied
        found: usize,
    },

    /// A raster layer payload was made for an image of another size
    #[error("raster layer holds {found} pixels but the raster has {expected}")]
    TotalPixelsMismatch {
        /// `width * height` of the raster
        expected: usize,
        /// `total_pixels` of the payload
        found: usize,
    },

    /// A raster with this id is already registered
    #[error("Raster with id {id} already exists!")]
    DuplicateRaster {
        /// The clashing id
        id: RasterId,
    },

    /// No raster maps the given annotation
    #[error("No label associated with annotationId {id} on raster.")]
    UnmappedAnnotation {
        /// The annotation id
        id: AnnotationId,
    },
}

/// Errors reported by an annotation manager implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    /// The annotation does not exist
    #[error("Annotation not found: {id}")]
    NotFound {
        /// The missing annotation id
        id: AnnotationId,
    },

    /// The backing store refused the request
    #[error("Annotation request rejected: {message}")]
    Rejected {
        /// Description of the failure
        message: String,
    },
}

impl ManagerError {
    /// Create a rejected-request error with a message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Errors raised while painting onto a raster.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrushError {
    /// The raster could not satisfy the stroke
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// The annotation manager failed; pixels stay painted
    #[error(transparent)]
    Manager(#[from] ManagerError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        /// Version found in the file
        file_version: u32,
        /// Newest version this build reads
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_messages_are_verbatim() {
        assert_eq!(
            RleError::malformed(RleKind::Dense).to_string(),
            "dense RLE length must by a multiple of 2 (encoded in pairs)"
        );
        assert_eq!(
            RleError::malformed(RleKind::Sparse).to_string(),
            "sparse RLE length must by a multiple of 2 (encoded in pairs)"
        );
        assert_eq!(
            RleError::Overflow { total_pixels: 4 }.to_string(),
            "Encoded data exceeds totalPixels given."
        );
    }

    #[test]
    fn test_raster_error_keeps_rle_message() {
        let err = RasterError::from(RleError::OutOfRange {
            end: 20,
            mask_length: 12,
        });
        assert_eq!(err.to_string(), "Encoded data exceeds mask length.");
    }
}
