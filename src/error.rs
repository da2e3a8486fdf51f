//! Error types for symbol construction.

use thiserror::Error;

use crate::encoder::Mode;
use crate::qrcode::CorrectionLevel;

/// Result type alias using the crate error type.
pub type Result<T> = std::result::Result<T, QrError>;

/// Errors that can occur while encoding content into a QR symbol.
///
/// Nothing here is retryable: generation is deterministic, so the same input
/// reproduces the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QrError {
    /// Version number outside 1..=40.
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    /// Correction level other than L, M, Q or H.
    #[error("unsupported correction level: {0:?}")]
    UnsupportedCorrectionLevel(String),

    /// Mask number outside 0..=7.
    #[error("unsupported mask: {0}")]
    UnsupportedMask(u8),

    /// Mode the encoder cannot produce.
    #[error("unsupported mode: {0}")]
    UnsupportedMode(String),

    /// Content does not fit the chosen version, level and mode.
    #[error(
        "data is too long for version {version}, correction level {level} and mode {mode}: \
         max length {max}, given length {given}"
    )]
    CapacityExceeded {
        mode: Mode,
        version: u8,
        level: CorrectionLevel,
        max: usize,
        given: usize,
    },

    /// Bit payload larger than the grid can hold.
    #[error("data too long: permitted {max} bits, provided {given}")]
    DataTooLong { max: usize, given: usize },

    /// Division by zero in GF(2^8). Indicates a defect, never bad input.
    #[error("division by zero in GF(256)")]
    DivisionByZero,
}

impl QrError {
    /// True for the configuration family (version, level, mask, mode).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedVersion(_)
                | Self::UnsupportedCorrectionLevel(_)
                | Self::UnsupportedMask(_)
                | Self::UnsupportedMode(_)
        )
    }

    /// True when the content is too long for the symbol.
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. } | Self::DataTooLong { .. })
    }
}
