// src/error.rs
use thiserror::Error;

/// Library-wide error for gr-histogram.
#[derive(Debug, Error)]
pub enum HistError {
    /// Tried to add NaN/±inf to a histogram.
    /// `context` pinpoints where it came from (e.g., "sample value", "merged point").
    #[error(
        "histogram: invalid value (inf or nan) for aggregation ({context}). \
hint: clean your data or drop NaN/±inf before aggregating"
    )]
    NonFiniteInput { context: &'static str },

    /// Weight was not a finite, strictly positive number.
    #[error("histogram: invalid weight ({context}). hint: weights must be finite and > 0")]
    InvalidWeight { context: &'static str },

    /// Decoded point count exceeds what the current configuration may hold.
    #[error("histogram: too many bins in serialized state: {size} (maximum: {limit})")]
    OversizedState { size: u64, limit: u64 },

    /// Structurally broken payload (e.g. a varint that never terminates).
    #[error("histogram: invalid payload: {what}")]
    InvalidPayload { what: &'static str },

    /// Bin count parameter was zero.
    #[error("histogram: bin count should be positive")]
    ZeroMaxBins,

    /// Bin count parameter above the supported limit.
    #[error("histogram: unsupported bins count {got}. hint: should not be greater than {limit}")]
    InvalidMaxBins { got: u64, limit: u32 },

    /// Failure of the underlying byte stream; short reads surface as `UnexpectedEof`.
    #[error("histogram: i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl HistError {
    /// `true` for rejected sample values or weights.
    #[inline]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            HistError::NonFiniteInput { .. } | HistError::InvalidWeight { .. }
        )
    }

    /// `true` when a serialized state was rejected for its size.
    #[inline]
    pub fn is_oversized(&self) -> bool {
        matches!(self, HistError::OversizedState { .. })
    }
}

pub type HistResult<T> = Result<T, HistError>;
