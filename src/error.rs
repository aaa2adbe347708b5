//! # Decode Errors
//!
//! Every way a measurement session can fail, from the capture buffer to the
//! temperature lookup. Per-cycle failures are absorbed by the averager; the
//! rest abort the session and reach the report sinks as a typed failure.

use thiserror::Error;

/// Errors produced while capturing and decoding a UTI pulse stream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// A duration arrived after the buffer was sealed (non-fatal, dropped)
    #[error("buffer overrun: capacity {capacity} already reached")]
    BufferOverrun { capacity: usize },

    /// Decode requested before the buffer filled up
    #[error("buffer incomplete: {len} of {capacity} samples captured")]
    Incomplete { len: usize, capacity: usize },

    /// The cycle locator could not tell which side of the minimum starts the frame
    #[error("ambiguous start of frame around index {index}")]
    AmbiguousSof { index: usize },

    /// Reference period equals the offset period, the ratio is undefined
    #[error("division by zero in cycle at index {index} (Nab == Noff == {offset})")]
    DivisionByZero { index: usize, offset: u64 },

    /// Not a single usable cycle in the buffer
    #[error("insufficient cycles: {fitted} fitted, {valid} valid")]
    InsufficientCycles { fitted: usize, valid: usize },

    /// Resistance is outside the tabulated sensor curve
    #[error("resistance {resistance:.2} Ω outside calibrated range {min:.2}..={max:.2} Ω")]
    OutOfCalibratedRange { resistance: f64, min: f64, max: f64 },

    /// Configuration values the decoder cannot work with
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DecodeError {
    /// True if the error ends the session; false for errors that only drop
    /// a single sample or cycle.
    pub fn is_session_fatal(&self) -> bool {
        !matches!(
            self,
            DecodeError::BufferOverrun { .. } | DecodeError::DivisionByZero { .. }
        )
    }
}
