//! # Cycle Locator
//!
//! The UTI repeats its measurement cycle forever, and capture starts at an
//! arbitrary point of that cycle. The locator finds the start of frame (SOF):
//! the first of the two offset pulses, which are the shortest pulses in the
//! stream.
//!
//! ## Search
//! 1. Scan `search_window` samples starting at index 1 (the duration at
//!    index 0 has an unknown predecessor) for the minimum duration `m`.
//! 2. The other offset pulse is whichever neighbour of `m` is shorter:
//!    `d[m-1] < d[m+1]` puts the SOF at `m-1`, `d[m-1] > d[m+1]` at `m`.
//! 3. Equal neighbours, or a minimum shared with a neighbour, leave the frame
//!    boundary undecidable and fail with [`DecodeError::AmbiguousSof`].
//!
//! A SOF resolved to index 0 is moved one cycle forward so the unreliable
//! first sample never takes part in a resistance window.

use crate::error::DecodeError;
use crate::sample_buffer::EdgeDuration;
use tracing::debug;

/// Number of durations one resistance computation consumes.
pub const WINDOW_LEN: usize = 4;

/// Finds the start-of-frame index in a sealed sample stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleLocator {
    cycle_length: usize,
    search_window: usize,
}

impl CycleLocator {
    /// Locator searching two full cycles, enough to contain one offset pair
    /// wherever the capture started.
    pub fn new(cycle_length: usize) -> Self {
        Self::with_search_window(cycle_length, 2 * cycle_length)
    }

    pub fn with_search_window(cycle_length: usize, search_window: usize) -> Self {
        Self {
            cycle_length,
            search_window,
        }
    }

    pub fn search_window(&self) -> usize {
        self.search_window
    }

    /// Resolve the SOF index for `samples`.
    ///
    /// The returned index always leaves room for one full resistance window:
    /// `0 < sof` and `sof + 3 < samples.len()`.
    pub fn locate(&self, samples: &[EdgeDuration]) -> Result<usize, DecodeError> {
        let insufficient = DecodeError::InsufficientCycles {
            fitted: 0,
            valid: 0,
        };
        if samples.len() < WINDOW_LEN {
            return Err(insufficient);
        }

        // Candidates need a neighbour on both sides
        let end = (1 + self.search_window).min(samples.len() - 1);
        let window = samples.get(1..end).ok_or(insufficient.clone())?;
        let min = window.iter().copied().min().ok_or(insufficient.clone())?;
        let m = 1 + window
            .iter()
            .position(|&d| d == min)
            .ok_or(insufficient.clone())?;

        let before = samples[m - 1];
        let after = samples[m + 1];
        if before == after || before == min || after == min {
            return Err(DecodeError::AmbiguousSof { index: m });
        }

        let mut sof = if before < after { m - 1 } else { m };
        if sof == 0 {
            sof += self.cycle_length;
        }
        debug!(min_index = m, min_duration = min, sof, "start of frame located");

        if sof + WINDOW_LEN > samples.len() {
            return Err(insufficient);
        }
        Ok(sof)
    }
}
