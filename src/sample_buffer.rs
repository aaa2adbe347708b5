//! # Edge Sample Buffer
//!
//! Fixed-capacity, append-only store of inter-edge durations. The buffer is
//! written by a single producer (the edge callback) until it holds exactly
//! `capacity` samples, then it is sealed and only ever read.
//!
//! The hand-off between producer and consumer is an ownership transfer:
//! [`EdgeCapture`] owns the buffer while edges arrive and gives it up through
//! [`EdgeCapture::into_buffer`]. The decoder only accepts a sealed buffer, so
//! no decode step can observe a half-written sample stream.

use tracing::warn;

/// Microseconds elapsed since the previous rising edge.
pub type EdgeDuration = u32;

/// Result of a single [`SampleBuffer::record`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Sample stored, buffer still has room
    Stored,
    /// Sample stored and the buffer is now sealed
    Sealed,
    /// Buffer was already sealed, sample dropped
    Overrun,
}

/// Ordered sequence of edge durations in arrival order.
///
/// # Example
/// ```
/// use uti_pt100_lib::sample_buffer::{RecordOutcome, SampleBuffer};
///
/// let mut buffer = SampleBuffer::new(2);
/// assert_eq!(buffer.record(120), RecordOutcome::Stored);
/// assert_eq!(buffer.record(130), RecordOutcome::Sealed);
/// assert_eq!(buffer.record(140), RecordOutcome::Overrun);
/// assert_eq!(buffer.as_slice(), &[120, 130]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Vec<EdgeDuration>,
    capacity: usize,
}

impl SampleBuffer {
    /// Create an empty buffer that seals after `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Build an already-filled buffer from captured durations.
    ///
    /// The capacity is the number of durations given, so the result is sealed.
    pub fn from_durations(durations: Vec<EdgeDuration>) -> Self {
        let capacity = durations.len();
        Self {
            samples: durations,
            capacity,
        }
    }

    /// Append one duration unless the buffer is already sealed.
    pub fn record(&mut self, duration: EdgeDuration) -> RecordOutcome {
        if self.is_full() {
            return RecordOutcome::Overrun;
        }
        self.samples.push(duration);
        if self.is_full() {
            RecordOutcome::Sealed
        } else {
            RecordOutcome::Stored
        }
    }

    /// True once `capacity` samples have been recorded.
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Recorded durations in arrival order.
    pub fn as_slice(&self) -> &[EdgeDuration] {
        &self.samples
    }
}

/// Converts rising-edge timestamps into durations and feeds a [`SampleBuffer`].
///
/// The first edge of a session only arms the timer; every later edge records
/// the time since its predecessor.
#[derive(Debug)]
pub struct EdgeCapture {
    buffer: SampleBuffer,
    last_edge_us: Option<u64>,
    overrun_logged: bool,
}

impl EdgeCapture {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: SampleBuffer::new(capacity),
            last_edge_us: None,
            overrun_logged: false,
        }
    }

    /// Handle one rising edge at `timestamp_us` on a monotonic clock.
    pub fn on_edge(&mut self, timestamp_us: u64) -> RecordOutcome {
        let previous = self.last_edge_us.replace(timestamp_us);
        let Some(previous) = previous else {
            return if self.buffer.is_full() {
                RecordOutcome::Overrun
            } else {
                RecordOutcome::Stored
            };
        };

        // A clock that steps backwards yields 0 rather than a wrapped value
        let elapsed = timestamp_us.saturating_sub(previous);
        let duration = EdgeDuration::try_from(elapsed).unwrap_or(EdgeDuration::MAX);

        let outcome = self.buffer.record(duration);
        if outcome == RecordOutcome::Overrun && !self.overrun_logged {
            self.overrun_logged = true;
            warn!(
                "{}",
                crate::error::DecodeError::BufferOverrun {
                    capacity: self.buffer.capacity()
                }
            );
        }
        outcome
    }

    pub fn is_full(&self) -> bool {
        self.buffer.is_full()
    }

    /// True once an edge has been dropped on a sealed buffer; the overrun is
    /// logged the first time only.
    pub fn overrun_reported(&self) -> bool {
        self.overrun_logged
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Hand the captured samples to the consumer.
    pub fn into_buffer(self) -> SampleBuffer {
        self.buffer
    }
}
