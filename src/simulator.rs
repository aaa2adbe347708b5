//! # Synthetic UTI Signal
//!
//! Generates the rising-edge stream a UTI in three-signal mode would produce
//! for a given sensor resistance, so the whole capture and decode path can run
//! on a desk without the interface board.
//!
//! ## Model
//! Each period is the interface offset plus a term proportional to the
//! resistance being measured:
//!
//! ```text
//! Toff = offset_us                      (split in two halves, second one 1 µs longer)
//! Tab  = offset_us + us_per_ohm * Rref
//! Tcd  = offset_us + us_per_ohm * Rsensor
//! ```
//!
//! Cycles longer than four slots are padded with idle periods of
//! `offset_us + us_per_ohm * 2 * Rref`, long enough never to be mistaken for
//! an offset half.
//!
//! A fixed ±1 µs pattern is added to the reference and sensor periods to mimic
//! timer jitter, and the stream can start anywhere inside a cycle.
//!
//! ### Accuracy Trade-offs
//! - Durations are whole microseconds, so one cycle resolves `1 / us_per_ohm` Ω
//! - The offset halves never jitter; on real hardware they do, slightly

use crate::curve::TemperatureCurve;
use crate::error::DecodeError;
use crate::sample_buffer::{EdgeCapture, EdgeDuration, SampleBuffer};

/// Per-cycle jitter in microseconds; sums to zero over four cycles
const JITTER_US: [i64; 4] = [0, 1, 0, -1];

/// Signal generator for a UTI wired to a PT100.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UtiSimulator {
    /// Total offset period, microseconds
    pub offset_us: u32,
    /// Period growth per ohm of measured resistance, microseconds
    pub us_per_ohm: f64,
    /// Reference resistor, ohms
    pub reference_ohms: f64,
    /// Durations per cycle, at least 4
    pub cycle_length: usize,
    /// Position inside the cycle at which the stream starts (0..cycle_length)
    pub phase: usize,
    /// Apply the jitter pattern
    pub jitter: bool,
}

impl UtiSimulator {
    pub fn new(reference_ohms: f64) -> Self {
        Self {
            offset_us: 321,
            us_per_ohm: 40.0,
            reference_ohms,
            cycle_length: 4,
            phase: 1,
            jitter: true,
        }
    }

    pub fn with_phase(mut self, phase: usize) -> Self {
        self.phase = phase;
        self
    }

    /// Pad every cycle to `cycle_length` slots, never fewer than four.
    pub fn with_cycle_length(mut self, cycle_length: usize) -> Self {
        self.cycle_length = cycle_length.max(4);
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    fn period(&self, ohms: f64, jitter: i64) -> EdgeDuration {
        let us = f64::from(self.offset_us) + (ohms * self.us_per_ohm).round() + jitter as f64;
        us.clamp(1.0, f64::from(EdgeDuration::MAX)) as EdgeDuration
    }

    /// The `cycle_length` durations of cycle number `k` for a sensor at `sensor_ohms`.
    pub fn cycle(&self, sensor_ohms: f64, k: usize) -> Vec<EdgeDuration> {
        let jitter = if self.jitter {
            JITTER_US[k % JITTER_US.len()]
        } else {
            0
        };
        let off_a = self.offset_us / 2;
        let off_b = self.offset_us - off_a;
        let idle = self.period(2.0 * self.reference_ohms, 0);

        let mut durations = vec![
            off_a,
            off_b,
            self.period(self.reference_ohms, jitter),
            self.period(sensor_ohms, -jitter),
        ];
        durations.resize(self.cycle_length.max(4), idle);
        durations
    }

    /// `count` consecutive durations, starting `phase` slots into the first cycle.
    pub fn durations(&self, sensor_ohms: f64, count: usize) -> Vec<EdgeDuration> {
        (0..)
            .flat_map(|k| self.cycle(sensor_ohms, k))
            .skip(self.phase % self.cycle_length.max(4))
            .take(count)
            .collect()
    }

    /// Rising-edge timestamps producing `count` durations; one more edge
    /// than durations, the first one at `start_us`.
    pub fn edge_timestamps(&self, sensor_ohms: f64, start_us: u64, count: usize) -> Vec<u64> {
        let mut t = start_us;
        std::iter::once(start_us)
            .chain(self.durations(sensor_ohms, count).into_iter().map(|d| {
                t += u64::from(d);
                t
            }))
            .collect()
    }

    /// Capture a full buffer for a sensor at `temperature_c`, feeding the
    /// edges through [`EdgeCapture`] as the hardware source does.
    pub fn capture(
        &self,
        curve: &TemperatureCurve,
        temperature_c: f64,
        capacity: usize,
    ) -> Result<SampleBuffer, DecodeError> {
        let ohms = curve.resistance_at(temperature_c).ok_or_else(|| {
            let (min, max) = curve.range();
            DecodeError::OutOfCalibratedRange {
                resistance: f64::NAN,
                min,
                max,
            }
        })?;

        let mut capture = EdgeCapture::new(capacity);
        for ts in self.edge_timestamps(ohms, 1_000_000, capacity) {
            capture.on_edge(ts);
        }
        Ok(capture.into_buffer())
    }
}
