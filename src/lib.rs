//! # UTI PT100 Thermometer Core Library
//!
//! This library decodes the pulse-time-modulated output of a Smartec Universal
//! Transducer Interface (UTI) wired to a PT100 platinum resistance sensor, and turns
//! it into a calibrated temperature. It is written for a Raspberry Pi reading the UTI
//! output on a single GPIO line.
//!
//! ## Signal
//!
//! In three-signal mode the UTI repeats a cycle of four periods on its output:
//! two short offset halves, the reference-resistor period and the sensor period.
//! Each rising edge ends one period, so the time between consecutive rising edges is
//! all the decoder needs.
//!
//! ## Data Flow
//! 1. **Capture**: [`sample_buffer::EdgeCapture`] turns edge timestamps into durations
//!    until the [`sample_buffer::SampleBuffer`] is full
//! 2. **Frame**: [`cycle_locator::CycleLocator`] finds the start of the first complete cycle
//! 3. **Ratio**: [`resistance::ResistanceEstimator`] computes one resistance per cycle
//! 4. **Average**: [`averager::average_resistance`] means all complete cycles
//! 5. **Temperature**: [`curve::TemperatureCurve`] interpolates the PT100 table
//!
//! [`decoder::Decoder`] runs steps 2–5 over a sealed buffer and yields a [`Reading`]
//! or a typed [`DecodeError`]; [`report`] hands either to the console and to files.
//!
//! ## Core Types
//! - [`Measurement`]: the decoded values of one session, a pure function of the buffer
//! - [`Reading`]: a measurement stamped with the local time it was taken

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod averager;
pub mod config;
pub mod curve;
pub mod cycle_locator;
pub mod decoder;
pub mod error;
pub mod report;
pub mod resistance;
pub mod sample_buffer;
pub mod simulator;

pub use error::DecodeError;

/// Decoded result of one measurement session.
///
/// # Example
/// ```
/// use uti_pt100_lib::Measurement;
///
/// let m = Measurement {
///     temperature_c: 21.5,
///     resistance_ohms: 108.38,
///     cycles_used: 15,
///     cycles_skipped: 0,
///     sof_index: 2,
/// };
/// assert_eq!(m.cycles_used + m.cycles_skipped, 15);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Temperature in degrees Celsius
    pub temperature_c: f64,
    /// Mean sensor resistance in ohms
    pub resistance_ohms: f64,
    /// Cycles averaged into the resistance
    pub cycles_used: usize,
    /// Cycles dropped because their ratio was undefined
    pub cycles_skipped: usize,
    /// Start-of-frame index in the sample buffer
    pub sof_index: usize,
}

/// A measurement together with the moment it was decoded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(flatten)]
    pub measurement: Measurement,
    /// Local time the decode finished
    pub taken_at: DateTime<Local>,
}

impl Reading {
    pub fn new(measurement: Measurement) -> Self {
        Self {
            measurement,
            taken_at: Local::now(),
        }
    }

    pub fn temperature_c(&self) -> f64 {
        self.measurement.temperature_c
    }
}
