//! # Reading Output
//!
//! Hands the outcome of each measurement session to the outside world: a line on
//! the console (with an optional ASCII gauge for development), and two files for
//! other processes on the Pi:
//!
//! - the temperature file, a single line with the temperature in °C, read by the
//!   web page that shows the current temperature
//! - the reading file, the full [`Reading`] as JSON
//!
//! A failed session never overwrites either file, so readers keep seeing the last
//! good value instead of a made-up one.

use crate::curve::{T_MAX, T_MIN};
use crate::{DecodeError, Reading};
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Receives the outcome of every measurement session.
pub trait ReadingSink {
    fn report(&mut self, outcome: &Result<Reading, DecodeError>) -> anyhow::Result<()>;
}

/// Pass `outcome` to every sink; a failing sink is logged and does not stop
/// the others.
pub fn report_all(sinks: &mut [Box<dyn ReadingSink>], outcome: &Result<Reading, DecodeError>) {
    for sink in sinks.iter_mut() {
        if let Err(e) = sink.report(outcome) {
            warn!("Report failed: {:#}", e);
        }
    }
}

/// One-line human readable summary of a session outcome.
pub fn format_outcome(outcome: &Result<Reading, DecodeError>) -> String {
    match outcome {
        Ok(reading) => {
            let m = &reading.measurement;
            let skipped = if m.cycles_skipped > 0 {
                format!(", {} skipped", m.cycles_skipped)
            } else {
                String::new()
            };
            format!(
                "Current temperature: {:.2}°C (R={:.2} Ω, {} cycles{})",
                m.temperature_c, m.resistance_ohms, m.cycles_used, skipped
            )
        }
        Err(err) => format!("Measurement failed: {}", err),
    }
}

/// Render a horizontal thermometer over the calibrated range.
///
/// ```text
///  -50°C |██████░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░| 400°C
/// ```
pub fn draw_gauge(temperature_c: f64, width: usize) -> String {
    let fraction = ((temperature_c - T_MIN) / (T_MAX - T_MIN)).clamp(0.0, 1.0);
    let filled = (fraction * width as f64).round() as usize;
    format!(
        "{:>4.0}°C |{}{}| {:.0}°C",
        T_MIN,
        "█".repeat(filled),
        "░".repeat(width - filled),
        T_MAX
    )
}

/// Prints every outcome to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    /// Width of the ASCII gauge, `None` to print the summary line only
    pub gauge_width: Option<usize>,
}

impl ConsoleSink {
    pub fn with_gauge(width: usize) -> Self {
        Self {
            gauge_width: Some(width),
        }
    }
}

impl ReadingSink for ConsoleSink {
    fn report(&mut self, outcome: &Result<Reading, DecodeError>) -> anyhow::Result<()> {
        println!("{}", format_outcome(outcome));
        if let (Some(width), Ok(reading)) = (self.gauge_width, outcome) {
            println!("{}", draw_gauge(reading.temperature_c(), width));
        }
        Ok(())
    }
}

/// Writes successful readings to the temperature and reading files.
#[derive(Debug, Clone)]
pub struct FileSink {
    temperature_file: PathBuf,
    reading_file: PathBuf,
}

impl FileSink {
    pub fn new(temperature_file: impl Into<PathBuf>, reading_file: impl Into<PathBuf>) -> Self {
        Self {
            temperature_file: temperature_file.into(),
            reading_file: reading_file.into(),
        }
    }
}

impl ReadingSink for FileSink {
    fn report(&mut self, outcome: &Result<Reading, DecodeError>) -> anyhow::Result<()> {
        let reading = match outcome {
            Ok(reading) => reading,
            Err(err) => {
                warn!(
                    "Keeping previous {} after failed session: {}",
                    self.temperature_file.display(),
                    err
                );
                return Ok(());
            }
        };

        fs::write(
            &self.temperature_file,
            format!("{:.2}\n", reading.temperature_c()),
        )
        .with_context(|| format!("write {}", self.temperature_file.display()))?;

        let json = serde_json::to_vec_pretty(reading)?;
        fs::write(&self.reading_file, json)
            .with_context(|| format!("write {}", self.reading_file.display()))?;

        info!(
            "Saved {:.2}°C to {}",
            reading.temperature_c(),
            self.temperature_file.display()
        );
        Ok(())
    }
}

/// Load the last reading saved by a [`FileSink`].
pub fn load_last_reading<P: AsRef<Path>>(path: P) -> anyhow::Result<Reading> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let reading = serde_json::from_slice(&data)
        .with_context(|| format!("parse reading in {}", path.display()))?;
    Ok(reading)
}
