//! # Decode Pipeline
//!
//! Runs the cycle locator, the averager and the temperature curve over one
//! sealed [`SampleBuffer`]. Decoding is a pure function of the buffer
//! contents: the same buffer always produces the same [`Measurement`].

use crate::averager::{average_resistance, CycleAverage};
use crate::config::UtiConfig;
use crate::curve::TemperatureCurve;
use crate::cycle_locator::CycleLocator;
use crate::error::DecodeError;
use crate::resistance::ResistanceEstimator;
use crate::sample_buffer::SampleBuffer;
use crate::{Measurement, Reading};
use tracing::{debug, info};

/// Turns sealed sample buffers into temperature readings.
#[derive(Clone, Debug)]
pub struct Decoder {
    locator: CycleLocator,
    estimator: ResistanceEstimator,
    cycle_length: usize,
    curve: TemperatureCurve,
}

impl Decoder {
    /// Build a decoder for the frame layout in `config`.
    pub fn new(config: &UtiConfig, curve: TemperatureCurve) -> Result<Self, DecodeError> {
        config.validate()?;
        Ok(Self {
            locator: CycleLocator::with_search_window(config.cycle_length, config.search_window()),
            estimator: ResistanceEstimator::new(config.reference_resistance),
            cycle_length: config.cycle_length,
            curve,
        })
    }

    pub fn curve(&self) -> &TemperatureCurve {
        &self.curve
    }

    /// Locate the frame and average the resistance of every complete cycle.
    ///
    /// Returns the start-of-frame index alongside the average.
    pub fn decode_resistance(
        &self,
        buffer: &SampleBuffer,
    ) -> Result<(usize, CycleAverage), DecodeError> {
        if !buffer.is_full() {
            return Err(DecodeError::Incomplete {
                len: buffer.len(),
                capacity: buffer.capacity(),
            });
        }

        let samples = buffer.as_slice();
        let sof = self.locator.locate(samples)?;
        let average = average_resistance(&self.estimator, samples, sof, self.cycle_length)?;
        debug!(
            sof,
            cycles_used = average.cycles_used,
            cycles_skipped = average.cycles_skipped,
            "mean resistance {:.3} Ω",
            average.resistance_ohms
        );
        Ok((sof, average))
    }

    /// Full decode pass without the timestamp.
    pub fn decode_measurement(&self, buffer: &SampleBuffer) -> Result<Measurement, DecodeError> {
        let (sof_index, average) = self.decode_resistance(buffer)?;
        let temperature_c = self.curve.temperature(average.resistance_ohms)?;
        Ok(Measurement {
            temperature_c,
            resistance_ohms: average.resistance_ohms,
            cycles_used: average.cycles_used,
            cycles_skipped: average.cycles_skipped,
            sof_index,
        })
    }

    /// Full decode pass, stamped with the current local time.
    pub fn decode(&self, buffer: &SampleBuffer) -> Result<Reading, DecodeError> {
        let measurement = self.decode_measurement(buffer)?;
        info!(
            "Decoded {:.2}°C from {:.3} Ω over {} cycles",
            measurement.temperature_c, measurement.resistance_ohms, measurement.cycles_used
        );
        Ok(Reading::new(measurement))
    }
}
