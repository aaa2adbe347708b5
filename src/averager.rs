//! # Cycle Averager
//!
//! A single UTI cycle is subject to timer jitter of a few microseconds. The
//! averager runs the resistance estimator over every complete cycle that
//! follows the start of frame and returns the arithmetic mean.
//!
//! Cycles whose reference period collapses onto the offset period are
//! skipped, not fatal; the session fails only when no cycle fits at all or
//! every fitted cycle was skipped.

use crate::cycle_locator::WINDOW_LEN;
use crate::error::DecodeError;
use crate::resistance::ResistanceEstimator;
use crate::sample_buffer::EdgeDuration;
use tracing::debug;

/// Mean resistance over the cycles of one buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleAverage {
    /// Arithmetic mean of the successful per-cycle estimates, ohms
    pub resistance_ohms: f64,
    /// Cycles that contributed to the mean
    pub cycles_used: usize,
    /// Cycles dropped because their ratio was undefined
    pub cycles_skipped: usize,
}

/// Number of complete windows starting at `sof + k * cycle_length` that fit
/// in a stream of `len` samples.
pub fn fitted_cycles(len: usize, sof: usize, cycle_length: usize) -> usize {
    if cycle_length == 0 || sof + WINDOW_LEN > len {
        return 0;
    }
    (len - sof - WINDOW_LEN) / cycle_length + 1
}

/// Average the resistance of all complete cycles after `sof`.
pub fn average_resistance(
    estimator: &ResistanceEstimator,
    samples: &[EdgeDuration],
    sof: usize,
    cycle_length: usize,
) -> Result<CycleAverage, DecodeError> {
    let fitted = fitted_cycles(samples.len(), sof, cycle_length);
    let mut sum = 0.0;
    let mut cycles_used = 0;
    let mut cycles_skipped = 0;

    for k in 0..fitted {
        let start = sof + k * cycle_length;
        match estimator.resistance_at(samples, start) {
            Ok(ohms) => {
                sum += ohms;
                cycles_used += 1;
            }
            Err(err @ DecodeError::DivisionByZero { .. }) => {
                debug!("skipping cycle {k}: {err}");
                cycles_skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    if cycles_used == 0 {
        return Err(DecodeError::InsufficientCycles {
            fitted,
            valid: cycles_used,
        });
    }

    Ok(CycleAverage {
        resistance_ohms: sum / cycles_used as f64,
        cycles_used,
        cycles_skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> ResistanceEstimator {
        ResistanceEstimator::new(100.0)
    }

    #[test]
    fn counts_every_window_that_fits() {
        assert_eq!(fitted_cycles(10, 1, 4), 2);
        assert_eq!(fitted_cycles(13, 1, 4), 3);
        assert_eq!(fitted_cycles(12, 1, 4), 2);
        assert_eq!(fitted_cycles(4, 1, 4), 0);
        assert_eq!(fitted_cycles(5, 1, 4), 1);
        assert_eq!(fitted_cycles(64, 1, 0), 0);
    }

    #[test]
    fn mean_of_three_known_cycles() {
        // Noff = 20 and Nab = 220 in every cycle, so R = (Ncd - 20) / 2
        #[rustfmt::skip]
        let samples = vec![
            777,
            10, 10, 220, 160, // 70 Ω
            10, 10, 220, 220, // 100 Ω
            10, 10, 220, 300, // 140 Ω
        ];
        let avg = average_resistance(&estimator(), &samples, 1, 4).unwrap();
        assert_eq!(avg.cycles_used, 3);
        assert_eq!(avg.cycles_skipped, 0);
        assert!((avg.resistance_ohms - (70.0 + 100.0 + 140.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn ignores_trailing_partial_cycle() {
        #[rustfmt::skip]
        let samples = vec![
            777,
            10, 10, 220, 160,
            10, 10, 220, // cut off
        ];
        let avg = average_resistance(&estimator(), &samples, 1, 4).unwrap();
        assert_eq!(avg.cycles_used, 1);
        assert!((avg.resistance_ohms - 70.0).abs() < 1e-9);
    }

    #[test]
    fn skips_division_by_zero_cycles() {
        #[rustfmt::skip]
        let samples = vec![
            777,
            10, 10, 220, 160, // 70 Ω
            10, 10, 20, 300,  // Nab == Noff
            10, 10, 220, 300, // 140 Ω
        ];
        let avg = average_resistance(&estimator(), &samples, 1, 4).unwrap();
        assert_eq!(avg.cycles_used, 2);
        assert_eq!(avg.cycles_skipped, 1);
        assert!((avg.resistance_ohms - 105.0).abs() < 1e-9);
    }

    #[test]
    fn all_cycles_failing_is_insufficient() {
        let samples = vec![777, 10, 10, 20, 300, 10, 10, 20, 300];
        assert_eq!(
            average_resistance(&estimator(), &samples, 1, 4),
            Err(DecodeError::InsufficientCycles { fitted: 2, valid: 0 })
        );
    }

    #[test]
    fn buffer_shorter_than_one_window_is_insufficient() {
        let samples = vec![777, 10, 10];
        assert_eq!(
            average_resistance(&estimator(), &samples, 1, 4),
            Err(DecodeError::InsufficientCycles { fitted: 0, valid: 0 })
        );
    }
}
