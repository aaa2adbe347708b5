//! # Resistance Estimator
//!
//! One UTI cycle in three-signal mode carries four periods:
//!
//! | slot | duration        | meaning                          |
//! |------|-----------------|----------------------------------|
//! | d0   | offset, 1st half| interface zero offset            |
//! | d1   | offset, 2nd half| interface zero offset            |
//! | d2   | `Nab`           | offset + reference resistor      |
//! | d3   | `Ncd`           | offset + sensor                  |
//!
//! Subtracting the offset from both and taking the ratio cancels the
//! oscillator frequency and the interface offset:
//!
//! ```text
//! R = Rref * (Ncd - Noff) / (Nab - Noff),   Noff = d0 + d1
//! ```

use crate::cycle_locator::WINDOW_LEN;
use crate::error::DecodeError;
use crate::sample_buffer::EdgeDuration;

/// Computes sensor resistance from SOF-aligned cycle windows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResistanceEstimator {
    reference_ohms: f64,
}

impl ResistanceEstimator {
    pub fn new(reference_ohms: f64) -> Self {
        Self { reference_ohms }
    }

    pub fn reference_ohms(&self) -> f64 {
        self.reference_ohms
    }

    /// Resistance of the cycle starting at `sof` in `samples`.
    ///
    /// Fails with [`DecodeError::DivisionByZero`] when the reference period
    /// equals the offset period, and with
    /// [`DecodeError::InsufficientCycles`] when fewer than four samples
    /// follow `sof`.
    ///
    /// # Example
    /// ```
    /// use uti_pt100_lib::resistance::ResistanceEstimator;
    ///
    /// let estimator = ResistanceEstimator::new(100.0);
    /// let ohms = estimator.resistance_at(&[10, 10, 50, 70], 0).unwrap();
    /// assert!((ohms - 166.67).abs() < 0.01);
    /// ```
    pub fn resistance_at(&self, samples: &[EdgeDuration], sof: usize) -> Result<f64, DecodeError> {
        let window = sof
            .checked_add(WINDOW_LEN)
            .and_then(|end| samples.get(sof..end))
            .ok_or(DecodeError::InsufficientCycles {
                fitted: 0,
                valid: 0,
            })?;

        let n_off = u64::from(window[0]) + u64::from(window[1]);
        let n_ab = u64::from(window[2]);
        let n_cd = u64::from(window[3]);

        if n_ab == n_off {
            return Err(DecodeError::DivisionByZero {
                index: sof,
                offset: n_off,
            });
        }

        let numerator = n_cd as f64 - n_off as f64;
        let denominator = n_ab as f64 - n_off as f64;
        Ok(self.reference_ohms * numerator / denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_against_reference_resistor() {
        let estimator = ResistanceEstimator::new(100.0);
        let r = estimator.resistance_at(&[10, 10, 50, 70], 0).unwrap();
        assert!((r - 166.666_666).abs() < 0.01, "got {r}");
    }

    #[test]
    fn window_is_taken_from_sof() {
        let estimator = ResistanceEstimator::new(100.0);
        let samples = [999, 5, 15, 220, 160, 1];
        // Noff = 20, Nab = 220, Ncd = 160 => 100 * 140 / 200
        let r = estimator.resistance_at(&samples, 1).unwrap();
        assert!((r - 70.0).abs() < 1e-9);
    }

    #[test]
    fn output_is_not_truncated() {
        let estimator = ResistanceEstimator::new(100.0);
        let r = estimator.resistance_at(&[100, 100, 4_200, 4_633], 0).unwrap();
        assert!((r - 110.825).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn equal_reference_and_offset_is_division_by_zero() {
        let estimator = ResistanceEstimator::new(100.0);
        assert_eq!(
            estimator.resistance_at(&[0, 4, 6, 10, 90], 1),
            Err(DecodeError::DivisionByZero {
                index: 1,
                offset: 10
            })
        );
    }

    #[test]
    fn window_past_end_is_rejected() {
        let estimator = ResistanceEstimator::new(100.0);
        assert!(matches!(
            estimator.resistance_at(&[10, 10, 50], 0),
            Err(DecodeError::InsufficientCycles { .. })
        ));
        assert!(estimator.resistance_at(&[10, 10, 50, 70], usize::MAX).is_err());
    }
}
