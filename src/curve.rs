//! # PT100 Temperature Curve
//!
//! Maps sensor resistance to temperature by piecewise-linear interpolation
//! over the IEC 60751 PT100 table (R0 = 100 Ω, α = 0.00385).
//!
//! The table starts at −50 °C / 80.31 Ω and is spaced more tightly as the
//! curve bends at higher temperature:
//!
//! | band            | step    |
//! |-----------------|---------|
//! | −50 … 150 °C    | 10 °C   |
//! | 150 … 300 °C    | 5 °C    |
//! | 300 … 400 °C    | 2.5 °C  |
//!
//! Inputs below the first entry or above the last one are reported as
//! [`DecodeError::OutOfCalibratedRange`], never clamped to the nearest edge.

use crate::error::DecodeError;

/// Lowest tabulated temperature, °C.
pub const T_MIN: f64 = -50.0;

/// Highest tabulated temperature, °C.
pub const T_MAX: f64 = 400.0;

/// Upper bound (exclusive) and step of each temperature band, °C.
const BANDS: [(f64, f64); 3] = [(150.0, 10.0), (300.0, 5.0), (f64::INFINITY, 2.5)];

/// PT100 resistance in ohms at every table temperature from [`T_MIN`] to
/// [`T_MAX`], stepping through [`BANDS`].
#[rustfmt::skip]
const PT100_OHMS: [f64; 91] = [
    80.31, 84.27, 88.22, 92.16, 96.09, 100.00, 103.90, 107.79,
    111.67, 115.54, 119.40, 123.24, 127.08, 130.90, 134.71, 138.51,
    142.29, 146.07, 149.83, 153.58,

    157.33, 159.19, 161.05, 162.91, 164.77, 166.63, 168.48, 170.33,
    172.17, 174.02, 175.86, 177.69, 179.53, 181.36, 183.19, 185.01,
    186.84, 188.66, 190.47, 192.29, 194.10, 195.91, 197.71, 199.51,
    201.31, 203.11, 204.90, 206.70, 208.48, 210.27,

    212.05, 212.94, 213.83, 214.72, 215.61, 216.49, 217.38, 218.27,
    219.15, 220.04, 220.92, 221.80, 222.68, 223.57, 224.45, 225.33,
    226.21, 227.08, 227.96, 228.84, 229.72, 230.59, 231.47, 232.34,
    233.21, 234.09, 234.96, 235.83, 236.70, 237.57, 238.44, 239.31,
    240.18, 241.04, 241.91, 242.78, 243.64, 244.50, 245.37, 246.23,
    247.09,
];

/// Temperature step of the band containing `t`.
fn band_step(t: f64) -> f64 {
    BANDS
        .iter()
        .find(|(upper, _)| t < *upper)
        .map(|(_, step)| *step)
        .unwrap_or(BANDS[BANDS.len() - 1].1)
}

/// One calibration point of a resistance curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    pub resistance: f64,
    pub temperature: f64,
}

impl CurvePoint {
    pub const fn new(resistance: f64, temperature: f64) -> Self {
        Self {
            resistance,
            temperature,
        }
    }
}

/// Calibration points ordered by strictly increasing resistance.
///
/// # Example
/// ```
/// use uti_pt100_lib::curve::TemperatureCurve;
///
/// let curve = TemperatureCurve::pt100();
/// assert_eq!(curve.temperature(100.0).unwrap(), 0.0);
/// assert!(curve.temperature(20.0).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TemperatureCurve {
    points: Vec<CurvePoint>,
}

impl TemperatureCurve {
    /// Build a curve from explicit points.
    ///
    /// Needs at least two points, strictly increasing in both resistance and
    /// temperature.
    pub fn new(points: Vec<CurvePoint>) -> Result<Self, DecodeError> {
        if points.len() < 2 {
            return Err(DecodeError::InvalidConfig(format!(
                "temperature curve needs at least 2 points, got {}",
                points.len()
            )));
        }
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if !(a.resistance < b.resistance && a.temperature < b.temperature) {
                return Err(DecodeError::InvalidConfig(format!(
                    "temperature curve not increasing between {:.2} Ω and {:.2} Ω",
                    a.resistance, b.resistance
                )));
            }
        }
        Ok(Self { points })
    }

    /// The standard PT100 table.
    pub fn pt100() -> Self {
        let mut t = T_MIN;
        let points = PT100_OHMS
            .iter()
            .map(|&ohms| {
                let point = CurvePoint::new(ohms, t);
                t += band_step(t);
                point
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Calibrated resistance range, inclusive, ohms.
    pub fn range(&self) -> (f64, f64) {
        (
            self.points[0].resistance,
            self.points[self.points.len() - 1].resistance,
        )
    }

    /// Interpolated temperature in °C for `resistance` ohms.
    pub fn temperature(&self, resistance: f64) -> Result<f64, DecodeError> {
        let (min, max) = self.range();
        let out_of_range = DecodeError::OutOfCalibratedRange {
            resistance,
            min,
            max,
        };
        if !resistance.is_finite() || resistance < min {
            return Err(out_of_range);
        }

        if resistance == max {
            return Ok(self.points[self.points.len() - 1].temperature);
        }

        let mut prev = self.points[0];
        for &curr in &self.points[1..] {
            if resistance < curr.resistance {
                let dt = curr.temperature - prev.temperature;
                return Ok(prev.temperature
                    + (resistance - prev.resistance) * dt / (curr.resistance - prev.resistance));
            }
            prev = curr;
        }
        Err(out_of_range)
    }

    /// Interpolated resistance at `temperature` °C, `None` outside the table.
    pub fn resistance_at(&self, temperature: f64) -> Option<f64> {
        let first = self.points[0];
        if temperature.is_nan() || temperature < first.temperature {
            return None;
        }
        self.points.windows(2).find_map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            (temperature <= b.temperature).then(|| {
                a.resistance
                    + (temperature - a.temperature) * (b.resistance - a.resistance)
                        / (b.temperature - a.temperature)
            })
        })
    }
}

impl Default for TemperatureCurve {
    fn default() -> Self {
        Self::pt100()
    }
}
