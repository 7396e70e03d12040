//! Value ranges with skew, step interval and inversion.
//!
//! Mapping from the normalised `0..=1` domain to a range follows the usual
//! skewed-range convention: `value = min + (max - min) * p^(1 / skew)`, with
//! `p` flipped first when the range is inverted and the result snapped to the
//! step interval. A skew below 1 gives more resolution at the low end.

use libm::{exp, log, pow, round};

/// A parameter's value domain.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Step size, or zero for a continuous range.
    pub interval: f64,
    /// Skew exponent; 1 is linear.
    pub skew: f64,
    /// Whether the normalised domain runs from `max` to `min`.
    pub inverted: bool,
}

impl ParameterRange {
    /// A linear, continuous range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            interval: 0.0,
            skew: 1.0,
            inverted: false,
        }
    }

    /// The unit range `0..=1`.
    pub const fn unit() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Returns a copy with a step interval.
    pub const fn with_interval(mut self, interval: f64) -> Self {
        self.interval = interval;
        self
    }

    /// Returns a copy with a skew exponent.
    pub const fn with_skew(mut self, skew: f64) -> Self {
        self.skew = skew;
        self
    }

    /// Returns a copy whose skew puts `centre` at the middle of the
    /// normalised domain.
    pub fn with_centre_skew(mut self, centre: f64) -> Self {
        let proportion = (centre - self.min) / (self.max - self.min);
        if proportion > 0.0 && proportion < 1.0 {
            self.skew = log(0.5) / log(proportion);
        }
        self
    }

    /// Returns a copy with the inversion flag set.
    pub const fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Width of the range.
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Limits `value` to the range.
    pub fn clamp(&self, value: f64) -> f64 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        value.clamp(lo, hi)
    }

    /// Snaps `value` to the nearest step and clamps it.
    pub fn snap(&self, value: f64) -> f64 {
        if self.interval > 0.0 {
            self.clamp(self.min + self.interval * round((value - self.min) / self.interval))
        } else {
            self.clamp(value)
        }
    }

    /// Maps a normalised value onto the range.
    pub fn convert_from_0_to_1(&self, normalized: f64) -> f64 {
        let mut p = normalized.clamp(0.0, 1.0);
        if self.inverted {
            p = 1.0 - p;
        }
        if self.skew != 1.0 && p > 0.0 {
            p = exp(log(p) / self.skew);
        }
        self.snap(self.min + self.length() * p)
    }

    /// Maps a value in the range onto `0..=1`.
    pub fn convert_to_0_to_1(&self, value: f64) -> f64 {
        let length = self.length();
        if length == 0.0 {
            return 0.0;
        }
        let mut p = ((self.clamp(value) - self.min) / length).clamp(0.0, 1.0);
        if self.skew != 1.0 && p > 0.0 {
            p = pow(p, self.skew);
        }
        if self.inverted { 1.0 - p } else { p }
    }
}

impl Default for ParameterRange {
    fn default() -> Self {
        Self::unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_mapping() {
        let range = ParameterRange::new(-100.0, 0.0);
        assert_eq!(range.convert_from_0_to_1(0.0), -100.0);
        assert_eq!(range.convert_from_0_to_1(0.5), -50.0);
        assert_eq!(range.convert_to_0_to_1(-25.0), 0.75);
    }

    #[test]
    fn skew_round_trips() {
        let range = ParameterRange::new(20.0, 20000.0).with_centre_skew(1000.0);
        assert!((range.convert_from_0_to_1(0.5) - 1000.0).abs() < 1e-6);
        for p in [0.1, 0.3, 0.7, 0.9] {
            let back = range.convert_to_0_to_1(range.convert_from_0_to_1(p));
            assert!((back - p).abs() < 1e-9, "{p} came back as {back}");
        }
    }

    #[test]
    fn inverted_and_stepped() {
        let range = ParameterRange::new(0.0, 10.0)
            .with_interval(1.0)
            .with_inverted(true);
        assert_eq!(range.convert_from_0_to_1(0.0), 10.0);
        assert_eq!(range.convert_from_0_to_1(0.33), 7.0);
        assert_eq!(range.convert_to_0_to_1(10.0), 0.0);
    }

    #[test]
    fn out_of_range_inputs_clamp() {
        let range = ParameterRange::new(0.0, 1.0);
        assert_eq!(range.convert_from_0_to_1(2.0), 1.0);
        assert_eq!(range.convert_to_0_to_1(-3.0), 0.0);
        assert_eq!(ParameterRange::new(1.0, 1.0).convert_to_0_to_1(1.0), 0.0);
    }
}
