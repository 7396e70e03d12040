//! Unit conversions applied to a parameter value on its way to a target.
//!
//! Converters are zero-sized where possible and compose as tuples:
//! `(MsToFreq, Invert)` applies `MsToFreq` first.

use crate::math;

/// Maps a value from one unit to another.
pub trait Converter {
    /// Converts one value.
    fn convert(&self, value: f64) -> f64;
}

/// Passes values through.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Converter for Identity {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        value
    }
}

/// Decibels to linear gain; -100 dB and below become 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct DbToGain;

impl Converter for DbToGain {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        math::decibels_to_gain(value)
    }
}

/// Linear gain to decibels, floored at -100 dB.
#[derive(Debug, Clone, Copy, Default)]
pub struct GainToDb;

impl Converter for GainToDb {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        math::gain_to_decibels(value)
    }
}

/// Period in ms to frequency in Hz.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsToFreq;

impl Converter for MsToFreq {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        math::ms_to_freq(value)
    }
}

/// Frequency in Hz to period in ms.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreqToMs;

impl Converter for FreqToMs {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        math::freq_to_ms(value)
    }
}

/// Milliseconds to samples at a fixed sample rate.
#[derive(Debug, Clone, Copy)]
pub struct MsToSamples {
    /// Sample rate in Hz.
    pub sample_rate: f64,
}

impl Converter for MsToSamples {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        math::ms_to_samples(value, self.sample_rate)
    }
}

/// Semitones to a pitch ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemitonesToPitchRatio;

impl Converter for SemitonesToPitchRatio {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        math::semitones_to_ratio(value)
    }
}

/// Pitch ratio to semitones.
#[derive(Debug, Clone, Copy, Default)]
pub struct PitchRatioToSemitones;

impl Converter for PitchRatioToSemitones {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        math::ratio_to_semitones(value)
    }
}

/// `1 - x`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Invert;

impl Converter for Invert {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        1.0 - value
    }
}

/// `x^E`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pow<const E: i32>;

impl<const E: i32> Converter for Pow<E> {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        value.powi(E)
    }
}

/// A plain function.
#[derive(Debug, Clone, Copy)]
pub struct Custom(pub fn(f64) -> f64);

impl Converter for Custom {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        (self.0)(value)
    }
}

impl<A: Converter, B: Converter> Converter for (A, B) {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        self.1.convert(self.0.convert(value))
    }
}

impl<A: Converter, B: Converter, C: Converter> Converter for (A, B, C) {
    #[inline]
    fn convert(&self, value: f64) -> f64 {
        self.2.convert(self.1.convert(self.0.convert(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_conversions() {
        assert!((DbToGain.convert(-6.0) - 0.501_187).abs() < 1e-6);
        assert_eq!(DbToGain.convert(-100.0), 0.0);
        assert!((GainToDb.convert(0.5) + 6.0206).abs() < 1e-3);
        assert_eq!(MsToFreq.convert(4.0), 250.0);
        assert_eq!(FreqToMs.convert(250.0), 4.0);
        assert_eq!(MsToSamples { sample_rate: 44100.0 }.convert(10.0), 441.0);
        assert!((SemitonesToPitchRatio.convert(-12.0) - 0.5).abs() < 1e-12);
        assert!((PitchRatioToSemitones.convert(2.0) - 12.0).abs() < 1e-12);
        assert_eq!(Invert.convert(0.25), 0.75);
        assert_eq!(Pow::<3>.convert(2.0), 8.0);
    }

    #[test]
    fn tuples_apply_left_to_right() {
        let chain = (Invert, Pow::<2>);
        assert_eq!(chain.convert(0.25), 0.5625);

        let chain = (Custom(|x| x * 2.0), Invert, Identity);
        assert_eq!(chain.convert(0.25), 0.5);
    }
}
