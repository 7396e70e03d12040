//! Unit conversions shared by parameter converters and reference nodes.
//!
//! Sample-domain helpers are `f32`; parameter-domain helpers are `f64`
//! because parameter values travel through the graph as `f64`.

use libm::{exp, expf, log, logf, pow};

/// Gain values at or below this level are treated as silence.
pub const SILENCE_DB: f64 = -100.0;

/// Convert decibels to linear gain.
///
/// ```rust
/// use tessel_core::math::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Decibels to gain in the parameter domain. Values at or below
/// [`SILENCE_DB`] map to exactly zero.
#[inline]
pub fn decibels_to_gain(db: f64) -> f64 {
    if db <= SILENCE_DB {
        0.0
    } else {
        exp(db * core::f64::consts::LN_10 / 20.0)
    }
}

/// Gain to decibels in the parameter domain, floored at [`SILENCE_DB`].
#[inline]
pub fn gain_to_decibels(gain: f64) -> f64 {
    if gain <= 0.0 {
        SILENCE_DB
    } else {
        (log(gain) * 20.0 / core::f64::consts::LN_10).max(SILENCE_DB)
    }
}

/// Period in milliseconds to frequency in Hz.
#[inline]
pub fn ms_to_freq(ms: f64) -> f64 {
    if ms <= 0.0 { 0.0 } else { 1000.0 / ms }
}

/// Frequency in Hz to period in milliseconds.
#[inline]
pub fn freq_to_ms(freq: f64) -> f64 {
    if freq <= 0.0 { 0.0 } else { 1000.0 / freq }
}

/// Milliseconds to a sample count at `sample_rate`.
#[inline]
pub fn ms_to_samples(ms: f64, sample_rate: f64) -> f64 {
    ms * sample_rate / 1000.0
}

/// Semitones to a playback-rate ratio.
#[inline]
pub fn semitones_to_ratio(semitones: f64) -> f64 {
    pow(2.0, semitones / 12.0)
}

/// Playback-rate ratio to semitones.
#[inline]
pub fn ratio_to_semitones(ratio: f64) -> f64 {
    if ratio <= 0.0 {
        0.0
    } else {
        12.0 * log(ratio) / core::f64::consts::LN_2
    }
}

/// MIDI note number to frequency in Hz (A4 = 69 = 440 Hz).
#[inline]
pub fn note_to_freq(note: u8) -> f64 {
    440.0 * pow(2.0, (f64::from(note) - 69.0) / 12.0)
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
