//! Smoothed gain.

use crate::data::ProcessView;
use crate::error::Result;
use crate::math::decibels_to_gain;
use crate::node::Node;
use crate::parameter::{ParameterInfo, ParameterList};
use crate::poly::{PolyData, VoiceIndex};
use crate::smoothing::SmoothedParam;
use crate::specs::PrepareSpecs;

/// Smoothing time applied to gain changes unless configured otherwise.
pub const DEFAULT_GAIN_SMOOTHING_MS: f32 = 20.0;

/// Multiplies every channel by a gain set in decibels.
///
/// | Index | Parameter | Range |
/// |-------|-----------|-------|
/// | 0 | Gain | -100..0 dB, -100 dB is silence |
/// | 1 | Smoothing | 0..1000 ms |
///
/// `NV` is the number of voices the node keeps state for. With `NV > 1`
/// the node is polyphonic: a parameter change inside a voice touches only
/// that voice's gain, outside any voice it touches all of them.
///
/// ```rust
/// use tessel_core::prelude::*;
/// use tessel_core::nodes::Gain;
///
/// let mut gain = Gain::new(-6.0);
/// gain.prepare(&PrepareSpecs::new(48000.0, 64, 1)).unwrap();
///
/// let mut ch = [1.0_f32; 64];
/// gain.process(&mut ProcessData::new([&mut ch[..]]));
/// assert!((ch[63] - 0.501).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct Gain<const NV: usize = 1> {
    gain: PolyData<SmoothedParam, NV>,
    smoothing_ms: f32,
}

impl Gain {
    /// A mono gain starting at `db` without a ramp.
    pub fn new(db: f64) -> Self {
        Self::polyphonic(db)
    }
}

impl<const NV: usize> Gain<NV> {
    /// A gain with `NV` voices, each starting at `db`.
    pub fn polyphonic(db: f64) -> Self {
        let mut param = SmoothedParam::with_config(0.0, 44100.0, DEFAULT_GAIN_SMOOTHING_MS);
        param.set_immediate(decibels_to_gain(db) as f32);
        Self {
            gain: PolyData::new(param),
            smoothing_ms: DEFAULT_GAIN_SMOOTHING_MS,
        }
    }

    /// Target gain of `voice` as a linear factor.
    pub fn linear_gain(&self, voice: VoiceIndex) -> f32 {
        self.gain.get(voice).target()
    }

    /// Sets the gain of `voice`, or every voice, in decibels.
    pub fn set_gain_db(&mut self, db: f64, voice: VoiceIndex) {
        let linear = decibels_to_gain(db) as f32;
        for slot in self.gain.iter_active_mut(voice) {
            slot.set_target(linear);
        }
    }

    /// Sets the smoothing time for every voice.
    pub fn set_smoothing_ms(&mut self, ms: f32) {
        self.smoothing_ms = ms.max(0.0);
        for slot in self.gain.as_mut_slice() {
            slot.set_smoothing_time_ms(self.smoothing_ms);
        }
    }
}

impl Default for Gain {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<const NV: usize> Node for Gain<NV> {
    const ID: &'static str = "gain";
    const IS_POLYPHONIC: bool = NV > 1;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        self.gain.prepare(specs)?;
        for slot in self.gain.as_mut_slice() {
            slot.set_sample_rate(specs.sample_rate as f32);
            slot.set_smoothing_time_ms(self.smoothing_ms);
        }
        Ok(())
    }

    fn reset(&mut self, voice: VoiceIndex) {
        for slot in self.gain.iter_active_mut(voice) {
            slot.snap_to_target();
        }
    }

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        let gain = self.gain.get_mut(data.voice());
        if gain.is_settled() {
            let g = gain.get();
            for channel in data.channels_mut() {
                channel.iter_mut().for_each(|s| *s *= g);
            }
        } else {
            data.for_each_frame(|frame| {
                let g = gain.advance();
                frame.iter_mut().for_each(|s| *s *= g);
            });
        }
    }

    #[inline]
    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        let g = self.gain.get_mut(voice).advance();
        frame.iter_mut().for_each(|s| *s *= g);
    }

    fn describe_parameters(&self, list: &mut ParameterList) {
        list.add(ParameterInfo::gain_db(0, "Gain").with_default(0.0));
        list.add(ParameterInfo::time_ms(1, "Smoothing").with_default(f64::from(DEFAULT_GAIN_SMOOTHING_MS)));
    }

    fn set_parameter(&mut self, index: usize, value: f64, voice: VoiceIndex) {
        match index {
            0 => self.set_gain_db(value, voice),
            1 => self.set_smoothing_ms(value as f32),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProcessData;
    use crate::error::{self, ErrorCode};
    use crate::poly::VoiceContext;

    #[test]
    fn silence_at_the_floor() {
        let mut gain = Gain::new(-100.0);
        gain.prepare(&PrepareSpecs::default()).unwrap();
        let mut frame = [0.8_f32, -0.8];
        gain.process_frame(&mut frame, VoiceIndex::NONE);
        assert_eq!(frame, [0.0, 0.0]);
    }

    #[test]
    fn changes_are_smoothed() {
        let mut gain = Gain::new(0.0);
        gain.prepare(&PrepareSpecs::new(48000.0, 256, 1)).unwrap();
        gain.set_parameter(0, -100.0, VoiceIndex::NONE);

        let mut ch = [1.0_f32; 256];
        gain.process(&mut ProcessData::new([&mut ch[..]]));
        assert!(ch[0] > 0.9);
        assert!(ch.windows(2).all(|w| w[1] <= w[0]));

        gain.reset(VoiceIndex::NONE);
        let mut frame = [1.0_f32];
        gain.process_frame(&mut frame, VoiceIndex::NONE);
        assert_eq!(frame, [0.0]);
    }

    #[test]
    fn voices_are_independent() {
        let mut gain = Gain::<4>::polyphonic(0.0);
        assert!(gain.is_polyphonic());
        gain.set_smoothing_ms(0.0);
        gain.set_gain_db(-100.0, VoiceIndex::new(2));

        assert_eq!(gain.linear_gain(VoiceIndex::new(2)), 0.0);
        assert_eq!(gain.linear_gain(VoiceIndex::new(1)), 1.0);

        gain.set_gain_db(-100.0, VoiceIndex::NONE);
        assert_eq!(gain.linear_gain(VoiceIndex::new(1)), 0.0);
    }

    #[test]
    fn too_many_voices_fail() {
        let mut gain = Gain::<4>::polyphonic(0.0);
        let specs = PrepareSpecs::default().with_voice_context(VoiceContext::new(8));
        let err = error::poll(gain.prepare(&specs)).unwrap_err();
        assert_eq!(err.code, ErrorCode::IllegalPolyphony);
    }

    #[test]
    fn parameters_are_described() {
        let mut list = ParameterList::new();
        Gain::new(0.0).describe_parameters(&mut list);
        assert_eq!(list.len(), 2);
        assert_eq!(list.find("Gain").map(|p| p.range.min), Some(-100.0));
    }
}
