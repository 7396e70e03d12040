//! Signal generators.

use crate::data::ProcessView;
use crate::error::Result;
use crate::math::ms_to_freq;
use crate::node::Node;
use crate::parameter::{ParameterInfo, ParameterList, ParameterRange};
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Writes a fixed value into every channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Constant {
    value: f32,
}

impl Constant {
    /// A generator of `value`.
    pub fn new(value: f32) -> Self {
        Self { value }
    }

    /// The generated value.
    pub fn value(&self) -> f32 {
        self.value
    }
}

impl Node for Constant {
    const ID: &'static str = "constant";

    fn prepare(&mut self, _specs: &PrepareSpecs) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self, _voice: VoiceIndex) {}

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        for channel in data.channels_mut() {
            channel.fill(self.value);
        }
    }

    fn process_frame(&mut self, frame: &mut [f32], _voice: VoiceIndex) {
        frame.fill(self.value);
    }

    fn describe_parameters(&self, list: &mut ParameterList) {
        list.add(ParameterInfo::new(0, "Value").with_range(ParameterRange::new(-1.0, 1.0)));
    }

    fn set_parameter(&mut self, index: usize, value: f64, _voice: VoiceIndex) {
        if index == 0 {
            self.value = value as f32;
        }
    }
}

/// A rising 0..1 ramp with a period set in milliseconds.
///
/// The ramp replaces the input on every channel and reports its current
/// phase as a modulation value after each call, which makes it the usual
/// payload of a [`Mod`](crate::wrap::Mod) wrapper.
#[derive(Debug, Clone)]
pub struct Ramp {
    phase: f64,
    increment: f64,
    period_ms: f64,
    sample_rate: f64,
    pending: Option<f64>,
}

impl Ramp {
    /// A ramp that rises once every `period_ms`.
    pub fn new(period_ms: f64) -> Self {
        let mut ramp = Self {
            phase: 0.0,
            increment: 0.0,
            period_ms,
            sample_rate: 44100.0,
            pending: None,
        };
        ramp.update_increment();
        ramp
    }

    /// Current phase in `0..1`.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    fn update_increment(&mut self) {
        self.increment = if self.period_ms > 0.0 && self.sample_rate > 0.0 {
            ms_to_freq(self.period_ms) / self.sample_rate
        } else {
            0.0
        };
    }

    #[inline]
    fn tick(&mut self) -> f32 {
        let value = self.phase;
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        value as f32
    }
}

impl Default for Ramp {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

impl Node for Ramp {
    const ID: &'static str = "ramp";
    const HAS_MODULATION: bool = true;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        self.sample_rate = specs.sample_rate;
        self.update_increment();
        Ok(())
    }

    fn reset(&mut self, _voice: VoiceIndex) {
        self.phase = 0.0;
        self.pending = Some(0.0);
    }

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        data.for_each_frame(|frame| {
            let value = self.tick();
            frame.fill(value);
        });
        self.pending = Some(self.phase);
    }

    fn process_frame(&mut self, frame: &mut [f32], _voice: VoiceIndex) {
        let value = self.tick();
        frame.fill(value);
        self.pending = Some(self.phase);
    }

    fn handle_modulation(&mut self, _voice: VoiceIndex) -> Option<f64> {
        self.pending.take()
    }

    fn describe_parameters(&self, list: &mut ParameterList) {
        list.add(ParameterInfo::time_ms(0, "Period").with_default(1000.0));
    }

    fn set_parameter(&mut self, index: usize, value: f64, _voice: VoiceIndex) {
        if index == 0 {
            self.period_ms = value;
            self.update_increment();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProcessData;

    #[test]
    fn constant_overwrites_input() {
        let mut node = Constant::new(0.25);
        let mut ch = [1.0_f32; 3];
        node.process(&mut ProcessData::new([&mut ch[..]]));
        assert_eq!(ch, [0.25; 3]);

        node.set_parameter(0, -0.5, VoiceIndex::NONE);
        let mut frame = [0.0_f32; 2];
        node.process_frame(&mut frame, VoiceIndex::NONE);
        assert_eq!(frame, [-0.5; 2]);
    }

    #[test]
    fn ramp_wraps_once_per_period() {
        let mut ramp = Ramp::new(8.0);
        ramp.prepare(&PrepareSpecs::new(1000.0, 16, 1)).unwrap();

        let mut ch = [0.0_f32; 12];
        ramp.process(&mut ProcessData::new([&mut ch[..]]));
        assert_eq!(ch[4], 0.5);
        assert_eq!(ch[7], 0.875);
        assert_eq!(ch[8], 0.0);
        assert_eq!(ramp.handle_modulation(VoiceIndex::NONE), Some(0.5));
        assert_eq!(ramp.handle_modulation(VoiceIndex::NONE), None);
    }

    #[test]
    fn reset_restarts_the_phase() {
        let mut ramp = Ramp::new(10.0);
        ramp.prepare(&PrepareSpecs::new(1000.0, 16, 1)).unwrap();
        let mut frame = [0.0_f32];
        ramp.process_frame(&mut frame, VoiceIndex::NONE);
        ramp.process_frame(&mut frame, VoiceIndex::NONE);
        ramp.reset(VoiceIndex::NONE);
        assert_eq!(ramp.phase(), 0.0);
        assert_eq!(ramp.handle_modulation(VoiceIndex::NONE), Some(0.0));
    }
}
