//! Peak meter.

use crate::data::ProcessView;
use crate::error::Result;
use crate::node::Node;
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Passes audio through and reports the largest absolute sample of the last
/// call as a modulation value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Peak {
    max: f32,
    pending: bool,
}

impl Peak {
    /// The peak of the last call.
    pub fn value(&self) -> f32 {
        self.max
    }
}

impl Node for Peak {
    const ID: &'static str = "peak";
    const HAS_MODULATION: bool = true;

    fn prepare(&mut self, _specs: &PrepareSpecs) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self, _voice: VoiceIndex) {
        self.max = 0.0;
        self.pending = true;
    }

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        let mut max = 0.0_f32;
        for c in 0..data.num_channels() {
            max = data.channel(c).iter().fold(max, |max, s| max.max(s.abs()));
        }
        self.max = max;
        self.pending = true;
    }

    fn process_frame(&mut self, frame: &mut [f32], _voice: VoiceIndex) {
        self.max = frame.iter().fold(0.0_f32, |max, s| max.max(s.abs()));
        self.pending = true;
    }

    fn handle_modulation(&mut self, _voice: VoiceIndex) -> Option<f64> {
        core::mem::take(&mut self.pending).then_some(f64::from(self.max))
    }
}
