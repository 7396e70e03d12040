//! Bypass wrappers.
//!
//! Both react to [`BYPASS_INDEX`]: a value above 0.5 bypasses the child, a
//! value at or below re-enables it. Every other parameter index is forwarded.

use super::forward_to_child;
use crate::data::{AudioBuffer, DataSlots, Event, ProcessView};
use crate::error::Result;
use crate::node::Node;
use crate::parameter::BYPASS_INDEX;
use crate::poly::VoiceIndex;
use crate::smoothing::LinearSmoothedParam;
use crate::specs::{MAX_CHANNELS, PrepareSpecs};

/// Default crossfade length of [`SmoothedBypass`].
pub const DEFAULT_BYPASS_RAMP_MS: f32 = 20.0;

#[inline]
fn is_bypass_on(value: f64) -> bool {
    value > 0.5
}

/// Skips its child entirely while bypassed.
///
/// A bypassed child does not process, does not reset and produces no
/// modulation. It is still prepared and still receives events, so it is
/// ready the moment the bypass is lifted.
#[derive(Debug, Clone, Default)]
pub struct Bypass<T> {
    child: T,
    bypassed: bool,
}

impl<T> Bypass<T> {
    /// Wraps `child`, active.
    pub fn new(child: T) -> Self {
        Self { child, bypassed: false }
    }

    /// Whether the child is currently skipped.
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// The wrapped node.
    pub fn inner(&self) -> &T {
        &self.child
    }

    /// The wrapped node, mutably.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.child
    }

    /// Unwraps the node.
    pub fn into_inner(self) -> T {
        self.child
    }
}

impl<T: Node> Node for Bypass<T> {
    const ID: &'static str = T::ID;
    const IS_POLYPHONIC: bool = T::IS_POLYPHONIC;
    const HAS_MODULATION: bool = T::HAS_MODULATION;
    const IS_MODULATION_SOURCE: bool = T::IS_MODULATION_SOURCE;
    const FRAME_CAPABLE: bool = T::FRAME_CAPABLE;
    const DATA_SLOTS: DataSlots = T::DATA_SLOTS;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        self.child.prepare(specs)
    }

    fn reset(&mut self, voice: VoiceIndex) {
        if !self.bypassed {
            self.child.reset(voice);
        }
    }

    #[inline]
    fn process<P: ProcessView>(&mut self, data: &mut P) {
        if !self.bypassed {
            self.child.process(data);
        }
    }

    #[inline]
    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        if !self.bypassed {
            self.child.process_frame(frame, voice);
        }
    }

    fn handle_modulation(&mut self, voice: VoiceIndex) -> Option<f64> {
        if self.bypassed {
            None
        } else {
            self.child.handle_modulation(voice)
        }
    }

    fn set_parameter(&mut self, index: usize, value: f64, voice: VoiceIndex) {
        if index == BYPASS_INDEX {
            self.bypassed = is_bypass_on(value);
        } else {
            self.child.set_parameter(index, value, voice);
        }
    }

    fn id(&self) -> &'static str {
        self.child.id()
    }

    forward_to_child!(
        handle_event,
        describe_parameters,
        bind_external_data,
        fixed_channels,
        is_polyphonic,
        has_modulation,
        is_modulation_source,
        is_frame_capable,
        data_slots,
    );
}

/// Bypass with a linear crossfade between the child's output and the dry
/// input.
///
/// While the mix ramps, the dry signal is kept in a scratch buffer and every
/// output sample is `dry * (1 - m) + wet * m`. Once the ramp has settled the
/// wrapper costs one branch: the child either runs in place or not at all.
#[derive(Debug, Clone)]
pub struct SmoothedBypass<T> {
    child: T,
    mix: LinearSmoothedParam,
    dry: AudioBuffer,
    ramp_ms: f32,
}

impl<T> SmoothedBypass<T> {
    /// Wraps `child`, active, with a [`DEFAULT_BYPASS_RAMP_MS`] crossfade.
    pub fn new(child: T) -> Self {
        Self {
            child,
            mix: LinearSmoothedParam::with_config(1.0, 44100.0, DEFAULT_BYPASS_RAMP_MS),
            dry: AudioBuffer::default(),
            ramp_ms: DEFAULT_BYPASS_RAMP_MS,
        }
    }

    /// Changes the crossfade length. Applies to the next bypass change.
    pub fn set_ramp_time_ms(&mut self, ramp_ms: f32) {
        self.ramp_ms = ramp_ms.max(0.0);
        self.mix.set_ramp_time_ms(self.ramp_ms);
    }

    /// Whether the target state is bypassed.
    pub fn is_bypassed(&self) -> bool {
        self.mix.target() < 0.5
    }

    /// Current wet proportion, 1 when fully active.
    pub fn mix(&self) -> f32 {
        self.mix.get()
    }

    /// Largest per-sample change of the mix while it ramps.
    pub fn mix_step(&self) -> f32 {
        self.mix.step()
    }

    /// The wrapped node.
    pub fn inner(&self) -> &T {
        &self.child
    }

    /// The wrapped node, mutably.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.child
    }

    /// Unwraps the node.
    pub fn into_inner(self) -> T {
        self.child
    }
}

impl<T: Default> Default for SmoothedBypass<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Node> Node for SmoothedBypass<T> {
    const ID: &'static str = T::ID;
    const IS_POLYPHONIC: bool = T::IS_POLYPHONIC;
    const HAS_MODULATION: bool = T::HAS_MODULATION;
    const IS_MODULATION_SOURCE: bool = T::IS_MODULATION_SOURCE;
    const FRAME_CAPABLE: bool = T::FRAME_CAPABLE;
    const DATA_SLOTS: DataSlots = T::DATA_SLOTS;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = specs.sample_rate,
            ramp_ms = self.ramp_ms,
            "smoothed_bypass_prepare: {}",
            self.child.id()
        );

        self.mix.set_sample_rate(specs.sample_rate as f32);
        self.mix.set_ramp_time_ms(self.ramp_ms);
        self.mix.snap_to_target();
        self.dry.resize(specs.num_channels, specs.block_size);
        self.child.prepare(specs)
    }

    fn reset(&mut self, voice: VoiceIndex) {
        self.mix.snap_to_target();
        self.child.reset(voice);
    }

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        if self.mix.is_settled() {
            if !self.is_bypassed() {
                self.child.process(data);
            }
            return;
        }

        self.dry.copy_from(data);
        self.child.process(data);

        let len = data.num_samples().min(self.dry.capacity());
        let channels = data.num_channels().min(self.dry.num_channels());
        for i in 0..len {
            let m = self.mix.advance();
            for c in 0..channels {
                let dry = self.dry.channel(c)[i];
                let out = &mut data.channel_mut(c)[i];
                *out = dry * (1.0 - m) + *out * m;
            }
        }
    }

    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        if self.mix.is_settled() {
            if !self.is_bypassed() {
                self.child.process_frame(frame, voice);
            }
            return;
        }

        let n = frame.len().min(MAX_CHANNELS);
        let mut dry = [0.0_f32; MAX_CHANNELS];
        dry[..n].copy_from_slice(&frame[..n]);
        self.child.process_frame(frame, voice);

        let m = self.mix.advance();
        for (out, d) in frame.iter_mut().zip(&dry[..n]) {
            *out = *d * (1.0 - m) + *out * m;
        }
    }

    fn handle_event(&mut self, event: &mut Event, voice: VoiceIndex) {
        self.child.handle_event(event, voice);
    }

    fn handle_modulation(&mut self, voice: VoiceIndex) -> Option<f64> {
        if self.mix.is_settled() && self.is_bypassed() {
            None
        } else {
            self.child.handle_modulation(voice)
        }
    }

    fn set_parameter(&mut self, index: usize, value: f64, voice: VoiceIndex) {
        if index == BYPASS_INDEX {
            self.mix.set_target(if is_bypass_on(value) { 0.0 } else { 1.0 });
        } else {
            self.child.set_parameter(index, value, voice);
        }
    }

    fn id(&self) -> &'static str {
        self.child.id()
    }

    forward_to_child!(
        describe_parameters,
        bind_external_data,
        fixed_channels,
        is_polyphonic,
        has_modulation,
        is_modulation_source,
        is_frame_capable,
        data_slots,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProcessData;
    use crate::node::test_nodes::{Probe, Scale};

    #[test]
    fn hard_bypass_skips_processing_and_reset() {
        let mut node = Bypass::new(Probe::default());
        node.prepare(&PrepareSpecs::new(44100.0, 4, 1)).unwrap();
        node.set_parameter(BYPASS_INDEX, 1.0, VoiceIndex::NONE);
        assert!(node.is_bypassed());

        let mut ch = [0.0_f32; 4];
        node.process(&mut ProcessData::new([&mut ch[..]]));
        node.reset(VoiceIndex::NONE);
        assert!(node.inner().blocks.is_empty());
        assert_eq!(node.inner().resets, 0);

        let mut event = Event::note_on(64, 90);
        node.handle_event(&mut event, VoiceIndex::NONE);
        assert_eq!(node.inner().events.len(), 1);

        node.set_parameter(BYPASS_INDEX, 0.0, VoiceIndex::NONE);
        node.process(&mut ProcessData::new([&mut ch[..]]));
        assert_eq!(node.inner().blocks, vec![4]);
    }

    #[test]
    fn other_indices_are_forwarded() {
        let mut node = Bypass::new(Scale(1.0));
        node.set_parameter(0, 0.25, VoiceIndex::NONE);
        assert_eq!(node.inner(), &Scale(0.25));
        assert!(!node.is_bypassed());
    }

    #[test]
    fn crossfade_has_no_jumps() {
        let mut node = SmoothedBypass::new(Scale(0.0));
        node.prepare(&PrepareSpecs::new(1000.0, 64, 1)).unwrap();

        let mut ch = [1.0_f32; 64];
        node.process(&mut ProcessData::new([&mut ch[..]]));
        assert_eq!(ch, [0.0; 64]);

        node.set_parameter(BYPASS_INDEX, 1.0, VoiceIndex::NONE);
        let step = node.mix_step();
        assert!((step - 0.05).abs() < 1e-6);

        let mut ch = [1.0_f32; 64];
        node.process(&mut ProcessData::new([&mut ch[..]]));
        let mut previous = 0.0_f32;
        for &sample in &ch {
            assert!((sample - previous).abs() <= step + 1e-5);
            previous = sample;
        }
        assert!((ch[63] - 1.0).abs() < 1e-6);
        assert!(node.is_bypassed());
    }

    #[test]
    fn settled_bypass_leaves_input_alone() {
        let mut node = SmoothedBypass::new(Scale(0.0));
        node.set_ramp_time_ms(0.0);
        node.prepare(&PrepareSpecs::new(48000.0, 8, 1)).unwrap();
        node.set_parameter(BYPASS_INDEX, 1.0, VoiceIndex::NONE);

        let mut frame = [0.7_f32];
        node.process_frame(&mut frame, VoiceIndex::NONE);
        assert_eq!(frame, [0.7]);
        assert_eq!(node.mix(), 0.0);
    }
}
