//! Modulation source wrapper.

use super::forward_to_child;
use crate::data::{DataSlots, Event, ProcessView};
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::Node;
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Marks its child as a modulation source for the enclosing container.
///
/// After every call that can change the child's output (`process`,
/// `process_frame`, `reset`, `handle_event`) the wrapper asks the child for a
/// new value and latches it. The container then collects the latched value
/// through [`handle_modulation`](Node::handle_modulation) and forwards it
/// along its modulation routes. Each value is handed out once.
#[derive(Debug, Clone, Default)]
pub struct Mod<T> {
    child: T,
    latched: Option<f64>,
}

impl<T> Mod<T> {
    /// Wraps `child`.
    pub fn new(child: T) -> Self {
        Self { child, latched: None }
    }

    /// Latched value not yet collected.
    pub fn pending(&self) -> Option<f64> {
        self.latched
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

impl<T: Node> Mod<T> {
    #[inline]
    fn latch(&mut self, voice: VoiceIndex) {
        if let Some(value) = self.child.handle_modulation(voice) {
            self.latched = Some(value);
        }
    }
}

impl<T: Node> Node for Mod<T> {
    const ID: &'static str = T::ID;
    const IS_POLYPHONIC: bool = T::IS_POLYPHONIC;
    const HAS_MODULATION: bool = true;
    const IS_MODULATION_SOURCE: bool = true;
    const FRAME_CAPABLE: bool = T::FRAME_CAPABLE;
    const DATA_SLOTS: DataSlots = T::DATA_SLOTS;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        if !self.child.has_modulation() {
            return error::raise(NodeError::code(ErrorCode::IllegalModulation));
        }
        self.latched = None;
        self.child.prepare(specs)
    }

    fn reset(&mut self, voice: VoiceIndex) {
        self.child.reset(voice);
        self.latch(voice);
    }

    #[inline]
    fn process<P: ProcessView>(&mut self, data: &mut P) {
        self.child.process(data);
        self.latch(data.voice());
    }

    #[inline]
    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        self.child.process_frame(frame, voice);
        self.latch(voice);
    }

    fn handle_event(&mut self, event: &mut Event, voice: VoiceIndex) {
        self.child.handle_event(event, voice);
        self.latch(voice);
    }

    fn handle_modulation(&mut self, _voice: VoiceIndex) -> Option<f64> {
        self.latched.take()
    }

    fn id(&self) -> &'static str {
        self.child.id()
    }

    fn is_modulation_source(&self) -> bool {
        true
    }

    fn has_modulation(&self) -> bool {
        true
    }

    forward_to_child!(
        describe_parameters,
        set_parameter,
        bind_external_data,
        fixed_channels,
        is_polyphonic,
        is_frame_capable,
        data_slots,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProcessData;
    use crate::node::test_nodes::Scale;

    /// Reports the last sample of channel 0 after every block.
    #[derive(Debug, Default)]
    struct LastSample(Option<f64>);

    impl Node for LastSample {
        const ID: &'static str = "last_sample";
        const HAS_MODULATION: bool = true;

        fn prepare(&mut self, _specs: &PrepareSpecs) -> Result<()> {
            Ok(())
        }

        fn reset(&mut self, _voice: VoiceIndex) {
            self.0 = Some(0.0);
        }

        fn process<P: ProcessView>(&mut self, data: &mut P) {
            self.0 = data.channel(0).last().map(|&s| f64::from(s));
        }

        fn process_frame(&mut self, frame: &mut [f32], _voice: VoiceIndex) {
            self.0 = frame.first().map(|&s| f64::from(s));
        }

        fn handle_modulation(&mut self, _voice: VoiceIndex) -> Option<f64> {
            self.0.take()
        }
    }

    #[test]
    fn value_is_latched_and_handed_out_once() {
        let mut node = Mod::new(LastSample::default());
        node.prepare(&PrepareSpecs::default()).unwrap();

        let mut ch = [0.1_f32, 0.5];
        node.process(&mut ProcessData::new([&mut ch[..]]));
        assert_eq!(node.pending(), Some(f64::from(0.5_f32)));
        assert_eq!(node.handle_modulation(VoiceIndex::NONE), Some(f64::from(0.5_f32)));
        assert_eq!(node.handle_modulation(VoiceIndex::NONE), None);

        node.reset(VoiceIndex::NONE);
        assert_eq!(node.handle_modulation(VoiceIndex::NONE), Some(0.0));
    }

    #[test]
    fn child_without_modulation_is_rejected() {
        let mut node = Mod::new(Scale(1.0));
        assert!(node.is_modulation_source());
        let err = error::poll(node.prepare(&PrepareSpecs::default())).unwrap_err();
        assert_eq!(err.code, ErrorCode::IllegalModulation);
    }
}
