//! Event delivery wrappers.

use super::forward_to_child;
use crate::data::{DataSlots, Event, ProcessView};
use crate::error::Result;
use crate::node::Node;
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Delivers a block's events at their exact sample offsets.
///
/// The block is split at every event timestamp: the child processes the
/// samples before the event, receives the event, then processes on. Events
/// are expected in timestamp order; a timestamp past the end of the block is
/// delivered after the last sample. Sub-blocks carry no events of their own.
#[derive(Debug, Clone, Default)]
pub struct EventSync<T> {
    child: T,
}

impl<T> EventSync<T> {
    /// Wraps `child`.
    pub fn new(child: T) -> Self {
        Self { child }
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

impl<T: Node> Node for EventSync<T> {
    const ID: &'static str = T::ID;
    const IS_POLYPHONIC: bool = T::IS_POLYPHONIC;
    const HAS_MODULATION: bool = T::HAS_MODULATION;
    const IS_MODULATION_SOURCE: bool = T::IS_MODULATION_SOURCE;
    const FRAME_CAPABLE: bool = T::FRAME_CAPABLE;
    const DATA_SLOTS: DataSlots = T::DATA_SLOTS;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        self.child.prepare(specs)
    }

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        let voice = data.voice();
        let mut all = data.as_dyn();
        let events = all.event_slice();
        if events.is_empty() {
            self.child.process(&mut all);
            return;
        }

        let num_samples = all.num_samples();
        let mut position = 0;
        for event in events {
            let at = event.timestamp.min(num_samples);
            if at > position {
                let mut block = all.sub_block(position, at - position);
                self.child.process(&mut block);
                position = at;
            }
            let mut event = *event;
            event.timestamp = 0;
            self.child.handle_event(&mut event, voice);
        }
        if position < num_samples {
            let mut block = all.sub_block(position, num_samples - position);
            self.child.process(&mut block);
        }
    }

    #[inline]
    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        self.child.process_frame(frame, voice);
    }

    fn id(&self) -> &'static str {
        self.child.id()
    }

    forward_to_child!(
        reset,
        handle_event,
        handle_modulation,
        describe_parameters,
        set_parameter,
        bind_external_data,
        fixed_channels,
        is_polyphonic,
        has_modulation,
        is_modulation_source,
        is_frame_capable,
        data_slots,
    );
}

/// Keeps every event away from its child.
#[derive(Debug, Clone, Default)]
pub struct NoEvents<T> {
    child: T,
}

impl<T> NoEvents<T> {
    /// Wraps `child`.
    pub fn new(child: T) -> Self {
        Self { child }
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

impl<T: Node> Node for NoEvents<T> {
    const ID: &'static str = T::ID;
    const IS_POLYPHONIC: bool = T::IS_POLYPHONIC;
    const HAS_MODULATION: bool = T::HAS_MODULATION;
    const IS_MODULATION_SOURCE: bool = T::IS_MODULATION_SOURCE;
    const FRAME_CAPABLE: bool = T::FRAME_CAPABLE;
    const DATA_SLOTS: DataSlots = T::DATA_SLOTS;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        self.child.prepare(specs)
    }

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        let mut all = data.as_dyn().without_events();
        self.child.process(&mut all);
    }

    #[inline]
    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        self.child.process_frame(frame, voice);
    }

    fn handle_event(&mut self, _event: &mut Event, _voice: VoiceIndex) {}

    fn id(&self) -> &'static str {
        self.child.id()
    }

    forward_to_child!(
        reset,
        handle_modulation,
        describe_parameters,
        set_parameter,
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
    use crate::data::ProcessDataDyn;
    use crate::node::test_nodes::Probe;

    #[test]
    fn events_arrive_between_sub_blocks() {
        let events = [Event::note_on(60, 100).at(3), Event::note_off(60).at(10)];
        let mut node = EventSync::new(Probe::default());

        let mut ch = [0.0_f32; 16];
        let mut data = ProcessDataDyn::new([&mut ch[..]]).with_events(&events);
        node.process(&mut data);

        let probe = node.inner();
        assert_eq!(probe.blocks, vec![3, 7, 6]);
        assert_eq!(probe.events.iter().map(|(at, _)| *at).collect::<Vec<_>>(), vec![3, 10]);
        assert!(probe.events[0].1.is_note_on());
    }

    #[test]
    fn late_and_simultaneous_events_are_kept() {
        let events = [
            Event::note_on(60, 100),
            Event::note_on(64, 100),
            Event::controller(1, 64).at(99),
        ];
        let mut node = EventSync::new(Probe::default());

        let mut ch = [0.0_f32; 8];
        node.process(&mut ProcessDataDyn::new([&mut ch[..]]).with_events(&events));

        let probe = node.inner();
        assert_eq!(probe.blocks, vec![8]);
        assert_eq!(probe.events.iter().map(|(at, _)| *at).collect::<Vec<_>>(), vec![0, 0, 8]);
    }

    #[test]
    fn no_events_swallows_everything() {
        let events = [Event::note_on(60, 100)];
        let mut node = NoEvents::new(Probe::default());
        let mut event = events[0];
        node.handle_event(&mut event, VoiceIndex::NONE);

        let mut ch = [0.0_f32; 4];
        let mut data = ProcessDataDyn::new([&mut ch[..]]).with_events(&events);
        node.process(&mut data);
        assert!(node.inner().events.is_empty());
        assert_eq!(node.inner().blocks, vec![4]);
    }
}
