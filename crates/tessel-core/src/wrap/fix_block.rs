//! Fixed block size.

use super::forward_to_child;
use crate::data::{DataSlots, ProcessView};
use crate::error::Result;
use crate::node::Node;
use crate::poly::VoiceIndex;
use crate::specs::{MAX_BLOCK_SIZE, PrepareSpecs};

/// Hands its child blocks of at most `B` samples.
///
/// The child is prepared with a block size of `B`. A host block of `n`
/// samples becomes `n / B` full blocks and one shorter tail. Sub-blocks
/// carry no events; events still reach the child through `handle_event`.
#[derive(Debug, Clone, Default)]
pub struct FixBlock<const B: usize, T> {
    child: T,
}

impl<const B: usize, T> FixBlock<B, T> {
    /// Wraps `child`.
    pub fn new(child: T) -> Self {
        const { assert!(B > 0 && B <= MAX_BLOCK_SIZE, "fixed block size out of range") };
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

impl<const B: usize, T: Node> Node for FixBlock<B, T> {
    const ID: &'static str = T::ID;
    const IS_POLYPHONIC: bool = T::IS_POLYPHONIC;
    const HAS_MODULATION: bool = T::HAS_MODULATION;
    const IS_MODULATION_SOURCE: bool = T::IS_MODULATION_SOURCE;
    const FRAME_CAPABLE: bool = T::FRAME_CAPABLE;
    const DATA_SLOTS: DataSlots = T::DATA_SLOTS;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        self.child.prepare(&specs.with_block_size(B))
    }

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        let num_samples = data.num_samples();
        if num_samples <= B {
            self.child.process(data);
            return;
        }

        let mut start = 0;
        while start < num_samples {
            let len = B.min(num_samples - start);
            let mut block = data.sub_block(start, len);
            self.child.process(&mut block);
            start += len;
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
