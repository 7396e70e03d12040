//! Control-rate wrapper.

use super::forward_to_child;
use crate::data::{AudioBuffer, DataSlots, ProcessView};
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::Node;
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Runs a mono child once every `DIVIDER` samples on a silent control
/// signal.
///
/// The child is prepared at `sample_rate / DIVIDER` with a block of
/// `block_size / DIVIDER` samples and one channel. The host signal passes
/// through untouched: whatever the child computes leaves it through
/// modulation, so the usual payload is a [`Mod`](super::Mod) whose output a
/// container routes onward.
#[derive(Debug, Clone)]
pub struct ControlRate<const DIVIDER: usize, T> {
    child: T,
    control: AudioBuffer,
    countdown: usize,
}

impl<const DIVIDER: usize, T> ControlRate<DIVIDER, T> {
    /// Wraps `child`.
    pub fn new(child: T) -> Self {
        const { assert!(DIVIDER > 0, "control rate divider must be positive") };
        Self {
            child,
            control: AudioBuffer::default(),
            countdown: 0,
        }
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

impl<const DIVIDER: usize, T: Default> Default for ControlRate<DIVIDER, T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<const DIVIDER: usize, T: Node> Node for ControlRate<DIVIDER, T> {
    const ID: &'static str = T::ID;
    const IS_POLYPHONIC: bool = T::IS_POLYPHONIC;
    const HAS_MODULATION: bool = T::HAS_MODULATION;
    const IS_MODULATION_SOURCE: bool = T::IS_MODULATION_SOURCE;
    const DATA_SLOTS: DataSlots = T::DATA_SLOTS;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        if let Some(fixed) = self.child.fixed_channels() {
            if fixed != 1 {
                return error::raise(NodeError::new(ErrorCode::ChannelMismatch, 1, fixed));
            }
        }
        if !self.child.is_frame_capable() {
            return error::raise(NodeError::code(ErrorCode::IllegalFrameCall));
        }

        let block_size = (specs.block_size / DIVIDER).max(1);
        self.control.resize(1, block_size);
        self.countdown = 0;
        self.child.prepare(
            &specs
                .with_sample_rate(specs.sample_rate / DIVIDER as f64)
                .with_block_size(block_size)
                .with_channels(1),
        )
    }

    fn reset(&mut self, voice: VoiceIndex) {
        self.countdown = 0;
        self.child.reset(voice);
    }

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        let num_updates = (data.num_samples() / DIVIDER).min(self.control.capacity());
        if num_updates == 0 {
            return;
        }
        self.control.clear();
        let mut control = self.control.view(1, num_updates, data.events(), data.voice());
        self.child.process(&mut control);
    }

    fn process_frame(&mut self, _frame: &mut [f32], voice: VoiceIndex) {
        if self.countdown == 0 {
            self.countdown = DIVIDER;
            let mut value = [0.0_f32];
            self.child.process_frame(&mut value, voice);
        }
        self.countdown -= 1;
    }

    fn id(&self) -> &'static str {
        self.child.id()
    }

    forward_to_child!(
        handle_event,
        handle_modulation,
        describe_parameters,
        set_parameter,
        bind_external_data,
        is_polyphonic,
        has_modulation,
        is_modulation_source,
        data_slots,
    );
}
