//! Per-sample execution.

use super::forward_to_child;
use crate::data::{DataSlots, ProcessView};
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::{Node, process_frames};
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Serves every block call by walking the block one frame at a time.
///
/// Useful when a child has per-sample feedback that a parent container wants
/// interleaved with its siblings. The child must be frame-capable; `prepare`
/// rejects one that is not with [`IllegalFrameCall`](ErrorCode::IllegalFrameCall).
#[derive(Debug, Clone, Default)]
pub struct Frame<T> {
    child: T,
}

impl<T> Frame<T> {
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

impl<T: Node> Node for Frame<T> {
    const ID: &'static str = T::ID;
    const IS_POLYPHONIC: bool = T::IS_POLYPHONIC;
    const HAS_MODULATION: bool = T::HAS_MODULATION;
    const IS_MODULATION_SOURCE: bool = T::IS_MODULATION_SOURCE;
    const DATA_SLOTS: DataSlots = T::DATA_SLOTS;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        if !self.child.is_frame_capable() {
            return error::raise(NodeError::code(ErrorCode::IllegalFrameCall));
        }
        self.child.prepare(specs)
    }

    #[inline]
    fn process<P: ProcessView>(&mut self, data: &mut P) {
        process_frames(&mut self.child, data);
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
        data_slots,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProcessData;
    use crate::node::test_nodes::{BlockOnly, Scale};

    #[test]
    fn block_call_runs_frame_by_frame() {
        let mut node = Frame::new(Scale(3.0));
        node.prepare(&PrepareSpecs::new(44100.0, 3, 2)).unwrap();

        let mut l = [1.0_f32, 2.0, 3.0];
        let mut r = [-1.0_f32; 3];
        node.process(&mut ProcessData::new([&mut l[..], &mut r[..]]));
        assert_eq!(l, [3.0, 6.0, 9.0]);
        assert_eq!(r, [-3.0; 3]);
    }

    #[test]
    fn block_only_child_is_rejected() {
        let mut node = Frame::new(BlockOnly::default());
        let err = error::poll(node.prepare(&PrepareSpecs::default())).unwrap_err();
        assert_eq!(err.code, ErrorCode::IllegalFrameCall);
        #[cfg(not(feature = "error-slot"))]
        assert_eq!(node.inner().prepared, 0);
    }
}
