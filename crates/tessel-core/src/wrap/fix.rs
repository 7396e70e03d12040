//! Compile-time channel count.

use super::forward_to_child;
use crate::data::ProcessView;
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::Node;
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Pins the channel count its child sees to `N`.
///
/// The child is prepared with `N` channels and always receives a typed
/// `ProcessData<N>` holding the first `N` channels of the caller's block.
/// Extra channels pass through untouched. Preparing with fewer than `N`
/// channels is a [`ChannelMismatch`](ErrorCode::ChannelMismatch).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fix<const N: usize, T> {
    child: T,
}

impl<const N: usize, T> Fix<N, T> {
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

impl<const N: usize, T: Node> Node for Fix<N, T> {
    const ID: &'static str = T::ID;
    const IS_POLYPHONIC: bool = T::IS_POLYPHONIC;
    const HAS_MODULATION: bool = T::HAS_MODULATION;
    const IS_MODULATION_SOURCE: bool = T::IS_MODULATION_SOURCE;
    const FRAME_CAPABLE: bool = T::FRAME_CAPABLE;
    const DATA_SLOTS: crate::data::DataSlots = T::DATA_SLOTS;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        if specs.num_channels < N {
            return error::raise(NodeError::new(ErrorCode::ChannelMismatch, N, specs.num_channels));
        }
        self.child.prepare(&specs.with_channels(N))
    }

    #[inline]
    fn process<P: ProcessView>(&mut self, data: &mut P) {
        let mut all = data.as_dyn();
        let mut fixed = all.first_channels::<N>();
        self.child.process(&mut fixed);
    }

    #[inline]
    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        self.child.process_frame(&mut frame[..N], voice);
    }

    fn fixed_channels(&self) -> Option<usize> {
        Some(N)
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
    fn child_sees_only_n_channels() {
        let mut fix = Fix::<1, _>::new(Scale(2.0));
        fix.prepare(&PrepareSpecs::new(44100.0, 2, 2)).unwrap();

        let mut l = [1.0_f32, 2.0];
        let mut r = [1.0_f32, 2.0];
        fix.process(&mut ProcessData::new([&mut l[..], &mut r[..]]));
        assert_eq!(l, [2.0, 4.0]);
        assert_eq!(r, [1.0, 2.0]);

        let mut frame = [1.0_f32, 1.0];
        fix.process_frame(&mut frame, VoiceIndex::NONE);
        assert_eq!(frame, [2.0, 1.0]);
    }

    #[test]
    fn child_is_prepared_with_n_channels() {
        let mut fix = Fix::<2, _>::new(Probe::default());
        fix.prepare(&PrepareSpecs::new(48000.0, 64, 4)).unwrap();
        assert_eq!(fix.inner().specs.map(|s| s.num_channels), Some(2));
        assert_eq!(fix.fixed_channels(), Some(2));
        assert_eq!(fix.id(), "probe");
    }

    #[test]
    fn too_few_channels_fail() {
        let mut fix = Fix::<2, _>::new(Probe::default());
        let err = error::poll(fix.prepare(&PrepareSpecs::new(48000.0, 64, 1))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChannelMismatch);
        assert_eq!((err.expected, err.actual), (2, 1));
        #[cfg(not(feature = "error-slot"))]
        assert!(fix.inner().specs.is_none());
    }
}
