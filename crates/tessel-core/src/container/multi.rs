//! Channel-partitioning container.

use super::{bind_in_order, data_slots_of, validate_graphs};
use crate::data::{DataSlots, Event, ExternalData, ProcessView};
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::{Node, NodeList};
use crate::parameter::{
    ModulationGraph, NoModulation, NoParameters, ParameterGraph, ParameterList, drain_modulation,
    poll_modulation,
};
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Gives each child its own contiguous slice of the channel range.
///
/// Children with a fixed channel count take exactly that many channels; the
/// rest share what is left equally, at least one channel each, with any
/// remainder going to the earliest of them. The partition is computed in
/// `prepare`.
#[derive(Debug, Clone, Default)]
pub struct Multi<L, P = NoParameters, M = NoModulation> {
    nodes: L,
    parameters: P,
    modulation: M,
    partition: Vec<(usize, usize)>,
}

impl<L: NodeList> Multi<L> {
    /// A multi over `nodes` with no exposed parameters.
    pub fn new(nodes: L) -> Self {
        Self {
            nodes,
            parameters: NoParameters,
            modulation: NoModulation,
            partition: Vec::new(),
        }
    }
}

impl<L, P, M> Multi<L, P, M> {
    /// Replaces the exposed parameters.
    pub fn with_parameters<Q>(self, parameters: Q) -> Multi<L, Q, M> {
        Multi {
            nodes: self.nodes,
            parameters,
            modulation: self.modulation,
            partition: self.partition,
        }
    }

    /// Replaces the modulation routes.
    pub fn with_modulation<N>(self, modulation: N) -> Multi<L, P, N> {
        Multi {
            nodes: self.nodes,
            parameters: self.parameters,
            modulation,
            partition: self.partition,
        }
    }

    /// The children.
    pub fn nodes(&self) -> &L {
        &self.nodes
    }

    /// `(first channel, channel count)` per child, valid after `prepare`.
    pub fn partition(&self) -> &[(usize, usize)] {
        &self.partition
    }
}

impl<L: NodeList, P, M> Multi<L, P, M> {
    fn compute_partition(&mut self, num_channels: usize) -> Result<()> {
        let count = self.nodes.len();
        if count > num_channels {
            return error::raise(NodeError::new(ErrorCode::TooManyChildNodes, num_channels, count));
        }

        let fixed_total: usize = (0..count).filter_map(|i| self.nodes.fixed_channels_at(i)).sum();
        let flexible = (0..count).filter(|&i| self.nodes.fixed_channels_at(i).is_none()).count();
        let remaining = num_channels.saturating_sub(fixed_total);
        let (share, mut extra) = match flexible {
            0 => (0, 0),
            n => ((remaining / n).max(1), remaining.saturating_sub((remaining / n).max(1) * n)),
        };

        self.partition.clear();
        let mut start = 0;
        for i in 0..count {
            let len = match self.nodes.fixed_channels_at(i) {
                Some(fixed) => fixed,
                None if extra > 0 => {
                    extra -= 1;
                    share + 1
                }
                None => share,
            };
            self.partition.push((start, len));
            start += len;
        }

        if start > num_channels {
            return error::raise(NodeError::new(ErrorCode::ChannelMismatch, num_channels, start));
        }
        Ok(())
    }
}

impl<L: NodeList, P: ParameterGraph<L>, M: ModulationGraph<L>> Node for Multi<L, P, M> {
    const ID: &'static str = "multi";

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        #[cfg(feature = "tracing")]
        super::log_prepare("multi", self.nodes.len(), specs);

        validate_graphs(&self.nodes, &self.parameters, &self.modulation)?;
        self.compute_partition(specs.num_channels)?;

        for (i, &(_, len)) in self.partition.iter().enumerate() {
            self.nodes.prepare_at(i, &specs.with_channels(len))?;
        }
        Ok(())
    }

    fn reset(&mut self, voice: VoiceIndex) {
        for i in 0..self.nodes.len() {
            self.nodes.reset_at(i, voice);
        }
        drain_modulation(&mut self.nodes, &mut self.modulation, voice);
    }

    fn process<PV: ProcessView>(&mut self, data: &mut PV) {
        let voice = data.voice();
        let mut all = data.as_dyn();
        for (i, &(start, len)) in self.partition.iter().enumerate() {
            let mut slice = all.channel_range(start, len);
            self.nodes.process_at(i, &mut slice);
            drop(slice);
            poll_modulation(&mut self.nodes, &mut self.modulation, i, voice);
        }
    }

    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        for (i, &(start, len)) in self.partition.iter().enumerate() {
            let end = (start + len).min(frame.len());
            self.nodes.process_frame_at(i, &mut frame[start.min(end)..end], voice);
            poll_modulation(&mut self.nodes, &mut self.modulation, i, voice);
        }
    }

    fn handle_event(&mut self, event: &mut Event, voice: VoiceIndex) {
        for i in 0..self.nodes.len() {
            self.nodes.handle_event_at(i, event, voice);
        }
        drain_modulation(&mut self.nodes, &mut self.modulation, voice);
    }

    fn describe_parameters(&self, list: &mut ParameterList) {
        self.parameters.describe(list, 0);
    }

    #[inline]
    fn set_parameter(&mut self, index: usize, value: f64, voice: VoiceIndex) {
        self.parameters.call(index, &mut self.nodes, value, voice);
    }

    fn bind_external_data(&mut self, data: &ExternalData, index: usize) -> Result<()> {
        bind_in_order(&mut self.nodes, data, index)
    }

    fn is_polyphonic(&self) -> bool {
        self.nodes.any_polyphonic()
    }

    fn is_frame_capable(&self) -> bool {
        self.nodes.all_frame_capable()
    }

    fn data_slots(&self) -> DataSlots {
        data_slots_of(&self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProcessData;
    use crate::node::test_nodes::{Probe, Scale};
    use crate::wrap::Fix;

    #[test]
    fn flexible_children_share_channels() {
        let mut multi = Multi::new((Scale(2.0), Scale(3.0)));
        multi.prepare(&PrepareSpecs::new(44100.0, 2, 4)).unwrap();
        assert_eq!(multi.partition(), &[(0, 2), (2, 2)]);

        let mut a = [1.0_f32; 2];
        let mut b = [1.0_f32; 2];
        let mut c = [1.0_f32; 2];
        let mut d = [1.0_f32; 2];
        multi.process(&mut ProcessData::new([&mut a[..], &mut b[..], &mut c[..], &mut d[..]]));
        assert_eq!([a[0], b[0], c[0], d[0]], [2.0, 2.0, 3.0, 3.0]);

        let mut frame = [1.0_f32; 4];
        multi.process_frame(&mut frame, VoiceIndex::NONE);
        assert_eq!(frame, [2.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn fixed_children_take_their_count() {
        let mut multi = Multi::new((Probe::default(), Fix::<1, _>::new(Probe::default()), Probe::default()));
        multi.prepare(&PrepareSpecs::new(44100.0, 8, 6)).unwrap();
        assert_eq!(multi.partition(), &[(0, 3), (3, 1), (4, 2)]);
        assert_eq!(multi.nodes().0.specs.map(|s| s.num_channels), Some(3));
        assert_eq!(multi.nodes().2.specs.map(|s| s.num_channels), Some(2));
    }

    #[test]
    fn more_children_than_channels_fail() {
        let mut multi = Multi::new((Scale(1.0), Scale(1.0), Scale(1.0)));
        let err = error::poll(multi.prepare(&PrepareSpecs::new(44100.0, 8, 2))).unwrap_err();
        assert_eq!(err.code, ErrorCode::TooManyChildNodes);
        assert_eq!((err.expected, err.actual), (2, 3));
    }

    #[test]
    fn oversized_fixed_children_fail() {
        let mut multi = Multi::new((Fix::<2, _>::new(Scale(1.0)), Scale(1.0)));
        let err = error::poll(multi.prepare(&PrepareSpecs::new(44100.0, 8, 2))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChannelMismatch);
        assert_eq!((err.expected, err.actual), (2, 3));
    }
}
