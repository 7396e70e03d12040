//! Parallel container.

use super::{bind_in_order, data_slots_of, prepare_all, validate_graphs};
use crate::data::{AudioBuffer, DataSlots, Event, ExternalData, ProcessView};
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::{Node, NodeList};
use crate::parameter::{
    ModulationGraph, NoModulation, NoParameters, ParameterGraph, ParameterList, drain_modulation,
    poll_modulation,
};
use crate::poly::VoiceIndex;
use crate::specs::{MAX_CHANNELS, PrepareSpecs};

/// Runs every child on its own copy of the input and accumulates what each
/// child changed.
///
/// For input `x` and children `C0..Cn` the output is
/// `x + sum(Ci(x) - x)`; for two children that is `A(x) + B(x) - x`. The
/// first child works in place, the others on a scratch copy. With a single
/// child no copy is made.
#[derive(Debug, Clone, Default)]
pub struct Split<L, P = NoParameters, M = NoModulation> {
    nodes: L,
    parameters: P,
    modulation: M,
    original: AudioBuffer,
    work: AudioBuffer,
}

impl<L: NodeList> Split<L> {
    /// A split over `nodes` with no exposed parameters.
    pub fn new(nodes: L) -> Self {
        Self {
            nodes,
            parameters: NoParameters,
            modulation: NoModulation,
            original: AudioBuffer::default(),
            work: AudioBuffer::default(),
        }
    }
}

impl<L, P, M> Split<L, P, M> {
    /// Replaces the exposed parameters.
    pub fn with_parameters<Q>(self, parameters: Q) -> Split<L, Q, M> {
        Split {
            nodes: self.nodes,
            parameters,
            modulation: self.modulation,
            original: self.original,
            work: self.work,
        }
    }

    /// Replaces the modulation routes.
    pub fn with_modulation<N>(self, modulation: N) -> Split<L, P, N> {
        Split {
            nodes: self.nodes,
            parameters: self.parameters,
            modulation,
            original: self.original,
            work: self.work,
        }
    }

    /// The children.
    pub fn nodes(&self) -> &L {
        &self.nodes
    }

    /// The children, mutably.
    pub fn nodes_mut(&mut self) -> &mut L {
        &mut self.nodes
    }
}

impl<L: NodeList, P: ParameterGraph<L>, M: ModulationGraph<L>> Node for Split<L, P, M> {
    const ID: &'static str = "split";

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        #[cfg(feature = "tracing")]
        super::log_prepare("split", self.nodes.len(), specs);

        validate_graphs(&self.nodes, &self.parameters, &self.modulation)?;

        for i in 0..self.nodes.len() {
            if let Some(fixed) = self.nodes.fixed_channels_at(i) {
                if fixed != specs.num_channels {
                    return error::raise(NodeError::new(
                        ErrorCode::ChannelMismatch,
                        specs.num_channels,
                        fixed,
                    ));
                }
            }
        }

        if self.nodes.len() > 1 {
            self.original.resize(specs.num_channels, specs.block_size);
            self.work.resize(specs.num_channels, specs.block_size);
        }

        prepare_all(&mut self.nodes, specs)
    }

    fn reset(&mut self, voice: VoiceIndex) {
        for i in 0..self.nodes.len() {
            self.nodes.reset_at(i, voice);
        }
        drain_modulation(&mut self.nodes, &mut self.modulation, voice);
    }

    fn process<PV: ProcessView>(&mut self, data: &mut PV) {
        let voice = data.voice();
        if self.nodes.len() == 1 {
            self.nodes.process_at(0, data);
            poll_modulation(&mut self.nodes, &mut self.modulation, 0, voice);
            return;
        }

        let num_channels = data.num_channels();
        let num_samples = data.num_samples();
        debug_assert!(num_samples <= self.original.capacity(), "block larger than prepared");

        self.original.copy_from(data);
        self.nodes.process_at(0, data);
        poll_modulation(&mut self.nodes, &mut self.modulation, 0, voice);

        for i in 1..self.nodes.len() {
            self.work.copy_from_buffer(&self.original, num_samples);
            {
                let mut copy = self.work.view(num_channels, num_samples, data.events(), voice);
                self.nodes.process_at(i, &mut copy);
            }
            poll_modulation(&mut self.nodes, &mut self.modulation, i, voice);
            self.work.add_delta_into(&self.original, data);
        }
    }

    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        let n = frame.len().min(MAX_CHANNELS);
        let mut original = [0.0_f32; MAX_CHANNELS];
        original[..n].copy_from_slice(&frame[..n]);

        self.nodes.process_frame_at(0, frame, voice);
        poll_modulation(&mut self.nodes, &mut self.modulation, 0, voice);

        for i in 1..self.nodes.len() {
            let mut work = original;
            self.nodes.process_frame_at(i, &mut work[..n], voice);
            poll_modulation(&mut self.nodes, &mut self.modulation, i, voice);
            for ((out, w), o) in frame.iter_mut().zip(&work[..n]).zip(&original[..n]) {
                *out += *w - *o;
            }
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
    use crate::node::test_nodes::{Offset, Scale};
    use crate::wrap::Fix;

    #[test]
    fn accumulates_each_childs_change() {
        let mut split = Split::new((Scale(2.0), Offset(1.0), Scale(0.0)));
        split.prepare(&PrepareSpecs::new(44100.0, 4, 2)).unwrap();

        let mut l = [1.0_f32, 2.0, 3.0, 4.0];
        let mut r = [-1.0_f32; 4];
        split.process(&mut ProcessData::new([&mut l[..], &mut r[..]]));

        // 2x + ((x + 1) - x) + (0 - x) = x + 1
        assert_eq!(l, [2.0, 3.0, 4.0, 5.0]);
        assert_eq!(r, [0.0; 4]);
    }

    #[test]
    fn two_linear_children_sum_minus_input() {
        let mut split = Split::new((Scale(0.5), Scale(3.0)));
        split.prepare(&PrepareSpecs::new(44100.0, 2, 1)).unwrap();

        let mut ch = [1.0_f32, -2.0];
        split.process(&mut ProcessData::new([&mut ch[..]]));
        assert_eq!(ch, [2.5, -5.0]);

        let mut frame = [2.0_f32];
        split.process_frame(&mut frame, VoiceIndex::NONE);
        assert_eq!(frame, [5.0]);
    }

    #[test]
    fn single_child_runs_in_place() {
        let mut split = Split::new((Scale(2.0),));
        split.prepare(&PrepareSpecs::new(44100.0, 2, 1)).unwrap();
        assert!(split.work.is_empty());

        let mut ch = [1.0_f32, 2.0];
        split.process(&mut ProcessData::new([&mut ch[..]]));
        assert_eq!(ch, [2.0, 4.0]);
    }

    #[test]
    fn children_must_use_every_channel() {
        let mut split = Split::new((Scale(1.0), Fix::<1, _>::new(Scale(1.0))));
        let err = error::poll(split.prepare(&PrepareSpecs::new(44100.0, 8, 2))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChannelMismatch);
    }
}
