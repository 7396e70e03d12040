//! Serial container.

use super::{bind_in_order, data_slots_of, prepare_all, validate_graphs};
use crate::data::{DataSlots, Event, ExternalData, ProcessView};
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::{Node, NodeList};
use crate::parameter::{
    ModulationGraph, NoModulation, NoParameters, ParameterGraph, ParameterList, drain_modulation,
    poll_modulation,
};
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Runs its children one after another over the same buffer.
///
/// The channel count is set by the first child; every child that insists on
/// a channel count must agree with it.
///
/// ```rust
/// use tessel_core::prelude::*;
/// use tessel_core::container::Chain;
/// use tessel_core::nodes::Gain;
///
/// let mut chain = Chain::new((Gain::new(-6.0), Gain::new(-6.0)));
/// chain.prepare(&PrepareSpecs::new(44100.0, 4, 1)).unwrap();
///
/// let mut ch = [1.0_f32; 4];
/// chain.process(&mut ProcessData::new([&mut ch[..]]));
/// assert!((ch[0] - 0.2512).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Chain<L, P = NoParameters, M = NoModulation> {
    nodes: L,
    parameters: P,
    modulation: M,
}

impl<L: NodeList> Chain<L> {
    /// A chain over `nodes` with no exposed parameters.
    pub fn new(nodes: L) -> Self {
        Self {
            nodes,
            parameters: NoParameters,
            modulation: NoModulation,
        }
    }
}

impl<L, P, M> Chain<L, P, M> {
    /// Replaces the exposed parameters.
    pub fn with_parameters<Q>(self, parameters: Q) -> Chain<L, Q, M> {
        Chain {
            nodes: self.nodes,
            parameters,
            modulation: self.modulation,
        }
    }

    /// Replaces the modulation routes.
    pub fn with_modulation<N>(self, modulation: N) -> Chain<L, P, N> {
        Chain {
            nodes: self.nodes,
            parameters: self.parameters,
            modulation,
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

    /// The exposed parameters, mutably.
    pub fn parameters_mut(&mut self) -> &mut P {
        &mut self.parameters
    }
}

impl<L: NodeList, P: ParameterGraph<L>, M: ModulationGraph<L>> Node for Chain<L, P, M> {
    const ID: &'static str = "chain";

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        #[cfg(feature = "tracing")]
        super::log_prepare("chain", self.nodes.len(), specs);

        validate_graphs(&self.nodes, &self.parameters, &self.modulation)?;

        let channels = self.nodes.fixed_channels_at(0).unwrap_or(specs.num_channels);
        for i in 1..self.nodes.len() {
            if let Some(fixed) = self.nodes.fixed_channels_at(i) {
                if fixed != channels {
                    return error::raise(NodeError::new(ErrorCode::ChannelMismatch, channels, fixed));
                }
            }
        }

        prepare_all(&mut self.nodes, specs)
    }

    fn reset(&mut self, voice: VoiceIndex) {
        for i in 0..self.nodes.len() {
            self.nodes.reset_at(i, voice);
        }
        drain_modulation(&mut self.nodes, &mut self.modulation, voice);
    }

    #[inline]
    fn process<PV: ProcessView>(&mut self, data: &mut PV) {
        let voice = data.voice();
        for i in 0..self.nodes.len() {
            self.nodes.process_at(i, data);
            poll_modulation(&mut self.nodes, &mut self.modulation, i, voice);
        }
    }

    #[inline]
    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        for i in 0..self.nodes.len() {
            self.nodes.process_frame_at(i, frame, voice);
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

    fn fixed_channels(&self) -> Option<usize> {
        self.nodes.fixed_channels_at(0)
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
