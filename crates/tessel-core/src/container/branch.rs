//! Selecting container.

use super::{bind_in_order, data_slots_of, prepare_all, validate_graphs};
use crate::data::{DataSlots, Event, ExternalData, ProcessView};
use crate::error::Result;
use crate::node::{Node, NodeList};
use crate::parameter::{
    ModulationGraph, NoModulation, NoParameters, ParameterGraph, ParameterInfo, ParameterList,
    ParameterRange, drain_modulation, poll_modulation,
};
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Holds several children and runs exactly one of them per call.
///
/// Parameter 0 selects the child. A new selection is latched and takes effect
/// at the start of the next `process` or `process_frame` call, never in the
/// middle of a block. The exposed graph's parameters follow from index 1.
/// Every child is prepared and receives every event, selected or not.
#[derive(Debug, Clone, Default)]
pub struct Branch<L, P = NoParameters, M = NoModulation> {
    nodes: L,
    parameters: P,
    modulation: M,
    active: usize,
    pending: usize,
}

impl<L: NodeList> Branch<L> {
    /// A branch over `nodes`, selecting the first child.
    pub fn new(nodes: L) -> Self {
        Self {
            nodes,
            parameters: NoParameters,
            modulation: NoModulation,
            active: 0,
            pending: 0,
        }
    }
}

impl<L, P, M> Branch<L, P, M> {
    /// Replaces the exposed parameters.
    pub fn with_parameters<Q>(self, parameters: Q) -> Branch<L, Q, M> {
        Branch {
            nodes: self.nodes,
            parameters,
            modulation: self.modulation,
            active: self.active,
            pending: self.pending,
        }
    }

    /// Replaces the modulation routes.
    pub fn with_modulation<N>(self, modulation: N) -> Branch<L, P, N> {
        Branch {
            nodes: self.nodes,
            parameters: self.parameters,
            modulation,
            active: self.active,
            pending: self.pending,
        }
    }

    /// The children.
    pub fn nodes(&self) -> &L {
        &self.nodes
    }

    /// Index of the child that ran last.
    pub fn active(&self) -> usize {
        self.active
    }
}

impl<L: NodeList, P, M> Branch<L, P, M> {
    #[inline]
    fn latch(&mut self) {
        self.active = self.pending;
    }

    fn select(&mut self, value: f64) {
        let last = self.nodes.len().saturating_sub(1);
        self.pending = if value.is_nan() || value <= 0.0 {
            0
        } else {
            (value.round() as usize).min(last)
        };
    }
}

impl<L: NodeList, P: ParameterGraph<L>, M: ModulationGraph<L>> Node for Branch<L, P, M> {
    const ID: &'static str = "branch";

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        #[cfg(feature = "tracing")]
        super::log_prepare("branch", self.nodes.len(), specs);

        validate_graphs(&self.nodes, &self.parameters, &self.modulation)?;
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
        self.latch();
        self.nodes.process_at(self.active, data);
        poll_modulation(&mut self.nodes, &mut self.modulation, self.active, data.voice());
    }

    #[inline]
    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        self.latch();
        self.nodes.process_frame_at(self.active, frame, voice);
        poll_modulation(&mut self.nodes, &mut self.modulation, self.active, voice);
    }

    fn handle_event(&mut self, event: &mut Event, voice: VoiceIndex) {
        for i in 0..self.nodes.len() {
            self.nodes.handle_event_at(i, event, voice);
        }
        drain_modulation(&mut self.nodes, &mut self.modulation, voice);
    }

    fn describe_parameters(&self, list: &mut ParameterList) {
        let last = self.nodes.len().saturating_sub(1) as f64;
        list.add(
            ParameterInfo::new(0, "Index").with_range(ParameterRange::new(0.0, last).with_interval(1.0)),
        );
        self.parameters.describe(list, 1);
    }

    #[inline]
    fn set_parameter(&mut self, index: usize, value: f64, voice: VoiceIndex) {
        match index {
            0 => self.select(value),
            _ => self.parameters.call(index - 1, &mut self.nodes, value, voice),
        }
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
