//! Routes from modulation sources to sibling parameters.
//!
//! After a child runs, its container asks it for a modulation value. Only
//! children marked as sources ([`Mod`](crate::wrap::Mod)-wrapped) are asked;
//! a new value is handed to the container's modulation graph together with
//! the source's index.

use super::target::ParameterTarget;
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::NodeList;
use crate::poly::VoiceIndex;

/// Modulation connections inside one container.
pub trait ModulationGraph<L: NodeList> {
    /// False for graphs without routes; containers skip source polling
    /// entirely.
    const ACTIVE: bool = true;

    /// Delivers `value` produced by child `source`.
    fn route(&mut self, source: usize, value: f64, nodes: &mut L, voice: VoiceIndex);

    /// Checks every route starts at a modulation source and ends at an
    /// existing child.
    fn validate(&self, nodes: &L) -> Result<()>;
}

/// No routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModulation;

impl<L: NodeList> ModulationGraph<L> for NoModulation {
    const ACTIVE: bool = false;

    #[inline]
    fn route(&mut self, _source: usize, _value: f64, _nodes: &mut L, _voice: VoiceIndex) {}

    fn validate(&self, _nodes: &L) -> Result<()> {
        Ok(())
    }
}

/// Sends the output of child `SRC` to `target`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModRoute<const SRC: usize, T> {
    /// Receiver of the modulation values.
    pub target: T,
}

impl<const SRC: usize, T> ModRoute<SRC, T> {
    /// A route from child `SRC` to `target`.
    pub const fn new(target: T) -> Self {
        Self { target }
    }
}

impl<L: NodeList, const SRC: usize, T: ParameterTarget<L>> ModulationGraph<L> for ModRoute<SRC, T> {
    #[inline]
    fn route(&mut self, source: usize, value: f64, nodes: &mut L, voice: VoiceIndex) {
        if source == SRC {
            self.target.call(nodes, value, voice);
        }
    }

    fn validate(&self, nodes: &L) -> Result<()> {
        if SRC >= nodes.len() {
            return error::raise(NodeError::new(ErrorCode::TooManyChildNodes, nodes.len(), SRC + 1));
        }
        if !nodes.is_modulation_source_at(SRC) {
            return error::raise(NodeError::new(ErrorCode::IllegalModulation, 1, 0));
        }
        self.target.validate(nodes)
    }
}

macro_rules! impl_modulation_for_tuple {
    ($($idx:tt => $name:ident),+) => {
        impl<L: NodeList, $($name: ModulationGraph<L>),+> ModulationGraph<L> for ($($name,)+) {
            const ACTIVE: bool = $(<$name as ModulationGraph<L>>::ACTIVE)||+;

            #[inline]
            fn route(&mut self, source: usize, value: f64, nodes: &mut L, voice: VoiceIndex) {
                $(self.$idx.route(source, value, nodes, voice);)+
            }

            fn validate(&self, nodes: &L) -> Result<()> {
                $(self.$idx.validate(nodes)?;)+
                Ok(())
            }
        }
    };
}

impl_modulation_for_tuple!(0 => A);
impl_modulation_for_tuple!(0 => A, 1 => B);
impl_modulation_for_tuple!(0 => A, 1 => B, 2 => C);
impl_modulation_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D);

/// Polls child `source` for a modulation value and routes it.
#[inline]
pub(crate) fn poll_source<L: NodeList, M: ModulationGraph<L>>(
    nodes: &mut L,
    graph: &mut M,
    source: usize,
    voice: VoiceIndex,
) {
    if !M::ACTIVE || !nodes.is_modulation_source_at(source) {
        return;
    }
    if let Some(value) = nodes.handle_modulation_at(source, voice) {
        graph.route(source, value, nodes, voice);
    }
}

/// Polls every modulation source in `nodes` and routes new values.
pub(crate) fn drain<L: NodeList, M: ModulationGraph<L>>(nodes: &mut L, graph: &mut M, voice: VoiceIndex) {
    if !M::ACTIVE {
        return;
    }
    for source in 0..nodes.len() {
        poll_source(nodes, graph, source, voice);
    }
}
