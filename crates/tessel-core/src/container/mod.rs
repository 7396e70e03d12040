//! Nodes that own and sequence other nodes.
//!
//! | container  | children see                          | output                     |
//! |------------|---------------------------------------|----------------------------|
//! | [`Chain`]  | the same buffer, one after another    | the last child's output    |
//! | [`Split`]  | independent copies of the input       | sum of the children's changes |
//! | [`Multi`]  | disjoint slices of the channel range  | each slice in place        |
//! | [`Branch`] | the buffer, one child per call        | the selected child's output |
//!
//! Every container is generic over its child list `L`, its exposed
//! parameters `P` and its modulation routes `M`. Setting parameter `i` on a
//! container always goes to `P`; children are never addressed implicitly. A
//! fully assembled container is itself a [`Node`](crate::node::Node) and can
//! be nested, wrapped, or put into an [`OpaqueNode`](crate::handle::OpaqueNode).

mod branch;
mod chain;
mod multi;
mod split;

pub use branch::Branch;
pub use chain::Chain;
pub use multi::Multi;
pub use split::Split;

use crate::data::{DataSlots, ExternalData};
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::NodeList;
use crate::parameter::{ModulationGraph, ParameterGraph};
use crate::specs::PrepareSpecs;

/// Graph validation shared by every container's `prepare`.
fn validate_graphs<L: NodeList, P: ParameterGraph<L>, M: ModulationGraph<L>>(
    nodes: &L,
    parameters: &P,
    modulation: &M,
) -> Result<()> {
    parameters.validate(nodes)?;
    modulation.validate(nodes)
}

/// Prepares every child with the same specs.
fn prepare_all<L: NodeList>(nodes: &mut L, specs: &PrepareSpecs) -> Result<()> {
    for i in 0..nodes.len() {
        nodes.prepare_at(i, specs)?;
    }
    Ok(())
}

/// Every child's data slots, summed.
fn data_slots_of<L: NodeList>(nodes: &L) -> DataSlots {
    (0..nodes.len()).fold(DataSlots::NONE, |slots, i| slots.merged(nodes.data_slots_at(i)))
}

/// Binds `data` to the child owning slot `index` of its kind. Slots are
/// numbered across children in declaration order.
fn bind_in_order<L: NodeList>(nodes: &mut L, data: &ExternalData, index: usize) -> Result<()> {
    let kind = data.kind();
    let mut first = 0;
    for i in 0..nodes.len() {
        let count = nodes.data_slots_at(i).count(kind);
        if index < first + count {
            return nodes.bind_external_data_at(i, data, index - first);
        }
        first += count;
    }
    error::raise(NodeError::new(ErrorCode::InvalidExternalData, first, index))
}

#[cfg(feature = "tracing")]
fn log_prepare(kind: &str, children: usize, specs: &PrepareSpecs) {
    tracing::debug!(
        sample_rate = specs.sample_rate,
        block_size = specs.block_size,
        channels = specs.num_channels,
        "{kind}_prepare: {children} children"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataType;
    use crate::nodes::{Gain, TableLookup};

    #[test]
    fn slots_are_numbered_across_children() {
        let mut nodes = (TableLookup::default(), Gain::new(0.0), TableLookup::default());
        assert_eq!(data_slots_of(&nodes).count(DataType::Table), 2);

        let table = ExternalData::table(vec![0.0_f32, 1.0]);
        assert!(error::poll(bind_in_order(&mut nodes, &table, 1)).is_ok());
        assert!(nodes.0.table().is_none());
        assert!(nodes.2.table().is_some());

        let err = error::poll(bind_in_order(&mut nodes, &table, 2)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidExternalData);
    }
}
