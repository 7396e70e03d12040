//! A container's exposed parameters.
//!
//! Setting parameter `i` on a container always goes to its graph, never
//! implicitly to a child. The graph decides which children receive the value
//! and how it is transformed on the way.

use super::info::{ParameterInfo, ParameterList};
use super::target::{DynamicTarget, ParameterTarget};
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::NodeList;
use crate::poly::VoiceIndex;

/// The set of parameters a container exposes over children `L`.
pub trait ParameterGraph<L: NodeList> {
    /// Number of exposed parameters.
    fn num_parameters(&self) -> usize;

    /// Sets exposed parameter `index`. Unknown indices are ignored.
    fn call(&mut self, index: usize, nodes: &mut L, value: f64, voice: VoiceIndex);

    /// Appends the exposed parameters, numbered from `offset`.
    fn describe(&self, list: &mut ParameterList, offset: usize);

    /// Checks every descriptor is connected to an existing child.
    fn validate(&self, nodes: &L) -> Result<()>;
}

/// Exposes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParameters;

impl<L: NodeList> ParameterGraph<L> for NoParameters {
    fn num_parameters(&self) -> usize {
        0
    }

    #[inline]
    fn call(&mut self, _index: usize, _nodes: &mut L, _value: f64, _voice: VoiceIndex) {}

    fn describe(&self, _list: &mut ParameterList, _offset: usize) {}

    fn validate(&self, _nodes: &L) -> Result<()> {
        Ok(())
    }
}

/// One parameter forwarded unchanged to a target.
#[derive(Debug, Clone)]
pub struct Single<T> {
    /// Description of the exposed parameter.
    pub info: ParameterInfo,
    /// Receiver.
    pub target: T,
}

impl<T> Single<T> {
    /// Exposes `target` as `info`.
    pub const fn new(info: ParameterInfo, target: T) -> Self {
        Self { info, target }
    }
}

impl<L: NodeList, T: ParameterTarget<L>> ParameterGraph<L> for Single<T> {
    fn num_parameters(&self) -> usize {
        1
    }

    #[inline]
    fn call(&mut self, index: usize, nodes: &mut L, value: f64, voice: VoiceIndex) {
        if index == 0 {
            self.target.call(nodes, value, voice);
        }
    }

    fn describe(&self, list: &mut ParameterList, offset: usize) {
        list.add(self.info.at_index(offset));
    }

    fn validate(&self, nodes: &L) -> Result<()> {
        self.target.validate(nodes)
    }
}

/// One parameter whose value is normalised by its own range once, then fanned
/// out to every target.
///
/// The targets are usually [`Ranged`](super::Ranged), each mapping the
/// normalised value into its own child's domain.
#[derive(Debug, Clone)]
pub struct ParamChain<T> {
    /// Description of the exposed parameter; its range is the input range.
    pub info: ParameterInfo,
    /// Receivers, typically a tuple.
    pub targets: T,
}

impl<T> ParamChain<T> {
    /// Exposes `targets` as `info`.
    pub const fn new(info: ParameterInfo, targets: T) -> Self {
        Self { info, targets }
    }
}

impl<L: NodeList, T: ParameterTarget<L>> ParameterGraph<L> for ParamChain<T> {
    fn num_parameters(&self) -> usize {
        1
    }

    #[inline]
    fn call(&mut self, index: usize, nodes: &mut L, value: f64, voice: VoiceIndex) {
        if index == 0 {
            let normalized = self.info.range.convert_to_0_to_1(value);
            self.targets.call(nodes, normalized, voice);
        }
    }

    fn describe(&self, list: &mut ParameterList, offset: usize) {
        list.add(self.info.at_index(offset));
    }

    fn validate(&self, nodes: &L) -> Result<()> {
        self.targets.validate(nodes)
    }
}

/// Independently addressable parameters, one graph per slot, no fan-out
/// between them.
#[derive(Debug, Clone, Default)]
pub struct ParamList<T>(pub T);

macro_rules! impl_param_list_for_tuple {
    ($($idx:tt => $name:ident),+) => {
        impl<L: NodeList, $($name: ParameterGraph<L>),+> ParameterGraph<L> for ParamList<($($name,)+)> {
            fn num_parameters(&self) -> usize {
                0 $(+ self.0.$idx.num_parameters())+
            }

            #[inline]
            fn call(&mut self, index: usize, nodes: &mut L, value: f64, voice: VoiceIndex) {
                let mut offset = 0;
                $(
                    let count = self.0.$idx.num_parameters();
                    if index < offset + count {
                        self.0.$idx.call(index - offset, nodes, value, voice);
                        return;
                    }
                    offset += count;
                )+
                let _ = offset;
            }

            fn describe(&self, list: &mut ParameterList, offset: usize) {
                let mut offset = offset;
                $(
                    self.0.$idx.describe(list, offset);
                    offset += self.0.$idx.num_parameters();
                )+
                let _ = offset;
            }

            fn validate(&self, nodes: &L) -> Result<()> {
                $(self.0.$idx.validate(nodes)?;)+
                Ok(())
            }
        }
    };
}

impl_param_list_for_tuple!(0 => A);
impl_param_list_for_tuple!(0 => A, 1 => B);
impl_param_list_for_tuple!(0 => A, 1 => B, 2 => C);
impl_param_list_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D);
impl_param_list_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
impl_param_list_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F);
impl_param_list_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G);
impl_param_list_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H);

/// One run-time parameter of [`DynamicParameters`].
#[derive(Debug, Clone)]
pub struct DynamicParameter {
    /// Description; its range normalises incoming values.
    pub info: ParameterInfo,
    /// Receivers.
    pub targets: Vec<DynamicTarget>,
}

/// Parameters assembled at run time, for graphs whose shape is only known
/// after loading.
#[derive(Debug, Clone, Default)]
pub struct DynamicParameters {
    parameters: Vec<DynamicParameter>,
}

impl DynamicParameters {
    /// No parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter with no targets and returns its index.
    pub fn add(&mut self, info: ParameterInfo) -> usize {
        self.parameters.push(DynamicParameter {
            info,
            targets: Vec::new(),
        });
        self.parameters.len() - 1
    }

    /// Adds a target to parameter `index`.
    pub fn connect(&mut self, index: usize, target: DynamicTarget) -> Result<()> {
        let count = self.parameters.len();
        let Some(parameter) = self.parameters.get_mut(index) else {
            return error::raise(NodeError::new(ErrorCode::TooManyParameters, count, index + 1));
        };
        parameter.targets.push(target);
        Ok(())
    }

    /// Parameter `index`.
    pub fn get(&self, index: usize) -> Option<&DynamicParameter> {
        self.parameters.get(index)
    }
}

impl<L: NodeList> ParameterGraph<L> for DynamicParameters {
    fn num_parameters(&self) -> usize {
        self.parameters.len()
    }

    fn call(&mut self, index: usize, nodes: &mut L, value: f64, voice: VoiceIndex) {
        if let Some(parameter) = self.parameters.get(index) {
            let normalized = parameter.info.range.convert_to_0_to_1(value);
            for target in &parameter.targets {
                target.call(nodes, normalized, voice);
            }
        }
    }

    fn describe(&self, list: &mut ParameterList, offset: usize) {
        for (i, parameter) in self.parameters.iter().enumerate() {
            list.add(parameter.info.at_index(offset + i));
        }
    }

    fn validate(&self, nodes: &L) -> Result<()> {
        for (index, parameter) in self.parameters.iter().enumerate() {
            if parameter.targets.is_empty() {
                return error::raise(NodeError::new(ErrorCode::UnconnectedParameter, index, 0));
            }
            for target in &parameter.targets {
                if !ParameterTarget::<L>::is_connected(target) {
                    return error::raise(NodeError::new(ErrorCode::UnconnectedParameter, index, 0));
                }
                target.validate(nodes)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::test_nodes::Scale;
    use crate::parameter::range::ParameterRange;
    use crate::parameter::target::{Plain, Ranged};

    type Pair = (Scale, Scale);

    #[test]
    fn chain_normalises_once_and_fans_out() {
        let mut nodes = (Scale(0.0), Scale(0.0));
        let mut graph = ParamChain::new(
            ParameterInfo::new(0, "Amount").with_range(ParameterRange::new(0.0, 100.0)),
            (
                Ranged::<0, 0>::new(ParameterRange::new(0.0, 2.0)),
                Ranged::<1, 0>::new(ParameterRange::new(-1.0, 1.0)),
            ),
        );
        assert!(error::poll(graph.validate(&nodes)).is_ok());

        graph.call(0, &mut nodes, 25.0, VoiceIndex::NONE);
        assert_eq!(nodes, (Scale(0.5), Scale(-0.5)));
    }

    #[test]
    fn list_addresses_each_slot() {
        let mut nodes = (Scale(0.0), Scale(0.0));
        let mut graph = ParamList((
            Single::new(ParameterInfo::new(0, "Left"), Plain::<0, 0>),
            Single::new(ParameterInfo::new(0, "Right"), Plain::<1, 0>),
        ));
        assert_eq!(ParameterGraph::<Pair>::num_parameters(&graph), 2);

        graph.call(1, &mut nodes, 4.0, VoiceIndex::NONE);
        graph.call(7, &mut nodes, 9.0, VoiceIndex::NONE);
        assert_eq!(nodes, (Scale(0.0), Scale(4.0)));

        let mut list = ParameterList::new();
        ParameterGraph::<Pair>::describe(&graph, &mut list, 3);
        assert_eq!(list.find("Right").map(|p| p.index), Some(4));
    }

    #[test]
    fn dynamic_parameters_reject_unconnected() {
        let nodes = (Scale(0.0), Scale(0.0));
        let mut graph = DynamicParameters::new();
        let index = graph.add(ParameterInfo::new(0, "Depth"));

        let err = error::poll(graph.validate(&nodes)).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnconnectedParameter);

        graph
            .connect(index, DynamicTarget::connected(5, 0, ParameterRange::unit()))
            .unwrap();
        let err = error::poll(graph.validate(&nodes)).unwrap_err();
        assert_eq!(err.code, ErrorCode::TooManyChildNodes);

        let err = error::poll(graph.connect(3, DynamicTarget::new())).unwrap_err();
        assert_eq!(err.code, ErrorCode::TooManyParameters);
    }

    #[test]
    fn dynamic_parameters_route_values() {
        let mut nodes = (Scale(0.0), Scale(0.0));
        let mut graph = DynamicParameters::new();
        let index = graph.add(ParameterInfo::new(0, "Depth").with_range(ParameterRange::new(0.0, 10.0)));
        graph
            .connect(index, DynamicTarget::connected(0, 0, ParameterRange::new(0.0, 2.0)))
            .unwrap();
        graph
            .connect(index, DynamicTarget::connected(1, 0, ParameterRange::unit()))
            .unwrap();

        assert!(error::poll(graph.validate(&nodes)).is_ok());
        graph.call(index, &mut nodes, 5.0, VoiceIndex::NONE);
        assert_eq!(nodes, (Scale(1.0), Scale(0.5)));
    }
}
