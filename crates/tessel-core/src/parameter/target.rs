//! Receivers of parameter values.
//!
//! A target addresses one parameter of one child of a container by index
//! into the container's [`NodeList`]. The container owns its children, so an
//! index can never dangle; rebuilding the container rebuilds the targets.
//! Static targets carry both indices as const generics and compile down to a
//! direct call on the child.

use super::BYPASS_INDEX;
use super::convert::Converter;
use super::range::ParameterRange;
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::NodeList;
use crate::poly::VoiceIndex;

/// Something a parameter value can be sent to.
pub trait ParameterTarget<L: NodeList> {
    /// Delivers `value`.
    ///
    /// Only valid after [`validate`](Self::validate) has succeeded against
    /// the same child list.
    fn call(&self, nodes: &mut L, value: f64, voice: VoiceIndex);

    /// Checks that the target addresses an existing child.
    fn validate(&self, nodes: &L) -> Result<()>;

    /// Whether the target has a receiver. Static targets always do.
    fn is_connected(&self) -> bool {
        true
    }
}

fn check_node_index<L: NodeList>(node: usize, nodes: &L) -> Result<()> {
    if node >= nodes.len() {
        return error::raise(NodeError::new(ErrorCode::TooManyChildNodes, nodes.len(), node + 1));
    }
    Ok(())
}

/// Sends the value unchanged to parameter `P` of child `NODE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain<const NODE: usize, const P: usize>;

impl<L: NodeList, const NODE: usize, const P: usize> ParameterTarget<L> for Plain<NODE, P> {
    #[inline]
    fn call(&self, nodes: &mut L, value: f64, voice: VoiceIndex) {
        nodes.set_parameter_at(NODE, P, value, voice);
    }

    fn validate(&self, nodes: &L) -> Result<()> {
        check_node_index(NODE, nodes)
    }
}

/// Maps a normalised value into `range` before sending it to parameter `P`
/// of child `NODE`.
#[derive(Debug, Clone, Copy)]
pub struct Ranged<const NODE: usize, const P: usize> {
    /// Target domain.
    pub range: ParameterRange,
}

impl<const NODE: usize, const P: usize> Ranged<NODE, P> {
    /// A target mapping `0..=1` onto `range`.
    pub const fn new(range: ParameterRange) -> Self {
        Self { range }
    }
}

impl<L: NodeList, const NODE: usize, const P: usize> ParameterTarget<L> for Ranged<NODE, P> {
    #[inline]
    fn call(&self, nodes: &mut L, value: f64, voice: VoiceIndex) {
        nodes.set_parameter_at(NODE, P, self.range.convert_from_0_to_1(value), voice);
    }

    fn validate(&self, nodes: &L) -> Result<()> {
        check_node_index(NODE, nodes)
    }
}

/// Applies a unit conversion, then forwards to another target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converted<C, T> {
    /// Conversion applied first.
    pub converter: C,
    /// Receiver of the converted value.
    pub target: T,
}

impl<C, T> Converted<C, T> {
    /// Wraps `target` behind `converter`.
    pub const fn new(converter: C, target: T) -> Self {
        Self { converter, target }
    }
}

impl<L: NodeList, C: Converter, T: ParameterTarget<L>> ParameterTarget<L> for Converted<C, T> {
    #[inline]
    fn call(&self, nodes: &mut L, value: f64, voice: VoiceIndex) {
        self.target.call(nodes, self.converter.convert(value), voice);
    }

    fn validate(&self, nodes: &L) -> Result<()> {
        self.target.validate(nodes)
    }

    fn is_connected(&self) -> bool {
        ParameterTarget::<L>::is_connected(&self.target)
    }
}

/// Drives the bypass state of child `NODE` through [`BYPASS_INDEX`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BypassTarget<const NODE: usize>;

impl<L: NodeList, const NODE: usize> ParameterTarget<L> for BypassTarget<NODE> {
    #[inline]
    fn call(&self, nodes: &mut L, value: f64, voice: VoiceIndex) {
        nodes.set_parameter_at(NODE, BYPASS_INDEX, value, voice);
    }

    fn validate(&self, nodes: &L) -> Result<()> {
        check_node_index(NODE, nodes)
    }
}

/// A target chosen at run time.
///
/// Starts unconnected; [`connect`](Self::connect) binds it to a child and
/// parameter. Values are treated as normalised and mapped into `range`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicTarget {
    connection: Option<(usize, usize)>,
    range: ParameterRange,
}

impl DynamicTarget {
    /// An unconnected target.
    pub const fn new() -> Self {
        Self {
            connection: None,
            range: ParameterRange::unit(),
        }
    }

    /// A target bound to `parameter` of child `node`.
    pub const fn connected(node: usize, parameter: usize, range: ParameterRange) -> Self {
        Self {
            connection: Some((node, parameter)),
            range,
        }
    }

    /// Binds the target.
    pub fn connect(&mut self, node: usize, parameter: usize, range: ParameterRange) {
        self.connection = Some((node, parameter));
        self.range = range;
    }

    /// Removes the binding.
    pub fn disconnect(&mut self) {
        self.connection = None;
    }

    /// `(child, parameter)` the target is bound to.
    pub fn connection(&self) -> Option<(usize, usize)> {
        self.connection
    }

    /// Target domain.
    pub fn range(&self) -> ParameterRange {
        self.range
    }
}

impl<L: NodeList> ParameterTarget<L> for DynamicTarget {
    #[inline]
    fn call(&self, nodes: &mut L, value: f64, voice: VoiceIndex) {
        debug_assert!(self.connection.is_some(), "unconnected parameter target called");
        if let Some((node, parameter)) = self.connection {
            nodes.set_parameter_at(node, parameter, self.range.convert_from_0_to_1(value), voice);
        }
    }

    fn validate(&self, nodes: &L) -> Result<()> {
        match self.connection {
            Some((node, _)) => check_node_index(node, nodes),
            None => error::raise(NodeError::new(ErrorCode::UnconnectedParameter, 0, 0)),
        }
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

macro_rules! impl_target_for_tuple {
    ($($idx:tt => $name:ident),+) => {
        impl<L: NodeList, $($name: ParameterTarget<L>),+> ParameterTarget<L> for ($($name,)+) {
            #[inline]
            fn call(&self, nodes: &mut L, value: f64, voice: VoiceIndex) {
                $(self.$idx.call(nodes, value, voice);)+
            }

            fn validate(&self, nodes: &L) -> Result<()> {
                $(self.$idx.validate(nodes)?;)+
                Ok(())
            }

            fn is_connected(&self) -> bool {
                $(ParameterTarget::<L>::is_connected(&self.$idx))&&+
            }
        }
    };
}

impl_target_for_tuple!(0 => A);
impl_target_for_tuple!(0 => A, 1 => B);
impl_target_for_tuple!(0 => A, 1 => B, 2 => C);
impl_target_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D);
impl_target_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
impl_target_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F);
