//! Parameter descriptions, value ranges and routing.
//!
//! - [`ParameterInfo`] / [`ParameterList`] describe what a node exposes.
//! - [`ParameterRange`] maps between a parameter's domain and `0..=1`.
//! - [`ParameterTarget`]s deliver a value to one child parameter;
//!   [`ParameterGraph`]s are a container's exposed parameters built from
//!   targets; [`ModulationGraph`]s carry modulation output to siblings.
//! - [`encoding`] is the fixed-width binary form used across library
//!   boundaries.

mod convert;
pub mod encoding;
mod graph;
mod info;
mod modulation;
mod range;
mod target;

pub use convert::{
    Converter, Custom, DbToGain, FreqToMs, GainToDb, Identity, Invert, MsToFreq, MsToSamples,
    PitchRatioToSemitones, Pow, SemitonesToPitchRatio,
};
pub use graph::{
    DynamicParameter, DynamicParameters, NoParameters, ParamChain, ParamList, ParameterGraph,
    Single,
};
pub use info::{ParameterInfo, ParameterList, SHORT_NAME_LEN, ShortName};
pub use modulation::{ModRoute, ModulationGraph, NoModulation};
pub(crate) use modulation::{drain as drain_modulation, poll_source as poll_modulation};
pub use range::ParameterRange;
pub use target::{BypassTarget, Converted, DynamicTarget, ParameterTarget, Plain, Ranged};

/// Parameter index every bypass-capable wrapper reacts to. Far above any
/// index a node uses for its own parameters.
pub const BYPASS_INDEX: usize = 9000;
