//! Tessel Core - node composition and dispatch for real-time audio graphs
//!
//! This crate is the runtime underneath a modular audio graph: a uniform
//! contract every processing unit implements, generic containers and
//! wrappers that compose units into bigger ones, a type-erased handle for
//! units that cross module boundaries, a parameter routing graph, and the
//! per-voice plumbing polyphonic units need. It holds no DSP beyond a few
//! reference leaves.
//!
//! # Core Abstractions
//!
//! ## Node contract
//!
//! - [`Node`] - `prepare`, `reset`, `process`, `process_frame` plus optional
//!   members with no-op defaults
//! - [`NodeList`] - an ordered child list (tuple, array, or `Vec`) a
//!   container drives by index
//! - [`ProcessData`] / [`ProcessDataDyn`] - non-owning block views, typed and
//!   dynamic channel count
//! - [`PrepareSpecs`] - sample rate, block size, channel count, voice context
//!
//! ## Composition
//!
//! - [`container`] - [`Chain`](container::Chain),
//!   [`Split`](container::Split), [`Multi`](container::Multi),
//!   [`Branch`](container::Branch)
//! - [`wrap`] - single-child decorators: fixed channels, frame-forced,
//!   bypass, modulation source, oversampling, control rate, duplication
//! - [`parameter`] - exposed parameters routed to children, optionally
//!   through unit conversions
//!
//! ## Type erasure
//!
//! - [`OpaqueNode`] - inline-storage handle with a function-pointer table;
//!   the only place a concrete node type is erased
//!
//! ## Voices
//!
//! - [`VoiceIndex`] - which voice a call belongs to, passed explicitly
//! - [`PolyData`] - per-voice storage that iterates one slot or all of them
//!
//! # Example
//!
//! ```rust
//! use tessel_core::prelude::*;
//! use tessel_core::container::{Chain, Split};
//! use tessel_core::nodes::Gain;
//!
//! // Two parallel gains followed by a third, all resolved at compile time.
//! let mut graph = Chain::new((Split::new((Gain::new(-6.0), Gain::new(-12.0))), Gain::new(0.0)));
//! graph.prepare(&PrepareSpecs::new(48000.0, 64, 2)).unwrap();
//!
//! let mut left = [1.0_f32; 64];
//! let mut right = [1.0_f32; 64];
//! graph.process(&mut ProcessData::new([&mut left[..], &mut right[..]]));
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: `process`, `process_frame`, `reset` and
//!   `handle_event` never allocate and never block
//! - **Errors at prepare time**: every configuration fault surfaces from
//!   `prepare` or graph construction; the render path has no error channel
//! - **Static first**: containers are generic over their children; dynamic
//!   dispatch exists only behind [`OpaqueNode`]

pub mod container;
pub mod data;
pub mod error;
pub mod handle;
pub mod math;
pub mod node;
pub mod nodes;
pub mod parameter;
pub mod poly;
pub mod smoothing;
pub mod specs;
pub mod wrap;

// Re-export main types at crate root
pub use data::{AudioBuffer, DataSlots, DataType, Event, EventKind, ExternalData, ProcessData, ProcessDataDyn, ProcessView};
pub use error::{ErrorCode, NodeError, Result};
pub use handle::OpaqueNode;
pub use node::{Node, NodeList, process_frames};
pub use parameter::{BYPASS_INDEX, ParameterInfo, ParameterList, ParameterRange};
pub use poly::{PolyData, PolyHandler, VoiceContext, VoiceIndex};
pub use smoothing::{LinearSmoothedParam, SmoothedParam};
pub use specs::{MAX_BLOCK_SIZE, MAX_CHANNELS, PrepareSpecs};

/// The names almost every node implementation needs.
pub mod prelude {
    pub use crate::data::{Event, ExternalData, ProcessData, ProcessDataDyn, ProcessView};
    pub use crate::error::{NodeError, Result};
    pub use crate::handle::OpaqueNode;
    pub use crate::node::{Node, NodeList};
    pub use crate::parameter::{ParameterInfo, ParameterList, ParameterRange};
    pub use crate::poly::{PolyData, VoiceIndex};
    pub use crate::specs::PrepareSpecs;
}
