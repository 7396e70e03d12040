//! Node libraries and a host-side factory for tessel graphs.
//!
//! A node library is the boundary a separately compiled set of nodes
//! exposes to a host. It answers four questions by index: how many nodes
//! there are, what a node is called, how to place one into an
//! [`OpaqueNode`](tessel_core::OpaqueNode), and how many external data slots
//! of each kind it needs. It also hands out each node's parameter table in
//! the fixed-width [`encoding`](tessel_core::parameter::encoding) format.
//!
//! # Features
//!
//! - **Libraries**: [`NodeLibrary`] is the boundary; [`StaticLibrary`] is a
//!   registration table of node types
//! - **Factory**: [`NodeFactory`] aggregates libraries and instantiates nodes
//!   by string id
//! - **Built-ins**: [`builtin_library`] exposes the reference leaves of
//!   `tessel-core`
//!
//! # Example
//!
//! ```rust
//! use tessel_core::prelude::*;
//! use tessel_library::{NodeFactory, builtin_library};
//!
//! let mut factory = NodeFactory::new();
//! factory.add_library(builtin_library());
//!
//! let mut gain = factory.create("gain").unwrap();
//! gain.prepare(&PrepareSpecs::new(48000.0, 64, 1)).unwrap();
//! gain.set_parameter(0, -6.0, VoiceIndex::NONE);
//!
//! for descriptor in factory.list() {
//!     println!("{}: {} parameters", descriptor.id, descriptor.num_parameters);
//! }
//! ```

mod builtin;
mod error;
mod factory;
mod library;

pub use builtin::{BUILTIN_LIBRARY_NAME, builtin_library};
pub use error::LibraryError;
pub use factory::{NodeDescriptor, NodeFactory};
pub use library::{NodeLibrary, StaticLibrary};
