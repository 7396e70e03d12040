//! Host-side node factory.

use tessel_core::parameter::{ParameterList, encoding};
use tessel_core::{DataSlots, DataType, Node, OpaqueNode};

use crate::error::LibraryError;
use crate::library::NodeLibrary;

/// Describes a node one of the factory's libraries provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    /// String id the node is created by.
    pub id: String,
    /// Name of the providing library.
    pub library: String,
    /// Number of parameters in the node's table.
    pub num_parameters: usize,
    /// External data slots per category.
    pub data_slots: DataSlots,
}

/// Instantiates nodes by string id from a set of libraries.
///
/// Libraries are searched in the order they were added; the first one that
/// provides an id wins.
#[derive(Default)]
pub struct NodeFactory {
    libraries: Vec<Box<dyn NodeLibrary>>,
}

impl NodeFactory {
    /// A factory with no libraries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a library to the search list.
    pub fn add_library(&mut self, library: impl NodeLibrary + 'static) {
        tracing::info!(
            library = library.name(),
            nodes = library.node_count(),
            "node library added"
        );
        self.libraries.push(Box::new(library));
    }

    /// Number of libraries.
    pub fn num_libraries(&self) -> usize {
        self.libraries.len()
    }

    fn find(&self, id: &str) -> Option<(&dyn NodeLibrary, usize)> {
        self.libraries.iter().find_map(|library| {
            (0..library.node_count())
                .find(|&i| library.node_id(i) == Some(id))
                .map(|i| (library.as_ref(), i))
        })
    }

    /// True if some library provides `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// A new handle holding node `id`.
    pub fn create(&self, id: &str) -> Result<OpaqueNode, LibraryError> {
        let mut handle = OpaqueNode::empty();
        self.init(id, &mut handle)?;
        Ok(handle)
    }

    /// Replaces the content of `handle` with node `id`.
    ///
    /// The handle is left as it was if the id is unknown.
    pub fn init(&self, id: &str, handle: &mut OpaqueNode) -> Result<(), LibraryError> {
        let (library, index) = self
            .find(id)
            .ok_or_else(|| LibraryError::UnknownNode(id.to_string()))?;
        library.init_opaque_node(index, handle)?;

        debug_assert_eq!(handle.id(), id, "library returned a node with another id");
        tracing::debug!(
            id,
            library = library.name(),
            inline = handle.is_inline(),
            "node created"
        );
        Ok(())
    }

    /// Every node of every library, in search order. An id shadowed by an
    /// earlier library is listed once.
    pub fn list(&self) -> Vec<NodeDescriptor> {
        let mut out: Vec<NodeDescriptor> = Vec::new();
        for library in &self.libraries {
            for index in 0..library.node_count() {
                let Some(id) = library.node_id(index) else {
                    continue;
                };
                if out.iter().any(|d| d.id == id) {
                    continue;
                }
                let num_parameters = library
                    .parameter_data(index)
                    .map_or(0, |bytes| bytes.len() / encoding::RECORD_SIZE);
                out.push(NodeDescriptor {
                    id: id.to_string(),
                    library: library.name().to_string(),
                    num_parameters,
                    data_slots: slots_of(library.as_ref(), index),
                });
            }
        }
        out
    }

    /// Decoded parameter table of node `id`.
    pub fn parameters(&self, id: &str) -> Result<ParameterList, LibraryError> {
        let (library, index) = self
            .find(id)
            .ok_or_else(|| LibraryError::UnknownNode(id.to_string()))?;
        match library.parameter_data(index) {
            Some(bytes) => Ok(encoding::decode(bytes)?),
            None => Ok(ParameterList::new()),
        }
    }
}

fn slots_of(library: &dyn NodeLibrary, index: usize) -> DataSlots {
    DataType::ALL
        .into_iter()
        .fold(DataSlots::NONE, |slots, kind| slots.with(kind, library.data_slot_count(index, kind)))
}

impl core::fmt::Debug for NodeFactory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeFactory")
            .field("libraries", &self.libraries.iter().map(|l| l.name()).collect::<Vec<_>>())
            .finish()
    }
}
