//! The library boundary and its registration-table implementation.

use tessel_core::parameter::{ParameterList, encoding};
use tessel_core::{DataSlots, DataType, Node, OpaqueNode};

use crate::error::LibraryError;

/// A set of nodes a host can instantiate by index.
///
/// Indices run from `0` to `node_count() - 1` and are stable for the
/// lifetime of the library.
pub trait NodeLibrary: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Number of nodes the library provides.
    fn node_count(&self) -> usize;

    /// String id of node `index`.
    fn node_id(&self, index: usize) -> Option<&str>;

    /// Places a fresh instance of node `index` into `handle`, replacing what
    /// it held.
    fn init_opaque_node(&self, index: usize, handle: &mut OpaqueNode) -> Result<(), LibraryError>;

    /// External data slots of `kind` node `index` needs. Zero for unknown
    /// indices.
    fn data_slot_count(&self, index: usize, kind: DataType) -> usize;

    /// Encoded parameter table of node `index`.
    fn parameter_data(&self, index: usize) -> Option<&[u8]>;
}

struct Entry {
    id: &'static str,
    slots: DataSlots,
    parameters: Vec<u8>,
    create: fn(&mut OpaqueNode),
}

/// A library built from a list of node types.
///
/// Each registered type must be default-constructible; its id, data slots
/// and parameter table are captured from a default instance at registration.
///
/// ```rust
/// use tessel_core::nodes::{Constant, Gain};
/// use tessel_library::{NodeLibrary, StaticLibrary};
///
/// let library = StaticLibrary::new("mine").register::<Gain>().register::<Constant>();
/// assert_eq!(library.node_count(), 2);
/// assert_eq!(library.node_id(1), Some("constant"));
/// ```
pub struct StaticLibrary {
    name: String,
    entries: Vec<Entry>,
}

impl StaticLibrary {
    /// An empty library.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Adds `T`. A type whose id is already registered replaces the earlier
    /// entry at the same index.
    pub fn register<T: Node + Default + Send + 'static>(mut self) -> Self {
        let prototype = T::default();
        let mut parameters = ParameterList::new();
        prototype.describe_parameters(&mut parameters);

        let entry = Entry {
            id: prototype.id(),
            slots: prototype.data_slots(),
            parameters: encoding::encode(parameters.as_slice()),
            create: OpaqueNode::create::<T>,
        };

        tracing::debug!(
            library = %self.name,
            id = entry.id,
            parameters = parameters.len(),
            data_slots = entry.slots.total(),
            "node registered"
        );

        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => {
                tracing::warn!(library = %self.name, id = entry.id, "node id registered twice");
                *existing = entry;
            }
            None => self.entries.push(entry),
        }
        self
    }

    /// Index of the node with `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn entry(&self, index: usize) -> Result<&Entry, LibraryError> {
        self.entries.get(index).ok_or_else(|| LibraryError::IndexOutOfRange {
            library: self.name.clone(),
            index,
            count: self.entries.len(),
        })
    }
}

impl NodeLibrary for StaticLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn node_count(&self) -> usize {
        self.entries.len()
    }

    fn node_id(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.id)
    }

    fn init_opaque_node(&self, index: usize, handle: &mut OpaqueNode) -> Result<(), LibraryError> {
        let entry = self.entry(index)?;
        (entry.create)(handle);
        Ok(())
    }

    fn data_slot_count(&self, index: usize, kind: DataType) -> usize {
        self.entries.get(index).map_or(0, |e| e.slots.count(kind))
    }

    fn parameter_data(&self, index: usize) -> Option<&[u8]> {
        self.entries.get(index).map(|e| e.parameters.as_slice())
    }
}

impl core::fmt::Debug for StaticLibrary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StaticLibrary")
            .field("name", &self.name)
            .field("nodes", &self.entries.iter().map(|e| e.id).collect::<Vec<_>>())
            .finish()
    }
}
