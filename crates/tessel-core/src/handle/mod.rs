//! The opaque node handle.
//!
//! [`OpaqueNode`] stores a value of any [`Node`] type together with a table of
//! function pointers captured when the value was created. After
//! [`create`](OpaqueNode::create), the concrete type is never named again:
//! every call goes through the table. This lets a graph hold statically
//! composed nodes and nodes instantiated by a separately compiled library
//! side by side.
//!
//! Values up to [`INLINE_CAPACITY`] bytes with an alignment of at most 16 are
//! stored inside the handle; larger ones go to the heap. Whether a type fits
//! is a compile-time property ([`fits_inline`]).
//!
//! ```rust
//! use tessel_core::prelude::*;
//! use tessel_core::nodes::Gain;
//!
//! let mut handle = OpaqueNode::new(Gain::new(-6.0));
//! assert_eq!(handle.id(), "gain");
//! assert!(handle.is_inline());
//!
//! handle.prepare(&PrepareSpecs::new(48000.0, 64, 1)).unwrap();
//! let mut ch = [1.0_f32; 64];
//! handle.process(&mut ProcessData::new([&mut ch[..]]));
//! assert!((ch[63] - 0.501).abs() < 1e-3);
//! ```

#![allow(unsafe_code)]

mod vtable;

use core::mem::MaybeUninit;
use core::ptr;

use vtable::NodeVTable;

use crate::data::{DataSlots, Event, ExternalData, ProcessDataDyn, ProcessView};
use crate::error::Result;
use crate::node::Node;
use crate::parameter::ParameterList;
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Bytes available for inline storage.
pub const INLINE_CAPACITY: usize = 512;

/// Alignment of the inline storage.
pub const INLINE_ALIGN: usize = 16;

/// Whether `T` is stored inside the handle rather than on the heap.
pub const fn fits_inline<T>() -> bool {
    size_of::<T>() <= INLINE_CAPACITY && align_of::<T>() <= INLINE_ALIGN
}

#[repr(C, align(16))]
struct InlineStorage([MaybeUninit<u8>; INLINE_CAPACITY]);

impl InlineStorage {
    const fn new() -> Self {
        Self([MaybeUninit::uninit(); INLINE_CAPACITY])
    }
}

/// A type-erased node.
///
/// An empty handle (from [`Default`]) ignores every call and reports the id
/// `"empty"`.
pub struct OpaqueNode {
    storage: InlineStorage,
    heap: *mut u8,
    vtable: Option<NodeVTable>,
}

// SAFETY: the handle owns its value exclusively and only accepts `T: Send`.
unsafe impl Send for OpaqueNode {}

impl OpaqueNode {
    /// An empty handle.
    pub const fn empty() -> Self {
        Self {
            storage: InlineStorage::new(),
            heap: ptr::null_mut(),
            vtable: None,
        }
    }

    /// A handle holding `node`.
    pub fn new<T: Node + Send + 'static>(node: T) -> Self {
        let mut handle = Self::empty();
        handle.create_with(node);
        handle
    }

    /// Replaces the content with a default-constructed `T`.
    pub fn create<T: Node + Default + Send + 'static>(&mut self) {
        self.create_with(T::default());
    }

    /// Replaces the content with `node`.
    pub fn create_with<T: Node + Send + 'static>(&mut self, node: T) {
        self.clear();

        if fits_inline::<T>() {
            // SAFETY: the storage is large and aligned enough for `T` and
            // holds no live value after `clear`.
            unsafe { self.storage.0.as_mut_ptr().cast::<T>().write(node) };
        } else {
            self.heap = Box::into_raw(Box::new(node)).cast::<u8>();
        }
        self.vtable = Some(NodeVTable::of::<T>());

        #[cfg(feature = "tracing")]
        tracing::trace!(
            id = T::ID,
            size = size_of::<T>(),
            inline = fits_inline::<T>(),
            "opaque node created"
        );
    }

    /// Drops the content, leaving an empty handle.
    pub fn clear(&mut self) {
        if let Some(vtable) = self.vtable.take() {
            if self.heap.is_null() {
                // SAFETY: the inline storage holds the live value the table
                // belongs to; the table was taken first so it drops once.
                unsafe { (vtable.drop_in_place)(self.storage.0.as_mut_ptr().cast()) };
            } else {
                // SAFETY: `heap` came from `Box::into_raw` for the table's type.
                unsafe { (vtable.drop_boxed)(self.heap) };
                self.heap = ptr::null_mut();
            }
        }
    }

    fn object_mut(&mut self) -> *mut u8 {
        if self.heap.is_null() {
            self.storage.0.as_mut_ptr().cast()
        } else {
            self.heap
        }
    }

    fn object(&self) -> *const u8 {
        if self.heap.is_null() {
            self.storage.0.as_ptr().cast()
        } else {
            self.heap
        }
    }

    /// True if no node is held.
    pub fn is_empty(&self) -> bool {
        self.vtable.is_none()
    }

    /// True if the node lives inside the handle.
    pub fn is_inline(&self) -> bool {
        self.vtable.is_some() && self.heap.is_null()
    }

    fn query(&self, select: impl FnOnce(&NodeVTable) -> unsafe fn(*const u8) -> bool) -> bool {
        match &self.vtable {
            // SAFETY: the table belongs to the held value.
            Some(vtable) => unsafe { select(vtable)(self.object()) },
            None => false,
        }
    }

    /// Processes a dynamic view through the table.
    pub fn process_dyn(&mut self, data: &mut ProcessDataDyn<'_>) {
        if let Some(vtable) = self.vtable {
            // SAFETY: the table belongs to the held value.
            unsafe { (vtable.process)(self.object_mut(), data) }
        }
    }
}

impl Default for OpaqueNode {
    fn default() -> Self {
        Self::empty()
    }
}

impl Drop for OpaqueNode {
    fn drop(&mut self) {
        self.clear();
    }
}

impl core::fmt::Debug for OpaqueNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpaqueNode")
            .field("id", &self.id())
            .field("inline", &self.is_inline())
            .finish_non_exhaustive()
    }
}

impl Node for OpaqueNode {
    const ID: &'static str = "opaque";

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        match self.vtable {
            // SAFETY: the table belongs to the held value.
            Some(vtable) => unsafe { (vtable.prepare)(self.object_mut(), specs) },
            None => Ok(()),
        }
    }

    fn reset(&mut self, voice: VoiceIndex) {
        if let Some(vtable) = self.vtable {
            // SAFETY: the table belongs to the held value.
            unsafe { (vtable.reset)(self.object_mut(), voice) }
        }
    }

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        let mut data = data.as_dyn();
        self.process_dyn(&mut data);
    }

    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        if let Some(vtable) = self.vtable {
            // SAFETY: the table belongs to the held value.
            unsafe { (vtable.process_frame)(self.object_mut(), frame, voice) }
        }
    }

    fn handle_event(&mut self, event: &mut Event, voice: VoiceIndex) {
        if let Some(vtable) = self.vtable {
            // SAFETY: the table belongs to the held value.
            unsafe { (vtable.handle_event)(self.object_mut(), event, voice) }
        }
    }

    fn handle_modulation(&mut self, voice: VoiceIndex) -> Option<f64> {
        let vtable = self.vtable?;
        // SAFETY: the table belongs to the held value.
        unsafe { (vtable.handle_modulation)(self.object_mut(), voice) }
    }

    fn describe_parameters(&self, list: &mut ParameterList) {
        if let Some(vtable) = self.vtable {
            // SAFETY: the table belongs to the held value.
            unsafe { (vtable.describe_parameters)(self.object(), list) }
        }
    }

    fn set_parameter(&mut self, index: usize, value: f64, voice: VoiceIndex) {
        if let Some(vtable) = self.vtable {
            // SAFETY: the table belongs to the held value.
            unsafe { (vtable.set_parameter)(self.object_mut(), index, value, voice) }
        }
    }

    fn bind_external_data(&mut self, data: &ExternalData, index: usize) -> Result<()> {
        match self.vtable {
            // SAFETY: the table belongs to the held value.
            Some(vtable) => unsafe { (vtable.bind_external_data)(self.object_mut(), data, index) },
            None => Ok(()),
        }
    }

    fn fixed_channels(&self) -> Option<usize> {
        let vtable = self.vtable?;
        // SAFETY: the table belongs to the held value.
        unsafe { (vtable.fixed_channels)(self.object()) }
    }

    fn id(&self) -> &'static str {
        self.vtable.map_or("empty", |v| v.id)
    }

    fn is_polyphonic(&self) -> bool {
        self.query(|v| v.is_polyphonic)
    }

    fn has_modulation(&self) -> bool {
        self.query(|v| v.has_modulation)
    }

    fn is_modulation_source(&self) -> bool {
        self.query(|v| v.is_modulation_source)
    }

    fn is_frame_capable(&self) -> bool {
        // An empty handle does nothing per frame either.
        self.vtable.is_none() || self.query(|v| v.is_frame_capable)
    }

    fn data_slots(&self) -> DataSlots {
        match &self.vtable {
            // SAFETY: the table belongs to the held value.
            Some(vtable) => unsafe { (vtable.data_slots)(self.object()) },
            None => DataSlots::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::data::ProcessData;
    use crate::node::test_nodes::{Probe, Scale};

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Counted<const BYTES: usize> {
        _counter: DropCounter,
        _payload: [u8; BYTES],
    }

    impl<const BYTES: usize> Node for Counted<BYTES> {
        const ID: &'static str = "counted";

        fn prepare(&mut self, _specs: &PrepareSpecs) -> Result<()> {
            Ok(())
        }

        fn reset(&mut self, _voice: VoiceIndex) {}

        fn process<P: ProcessView>(&mut self, _data: &mut P) {}

        fn process_frame(&mut self, _frame: &mut [f32], _voice: VoiceIndex) {}
    }

    fn counted<const BYTES: usize>(drops: &Arc<AtomicUsize>) -> Counted<BYTES> {
        Counted {
            _counter: DropCounter(Arc::clone(drops)),
            _payload: [0; BYTES],
        }
    }

    #[test]
    fn inline_budget() {
        assert!(fits_inline::<Scale>());
        assert!(fits_inline::<[u8; INLINE_CAPACITY]>());
        assert!(!fits_inline::<[u8; INLINE_CAPACITY + 1]>());
    }

    #[test]
    fn forwards_through_the_table() {
        let mut handle = OpaqueNode::new(Scale(3.0));
        assert!(handle.is_inline());
        assert_eq!(handle.id(), "scale");

        let mut ch = [1.0_f32, 2.0];
        handle.process(&mut ProcessData::new([&mut ch[..]]));
        assert_eq!(ch, [3.0, 6.0]);

        handle.set_parameter(0, 0.5, VoiceIndex::NONE);
        let mut frame = [4.0_f32];
        handle.process_frame(&mut frame, VoiceIndex::NONE);
        assert_eq!(frame, [2.0]);

        let mut list = ParameterList::new();
        handle.describe_parameters(&mut list);
        assert_eq!(list.find("Factor").map(|p| p.index), Some(0));
    }

    #[test]
    fn prepare_and_events_reach_the_node() {
        let mut handle = OpaqueNode::new(Probe::default());
        let specs = PrepareSpecs::new(48000.0, 32, 2);
        handle.prepare(&specs).unwrap();

        let mut event = Event::note_on(64, 90);
        handle.handle_event(&mut event, VoiceIndex::NONE);
        handle.reset(VoiceIndex::NONE);

        let mut list = ParameterList::new();
        handle.describe_parameters(&mut list);
        assert!(list.is_empty());
        assert_eq!(handle.id(), "probe");
    }

    #[test]
    fn heap_fallback_drops_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        {
            let handle = OpaqueNode::new(counted::<1024>(&drops));
            assert!(!handle.is_inline());
            assert!(!handle.is_empty());
        }
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn recreate_drops_previous_value() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut handle = OpaqueNode::new(counted::<8>(&drops));
        assert!(handle.is_inline());

        handle.create_with(counted::<2048>(&drops));
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        handle.create::<Probe>();
        assert_eq!(drops.load(Ordering::SeqCst), 2);
        assert_eq!(handle.id(), "probe");

        handle.clear();
        assert!(handle.is_empty());
        assert_eq!(handle.id(), "empty");
    }

    #[test]
    fn handle_survives_moves() {
        let mut handles: Vec<OpaqueNode> = (1..=4).map(|i| OpaqueNode::new(Scale(i as f32))).collect();
        handles.reserve(64);

        let mut frame = [1.0_f32];
        for handle in &mut handles {
            handle.process_frame(&mut frame, VoiceIndex::NONE);
        }
        assert_eq!(frame, [24.0]);
    }

    #[test]
    fn empty_handle_ignores_calls() {
        let mut handle = OpaqueNode::default();
        assert!(handle.prepare(&PrepareSpecs::default()).is_ok());
        let mut frame = [1.0_f32];
        handle.process_frame(&mut frame, VoiceIndex::NONE);
        assert_eq!(frame, [1.0]);
        assert_eq!(handle.handle_modulation(VoiceIndex::NONE), None);
        assert_eq!(handle.fixed_channels(), None);
        assert!(!handle.is_polyphonic());
    }
}
