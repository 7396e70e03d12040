//! Per-type function pointer tables.
//!
//! [`NodeVTable::of`] is the single place where a statically dispatched
//! [`Node`] is turned into call-through-pointer form. Every entry takes the
//! object as an untyped pointer and casts it back to the concrete type the
//! table was generated for.

#![allow(unsafe_code)]

use crate::data::{DataSlots, Event, ExternalData, ProcessDataDyn};
use crate::error::Result;
use crate::node::Node;
use crate::parameter::ParameterList;
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Function pointers of one concrete node type.
///
/// Every function requires `obj` to point at a live, properly aligned value
/// of the type the table was created for.
#[derive(Clone, Copy)]
pub(crate) struct NodeVTable {
    pub id: &'static str,

    pub data_slots: unsafe fn(*const u8) -> DataSlots,

    pub is_polyphonic: unsafe fn(*const u8) -> bool,
    pub has_modulation: unsafe fn(*const u8) -> bool,
    pub is_modulation_source: unsafe fn(*const u8) -> bool,
    pub is_frame_capable: unsafe fn(*const u8) -> bool,

    pub drop_in_place: unsafe fn(*mut u8),
    pub drop_boxed: unsafe fn(*mut u8),
    pub prepare: unsafe fn(*mut u8, &PrepareSpecs) -> Result<()>,
    pub reset: unsafe fn(*mut u8, VoiceIndex),
    pub process: unsafe fn(*mut u8, &mut ProcessDataDyn<'_>),
    pub process_frame: unsafe fn(*mut u8, &mut [f32], VoiceIndex),
    pub handle_event: unsafe fn(*mut u8, &mut Event, VoiceIndex),
    pub handle_modulation: unsafe fn(*mut u8, VoiceIndex) -> Option<f64>,
    pub describe_parameters: unsafe fn(*const u8, &mut ParameterList),
    pub set_parameter: unsafe fn(*mut u8, usize, f64, VoiceIndex),
    pub bind_external_data: unsafe fn(*mut u8, &ExternalData, usize) -> Result<()>,
    pub fixed_channels: unsafe fn(*const u8) -> Option<usize>,
}

impl NodeVTable {
    /// Table for `T`.
    pub fn of<T: Node>() -> Self {
        Self {
            id: T::ID,
            data_slots: data_slots::<T>,
            is_polyphonic: is_polyphonic::<T>,
            has_modulation: has_modulation::<T>,
            is_modulation_source: is_modulation_source::<T>,
            is_frame_capable: is_frame_capable::<T>,
            drop_in_place: drop_in_place::<T>,
            drop_boxed: drop_boxed::<T>,
            prepare: prepare::<T>,
            reset: reset::<T>,
            process: process::<T>,
            process_frame: process_frame::<T>,
            handle_event: handle_event::<T>,
            handle_modulation: handle_modulation::<T>,
            describe_parameters: describe_parameters::<T>,
            set_parameter: set_parameter::<T>,
            bind_external_data: bind_external_data::<T>,
            fixed_channels: fixed_channels::<T>,
        }
    }
}

// SAFETY (all functions below): callers pass a pointer to a live `T` that
// nothing else borrows for the duration of the call.

unsafe fn drop_in_place<T: Node>(obj: *mut u8) {
    unsafe { core::ptr::drop_in_place(obj.cast::<T>()) }
}

// `obj` must also come from `Box::<T>::into_raw`.
unsafe fn drop_boxed<T: Node>(obj: *mut u8) {
    drop(unsafe { Box::from_raw(obj.cast::<T>()) });
}

unsafe fn prepare<T: Node>(obj: *mut u8, specs: &PrepareSpecs) -> Result<()> {
    unsafe { (*obj.cast::<T>()).prepare(specs) }
}

unsafe fn reset<T: Node>(obj: *mut u8, voice: VoiceIndex) {
    unsafe { (*obj.cast::<T>()).reset(voice) }
}

unsafe fn process<T: Node>(obj: *mut u8, data: &mut ProcessDataDyn<'_>) {
    unsafe { (*obj.cast::<T>()).process(data) }
}

unsafe fn process_frame<T: Node>(obj: *mut u8, frame: &mut [f32], voice: VoiceIndex) {
    unsafe { (*obj.cast::<T>()).process_frame(frame, voice) }
}

unsafe fn handle_event<T: Node>(obj: *mut u8, event: &mut Event, voice: VoiceIndex) {
    unsafe { (*obj.cast::<T>()).handle_event(event, voice) }
}

unsafe fn handle_modulation<T: Node>(obj: *mut u8, voice: VoiceIndex) -> Option<f64> {
    unsafe { (*obj.cast::<T>()).handle_modulation(voice) }
}

unsafe fn describe_parameters<T: Node>(obj: *const u8, list: &mut ParameterList) {
    unsafe { (*obj.cast::<T>()).describe_parameters(list) }
}

unsafe fn set_parameter<T: Node>(obj: *mut u8, index: usize, value: f64, voice: VoiceIndex) {
    unsafe { (*obj.cast::<T>()).set_parameter(index, value, voice) }
}

unsafe fn bind_external_data<T: Node>(obj: *mut u8, data: &ExternalData, index: usize) -> Result<()> {
    unsafe { (*obj.cast::<T>()).bind_external_data(data, index) }
}

unsafe fn fixed_channels<T: Node>(obj: *const u8) -> Option<usize> {
    unsafe { (*obj.cast::<T>()).fixed_channels() }
}

unsafe fn is_polyphonic<T: Node>(obj: *const u8) -> bool {
    unsafe { (*obj.cast::<T>()).is_polyphonic() }
}

unsafe fn has_modulation<T: Node>(obj: *const u8) -> bool {
    unsafe { (*obj.cast::<T>()).has_modulation() }
}

unsafe fn is_modulation_source<T: Node>(obj: *const u8) -> bool {
    unsafe { (*obj.cast::<T>()).is_modulation_source() }
}

unsafe fn is_frame_capable<T: Node>(obj: *const u8) -> bool {
    unsafe { (*obj.cast::<T>()).is_frame_capable() }
}

unsafe fn data_slots<T: Node>(obj: *const u8) -> DataSlots {
    unsafe { (*obj.cast::<T>()).data_slots() }
}
