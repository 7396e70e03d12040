//! Single-child wrappers.
//!
//! Each wrapper owns exactly one child and forwards every contract member
//! except the one or two it changes:
//!
//! - [`Fix`]: pins the channel count the child sees.
//! - [`Frame`]: forces per-sample execution.
//! - [`Bypass`] / [`SmoothedBypass`]: gate the child, the latter with a
//!   click-free crossfade.
//! - [`Mod`]: turns the child into a routed modulation source.
//! - [`Oversample`]: runs the child at K times the rate.
//! - [`ControlRate`]: runs a mono child once every `DIVIDER` samples.
//! - [`Duplicate`]: a resizable array of clones.
//! - [`FixBlock`]: cuts blocks into fixed-size pieces.
//! - [`EventSync`] / [`NoEvents`]: sample-accurate event delivery, or none.

mod bypass;
mod control_rate;
mod duplicate;
mod events;
mod fix;
mod fix_block;
mod frame;
mod modulation;
mod oversample;

pub use bypass::{Bypass, DEFAULT_BYPASS_RAMP_MS, SmoothedBypass};
pub use control_rate::ControlRate;
pub use duplicate::{
    DEFAULT_MAX_CLONES, Duplicate, DuplicateController, DuplicatePolicy, DuplicateScratch, Parallel,
    PassThroughCopy, Serial,
};
pub use events::{EventSync, NoEvents};
pub use fix::Fix;
pub use fix_block::FixBlock;
pub use frame::Frame;
pub use modulation::Mod;
pub use oversample::{MAX_OVERSAMPLE_FACTOR, Oversample};

/// Emits `Node` members that hand the call straight to `self.child`.
macro_rules! forward_to_child {
    (reset) => {
        fn reset(&mut self, voice: $crate::poly::VoiceIndex) {
            self.child.reset(voice);
        }
    };
    (handle_event) => {
        fn handle_event(&mut self, event: &mut $crate::data::Event, voice: $crate::poly::VoiceIndex) {
            self.child.handle_event(event, voice);
        }
    };
    (handle_modulation) => {
        fn handle_modulation(&mut self, voice: $crate::poly::VoiceIndex) -> Option<f64> {
            self.child.handle_modulation(voice)
        }
    };
    (describe_parameters) => {
        fn describe_parameters(&self, list: &mut $crate::parameter::ParameterList) {
            self.child.describe_parameters(list);
        }
    };
    (set_parameter) => {
        fn set_parameter(&mut self, index: usize, value: f64, voice: $crate::poly::VoiceIndex) {
            self.child.set_parameter(index, value, voice);
        }
    };
    (bind_external_data) => {
        fn bind_external_data(
            &mut self,
            data: &$crate::data::ExternalData,
            index: usize,
        ) -> $crate::error::Result<()> {
            self.child.bind_external_data(data, index)
        }
    };
    (fixed_channels) => {
        fn fixed_channels(&self) -> Option<usize> {
            self.child.fixed_channels()
        }
    };
    (is_polyphonic) => {
        fn is_polyphonic(&self) -> bool {
            self.child.is_polyphonic()
        }
    };
    (has_modulation) => {
        fn has_modulation(&self) -> bool {
            self.child.has_modulation()
        }
    };
    (is_modulation_source) => {
        fn is_modulation_source(&self) -> bool {
            self.child.is_modulation_source()
        }
    };
    (is_frame_capable) => {
        fn is_frame_capable(&self) -> bool {
            self.child.is_frame_capable()
        }
    };
    (data_slots) => {
        fn data_slots(&self) -> $crate::data::DataSlots {
            self.child.data_slots()
        }
    };
    ($($member:ident),+ $(,)?) => {
        $($crate::wrap::forward_to_child!($member);)+
    };
}

pub(crate) use forward_to_child;
