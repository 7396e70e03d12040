//! Reference leaf nodes.
//!
//! A small set of leaves used by the built-in library, the examples in this
//! crate's docs, and the tests. They are deliberately simple; real DSP lives
//! outside this crate and plugs in through the same [`Node`] contract.

mod gain;
mod peak;
mod ramp;
mod table;

pub use gain::{DEFAULT_GAIN_SMOOTHING_MS, Gain};
pub use peak::Peak;
pub use ramp::{Constant, Ramp};
pub use table::TableLookup;

use crate::data::ProcessView;
use crate::error::Result;
use crate::node::Node;
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Leaves its input untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Passthrough;

impl Node for Passthrough {
    const ID: &'static str = "passthrough";

    fn prepare(&mut self, _specs: &PrepareSpecs) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self, _voice: VoiceIndex) {}

    #[inline]
    fn process<P: ProcessView>(&mut self, _data: &mut P) {}

    #[inline]
    fn process_frame(&mut self, _frame: &mut [f32], _voice: VoiceIndex) {}
}
