//! The node contract.
//!
//! Every processing unit, leaf or composite, implements [`Node`]. Dispatch is
//! static: containers are generic over their children and call them through
//! monomorphised code. The [`OpaqueNode`](crate::handle::OpaqueNode) handle is
//! the one place where a concrete node type is erased behind function
//! pointers.
//!
//! # Optional members
//!
//! Everything beyond `prepare`, `reset`, `process` and `process_frame` has a
//! default that does nothing. A node pays nothing for members it does not
//! override: the defaults are inlined away at the call site. Capabilities that
//! containers must know before the render loop (frame support, modulation
//! output, polyphony, data slots) are associated constants, so the checks
//! resolve at compile time. Each constant also has a `&self` query defaulting
//! to it; nodes whose answer depends on their content (the opaque handle, a
//! run-time child list) override the query instead.
//!
//! # Example
//!
//! ```rust
//! use tessel_core::prelude::*;
//!
//! /// Flips the polarity of every channel.
//! #[derive(Default)]
//! struct Invert;
//!
//! impl Node for Invert {
//!     const ID: &'static str = "invert";
//!
//!     fn prepare(&mut self, _specs: &PrepareSpecs) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn reset(&mut self, _voice: VoiceIndex) {}
//!
//!     fn process<P: ProcessView>(&mut self, data: &mut P) {
//!         for channel in data.channels_mut() {
//!             channel.iter_mut().for_each(|s| *s = -*s);
//!         }
//!     }
//!
//!     fn process_frame(&mut self, frame: &mut [f32], _voice: VoiceIndex) {
//!         frame.iter_mut().for_each(|s| *s = -*s);
//!     }
//! }
//!
//! let mut node = Invert;
//! let mut ch = [1.0_f32, -0.5];
//! node.process(&mut ProcessData::new([&mut ch[..]]));
//! assert_eq!(ch, [-1.0, 0.5]);
//! ```

mod list;

pub use list::NodeList;

use crate::data::{DataSlots, Event, ExternalData, ProcessView};
use crate::error::Result;
use crate::parameter::ParameterList;
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// A unit that processes audio blocks and frames.
pub trait Node {
    /// Identifier used in libraries and diagnostics.
    const ID: &'static str;

    /// Whether the node keeps per-voice state.
    const IS_POLYPHONIC: bool = false;

    /// Whether [`handle_modulation`](Self::handle_modulation) can produce
    /// values.
    const HAS_MODULATION: bool = false;

    /// Whether enclosing containers route this node's modulation output.
    /// Only the [`Mod`](crate::wrap::Mod) wrapper sets this.
    const IS_MODULATION_SOURCE: bool = false;

    /// Whether [`process_frame`](Self::process_frame) is supported.
    const FRAME_CAPABLE: bool = true;

    /// External data slots the node needs.
    const DATA_SLOTS: DataSlots = DataSlots::NONE;

    /// Configures the node for a sample rate, block size, channel count and
    /// voice context. The only place a node may allocate.
    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()>;

    /// Clears processing state for `voice`, or for all voices.
    fn reset(&mut self, voice: VoiceIndex);

    /// Processes one block in place.
    fn process<P: ProcessView>(&mut self, data: &mut P);

    /// Processes one frame (one sample per channel) in place.
    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex);

    /// Receives a control event. May rewrite it.
    fn handle_event(&mut self, _event: &mut Event, _voice: VoiceIndex) {}

    /// Returns a new modulation value produced since the last query.
    fn handle_modulation(&mut self, _voice: VoiceIndex) -> Option<f64> {
        None
    }

    /// Appends the node's parameters to `list`.
    fn describe_parameters(&self, _list: &mut ParameterList) {}

    /// Sets parameter `index` for `voice`, or for all voices.
    fn set_parameter(&mut self, _index: usize, _value: f64, _voice: VoiceIndex) {}

    /// Binds a block of external data to slot `index`.
    fn bind_external_data(&mut self, _data: &ExternalData, _index: usize) -> Result<()> {
        Ok(())
    }

    /// Channel count the node insists on, if any.
    fn fixed_channels(&self) -> Option<usize> {
        None
    }

    /// Runtime view of [`ID`](Self::ID).
    fn id(&self) -> &'static str {
        Self::ID
    }

    /// Runtime view of [`IS_POLYPHONIC`](Self::IS_POLYPHONIC). Containers
    /// and the opaque handle answer from their content.
    fn is_polyphonic(&self) -> bool {
        Self::IS_POLYPHONIC
    }

    /// Runtime view of [`HAS_MODULATION`](Self::HAS_MODULATION).
    fn has_modulation(&self) -> bool {
        Self::HAS_MODULATION
    }

    /// Runtime view of [`IS_MODULATION_SOURCE`](Self::IS_MODULATION_SOURCE).
    fn is_modulation_source(&self) -> bool {
        Self::IS_MODULATION_SOURCE
    }

    /// Runtime view of [`FRAME_CAPABLE`](Self::FRAME_CAPABLE).
    fn is_frame_capable(&self) -> bool {
        Self::FRAME_CAPABLE
    }

    /// Runtime view of [`DATA_SLOTS`](Self::DATA_SLOTS).
    fn data_slots(&self) -> DataSlots {
        Self::DATA_SLOTS
    }
}

/// Drives `node` across a block one frame at a time.
///
/// This is the block-to-frame adapter: any frame-capable node can serve a
/// block call through it. The opposite direction does not exist.
pub fn process_frames<T: Node, P: ProcessView>(node: &mut T, data: &mut P) {
    debug_assert!(node.is_frame_capable(), "{} cannot process frames", node.id());
    let voice = data.voice();
    data.for_each_frame(|frame| node.process_frame(frame, voice));
}

#[cfg(test)]
pub(crate) mod test_nodes {
    //! Small nodes with exactly known output, shared by unit tests.

    use super::*;

    /// Multiplies by a factor; parameter 0 sets the factor.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Scale(pub f32);

    impl Node for Scale {
        const ID: &'static str = "scale";

        fn prepare(&mut self, _specs: &PrepareSpecs) -> Result<()> {
            Ok(())
        }

        fn reset(&mut self, _voice: VoiceIndex) {}

        fn process<P: ProcessView>(&mut self, data: &mut P) {
            for channel in data.channels_mut() {
                channel.iter_mut().for_each(|s| *s *= self.0);
            }
        }

        fn process_frame(&mut self, frame: &mut [f32], _voice: VoiceIndex) {
            frame.iter_mut().for_each(|s| *s *= self.0);
        }

        fn set_parameter(&mut self, index: usize, value: f64, _voice: VoiceIndex) {
            if index == 0 {
                self.0 = value as f32;
            }
        }

        fn describe_parameters(&self, list: &mut ParameterList) {
            list.add(crate::parameter::ParameterInfo::new(0, "Factor").with_default(1.0));
        }
    }

    /// Adds a constant offset.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Offset(pub f32);

    impl Node for Offset {
        const ID: &'static str = "offset";

        fn prepare(&mut self, _specs: &PrepareSpecs) -> Result<()> {
            Ok(())
        }

        fn reset(&mut self, _voice: VoiceIndex) {}

        fn process<P: ProcessView>(&mut self, data: &mut P) {
            for channel in data.channels_mut() {
                channel.iter_mut().for_each(|s| *s += self.0);
            }
        }

        fn process_frame(&mut self, frame: &mut [f32], _voice: VoiceIndex) {
            frame.iter_mut().for_each(|s| *s += self.0);
        }
    }

    /// Block-only node that counts calls.
    #[derive(Debug, Clone, Default)]
    pub struct BlockOnly {
        pub prepared: usize,
        pub processed: usize,
    }

    impl Node for BlockOnly {
        const ID: &'static str = "block_only";
        const FRAME_CAPABLE: bool = false;

        fn prepare(&mut self, _specs: &PrepareSpecs) -> Result<()> {
            self.prepared += 1;
            Ok(())
        }

        fn reset(&mut self, _voice: VoiceIndex) {}

        fn process<P: ProcessView>(&mut self, _data: &mut P) {
            self.processed += 1;
        }

        fn process_frame(&mut self, _frame: &mut [f32], _voice: VoiceIndex) {
            debug_assert!(false, "block-only node called per frame");
        }
    }

    /// Records the last prepare specs and every event it sees.
    #[derive(Debug, Clone, Default)]
    pub struct Probe {
        pub specs: Option<PrepareSpecs>,
        pub events: Vec<(usize, Event)>,
        pub blocks: Vec<usize>,
        pub resets: usize,
    }

    impl Node for Probe {
        const ID: &'static str = "probe";

        fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
            self.specs = Some(*specs);
            Ok(())
        }

        fn reset(&mut self, _voice: VoiceIndex) {
            self.resets += 1;
        }

        fn process<P: ProcessView>(&mut self, data: &mut P) {
            self.blocks.push(data.num_samples());
        }

        fn process_frame(&mut self, _frame: &mut [f32], _voice: VoiceIndex) {}

        fn handle_event(&mut self, event: &mut Event, _voice: VoiceIndex) {
            let offset = self.blocks.iter().sum();
            self.events.push((offset, *event));
        }
    }
}
