//! Everything a node reads and writes during a call: processing views, frame
//! cursors, events, scratch buffers and external data.

mod buffer;
mod event;
mod external;
mod frame;
mod process_data;

pub use buffer::AudioBuffer;
pub use event::{Event, EventKind};
pub use external::{DataSlots, DataType, ExternalData};
pub use frame::{FrameProcessor, FrameProcessorDyn};
pub use process_data::{ProcessData, ProcessDataDyn, ProcessView};
