//! Table waveshaper.

use crate::data::{DataSlots, DataType, ExternalData, ProcessView};
use crate::error::Result;
use crate::node::Node;
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

/// Maps every sample through a bound lookup table.
///
/// Inputs are clamped to `0..=1` and read with linear interpolation across
/// the table. Without a table the node passes audio through.
#[derive(Debug, Clone, Default)]
pub struct TableLookup {
    table: Option<ExternalData>,
}

impl TableLookup {
    /// The bound table, if any.
    pub fn table(&self) -> Option<&ExternalData> {
        self.table.as_ref()
    }

    #[inline]
    fn lookup(values: &[f32], input: f32) -> f32 {
        match values {
            [] => input,
            [only] => *only,
            _ => {
                let position = input.clamp(0.0, 1.0) * (values.len() - 1) as f32;
                let index = (position as usize).min(values.len() - 2);
                let fraction = position - index as f32;
                values[index] + (values[index + 1] - values[index]) * fraction
            }
        }
    }
}

impl Node for TableLookup {
    const ID: &'static str = "table";
    const DATA_SLOTS: DataSlots = DataSlots::NONE.with(DataType::Table, 1);

    fn prepare(&mut self, _specs: &PrepareSpecs) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self, _voice: VoiceIndex) {}

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        let Some(table) = &self.table else {
            return;
        };
        let values = table.samples();
        for channel in data.channels_mut() {
            channel.iter_mut().for_each(|s| *s = Self::lookup(values, *s));
        }
    }

    fn process_frame(&mut self, frame: &mut [f32], _voice: VoiceIndex) {
        if let Some(table) = &self.table {
            let values = table.samples();
            frame.iter_mut().for_each(|s| *s = Self::lookup(values, *s));
        }
    }

    fn bind_external_data(&mut self, data: &ExternalData, index: usize) -> Result<()> {
        data.expect_kind(DataType::Table, index, Self::DATA_SLOTS.count(DataType::Table))?;
        self.table = Some(data.clone());
        Ok(())
    }
}
