//! Read-only data blocks owned outside the graph and bound to nodes by index.
//!
//! Tables, slider packs, audio files and filter coefficient sets are shared
//! between the graph and whatever edits them. A node declares how many slots
//! of each kind it needs through [`Node::DATA_SLOTS`] and receives the blocks
//! through [`Node::bind_external_data`].
//!
//! [`Node::DATA_SLOTS`]: crate::node::Node::DATA_SLOTS
//! [`Node::bind_external_data`]: crate::node::Node::bind_external_data

use std::sync::Arc;

use crate::error::{self, ErrorCode, NodeError, Result};

/// Category of an external data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// Lookup table, values in `0..=1`.
    Table,
    /// Array of independent slider values.
    SliderPack,
    /// Multichannel sample buffer.
    AudioFile,
    /// Filter coefficient set.
    FilterCoefficients,
    /// Buffer a node writes for display.
    DisplayBuffer,
}

impl DataType {
    /// Every category, in slot-table order.
    pub const ALL: [DataType; 5] = [
        DataType::Table,
        DataType::SliderPack,
        DataType::AudioFile,
        DataType::FilterCoefficients,
        DataType::DisplayBuffer,
    ];
}

/// Number of external data slots a node needs per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataSlots {
    /// Lookup tables.
    pub tables: usize,
    /// Slider packs.
    pub slider_packs: usize,
    /// Audio files.
    pub audio_files: usize,
    /// Filter coefficient sets.
    pub filter_coefficients: usize,
    /// Display buffers.
    pub display_buffers: usize,
}

impl DataSlots {
    /// No external data.
    pub const NONE: DataSlots = DataSlots {
        tables: 0,
        slider_packs: 0,
        audio_files: 0,
        filter_coefficients: 0,
        display_buffers: 0,
    };

    /// Returns a copy with `count` slots of `kind`.
    pub const fn with(self, kind: DataType, count: usize) -> Self {
        let mut slots = self;
        match kind {
            DataType::Table => slots.tables = count,
            DataType::SliderPack => slots.slider_packs = count,
            DataType::AudioFile => slots.audio_files = count,
            DataType::FilterCoefficients => slots.filter_coefficients = count,
            DataType::DisplayBuffer => slots.display_buffers = count,
        }
        slots
    }

    /// Slots of `kind`.
    pub const fn count(&self, kind: DataType) -> usize {
        match kind {
            DataType::Table => self.tables,
            DataType::SliderPack => self.slider_packs,
            DataType::AudioFile => self.audio_files,
            DataType::FilterCoefficients => self.filter_coefficients,
            DataType::DisplayBuffer => self.display_buffers,
        }
    }

    /// Per-category sum of two slot tables.
    pub const fn merged(self, other: DataSlots) -> Self {
        DataSlots {
            tables: self.tables + other.tables,
            slider_packs: self.slider_packs + other.slider_packs,
            audio_files: self.audio_files + other.audio_files,
            filter_coefficients: self.filter_coefficients + other.filter_coefficients,
            display_buffers: self.display_buffers + other.display_buffers,
        }
    }

    /// Total slots across all categories.
    pub const fn total(&self) -> usize {
        self.tables
            + self.slider_packs
            + self.audio_files
            + self.filter_coefficients
            + self.display_buffers
    }
}

/// A shared, immutable block of external data.
///
/// Samples are stored planar: channel `c` occupies
/// `samples[c * len .. (c + 1) * len]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalData {
    kind: DataType,
    samples: Arc<[f32]>,
    num_channels: usize,
    sample_rate: f64,
}

impl ExternalData {
    /// A lookup table.
    pub fn table(values: impl Into<Arc<[f32]>>) -> Self {
        Self::single(DataType::Table, values.into())
    }

    /// A slider pack.
    pub fn slider_pack(values: impl Into<Arc<[f32]>>) -> Self {
        Self::single(DataType::SliderPack, values.into())
    }

    /// A filter coefficient set.
    pub fn filter_coefficients(values: impl Into<Arc<[f32]>>) -> Self {
        Self::single(DataType::FilterCoefficients, values.into())
    }

    /// A zeroed display buffer of `len` samples.
    pub fn display_buffer(len: usize) -> Self {
        Self::single(DataType::DisplayBuffer, vec![0.0; len].into())
    }

    /// An audio file from planar channels of equal length.
    pub fn audio_file(channels: &[Vec<f32>], sample_rate: f64) -> Result<Self> {
        let len = channels.first().map_or(0, Vec::len);
        if let Some(bad) = channels.iter().find(|c| c.len() != len) {
            error::raise(NodeError::new(ErrorCode::InvalidExternalData, len, bad.len()))?;
        }
        let samples: Vec<f32> = channels.iter().flatten().copied().collect();
        Ok(Self {
            kind: DataType::AudioFile,
            samples: samples.into(),
            num_channels: channels.len(),
            sample_rate,
        })
    }

    fn single(kind: DataType, samples: Arc<[f32]>) -> Self {
        Self {
            kind,
            samples,
            num_channels: 1,
            sample_rate: 0.0,
        }
    }

    /// Category of this block.
    pub fn kind(&self) -> DataType {
        self.kind
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.samples.len().checked_div(self.num_channels).unwrap_or(0)
    }

    /// True if the block holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate of an audio file; zero for other kinds.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// One channel's samples.
    pub fn channel(&self, index: usize) -> &[f32] {
        let len = self.len();
        let start = (index * len).min(self.samples.len());
        let end = (start + len).min(self.samples.len());
        &self.samples[start..end]
    }

    /// Every sample, channel after channel.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Fails with [`ErrorCode::InvalidExternalData`] unless this block is of
    /// `kind` and `index` is below `slots`.
    pub fn expect_kind(&self, kind: DataType, index: usize, slots: usize) -> Result<()> {
        if self.kind != kind {
            return error::raise(NodeError::new(
                ErrorCode::InvalidExternalData,
                kind as i64,
                self.kind as i64,
            ));
        }
        if index >= slots {
            return error::raise(NodeError::new(ErrorCode::InvalidExternalData, slots, index));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_table_counts() {
        const SLOTS: DataSlots = DataSlots::NONE
            .with(DataType::Table, 2)
            .with(DataType::AudioFile, 1);
        assert_eq!(SLOTS.count(DataType::Table), 2);
        assert_eq!(SLOTS.count(DataType::AudioFile), 1);
        assert_eq!(SLOTS.count(DataType::SliderPack), 0);
        assert_eq!(SLOTS.total(), 3);
        assert_eq!(SLOTS.merged(SLOTS).count(DataType::Table), 4);
    }

    #[test]
    fn audio_file_is_planar() {
        let data = ExternalData::audio_file(&[vec![1.0, 2.0], vec![3.0, 4.0]], 48000.0).unwrap();
        assert_eq!(data.num_channels(), 2);
        assert_eq!(data.len(), 2);
        assert_eq!(data.channel(1), &[3.0, 4.0]);
    }

    #[test]
    fn ragged_audio_file_is_rejected() {
        let err = error::poll(
            ExternalData::audio_file(&[vec![1.0, 2.0], vec![3.0]], 48000.0).map(|_| ()),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidExternalData);
    }

    #[test]
    fn kind_and_index_are_checked() {
        let table = ExternalData::table(vec![0.0, 1.0]);
        assert!(error::poll(table.expect_kind(DataType::Table, 0, 1)).is_ok());

        let err = error::poll(table.expect_kind(DataType::AudioFile, 0, 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidExternalData);

        let err = error::poll(table.expect_kind(DataType::Table, 1, 1)).unwrap_err();
        assert_eq!((err.expected, err.actual), (1, 1));
    }
}
