//! Processing configuration handed to every node before rendering starts.

use crate::error::{self, ErrorCode, NodeError, Result};
use crate::poly::VoiceContext;

/// Upper bound on channels a single processing view can carry.
pub const MAX_CHANNELS: usize = 16;

/// Upper bound on samples per block.
pub const MAX_BLOCK_SIZE: usize = 8192;

/// The `(sample rate, block size, channel count, voice context)` tuple every
/// node is prepared with.
///
/// Block size is the maximum the node will ever be called with; actual calls
/// may be shorter. The voice context is `None` outside polyphonic graphs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrepareSpecs {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Maximum number of samples per call.
    pub block_size: usize,
    /// Number of audio channels.
    pub num_channels: usize,
    /// Voice context of the enclosing graph, if any.
    pub voice_context: Option<VoiceContext>,
}

impl PrepareSpecs {
    /// Creates a monophonic configuration.
    pub fn new(sample_rate: f64, block_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            block_size,
            num_channels,
            voice_context: None,
        }
    }

    /// Returns a copy with a different channel count.
    pub fn with_channels(self, num_channels: usize) -> Self {
        Self {
            num_channels,
            ..self
        }
    }

    /// Returns a copy with a different block size.
    pub fn with_block_size(self, block_size: usize) -> Self {
        Self { block_size, ..self }
    }

    /// Returns a copy with a different sample rate.
    pub fn with_sample_rate(self, sample_rate: f64) -> Self {
        Self {
            sample_rate,
            ..self
        }
    }

    /// Returns a copy bound to a voice context.
    pub fn with_voice_context(self, context: VoiceContext) -> Self {
        Self {
            voice_context: Some(context),
            ..self
        }
    }

    /// True if a voice context is attached and enabled.
    pub fn is_polyphonic(&self) -> bool {
        self.voice_context.is_some_and(|ctx| ctx.enabled)
    }

    /// Number of voices of the attached context, or 1.
    pub fn num_voices(&self) -> usize {
        match self.voice_context {
            Some(ctx) if ctx.enabled => ctx.num_voices,
            _ => 1,
        }
    }

    /// Checks the tuple for values no node can work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate > 0.0 && self.sample_rate.is_finite()) {
            return error::raise(NodeError::new(
                ErrorCode::SampleRateMismatch,
                44100,
                self.sample_rate as i64,
            ));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return error::raise(NodeError::new(
                ErrorCode::IllegalBlockSize,
                MAX_BLOCK_SIZE,
                self.block_size,
            ));
        }
        if self.num_channels == 0 || self.num_channels > MAX_CHANNELS {
            return error::raise(NodeError::new(
                ErrorCode::ChannelMismatch,
                MAX_CHANNELS,
                self.num_channels,
            ));
        }
        Ok(())
    }
}

impl Default for PrepareSpecs {
    fn default() -> Self {
        Self::new(44100.0, 512, 2)
    }
}
