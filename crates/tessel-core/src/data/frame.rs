//! Per-sample cursors over processing views.
//!
//! A cursor loads one frame (one value per channel) at a time into a local
//! array. Writes to the frame are deferred and flushed back into the view
//! when the cursor advances, when it is restarted, and when it is dropped.

use super::process_data::{ProcessData, ProcessDataDyn, ProcessView};
use crate::specs::MAX_CHANNELS;

/// Frame cursor over a [`ProcessData<N>`].
///
/// ```rust
/// use tessel_core::data::ProcessData;
///
/// let mut l = [1.0_f32, 2.0];
/// let mut r = [3.0_f32, 4.0];
/// let mut data = ProcessData::new([&mut l[..], &mut r[..]]);
/// let mut frames = data.frames();
/// while let Some(frame) = frames.next_frame() {
///     frame.swap(0, 1);
/// }
/// drop(frames);
/// assert_eq!(l, [3.0, 4.0]);
/// ```
pub struct FrameProcessor<'d, 'a, const N: usize> {
    data: &'d mut ProcessData<'a, N>,
    frame: [f32; N],
    position: usize,
    pending: bool,
}

impl<'d, 'a, const N: usize> FrameProcessor<'d, 'a, N> {
    pub(crate) fn new(data: &'d mut ProcessData<'a, N>) -> Self {
        Self {
            data,
            frame: [0.0; N],
            position: 0,
            pending: false,
        }
    }

    /// Flushes the current frame and loads the next one.
    pub fn next_frame(&mut self) -> Option<&mut [f32; N]> {
        self.flush();
        if self.position >= self.data.num_samples() {
            return None;
        }
        let index = self.position;
        for (value, channel) in self.frame.iter_mut().zip(self.data.channels().iter()) {
            *value = channel[index];
        }
        self.position += 1;
        self.pending = true;
        Some(&mut self.frame)
    }

    /// Index of the next frame to be loaded.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Flushes and rewinds to the first sample.
    pub fn restart(&mut self) {
        self.flush();
        self.position = 0;
    }

    fn flush(&mut self) {
        if self.pending {
            let index = self.position - 1;
            for (value, channel) in self.frame.iter().zip(self.data.channels().iter_mut()) {
                channel[index] = *value;
            }
            self.pending = false;
        }
    }
}

impl<const N: usize> Drop for FrameProcessor<'_, '_, N> {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Frame cursor over a [`ProcessDataDyn`].
pub struct FrameProcessorDyn<'d, 'a> {
    data: &'d mut ProcessDataDyn<'a>,
    frame: [f32; MAX_CHANNELS],
    num_channels: usize,
    position: usize,
    pending: bool,
}

impl<'d, 'a> FrameProcessorDyn<'d, 'a> {
    pub(crate) fn new(data: &'d mut ProcessDataDyn<'a>) -> Self {
        let num_channels = data.num_channels();
        Self {
            data,
            frame: [0.0; MAX_CHANNELS],
            num_channels,
            position: 0,
            pending: false,
        }
    }

    /// Flushes the current frame and loads the next one.
    pub fn next_frame(&mut self) -> Option<&mut [f32]> {
        self.flush();
        if self.position >= self.data.num_samples() {
            return None;
        }
        let index = self.position;
        for c in 0..self.num_channels {
            self.frame[c] = self.data.channel(c)[index];
        }
        self.position += 1;
        self.pending = true;
        Some(&mut self.frame[..self.num_channels])
    }

    /// Index of the next frame to be loaded.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Flushes and rewinds to the first sample.
    pub fn restart(&mut self) {
        self.flush();
        self.position = 0;
    }

    fn flush(&mut self) {
        if self.pending {
            let index = self.position - 1;
            for c in 0..self.num_channels {
                self.data.channel_mut(c)[index] = self.frame[c];
            }
            self.pending = false;
        }
    }
}

impl Drop for FrameProcessorDyn<'_, '_> {
    fn drop(&mut self) {
        self.flush();
    }
}
