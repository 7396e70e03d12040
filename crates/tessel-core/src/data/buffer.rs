//! Owned multichannel scratch storage.
//!
//! Containers and wrappers that need a copy of their input (split, smoothed
//! bypass, oversampling, parallel duplicates) size an [`AudioBuffer`] in
//! `prepare` and only ever copy into it on the render path.

use super::event::Event;
use super::process_data::{ProcessDataDyn, ProcessView};
use crate::poly::VoiceIndex;

/// Planar multichannel sample storage.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    capacity: usize,
}

impl AudioBuffer {
    /// Creates a zeroed buffer of `num_channels` x `capacity` samples.
    pub fn new(num_channels: usize, capacity: usize) -> Self {
        Self {
            channels: vec![vec![0.0; capacity]; num_channels],
            capacity,
        }
    }

    /// Reshapes the buffer, zeroing everything. Allocates; call from
    /// `prepare` only.
    pub fn resize(&mut self, num_channels: usize, capacity: usize) {
        self.channels.resize_with(num_channels, Vec::new);
        for channel in &mut self.channels {
            channel.clear();
            channel.resize(capacity, 0.0);
        }
        self.capacity = capacity;
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() || self.capacity == 0
    }

    /// Zeroes every channel.
    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
    }

    /// One channel.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// One channel, mutably.
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    /// Copies the view's samples into the front of this buffer.
    pub fn copy_from<P: ProcessView + ?Sized>(&mut self, data: &P) {
        let len = data.num_samples().min(self.capacity);
        for (c, channel) in self.channels.iter_mut().enumerate().take(data.num_channels()) {
            channel[..len].copy_from_slice(&data.channel(c)[..len]);
        }
    }

    /// Copies another buffer's samples into this one.
    pub fn copy_from_buffer(&mut self, other: &AudioBuffer, num_samples: usize) {
        let len = num_samples.min(self.capacity).min(other.capacity);
        for (dst, src) in self.channels.iter_mut().zip(&other.channels) {
            dst[..len].copy_from_slice(&src[..len]);
        }
    }

    /// Adds `self - reference` onto the view, sample by sample.
    ///
    /// This accumulates the change a node made to a copy of its input.
    pub fn add_delta_into<P: ProcessView + ?Sized>(&self, reference: &AudioBuffer, data: &mut P) {
        let len = data.num_samples().min(self.capacity);
        for c in 0..data.num_channels().min(self.channels.len()) {
            let out = &mut data.channel_mut(c)[..len];
            for ((o, w), r) in out.iter_mut().zip(&self.channels[c]).zip(&reference.channels[c]) {
                *o += *w - *r;
            }
        }
    }

    /// Adds the buffer's samples onto the view.
    pub fn add_into<P: ProcessView + ?Sized>(&self, data: &mut P) {
        let len = data.num_samples().min(self.capacity);
        for c in 0..data.num_channels().min(self.channels.len()) {
            for (o, w) in data.channel_mut(c)[..len].iter_mut().zip(&self.channels[c]) {
                *o += *w;
            }
        }
    }

    /// Writes the buffer's samples into the view.
    pub fn copy_into<P: ProcessView + ?Sized>(&self, data: &mut P) {
        let len = data.num_samples().min(self.capacity);
        for c in 0..data.num_channels().min(self.channels.len()) {
            data.channel_mut(c)[..len].copy_from_slice(&self.channels[c][..len]);
        }
    }

    /// A processing view over the first `num_channels` x `num_samples` of
    /// this buffer.
    pub fn view<'a>(
        &'a mut self,
        num_channels: usize,
        num_samples: usize,
        events: &'a [Event],
        voice: VoiceIndex,
    ) -> ProcessDataDyn<'a> {
        let len = num_samples.min(self.capacity);
        ProcessDataDyn::new(
            self.channels
                .iter_mut()
                .take(num_channels)
                .map(move |c| &mut c[..len]),
        )
        .with_events(events)
        .with_voice(voice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_and_view_round_trip() {
        let mut source = vec![vec![1.0_f32, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let data = ProcessDataDyn::from_vecs(&mut source);

        let mut buffer = AudioBuffer::new(2, 8);
        buffer.copy_from(&data);

        let view = buffer.view(2, 3, &[], VoiceIndex::NONE);
        assert_eq!(view.num_samples(), 3);
        assert_eq!(view.channel(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn delta_accumulates_change_only() {
        let mut out = vec![vec![1.0_f32, 1.0]];
        let mut data = ProcessDataDyn::from_vecs(&mut out);

        let mut reference = AudioBuffer::new(1, 2);
        reference.copy_from(&data);
        let mut work = reference.clone();
        work.channel_mut(0)[0] = 3.0;

        work.add_delta_into(&reference, &mut data);
        assert_eq!(data.channel(0), &[3.0, 1.0]);
    }

    #[test]
    fn resize_reshapes_and_zeroes() {
        let mut buffer = AudioBuffer::new(1, 4);
        buffer.channel_mut(0).fill(1.0);
        buffer.resize(3, 2);
        assert_eq!(buffer.num_channels(), 3);
        assert_eq!(buffer.capacity(), 2);
        assert_eq!(buffer.channel(0), &[0.0, 0.0]);
    }
}
