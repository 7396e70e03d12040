//! Non-owning processing views.
//!
//! A processing view borrows the caller's channel buffers for the duration of
//! one call. Two forms exist:
//!
//! - [`ProcessData<'a, N>`]: channel count fixed at compile time. Leaf code
//!   written against it is fully monomorphised.
//! - [`ProcessDataDyn<'a>`]: channel count known at run time, bounded by
//!   [`MAX_CHANNELS`]. This is the shape that crosses the opaque handle.
//!
//! Both implement [`ProcessView`], which is what [`Node::process`] is generic
//! over. Converting the dynamic form to a typed one
//! ([`ProcessDataDyn::to_fixed`]) is the channel-count check at an interface
//! crossing.
//!
//! Neither form allocates.
//!
//! [`Node::process`]: crate::node::Node::process

use arrayvec::ArrayVec;

use super::event::Event;
use super::frame::{FrameProcessor, FrameProcessorDyn};
use crate::poly::VoiceIndex;
use crate::specs::MAX_CHANNELS;

/// Access shared by the typed and dynamic processing views.
pub trait ProcessView {
    /// Number of channels.
    fn num_channels(&self) -> usize;

    /// Number of samples per channel.
    fn num_samples(&self) -> usize;

    /// Voice the call belongs to.
    fn voice(&self) -> VoiceIndex;

    /// Events attached to this block, in timestamp order.
    fn events(&self) -> &[Event];

    /// Read access to one channel.
    fn channel(&self, index: usize) -> &[f32];

    /// Write access to one channel.
    fn channel_mut(&mut self, index: usize) -> &mut [f32];

    /// Iterates all channels mutably.
    fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]>;

    /// Reborrows as a dynamic view.
    fn as_dyn(&mut self) -> ProcessDataDyn<'_>;

    /// Reborrows samples `start..start + len` of every channel. The sub-view
    /// carries no events.
    fn sub_block(&mut self, start: usize, len: usize) -> ProcessDataDyn<'_> {
        self.as_dyn().into_sub_block(start, len)
    }

    /// Runs `f` once per sample with a frame holding one value per channel.
    /// Frame writes land in the channels.
    fn for_each_frame(&mut self, mut f: impl FnMut(&mut [f32])) {
        let mut data = self.as_dyn();
        let mut frames = data.frames();
        while let Some(frame) = frames.next_frame() {
            f(frame);
        }
    }

    /// Zeroes every channel.
    fn clear(&mut self) {
        for channel in self.channels_mut() {
            channel.fill(0.0);
        }
    }
}

/// Processing view with exactly `N` channels.
#[derive(Debug)]
pub struct ProcessData<'a, const N: usize> {
    channels: [&'a mut [f32]; N],
    events: &'a [Event],
    voice: VoiceIndex,
    num_samples: usize,
}

impl<'a, const N: usize> ProcessData<'a, N> {
    /// Wraps `N` equally long channel slices.
    pub fn new(channels: [&'a mut [f32]; N]) -> Self {
        const { assert!(N <= MAX_CHANNELS, "too many channels for a processing view") };

        let num_samples = channels.first().map_or(0, |c| c.len());
        debug_assert!(
            channels.iter().all(|c| c.len() == num_samples),
            "channels must have equal length"
        );
        Self {
            channels,
            events: &[],
            voice: VoiceIndex::NONE,
            num_samples,
        }
    }

    /// Attaches events.
    pub fn with_events(mut self, events: &'a [Event]) -> Self {
        self.events = events;
        self
    }

    /// Tags the view with a voice index.
    pub fn with_voice(mut self, voice: VoiceIndex) -> Self {
        self.voice = voice;
        self
    }

    /// Typed frame cursor over this view.
    pub fn frames(&mut self) -> FrameProcessor<'_, 'a, N> {
        FrameProcessor::new(self)
    }

    /// Reborrows with a shorter lifetime.
    pub fn reborrow(&mut self) -> ProcessData<'_, N> {
        ProcessData {
            channels: self.channels.each_mut().map(|c| &mut **c),
            events: self.events,
            voice: self.voice,
            num_samples: self.num_samples,
        }
    }

    /// All channels as a fixed-size array.
    pub fn channels(&mut self) -> &mut [&'a mut [f32]; N] {
        &mut self.channels
    }
}

impl<const N: usize> ProcessView for ProcessData<'_, N> {
    #[inline]
    fn num_channels(&self) -> usize {
        N
    }

    #[inline]
    fn num_samples(&self) -> usize {
        self.num_samples
    }

    #[inline]
    fn voice(&self) -> VoiceIndex {
        self.voice
    }

    #[inline]
    fn events(&self) -> &[Event] {
        self.events
    }

    #[inline]
    fn channel(&self, index: usize) -> &[f32] {
        &*self.channels[index]
    }

    #[inline]
    fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut *self.channels[index]
    }

    fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.channels.iter_mut().map(|c| &mut **c)
    }

    fn as_dyn(&mut self) -> ProcessDataDyn<'_> {
        ProcessDataDyn {
            channels: self.channels.iter_mut().map(|c| &mut **c).collect(),
            events: self.events,
            voice: self.voice,
            num_samples: self.num_samples,
        }
    }

    fn for_each_frame(&mut self, mut f: impl FnMut(&mut [f32])) {
        let mut frames = self.frames();
        while let Some(frame) = frames.next_frame() {
            f(frame.as_mut_slice());
        }
    }
}

/// Processing view with a run-time channel count.
#[derive(Debug)]
pub struct ProcessDataDyn<'a> {
    channels: ArrayVec<&'a mut [f32], MAX_CHANNELS>,
    events: &'a [Event],
    voice: VoiceIndex,
    num_samples: usize,
}

impl<'a> ProcessDataDyn<'a> {
    /// Wraps up to [`MAX_CHANNELS`] equally long channel slices. Extra
    /// channels are ignored.
    pub fn new(channels: impl IntoIterator<Item = &'a mut [f32]>) -> Self {
        let channels: ArrayVec<_, MAX_CHANNELS> =
            channels.into_iter().take(MAX_CHANNELS).collect();
        let num_samples = channels.first().map_or(0, |c| c.len());
        debug_assert!(
            channels.iter().all(|c| c.len() == num_samples),
            "channels must have equal length"
        );
        Self {
            channels,
            events: &[],
            voice: VoiceIndex::NONE,
            num_samples,
        }
    }

    /// Wraps owned channel vectors, e.g. from a test fixture.
    pub fn from_vecs(channels: &'a mut [Vec<f32>]) -> Self {
        Self::new(channels.iter_mut().map(Vec::as_mut_slice))
    }

    /// Attaches events.
    pub fn with_events(mut self, events: &'a [Event]) -> Self {
        self.events = events;
        self
    }

    /// Tags the view with a voice index.
    pub fn with_voice(mut self, voice: VoiceIndex) -> Self {
        self.voice = voice;
        self
    }

    /// Returns the view with its events stripped.
    pub fn without_events(mut self) -> Self {
        self.events = &[];
        self
    }

    /// Events with the full view lifetime, independent of `&self`.
    pub fn event_slice(&self) -> &'a [Event] {
        self.events
    }

    /// Dynamic frame cursor over this view.
    pub fn frames(&mut self) -> FrameProcessorDyn<'_, 'a> {
        FrameProcessorDyn::new(self)
    }

    /// Narrows the view to samples `start..start + len`, keeping the full
    /// lifetime.
    pub fn into_sub_block(self, start: usize, len: usize) -> ProcessDataDyn<'a> {
        let end = (start + len).min(self.num_samples);
        let start = start.min(end);
        ProcessDataDyn {
            channels: self
                .channels
                .into_iter()
                .map(|c| &mut c[start..end])
                .collect(),
            events: &[],
            voice: self.voice,
            num_samples: end - start,
        }
    }

    /// Reborrows channels `start..start + len`. Events and voice carry over.
    pub fn channel_range(&mut self, start: usize, len: usize) -> ProcessDataDyn<'_> {
        let end = (start + len).min(self.channels.len());
        let start = start.min(end);
        ProcessDataDyn {
            channels: self.channels[start..end]
                .iter_mut()
                .map(|c| &mut **c)
                .collect(),
            events: self.events,
            voice: self.voice,
            num_samples: self.num_samples,
        }
    }

    /// Reborrows as a typed view of exactly `N` channels.
    ///
    /// The caller guarantees the count; `prepare` is where that guarantee is
    /// established. A mismatch is caught in debug builds.
    pub fn to_fixed<const N: usize>(&mut self) -> ProcessData<'_, N> {
        debug_assert_eq!(
            self.channels.len(),
            N,
            "channel count of dynamic view does not match typed view"
        );
        self.first_channels::<N>()
    }

    /// Reborrows the first `N` channels as a typed view. The view must hold
    /// at least `N` channels.
    pub fn first_channels<const N: usize>(&mut self) -> ProcessData<'_, N> {
        const { assert!(N <= MAX_CHANNELS, "too many channels for a processing view") };
        debug_assert!(
            self.channels.len() >= N,
            "view has {} channels, {} requested",
            self.channels.len(),
            N
        );

        let num_samples = self.num_samples;
        let mut iter = self.channels.iter_mut();
        ProcessData {
            channels: core::array::from_fn(|_| iter.next().map(|c| &mut **c).unwrap_or_default()),
            events: self.events,
            voice: self.voice,
            num_samples,
        }
    }
}

impl ProcessView for ProcessDataDyn<'_> {
    #[inline]
    fn num_channels(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    fn num_samples(&self) -> usize {
        self.num_samples
    }

    #[inline]
    fn voice(&self) -> VoiceIndex {
        self.voice
    }

    #[inline]
    fn events(&self) -> &[Event] {
        self.events
    }

    #[inline]
    fn channel(&self, index: usize) -> &[f32] {
        &*self.channels[index]
    }

    #[inline]
    fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut *self.channels[index]
    }

    fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.channels.iter_mut().map(|c| &mut **c)
    }

    fn as_dyn(&mut self) -> ProcessDataDyn<'_> {
        ProcessDataDyn {
            channels: self.channels.iter_mut().map(|c| &mut **c).collect(),
            events: self.events,
            voice: self.voice,
            num_samples: self.num_samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_view_reports_shape() {
        let mut l = [1.0_f32; 8];
        let mut r = [2.0_f32; 8];
        let events = [Event::note_on(60, 100).at(3)];
        let data = ProcessData::new([&mut l[..], &mut r[..]])
            .with_events(&events)
            .with_voice(VoiceIndex::new(1));

        assert_eq!(data.num_channels(), 2);
        assert_eq!(data.num_samples(), 8);
        assert_eq!(data.events().len(), 1);
        assert_eq!(data.voice(), VoiceIndex::new(1));
        assert_eq!(data.channel(1)[0], 2.0);
    }

    #[test]
    fn dyn_view_round_trips_through_fixed() {
        let mut channels = vec![vec![0.0_f32; 4]; 2];
        let mut data = ProcessDataDyn::from_vecs(&mut channels);
        {
            let mut fixed = data.to_fixed::<2>();
            fixed.channel_mut(0)[1] = 5.0;
            fixed.channel_mut(1)[2] = 7.0;
        }
        assert_eq!(data.channel(0), &[0.0, 5.0, 0.0, 0.0]);
        assert_eq!(data.channel(1), &[0.0, 0.0, 7.0, 0.0]);
    }

    #[test]
    fn sub_block_narrows_samples_and_drops_events() {
        let mut channels = vec![(0..8).map(|i| i as f32).collect::<Vec<_>>()];
        let events = [Event::note_on(60, 100)];
        let mut data = ProcessDataDyn::from_vecs(&mut channels).with_events(&events);

        let mut sub = data.sub_block(2, 3);
        assert_eq!(sub.num_samples(), 3);
        assert!(sub.events().is_empty());
        assert_eq!(sub.channel(0), &[2.0, 3.0, 4.0]);
        sub.clear();
        drop(sub);

        assert_eq!(data.channel(0), &[0.0, 1.0, 0.0, 0.0, 0.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn sub_block_clamps_to_view() {
        let mut channels = vec![vec![0.0_f32; 4]];
        let mut data = ProcessDataDyn::from_vecs(&mut channels);
        assert_eq!(data.sub_block(3, 10).num_samples(), 1);
        assert_eq!(data.sub_block(9, 2).num_samples(), 0);
    }

    #[test]
    fn channel_range_selects_contiguous_channels() {
        let mut channels = vec![vec![0.0_f32; 2], vec![1.0; 2], vec![2.0; 2], vec![3.0; 2]];
        let mut data = ProcessDataDyn::from_vecs(&mut channels);

        let mut middle = data.channel_range(1, 2);
        assert_eq!(middle.num_channels(), 2);
        assert_eq!(middle.channel(0)[0], 1.0);
        for c in middle.channels_mut() {
            c.fill(9.0);
        }
        drop(middle);
        assert_eq!(data.channel(0), &[0.0, 0.0]);
        assert_eq!(data.channel(2), &[9.0, 9.0]);
        assert_eq!(data.channel(3), &[3.0, 3.0]);
    }

    #[test]
    fn for_each_frame_writes_back() {
        let mut l = [1.0_f32, 2.0, 3.0];
        let mut r = [10.0_f32, 20.0, 30.0];
        let mut data = ProcessData::new([&mut l[..], &mut r[..]]);
        data.for_each_frame(|frame| {
            let sum = frame[0] + frame[1];
            frame[0] = sum;
            frame[1] = -sum;
        });
        assert_eq!(l, [11.0, 22.0, 33.0]);
        assert_eq!(r, [-11.0, -22.0, -33.0]);
    }

    #[test]
    fn dyn_for_each_frame_matches_typed() {
        let mut channels = vec![vec![1.0_f32, 2.0], vec![3.0, 4.0]];
        let mut data = ProcessDataDyn::from_vecs(&mut channels);
        data.for_each_frame(|frame| frame.swap(0, 1));
        drop(data);
        assert_eq!(channels, vec![vec![3.0, 4.0], vec![1.0, 2.0]]);
    }
}
