//! Voice context and per-voice storage.
//!
//! The active voice is passed explicitly with every render call as a
//! [`VoiceIndex`]. There is no thread-local or global "current voice": a
//! node learns which voice it is rendering from the call itself, and
//! [`PolyData`] uses that index to pick the slot to touch.
//!
//! ```rust
//! use tessel_core::poly::{PolyData, PolyHandler, VoiceIndex};
//!
//! let mut levels = PolyData::<f32, 4>::new(0.0);
//!
//! // Outside a render pass every slot is visited.
//! for level in levels.iter_active_mut(VoiceIndex::NONE) {
//!     *level = 1.0;
//! }
//!
//! // Inside one, only the bracketed voice's slot is.
//! let handler = PolyHandler::new(4);
//! handler.render_voice(2, |voice| {
//!     for level in levels.iter_active_mut(voice) {
//!         *level = 0.5;
//!     }
//! });
//! assert_eq!(levels.as_slice(), &[1.0, 1.0, 0.5, 1.0]);
//! ```

use crate::error::{self, ErrorCode, NodeError, Result};
use crate::specs::PrepareSpecs;

/// Index of the voice a render call belongs to, or [`VoiceIndex::NONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VoiceIndex(Option<u16>);

impl VoiceIndex {
    /// No voice is being rendered: monophonic calls, initialisation, bulk
    /// updates from a control thread.
    pub const NONE: VoiceIndex = VoiceIndex(None);

    /// Index of voice `index`.
    pub const fn new(index: u16) -> Self {
        Self(Some(index))
    }

    /// The bracketed voice, if any.
    #[inline]
    pub fn get(self) -> Option<usize> {
        self.0.map(usize::from)
    }

    /// True inside a voice render pass.
    #[inline]
    pub fn is_active(self) -> bool {
        self.0.is_some()
    }
}

/// Voice configuration of a graph instance, carried by [`PrepareSpecs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoiceContext {
    /// Number of voices the graph renders.
    pub num_voices: usize,
    /// Whether voice rendering is switched on.
    pub enabled: bool,
}

impl VoiceContext {
    /// An enabled context with `num_voices` voices.
    pub const fn new(num_voices: usize) -> Self {
        Self {
            num_voices,
            enabled: true,
        }
    }

    /// A context that exists but is switched off.
    pub const fn disabled(num_voices: usize) -> Self {
        Self {
            num_voices,
            enabled: false,
        }
    }
}

/// Hands out voice indices for one graph instance.
///
/// A render pass for voice `v` is bracketed by [`render_voice`](Self::render_voice),
/// which passes the matching [`VoiceIndex`] into the closure. Everything the
/// closure calls receives that index explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolyHandler {
    context: VoiceContext,
}

impl PolyHandler {
    /// Creates an enabled handler for `num_voices` voices.
    pub fn new(num_voices: usize) -> Self {
        Self {
            context: VoiceContext::new(num_voices),
        }
    }

    /// Switches voice rendering on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.context.enabled = enabled;
    }

    /// True when voice rendering is on.
    pub fn is_enabled(&self) -> bool {
        self.context.enabled
    }

    /// Number of voices.
    pub fn num_voices(&self) -> usize {
        self.context.num_voices
    }

    /// The context to put into [`PrepareSpecs`].
    pub fn context(&self) -> VoiceContext {
        self.context
    }

    /// Index for `voice`, or [`VoiceIndex::NONE`] when disabled or out of
    /// range.
    pub fn voice_index(&self, voice: usize) -> VoiceIndex {
        if !self.context.enabled || voice >= self.context.num_voices {
            return VoiceIndex::NONE;
        }
        u16::try_from(voice).map_or(VoiceIndex::NONE, VoiceIndex::new)
    }

    /// Runs one voice's render pass.
    pub fn render_voice<R>(&self, voice: usize, render: impl FnOnce(VoiceIndex) -> R) -> R {
        render(self.voice_index(voice))
    }
}

/// `N` instances of `T`, one per voice.
///
/// Accessors taking a [`VoiceIndex`] touch exactly the bracketed slot when a
/// voice is active and every slot otherwise.
#[derive(Debug, Clone)]
pub struct PolyData<T, const N: usize> {
    slots: [T; N],
}

impl<T: Clone, const N: usize> PolyData<T, N> {
    /// Fills every slot with a clone of `value`.
    pub fn new(value: T) -> Self {
        Self {
            slots: core::array::from_fn(|_| value.clone()),
        }
    }
}

impl<T: Default, const N: usize> Default for PolyData<T, N> {
    fn default() -> Self {
        Self {
            slots: core::array::from_fn(|_| T::default()),
        }
    }
}

impl<T, const N: usize> PolyData<T, N> {
    /// Builds each slot from its voice index.
    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Self {
            slots: core::array::from_fn(f),
        }
    }

    /// Checks the voice context against the slot count.
    ///
    /// Fails with [`ErrorCode::IllegalPolyphony`] if the graph renders more
    /// voices than there are slots.
    pub fn prepare(&self, specs: &PrepareSpecs) -> Result<()> {
        if specs.is_polyphonic() && specs.num_voices() > N {
            return error::raise(NodeError::new(
                ErrorCode::IllegalPolyphony,
                N,
                specs.num_voices(),
            ));
        }
        Ok(())
    }

    /// Number of slots.
    pub const fn len(&self) -> usize {
        N
    }

    /// True if `N == 0`.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    fn active_range(voice: VoiceIndex) -> core::ops::Range<usize> {
        match voice.get() {
            Some(index) if index < N => index..index + 1,
            Some(_) => 0..0,
            None => 0..N,
        }
    }

    /// Slots touched by a call for `voice`.
    pub fn iter_active(&self, voice: VoiceIndex) -> core::slice::Iter<'_, T> {
        self.slots[Self::active_range(voice)].iter()
    }

    /// Mutable slots touched by a call for `voice`.
    pub fn iter_active_mut(&mut self, voice: VoiceIndex) -> core::slice::IterMut<'_, T> {
        self.slots[Self::active_range(voice)].iter_mut()
    }

    /// The slot a render call for `voice` reads: the voice's own slot, or the
    /// first slot outside a render pass.
    pub fn get(&self, voice: VoiceIndex) -> &T {
        &self.slots[voice.get().filter(|&i| i < N).unwrap_or(0)]
    }

    /// Mutable counterpart of [`get`](Self::get).
    pub fn get_mut(&mut self, voice: VoiceIndex) -> &mut T {
        &mut self.slots[voice.get().filter(|&i| i < N).unwrap_or(0)]
    }

    /// All slots, regardless of voice.
    pub fn as_slice(&self) -> &[T] {
        &self.slots
    }

    /// All slots, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outside_a_voice_every_slot_is_visited() {
        let mut data = PolyData::<u32, 8>::new(0);
        for slot in data.iter_active_mut(VoiceIndex::NONE) {
            *slot += 1;
        }
        assert!(data.as_slice().iter().all(|&v| v == 1));
        assert_eq!(data.iter_active(VoiceIndex::NONE).count(), 8);
    }

    #[test]
    fn inside_a_voice_only_its_slot_is_visited() {
        let mut data = PolyData::<u32, 8>::new(0);
        let voice = VoiceIndex::new(5);
        for slot in data.iter_active_mut(voice) {
            *slot += 1;
        }
        assert_eq!(data.as_slice(), &[0, 0, 0, 0, 0, 1, 0, 0]);
        assert_eq!(*data.get(voice), 1);
    }

    #[test]
    fn out_of_range_voice_touches_nothing() {
        let mut data = PolyData::<u32, 2>::new(0);
        assert_eq!(data.iter_active_mut(VoiceIndex::new(7)).count(), 0);
    }

    #[test]
    fn handler_brackets_voice_index() {
        let mut handler = PolyHandler::new(4);
        assert_eq!(handler.render_voice(3, |v| v), VoiceIndex::new(3));
        assert_eq!(handler.voice_index(4), VoiceIndex::NONE);

        handler.set_enabled(false);
        assert_eq!(handler.render_voice(1, |v| v), VoiceIndex::NONE);
    }

    #[test]
    fn prepare_rejects_too_many_voices() {
        let data = PolyData::<f32, 4>::new(0.0);
        let specs = PrepareSpecs::default().with_voice_context(VoiceContext::new(8));
        let err = error::poll(data.prepare(&specs)).unwrap_err();
        assert_eq!(err.code, ErrorCode::IllegalPolyphony);
        assert_eq!((err.expected, err.actual), (4, 8));

        let specs = PrepareSpecs::default().with_voice_context(VoiceContext::new(4));
        assert!(error::poll(data.prepare(&specs)).is_ok());
    }
}
