//! Timestamped control events delivered alongside audio blocks.

use crate::math;

/// What an [`Event`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A key was pressed.
    NoteOn,
    /// A key was released.
    NoteOff,
    /// A continuous controller moved.
    Controller,
    /// Pitch wheel moved. `value` holds the 14-bit position.
    PitchBend,
    /// Every sounding note should stop.
    AllNotesOff,
}

/// A control event, timestamped relative to the start of the block it is
/// attached to.
///
/// Nodes receive events by `&mut` and may rewrite them (transpose, remap a
/// controller); the rewritten event is what later nodes in a chain see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Kind of event.
    pub kind: EventKind,
    /// Sample offset within the current block.
    pub timestamp: usize,
    /// MIDI channel, 1-based.
    pub channel: u8,
    /// Note or controller number.
    pub number: u8,
    /// Velocity, controller value, or pitch-bend position.
    pub value: u16,
}

impl Event {
    /// A note-on with `velocity` (0..=127).
    pub fn note_on(note: u8, velocity: u8) -> Self {
        Self::new(EventKind::NoteOn, note, u16::from(velocity))
    }

    /// A note-off.
    pub fn note_off(note: u8) -> Self {
        Self::new(EventKind::NoteOff, note, 0)
    }

    /// A controller change.
    pub fn controller(number: u8, value: u8) -> Self {
        Self::new(EventKind::Controller, number, u16::from(value))
    }

    /// A pitch-bend with a 14-bit position (8192 = centre).
    pub fn pitch_bend(position: u16) -> Self {
        Self::new(EventKind::PitchBend, 0, position.min(16383))
    }

    /// An all-notes-off message.
    pub fn all_notes_off() -> Self {
        Self::new(EventKind::AllNotesOff, 0, 0)
    }

    fn new(kind: EventKind, number: u8, value: u16) -> Self {
        Self {
            kind,
            timestamp: 0,
            channel: 1,
            number,
            value,
        }
    }

    /// Returns a copy at sample offset `timestamp`.
    pub fn at(self, timestamp: usize) -> Self {
        Self { timestamp, ..self }
    }

    /// Returns a copy on MIDI channel `channel`.
    pub fn on_channel(self, channel: u8) -> Self {
        Self { channel, ..self }
    }

    /// True for a note-on with non-zero velocity.
    pub fn is_note_on(&self) -> bool {
        self.kind == EventKind::NoteOn && self.value > 0
    }

    /// True for a note-off, or a note-on with zero velocity.
    pub fn is_note_off(&self) -> bool {
        self.kind == EventKind::NoteOff || (self.kind == EventKind::NoteOn && self.value == 0)
    }

    /// Value scaled to `0.0..=1.0` (pitch-bend to `-1.0..=1.0`).
    pub fn normalized_value(&self) -> f64 {
        match self.kind {
            EventKind::PitchBend => (f64::from(self.value) - 8192.0) / 8192.0,
            _ => f64::from(self.value.min(127)) / 127.0,
        }
    }

    /// Frequency of the note number in Hz.
    pub fn frequency(&self) -> f64 {
        math::note_to_freq(self.number)
    }

    /// Shifts the note number by `semitones`, saturating at the MIDI range.
    pub fn transpose(&mut self, semitones: i8) {
        self.number = (i16::from(self.number) + i16::from(semitones)).clamp(0, 127) as u8;
    }
}
