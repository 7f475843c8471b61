// MIDI event types emitted by the sequencer

/// A MIDI channel-voice event
///
/// `channel` carries the zero-based wire value (0 = channel 1 in the UI).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { note: u8, velocity: u8, channel: u8 },
    NoteOff { note: u8, channel: u8 },
}

impl MidiEvent {
    /// Note number carried by this event
    pub fn note(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { note, .. } => note,
            MidiEvent::NoteOff { note, .. } => note,
        }
    }

    /// Check if this is a note-on event
    pub fn is_note_on(&self) -> bool {
        matches!(self, MidiEvent::NoteOn { .. })
    }
}

/// MIDI event with sample-accurate timing
/// `samples_from_now` represents when this event should be processed
/// relative to the current audio block's first sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEventTimed {
    pub event: MidiEvent,
    pub samples_from_now: u32,
}
