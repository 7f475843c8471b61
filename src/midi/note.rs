// Note name helpers
// Converts MIDI note numbers to display names like "C4" or "F#3"

/// Chromatic note names, sharp spelling
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Get the display name of a MIDI note number (C4 = 60)
pub fn note_name(note: u8) -> String {
    let octave = (note / 12) as i32 - 1;
    let index = (note % 12) as usize;

    format!("{}{}", NOTE_NAMES[index], octave)
}
