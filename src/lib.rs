// Gridseq - host-synchronized MIDI step sequencer core

pub mod messaging;
pub mod midi;
pub mod sequencer;

// Re-export commonly used types for convenience
pub use messaging::channels::{CommandConsumer, CommandProducer, create_command_channel};
pub use messaging::command::{Command, ConfigChange};
pub use midi::event::{MidiEvent, MidiEventTimed};
pub use midi::note::note_name;
pub use sequencer::{
    FilterMode, KeySignature, LastNoteInfo, PlayState, Resolution, ScaleType, SequencerState,
    StateError, StepGrid, StepSequencer, StepState, StepTimer, TimeSignature, TransportSnapshot,
};
