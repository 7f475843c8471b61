// Sequencer module
// Grid data model, key signature, transport tracking and the
// step-timing engine

pub mod core;
pub mod engine;
pub mod grid;
pub mod key_signature;
pub mod state;
pub mod timeline;
pub mod transport;

pub use self::core::StepSequencer;
pub use engine::{DEFAULT_CHANNEL, DEFAULT_VELOCITY, LastNoteInfo, StepTimer};
pub use grid::StepGrid;
pub use key_signature::{FilterMode, KeySignature, ScaleType};
pub use state::{SequencerState, StateError, StepState, from_json, to_json};
pub use timeline::{Resolution, TimeSignature, ppq_per_step, samples_per_step};
pub use transport::{PlayState, TransportSnapshot};
