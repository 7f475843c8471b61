// Step timer - the transport-synchronized timing state machine
// Tracks tempo, time signature and step phase; walks each audio block
// emitting note-off/note-on pairs at exact sample offsets

use crate::midi::event::{MidiEvent, MidiEventTimed};
use crate::midi::note::note_name;
use crate::sequencer::grid::StepGrid;
use crate::sequencer::timeline::{Resolution, TimeSignature, ppq_per_step, samples_per_step};
use crate::sequencer::transport::{PlayState, TransportSnapshot};

/// Velocity of every emitted note-on; not per-cell configurable
pub const DEFAULT_VELOCITY: u8 = 100;

/// Zero-based wire channel of every emitted event (channel 1 in the UI)
pub const DEFAULT_CHANNEL: u8 = 0;

/// Last-triggered-note snapshot for display
///
/// Written on every note-on, polled by UI collaborators. Pure
/// projection; playback never reads it. `channel` is the 1-based value
/// shown to the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastNoteInfo {
    pub step_position: usize,
    pub note_number: u8,
    pub velocity: u8,
    pub channel: u8,
    pub gate_length: f64,
}

impl LastNoteInfo {
    /// Display name of the last note, formatted on demand
    pub fn note_name(&self) -> String {
        note_name(self.note_number)
    }
}

impl Default for LastNoteInfo {
    fn default() -> Self {
        Self {
            step_position: 0,
            note_number: 60,
            velocity: DEFAULT_VELOCITY,
            channel: DEFAULT_CHANNEL + 1,
            gate_length: 0.5,
        }
    }
}

/// The step-timing state machine
///
/// Converts the host's continuously-updating, possibly-discontinuous
/// position into a discrete step index plus intra-block sample offsets
/// for emitted events. Driven strictly from the audio callback:
/// `update_transport` once per block, then `process_block`.
#[derive(Debug, Clone)]
pub struct StepTimer {
    sample_rate: f64,
    bpm: f64,
    time_signature: TimeSignature,
    resolution: Resolution,
    num_steps: usize,

    samples_per_step: f64,
    sample_counter: f64,
    current_step: usize,
    last_ppq: f64,
    state: PlayState,
    just_started: bool,

    // Pitches with a pending note-off; drained at the next step
    // boundary, or at offset 0 after a stop
    sounding: Vec<u8>,

    last_note: LastNoteInfo,
}

impl StepTimer {
    pub fn new() -> Self {
        let mut timer = Self {
            sample_rate: 44100.0,
            bpm: 120.0,
            time_signature: TimeSignature::four_four(),
            resolution: Resolution::NormalTime,
            num_steps: 16,
            samples_per_step: 0.0,
            sample_counter: 0.0,
            current_step: 0,
            last_ppq: 0.0,
            state: PlayState::Stopped,
            just_started: false,
            sounding: Vec::with_capacity(16),
            last_note: LastNoteInfo::default(),
        };
        timer.update_step_length();
        timer
    }

    /// Adopt the session sample rate
    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.update_step_length();
    }

    /// Set the pattern dimensions
    ///
    /// The row count sizes the sounding-note list so the block path
    /// never allocates.
    pub fn set_pattern_size(&mut self, num_steps: usize, num_rows: usize) {
        self.num_steps = num_steps;
        if self.current_step >= num_steps {
            self.current_step = 0;
        }
        if self.sounding.capacity() < num_rows {
            self.sounding.reserve(num_rows.saturating_sub(self.sounding.len()));
        }
        self.update_step_length();
    }

    /// Adopt a tempo; non-positive values are ignored
    pub fn set_bpm(&mut self, bpm: f64) {
        if bpm > 0.0 && bpm != self.bpm {
            self.bpm = bpm;
            self.update_step_length();
        }
    }

    /// Adopt a time signature; degenerate values are ignored
    pub fn set_time_signature(&mut self, time_signature: TimeSignature) {
        if time_signature.is_valid() && time_signature != self.time_signature {
            self.time_signature = time_signature;
            self.update_step_length();
        }
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        if resolution != self.resolution {
            self.resolution = resolution;
            self.update_step_length();
        }
    }

    /// Enter the playing state; phase is NOT reset, the next transport
    /// update realigns it
    pub fn start(&mut self) {
        self.state = PlayState::Playing;
        self.just_started = true;
    }

    /// Stop and reset all phase state
    ///
    /// Sounding notes keep their pending note-offs: the next
    /// `process_block` flushes them at offset 0 rather than relying on
    /// the host's all-notes-off handling.
    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
        self.reset();
    }

    /// Rewind to step 0 with zero phase
    pub fn reset(&mut self) {
        self.current_step = 0;
        self.sample_counter = 0.0;
        self.last_ppq = 0.0;
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn samples_per_step(&self) -> f64 {
        self.samples_per_step
    }

    pub fn last_note(&self) -> &LastNoteInfo {
        &self.last_note
    }

    fn update_step_length(&mut self) {
        self.samples_per_step = samples_per_step(
            self.bpm,
            self.time_signature,
            self.num_steps,
            self.resolution,
            self.sample_rate,
        );
    }

    /// Track the host position, called once per block before
    /// `process_block`
    ///
    /// Adopts tempo and time-signature changes, then derives the step
    /// index from the PPQ position. A position that moved by more than
    /// one step since the last block (seek, loop, fresh start) is a
    /// transport jump: the intra-step phase is recomputed so playback
    /// resumes mid-step instead of retriggering from zero. A normal
    /// single-step advance just clears the phase.
    pub fn update_transport(&mut self, position: &TransportSnapshot) {
        self.set_bpm(position.bpm);
        self.set_time_signature(TimeSignature::new(
            position.time_sig_numerator,
            position.time_sig_denominator,
        ));

        if !position.is_playing {
            return;
        }

        let ppq_step = ppq_per_step(self.time_signature, self.num_steps, self.resolution);
        if ppq_step <= 0.0 {
            return;
        }

        let step_position = position.ppq_position / ppq_step;
        let new_step =
            (step_position.floor() as i64).rem_euclid(self.num_steps as i64) as usize;

        if new_step != self.current_step {
            let jumped = self.just_started
                || (position.ppq_position - self.last_ppq).abs() > ppq_step;

            self.current_step = new_step;
            if jumped {
                let phase = step_position - step_position.floor();
                self.sample_counter = phase * self.samples_per_step;
            } else {
                self.sample_counter = 0.0;
            }
        }

        self.just_started = false;
        self.last_ppq = position.ppq_position;
    }

    /// Walk one audio block, emitting events at exact sample offsets
    ///
    /// A step boundary triggers at the first sample index at or after
    /// its exact time; the counter keeps the fractional remainder, so
    /// boundary spacing never drifts at fractional step lengths. A
    /// counter already at the boundary (residue of a phase correction)
    /// triggers at offset 0. While stopped, only pending note-offs are
    /// flushed.
    ///
    /// Every emitted offset lies in `[0, num_samples)`.
    pub fn process_block(
        &mut self,
        grid: &StepGrid,
        lowest_note: u8,
        num_samples: usize,
        events: &mut Vec<MidiEventTimed>,
    ) {
        if !self.state.is_playing() {
            self.flush_sounding(0, events);
            return;
        }
        if self.samples_per_step <= 0.0 || self.num_steps == 0 || num_samples == 0 {
            return;
        }

        let mut position = 0usize;
        while position < num_samples {
            if self.sample_counter >= self.samples_per_step {
                self.trigger_step(grid, lowest_note, position as u32, events);
                self.sample_counter -= self.samples_per_step;
                continue;
            }

            let to_boundary = (self.samples_per_step - self.sample_counter).ceil() as usize;
            let run = to_boundary.min(num_samples - position);
            self.sample_counter += run as f64;
            position += run;
        }
    }

    /// Emit note-offs for whatever is sounding, advance the step, emit
    /// note-ons for the new step, all at the same offset
    fn trigger_step(
        &mut self,
        grid: &StepGrid,
        lowest_note: u8,
        offset: u32,
        events: &mut Vec<MidiEventTimed>,
    ) {
        self.flush_sounding(offset, events);

        self.current_step = (self.current_step + 1) % self.num_steps;

        let num_rows = grid.num_rows();
        for row in 0..num_rows {
            if !grid.cell(self.current_step, row) {
                continue;
            }
            let note = row_note(lowest_note, num_rows, row);
            events.push(MidiEventTimed {
                event: MidiEvent::NoteOn {
                    note,
                    velocity: DEFAULT_VELOCITY,
                    channel: DEFAULT_CHANNEL,
                },
                samples_from_now: offset,
            });
            self.sounding.push(note);

            self.last_note = LastNoteInfo {
                step_position: self.current_step,
                note_number: note,
                velocity: DEFAULT_VELOCITY,
                channel: DEFAULT_CHANNEL + 1,
                gate_length: self.last_note.gate_length,
            };
        }
    }

    fn flush_sounding(&mut self, offset: u32, events: &mut Vec<MidiEventTimed>) {
        for &note in &self.sounding {
            events.push(MidiEventTimed {
                event: MidiEvent::NoteOff {
                    note,
                    channel: DEFAULT_CHANNEL,
                },
                samples_from_now: offset,
            });
        }
        self.sounding.clear();
    }
}

impl Default for StepTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// MIDI note for a grid row: row 0 is the highest pitch
pub(crate) fn row_note(lowest_note: u8, num_rows: usize, row: usize) -> u8 {
    let offset = num_rows.saturating_sub(row + 1) as u16;
    (lowest_note as u16 + offset).min(127) as u8
}
