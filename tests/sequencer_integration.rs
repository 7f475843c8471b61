//! Cross-module integration tests
//!
//! These tests drive the sequencer the way a host would: transport
//! updates followed by block processing, over many buffers of varying
//! sizes, and assert the invariants the timing engine exists to
//! guarantee.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use gridseq::{
    Command, ConfigChange, MidiEventTimed, StepSequencer, TransportSnapshot,
    create_command_channel,
};
use ringbuf::traits::Producer;

const SAMPLE_RATE: f64 = 48000.0;

fn sequencer_with_pattern(cells: &[(usize, usize)]) -> StepSequencer {
    let mut sequencer = StepSequencer::new();
    sequencer.prepare_to_play(SAMPLE_RATE, 512);
    for &(step, row) in cells {
        sequencer.set_cell(step, row, true);
    }
    sequencer
}

/// Every NoteOn for a pitch is followed by exactly one NoteOff for the
/// same pitch before that pitch is retriggered, and every offset lies
/// within its block, across 1000 blocks of random sizes.
#[test]
fn test_event_pairing_over_random_blocks() {
    // A fixed pattern with repeated pitches across steps
    let mut sequencer = sequencer_with_pattern(&[
        (0, 15),
        (2, 15),
        (2, 12),
        (5, 3),
        (8, 15),
        (8, 0),
        (11, 7),
        (15, 15),
    ]);
    sequencer.start();

    let mut rng = StdRng::seed_from_u64(0xBEEF);
    let mut events: Vec<MidiEventTimed> = Vec::with_capacity(64);
    let mut on_count: HashMap<u8, u32> = HashMap::new();
    let mut total_events = 0usize;

    for _ in 0..1000 {
        let block_size = rng.gen_range(1..=2048);
        events.clear();
        sequencer.process_block(block_size, &mut events);

        let mut last_offset = 0u32;
        for timed in &events {
            assert!(
                (timed.samples_from_now as usize) < block_size,
                "offset {} outside block of {} samples",
                timed.samples_from_now,
                block_size
            );
            assert!(timed.samples_from_now >= last_offset, "offsets not monotonic");
            last_offset = timed.samples_from_now;

            let note = timed.event.note();
            let sounding = on_count.entry(note).or_insert(0);
            if timed.event.is_note_on() {
                assert_eq!(*sounding, 0, "note {note} retriggered while sounding");
                *sounding = 1;
            } else {
                assert_eq!(*sounding, 1, "note {note} released while silent");
                *sounding = 0;
            }
            total_events += 1;
        }
    }

    // 1000 blocks averaging ~1024 samples is ~170 steps of the pattern
    assert!(total_events > 100, "only {total_events} events emitted");
}

/// Boundary spacing must not drift when samples-per-step is fractional.
#[test]
fn test_boundary_spacing_does_not_drift() {
    let mut sequencer = sequencer_with_pattern(&[
        (0, 15),
        (1, 15),
        (2, 15),
        (3, 15),
        (4, 15),
        (5, 15),
        (6, 15),
        (7, 15),
        (8, 15),
        (9, 15),
        (10, 15),
        (11, 15),
        (12, 15),
        (13, 15),
        (14, 15),
        (15, 15),
    ]);
    // 121 BPM, 16 steps: samples_per_step = 48000 * (60/121) / 4 ≈ 5950.41
    sequencer.apply_config(ConfigChange::Bpm(121.0));
    sequencer.start();

    let samples_per_step = sequencer.samples_per_step();
    let block_size = 256usize;
    let mut events: Vec<MidiEventTimed> = Vec::new();
    let mut boundary_positions: Vec<f64> = Vec::new();

    for block in 0..8000 {
        events.clear();
        sequencer.process_block(block_size, &mut events);
        for timed in &events {
            if timed.event.is_note_on() {
                boundary_positions
                    .push((block * block_size) as f64 + timed.samples_from_now as f64);
            }
        }
    }

    assert!(boundary_positions.len() > 100);
    // The k-th boundary sits within one sample of k * samples_per_step
    for (k, position) in boundary_positions.iter().enumerate() {
        let expected = (k + 1) as f64 * samples_per_step;
        assert!(
            (position - expected).abs() < 1.0,
            "boundary {k} at {position}, expected {expected}"
        );
    }
}

/// Starting mid-pattern must schedule the first boundary a fraction of
/// a step into the block, not a full step away.
#[test]
fn test_transport_jump_resumes_mid_step() {
    let mut sequencer = sequencer_with_pattern(&[(10, 15), (11, 15)]);

    // Step 10, phase 0.5: ppq = 10.5 steps * 0.25 PPQ/step
    sequencer.update_transport(&TransportSnapshot::playing(120.0, 2.625));
    assert!(sequencer.is_playing());
    assert_eq!(sequencer.current_step(), 10);

    let mut events: Vec<MidiEventTimed> = Vec::new();
    sequencer.process_block(8192, &mut events);

    // samples_per_step = 6000; half a step remains = 3000
    assert!(!events.is_empty());
    assert_eq!(events[0].samples_from_now, 3000);
    assert!(events[0].event.is_note_on());
    // The boundary advanced into step 11
    assert_eq!(events[0].event.note(), 48 + (16 - 1 - 15) as u8);
    assert_eq!(sequencer.current_step(), 11);
}

/// A host seek while playing realigns the step index and phase.
#[test]
fn test_seek_realigns_phase() {
    let mut sequencer = sequencer_with_pattern(&[(3, 15)]);

    sequencer.update_transport(&TransportSnapshot::playing(120.0, 0.0));
    let mut events: Vec<MidiEventTimed> = Vec::new();
    sequencer.process_block(512, &mut events);

    // Jump far ahead: step 2, phase 0.25 (ppq = 2.25 * 0.25)
    sequencer.update_transport(&TransportSnapshot::playing(120.0, 0.5625));
    assert_eq!(sequencer.current_step(), 2);

    events.clear();
    sequencer.process_block(8192, &mut events);

    // 75% of a step remains = 4500 samples
    assert_eq!(events[0].samples_from_now, 4500);
    assert!(events[0].event.is_note_on());
}

/// Stopping mid-pattern flushes note-offs instead of leaving notes
/// hanging for the host to clean up.
#[test]
fn test_stop_mid_pattern_flushes_offs() {
    let mut sequencer = sequencer_with_pattern(&[(1, 4), (1, 9)]);
    sequencer.update_transport(&TransportSnapshot::playing(120.0, 0.0));

    let mut events: Vec<MidiEventTimed> = Vec::new();
    sequencer.process_block(6100, &mut events);
    let on_notes: Vec<u8> = events
        .iter()
        .filter(|timed| timed.event.is_note_on())
        .map(|timed| timed.event.note())
        .collect();
    assert_eq!(on_notes.len(), 2);

    sequencer.update_transport(&TransportSnapshot::stopped(120.0));
    events.clear();
    sequencer.process_block(512, &mut events);

    let mut off_notes: Vec<u8> = events
        .iter()
        .inspect(|timed| {
            assert!(!timed.event.is_note_on());
            assert_eq!(timed.samples_from_now, 0);
        })
        .map(|timed| timed.event.note())
        .collect();
    off_notes.sort_unstable();
    let mut expected = on_notes.clone();
    expected.sort_unstable();
    assert_eq!(off_notes, expected);
}

/// A command enqueued before a block is audible in that block.
#[test]
fn test_command_queue_hand_off() {
    let (mut tx, mut rx) = create_command_channel(32);
    let mut sequencer = StepSequencer::new();
    sequencer.prepare_to_play(SAMPLE_RATE, 512);

    tx.try_push(Command::SetCell {
        step: 1,
        row: 15,
        active: true,
    })
    .unwrap();
    tx.try_push(Command::Start).unwrap();

    // The audio callback: drain, then render
    sequencer.drain_commands(&mut rx);
    let mut events: Vec<MidiEventTimed> = Vec::new();
    sequencer.process_block(6100, &mut events);

    assert_eq!(events.len(), 1);
    assert!(events[0].event.is_note_on());
    assert_eq!(events[0].event.note(), 48);

    // Editing through the queue again: clear the pattern
    tx.try_push(Command::ClearAll).unwrap();
    tx.try_push(Command::Stop).unwrap();
    sequencer.drain_commands(&mut rx);
    assert!(!sequencer.cell(1, 15));
    assert!(!sequencer.is_playing());
}

/// Full persistence round trip through JSON restores the exact pattern.
#[test]
fn test_json_persistence_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut sequencer = StepSequencer::new();

    // A random sparse pattern
    let mut expected = Vec::new();
    for _ in 0..24 {
        let step = rng.gen_range(0..16);
        let row = rng.gen_range(0..16);
        sequencer.set_cell(step, row, true);
        expected.push((step, row));
    }

    let json = gridseq::sequencer::to_json(&sequencer.export_state()).unwrap();
    let restored_state = gridseq::sequencer::from_json(&json).unwrap();

    let mut restored = StepSequencer::new();
    restored.import_state(&restored_state);

    for step in 0..16 {
        for row in 0..16 {
            assert_eq!(
                restored.cell(step, row),
                sequencer.cell(step, row),
                "cell ({step}, {row})"
            );
        }
    }
}

/// Resolution changes rescale playback without touching the pattern.
#[test]
fn test_resolution_change_rescales_steps() {
    let mut sequencer = sequencer_with_pattern(&[(1, 15)]);
    sequencer.start();

    sequencer.apply_command(Command::SetResolution(gridseq::Resolution::DoubleTime));
    assert_eq!(sequencer.samples_per_step(), 3000.0);

    let mut events: Vec<MidiEventTimed> = Vec::new();
    sequencer.process_block(3100, &mut events);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].samples_from_now, 3000);
}

/// Tempo changes from the host take effect on the next boundary.
#[test]
fn test_host_tempo_change_rescales_steps() {
    let mut sequencer = sequencer_with_pattern(&[(1, 15), (2, 15)]);

    sequencer.update_transport(&TransportSnapshot::playing(120.0, 0.0));
    assert_eq!(sequencer.samples_per_step(), 6000.0);

    sequencer.update_transport(&TransportSnapshot::playing(60.0, 0.01));
    assert_eq!(sequencer.samples_per_step(), 12000.0);
}
