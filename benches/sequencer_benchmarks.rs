use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gridseq::{MidiEventTimed, StepSequencer, TransportSnapshot};

/// Benchmark the per-block path (runs inside the audio callback)
fn bench_process_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_block");

    for block_size in [64usize, 512, 2048] {
        let mut sequencer = StepSequencer::new();
        sequencer.prepare_to_play(48000.0, block_size);
        for step in 0..16 {
            sequencer.set_cell(step, 15 - (step % 4), true);
        }
        sequencer.start();

        let mut events: Vec<MidiEventTimed> = Vec::with_capacity(64);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, &size| {
                b.iter(|| {
                    events.clear();
                    sequencer.process_block(black_box(size), &mut events);
                    black_box(&events);
                });
            },
        );
    }
    group.finish();
}

/// Benchmark transport tracking with a moving playhead
fn bench_update_transport(c: &mut Criterion) {
    let mut sequencer = StepSequencer::new();
    sequencer.prepare_to_play(48000.0, 512);
    sequencer.start();

    let mut ppq = 0.0f64;
    c.bench_function("update_transport", |b| {
        b.iter(|| {
            ppq += 512.0 / 24000.0; // 512 samples at 120 BPM
            sequencer.update_transport(black_box(&TransportSnapshot::playing(120.0, ppq)));
        });
    });
}

criterion_group!(benches, bench_process_block, bench_update_transport);
criterion_main!(benches);
