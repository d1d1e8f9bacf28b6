//! Benchmarks for the interpolation kernels and the voice write path.
//!
//! Run with: cargo bench -p sv-engine
//!
//! One block is 64 samples; at 48kHz that is a 1.33ms deadline, shared by
//! every voice that is sounding.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sv_engine::{init_tables, Block, FilterKind, IirFilter, InterpMethod, LoopMode, VoiceDsp, BLOCK_SIZE};
use sv_ir::{SampleBank, SampleData, WaveformSample};

/// Pitch ratios from an octave down to an octave and a fifth up.
const RATIOS: &[f32] = &[0.5, 1.0, 1.4983, 3.0];

fn sine_sample() -> WaveformSample {
    let data = (0..4096)
        .map(|i| (libm::sinf(i as f32 * 0.05) * 30000.0) as i16)
        .collect();
    WaveformSample::new("sine", SampleData::from_i16(data))
        .with_loop(1024, 3072)
        .expect("loop fits")
}

fn bench_kernels(c: &mut Criterion) {
    init_tables();
    let mut group = c.benchmark_group("kernels");
    let sample = sine_sample();

    let kernels: [(&str, InterpMethod); 4] = [
        ("nearest", InterpMethod::None),
        ("linear", InterpMethod::Linear),
        ("cubic", InterpMethod::FourthOrder),
        ("sinc7", InterpMethod::SeventhOrder),
    ];
    for (name, method) in kernels {
        for &ratio in RATIOS {
            let mut voice = VoiceDsp::new(Default::default(), sample.range());
            voice.interp = method;
            voice.pitch_ratio = ratio;
            let mut out: Block = [0.0; BLOCK_SIZE];
            group.bench_with_input(BenchmarkId::new(name, ratio), &ratio, |b, _| {
                b.iter(|| black_box(voice.render(black_box(&sample), &mut out, true)))
            });
        }
    }
    group.finish();
}

fn bench_write(c: &mut Criterion) {
    init_tables();
    let mut group = c.benchmark_group("write");
    let mut bank = SampleBank::with_key();
    let sample = sine_sample();
    let range = sample.range();
    let key = bank.insert(sample);

    for (name, kind) in [("unfiltered", FilterKind::Disabled), ("lowpass", FilterKind::LowPass)] {
        let mut filter = IirFilter::new(kind);
        filter.set_cutoff(2000.0);
        filter.set_q(6.0);
        let mut voice = VoiceDsp::with_filters(key, range, filter, IirFilter::default());
        voice.loop_mode = LoopMode::Looped;
        voice.pitch_ratio = 1.4983;
        voice.amp = 0.5;
        let mut out: Block = [0.0; BLOCK_SIZE];
        group.bench_function(name, |b| b.iter(|| black_box(voice.write(black_box(&bank), &mut out))));
    }
    group.finish();
}

criterion_group!(benches, bench_kernels, bench_write);
criterion_main!(benches);
