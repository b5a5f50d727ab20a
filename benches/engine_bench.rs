//! Benchmarks for the per-voice compute engine.
//!
//! Run with: cargo bench
//!
//! Reference timing at 44.1kHz sample rate:
//!   - 64 frames  = 1.45ms deadline
//!   - 128 frames = 2.90ms deadline
//!   - 256 frames = 5.80ms deadline
//!   - 512 frames = 11.61ms deadline
//!
//! Benchmark groups:
//!   - engine/render   Plain two-oscillator render per format
//!   - engine/modulated Fully routed modulation matrix

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use modular_dsp::routing::{ModTarget, Sends};
use modular_dsp::sample::SourceBuffer;
use modular_dsp::synth::ModularSynth;

/// Common buffer sizes used in audio applications.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn plain_engine(size: usize) -> ModularSynth {
    let mut synth = ModularSynth::new(44_100, size);
    synth.osc_1.volume = 0.5;
    synth.osc_1.frequency = 523.25;
    synth
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/render");

    for &size in BLOCK_SIZES {
        let mut synth = plain_engine(size);
        let mut s16 = vec![0i16; size];
        group.bench_with_input(BenchmarkId::new("s16", size), &size, |b, _| {
            b.iter(|| {
                synth.compute(SourceBuffer::S16(black_box(&mut s16)));
            })
        });

        let mut synth = plain_engine(size);
        let mut float = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("f32", size), &size, |b, _| {
            b.iter(|| {
                synth.compute(SourceBuffer::Float(black_box(&mut float)));
            })
        });

        let mut synth = plain_engine(size);
        let mut double = vec![0.0f64; size];
        group.bench_with_input(BenchmarkId::new("f64", size), &size, |b, _| {
            b.iter(|| {
                synth.compute(SourceBuffer::Double(black_box(&mut double)));
            })
        });
    }

    group.finish();
}

fn bench_modulated(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/modulated");

    for &size in BLOCK_SIZES {
        // Every source routed somewhere: worst-case bending per frame.
        let mut synth = plain_engine(size);
        synth.env_0.sends = Sends::of(&[ModTarget::Osc0Volume, ModTarget::Volume]);
        synth.env_1.sends = Sends::of(&[ModTarget::Osc1Frequency]);
        synth.lfo_0.sends = Sends::of(&[ModTarget::Osc0Frequency, ModTarget::PitchTuning]);
        synth.lfo_1.sends = Sends::of(&[ModTarget::Osc1Phase]);
        synth.noise.sends = Sends::of(&[ModTarget::Volume]);
        synth.seed_noise(1);

        let mut double = vec![0.0f64; size];
        group.bench_with_input(BenchmarkId::new("f64", size), &size, |b, _| {
            b.iter(|| {
                synth.compute(SourceBuffer::Double(black_box(&mut double)));
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render, bench_modulated);
criterion_main!(benches);
