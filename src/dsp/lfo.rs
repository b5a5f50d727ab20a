//! Low-frequency oscillator kernel.
//!
//! An LFO multiplies its waveform into an existing buffer:
//!
//! ```text
//! buffer[i] *= tuning/1200 + wave(offset + i) * depth
//! ```
//!
//! With the buffer pre-filled to 1.0 (as the engine's drivers do), depth
//! 1.0 and tuning 0, the result is the raw waveform in [-1, 1]. `offset`
//! is the absolute frame index of the first sample, which keeps the LFO
//! phase-continuous across successive buffers.

use crate::dsp::oscillator::{self, Waveform};

/// LFO parameters for one compute pass.
#[derive(Debug, Clone, Copy)]
pub struct Lfo {
    pub frequency: f64,
    pub depth: f64,
    /// Constant bias in cents, contributing `tuning / 1200` to every sample.
    pub tuning: f64,
    pub samplerate: u32,
    /// Absolute frame index of `buffer[0]`.
    pub offset: usize,
}

impl Lfo {
    /// Dispatch on the configured waveform kind.
    pub fn compute(&self, waveform: Waveform, buffer: &mut [f64]) {
        match waveform {
            Waveform::Sine => self.compute_sine(buffer),
            Waveform::Sawtooth => self.compute_sawtooth(buffer),
            Waveform::Triangle => self.compute_triangle(buffer),
            Waveform::Square => self.compute_square(buffer),
            Waveform::Pulse => self.compute_pulse(buffer),
        }
    }

    pub fn compute_sine(&self, buffer: &mut [f64]) {
        self.apply(Waveform::Sine, buffer);
    }

    pub fn compute_sawtooth(&self, buffer: &mut [f64]) {
        self.apply(Waveform::Sawtooth, buffer);
    }

    pub fn compute_triangle(&self, buffer: &mut [f64]) {
        self.apply(Waveform::Triangle, buffer);
    }

    pub fn compute_square(&self, buffer: &mut [f64]) {
        self.apply(Waveform::Square, buffer);
    }

    pub fn compute_pulse(&self, buffer: &mut [f64]) {
        self.apply(Waveform::Pulse, buffer);
    }

    fn apply(&self, waveform: Waveform, buffer: &mut [f64]) {
        let samplerate = self.samplerate as f64;
        let frequency = self.frequency.max(crate::MIN_FREQUENCY);
        let bias = self.tuning / 1200.0;

        for (i, sample) in buffer.iter_mut().enumerate() {
            let t = (self.offset + i) as f64;
            *sample *= bias + oscillator::evaluate(waveform, t, frequency, samplerate) * self.depth;
        }
    }
}
