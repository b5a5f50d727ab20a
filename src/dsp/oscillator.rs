//! Closed-form waveform evaluation.
//!
//! Every generator in this crate — audible oscillators and LFOs alike —
//! evaluates the same five closed forms at an absolute frame time. The
//! engine bends frequency, phase and volume per frame, converts the bent
//! phase to an equivalent time offset with [`phase_to_frames`], and calls
//! [`evaluate`] with the shifted time. There is no per-generator state, so
//! phase continuity across buffer boundaries falls out of the absolute
//! timeline alone.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::TAU;

/*
Waveform closed forms, unit amplitude, t in frames:

  sine       sin(2π f t / sr)
  sawtooth   (t mod (sr/f)) · 2f/sr − 1          ramp over one period
  triangle   fold of the doubled ramp into [-1, 1]
  square     sign of the sine value
  pulse      sine thresholded against sin(2π·3/5) instead of 0, giving an
             asymmetric duty cycle rather than a 50% square
*/

/// Waveform kind shared by oscillators and LFOs.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
    Triangle,
    Square,
    Pulse,
}

/// Convert a phase in radians to the equivalent offset in frames:
/// `(phase / 2π) · (sr / f)`. The caller clamps `frequency` beforehand.
#[inline]
pub fn phase_to_frames(phase: f64, frequency: f64, samplerate: f64) -> f64 {
    (phase / TAU) * (samplerate / frequency)
}

/// Evaluate `waveform` at frame time `t` (may be fractional and include a
/// phase offset). Returns a value in [-1, 1].
#[inline]
pub fn evaluate(waveform: Waveform, t: f64, frequency: f64, samplerate: f64) -> f64 {
    match waveform {
        Waveform::Sine => sine(t, frequency, samplerate),
        Waveform::Sawtooth => {
            let period = samplerate / frequency;
            t.rem_euclid(period) * 2.0 * frequency / samplerate - 1.0
        }
        Waveform::Triangle => {
            let ramp = (t * frequency / samplerate).rem_euclid(1.0);
            if ramp < 0.5 {
                4.0 * ramp - 1.0
            } else {
                3.0 - 4.0 * ramp
            }
        }
        Waveform::Square => {
            if sine(t, frequency, samplerate) >= 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Pulse => {
            if sine(t, frequency, samplerate) >= (TAU * 3.0 / 5.0).sin() {
                1.0
            } else {
                -1.0
            }
        }
    }
}

#[inline]
fn sine(t: f64, frequency: f64, samplerate: f64) -> f64 {
    (t * TAU * frequency / samplerate).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 44_100.0;

    #[test]
    fn sine_matches_closed_form() {
        for n in 0..64 {
            let expected = (TAU * 440.0 * n as f64 / SR).sin();
            let actual = evaluate(Waveform::Sine, n as f64, 440.0, SR);
            assert!((actual - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn sine_is_periodic() {
        // 441 Hz divides 44100 evenly, so the period is exactly 100 frames.
        let period = (SR / 441.0).round();
        for n in 0..100 {
            let a = evaluate(Waveform::Sine, n as f64, 441.0, SR);
            let b = evaluate(Waveform::Sine, n as f64 + period, 441.0, SR);
            assert!((a - b).abs() < 1e-9, "frame {n}: {a} vs {b}");
        }
    }

    #[test]
    fn sawtooth_spans_full_range() {
        let period = SR / 441.0;
        let start = evaluate(Waveform::Sawtooth, 0.0, 441.0, SR);
        let end = evaluate(Waveform::Sawtooth, period - 1.0, 441.0, SR);
        assert!((start + 1.0).abs() < 1e-9);
        assert!(end > 0.9);
    }

    #[test]
    fn triangle_folds_at_half_period() {
        let period = SR / 441.0;
        let quarter = evaluate(Waveform::Triangle, period / 4.0, 441.0, SR);
        let half = evaluate(Waveform::Triangle, period / 2.0, 441.0, SR);
        assert!((quarter - 0.0).abs() < 1e-9);
        assert!((half - 1.0).abs() < 1e-9);
    }

    #[test]
    fn waveforms_stay_in_range() {
        for waveform in [
            Waveform::Sine,
            Waveform::Sawtooth,
            Waveform::Triangle,
            Waveform::Square,
            Waveform::Pulse,
        ] {
            for n in 0..1000 {
                let v = evaluate(waveform, n as f64, 440.0, SR);
                assert!((-1.0..=1.0).contains(&v), "{waveform:?} out of range: {v}");
            }
        }
    }

    #[test]
    fn pulse_duty_cycle_is_asymmetric() {
        // The threshold sits below zero, so the pulse is high for well over
        // half the period (unlike the square's 50% duty).
        let high = (0..44_100)
            .filter(|&n| evaluate(Waveform::Pulse, n as f64, 441.0, SR) > 0.0)
            .count();
        let duty = high as f64 / 44_100.0;
        assert!(duty > 0.6 && duty < 0.8, "unexpected duty cycle {duty}");
    }

    #[test]
    fn negative_time_is_defined() {
        // Phase offsets can drive the shifted time negative; the modulo
        // forms must stay in range there too.
        for waveform in [Waveform::Sawtooth, Waveform::Triangle] {
            let v = evaluate(waveform, -12.5, 440.0, SR);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn phase_conversion_shifts_one_cycle() {
        // A full turn of phase maps to exactly one period of frames.
        let frames = phase_to_frames(TAU, 441.0, SR);
        assert!((frames - SR / 441.0).abs() < 1e-9);
    }
}
