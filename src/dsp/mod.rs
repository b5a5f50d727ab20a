//! Low-level DSP kernels driven by the synthesis engine.
//!
//! These components are allocation-free and realtime-safe. Each one works
//! over a plain `f64` slice and knows nothing about routing, note timing or
//! sample encodings — the engine owns that orchestration.

/// Linear gain ramp applied multiplicatively in place.
pub mod envelope;
/// Shared 4th-order interpolation table and fixed-point phase.
pub mod interp;
/// Low-frequency oscillator kernel.
pub mod lfo;
/// Sample-and-hold white noise kernel.
pub mod noise;
/// Closed-form waveform evaluation.
pub mod oscillator;

pub use oscillator::Waveform;
