// Purpose: per-voice orchestration above the dsp kernels.

pub mod engine;

pub use engine::{
    EnvelopeConfig, LfoConfig, ModularSynth, NoiseConfig, NoiseMode, OscillatorConfig, PitchConfig,
};
