//! Per-voice modular synthesis compute engine.
//!
//! [`ModularSynth`] renders one audio buffer per [`compute`] call: two
//! additively mixed oscillators, bent per frame by two envelopes, two LFOs
//! and a sample-and-hold noise source according to each source's routing
//! list, followed by a 4th-order interpolated pitch shift and a master
//! volume stage. The whole pass runs in `f64` and touches the caller's
//! storage only through [`SampleEncoding`], so every supported format runs
//! the identical algorithm.
//!
//! The engine keeps an absolute frame `offset` that advances by one buffer
//! length per call, which is what makes waveforms and hold periods
//! continuous across buffer boundaries. `frame_count` is the total note
//! duration; the envelope drivers place the current call's window inside
//! it.
//!
//! [`compute`]: ModularSynth::compute

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::{PI, TAU};

use crate::dsp::envelope::EnvelopeRamp;
use crate::dsp::interp::{FixedPhase, InterpTable};
use crate::dsp::lfo::Lfo;
use crate::dsp::noise::Noise;
use crate::dsp::oscillator::{self, Waveform};
use crate::routing::{ModTarget, Sends};
use crate::sample::{self, SampleEncoding, SourceBuffer};
use crate::MIN_FREQUENCY;

/// One audible waveform generator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct OscillatorConfig {
    pub waveform: Waveform,
    pub frequency: f64,
    /// Base phase in radians.
    pub phase: f64,
    pub volume: f64,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            frequency: 440.0,
            phase: 0.0,
            volume: 1.0,
        }
    }
}

/// ADSR breakpoint levels plus the kernel drive frequency.
///
/// The four levels are breakpoints, not durations: the note is split into
/// four equal quarters ramping attack to decay, decay to sustain, sustain
/// to release, then holding release. `frequency` bounds how many frames a
/// single ramp-kernel invocation may span (`samplerate / frequency`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeConfig {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
    pub frequency: f64,
    pub sends: Sends,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 1.0,
            decay: 0.75,
            sustain: 0.5,
            release: 0.0,
            frequency: 10.0,
            sends: Sends::none(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct LfoConfig {
    pub waveform: Waveform,
    pub frequency: f64,
    pub depth: f64,
    /// Constant bias in cents.
    pub tuning: f64,
    pub sends: Sends,
}

impl Default for LfoConfig {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            frequency: 6.0,
            depth: 1.0,
            tuning: 0.0,
            sends: Sends::none(),
        }
    }
}

/// Noise flavour. Only white noise exists today; the tag keeps the
/// descriptor shape stable if coloured variants are added.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoiseMode {
    #[default]
    White,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct NoiseConfig {
    pub mode: NoiseMode,
    /// Sample-and-hold frequency: a fresh value per `samplerate / frequency`
    /// frames.
    pub frequency: f64,
    pub gain: f64,
    pub sends: Sends,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            mode: NoiseMode::White,
            frequency: 440.0,
            gain: 1.0,
            sends: Sends::none(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct PitchConfig {
    /// Key number whose root pitch is `2^((base_key - 48) / 12) * 440` Hz.
    pub base_key: f64,
    /// Base tuning in cents.
    pub tuning: f64,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            base_key: 48.0,
            tuning: 0.0,
        }
    }
}

/// Which oscillator a render pass is producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OscVoice {
    Osc0,
    Osc1,
}

/// One modulation source as the per-frame bending loops see it: its
/// routing list, its refreshed working buffer, and whether it uses the
/// envelope combinators (direct ratio) or the LFO/noise ones (unipolar
/// remap).
type ModSource<'a> = (&'a Sends, &'a [f64], bool);

pub struct ModularSynth {
    samplerate: u32,
    buffer_length: usize,
    source_stride: usize,
    /// Absolute frame index of the next buffer's first frame.
    offset: usize,
    /// Total note duration in frames.
    frame_count: usize,

    pub osc_0: OscillatorConfig,
    pub osc_1: OscillatorConfig,
    pub env_0: EnvelopeConfig,
    pub env_1: EnvelopeConfig,
    pub lfo_0: LfoConfig,
    pub lfo_1: LfoConfig,
    pub noise: NoiseConfig,
    pub pitch: PitchConfig,
    /// Master volume applied after the pitch stage.
    pub volume: f64,

    env_buffer_0: Vec<f64>,
    env_buffer_1: Vec<f64>,
    lfo_buffer_0: Vec<f64>,
    lfo_buffer_1: Vec<f64>,
    noise_buffer: Vec<f64>,
    pitch_scratch: Vec<f64>,
    noise_gen: Noise,
}

impl ModularSynth {
    /// Engine for one voice, processing `buffer_length` frames per call.
    /// The note duration defaults to one second; set it per note with
    /// [`set_frame_count`](Self::set_frame_count).
    pub fn new(samplerate: u32, buffer_length: usize) -> Self {
        Self {
            samplerate,
            buffer_length,
            source_stride: 1,
            offset: 0,
            frame_count: samplerate as usize,
            osc_0: OscillatorConfig::default(),
            osc_1: OscillatorConfig {
                volume: 0.0,
                ..OscillatorConfig::default()
            },
            env_0: EnvelopeConfig::default(),
            env_1: EnvelopeConfig::default(),
            lfo_0: LfoConfig::default(),
            lfo_1: LfoConfig::default(),
            noise: NoiseConfig::default(),
            pitch: PitchConfig::default(),
            volume: 1.0,
            env_buffer_0: vec![0.0; buffer_length],
            env_buffer_1: vec![0.0; buffer_length],
            lfo_buffer_0: vec![0.0; buffer_length],
            lfo_buffer_1: vec![0.0; buffer_length],
            noise_buffer: vec![0.0; buffer_length],
            pitch_scratch: vec![0.0; buffer_length],
            noise_gen: Noise::new(440.0, 1.0, samplerate),
        }
    }

    pub fn samplerate(&self) -> u32 {
        self.samplerate
    }

    pub fn set_samplerate(&mut self, samplerate: u32) {
        self.samplerate = samplerate;
    }

    pub fn buffer_length(&self) -> usize {
        self.buffer_length
    }

    /// Change the frames-per-call window, reallocating every working
    /// buffer. Must not overlap an in-flight `compute` on this instance.
    pub fn set_buffer_length(&mut self, buffer_length: usize) {
        self.buffer_length = buffer_length;
        self.env_buffer_0.resize(buffer_length, 0.0);
        self.env_buffer_1.resize(buffer_length, 0.0);
        self.lfo_buffer_0.resize(buffer_length, 0.0);
        self.lfo_buffer_1.resize(buffer_length, 0.0);
        self.noise_buffer.resize(buffer_length, 0.0);
        self.pitch_scratch.resize(buffer_length, 0.0);
    }

    pub fn source_stride(&self) -> usize {
        self.source_stride
    }

    /// Distance in samples between consecutive frames of the source
    /// buffer (1 for mono-packed, channel count for interleaved).
    pub fn set_source_stride(&mut self, stride: usize) {
        self.source_stride = stride.max(1);
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Reposition the engine on the note timeline, e.g. for a restart.
    /// `compute` advances the offset by one buffer length on its own.
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn set_frame_count(&mut self, frame_count: usize) {
        self.frame_count = frame_count;
    }

    /// Rewind to the start of the note.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Reseed the noise generator for reproducible renders.
    pub fn seed_noise(&mut self, seed: u64) {
        self.noise_gen = Noise::seeded(self.noise.frequency, self.noise.gain, self.samplerate, seed);
    }

    /// Render one buffer in place. An empty or too-short source is a
    /// silent no-op.
    pub fn compute(&mut self, source: SourceBuffer<'_>) {
        match source {
            SourceBuffer::S8(buffer) => self.compute_encoded::<sample::S8>(buffer),
            SourceBuffer::S16(buffer) => self.compute_encoded::<sample::S16>(buffer),
            SourceBuffer::S24(buffer) => self.compute_encoded::<sample::S24>(buffer),
            SourceBuffer::S32(buffer) => self.compute_encoded::<sample::S32>(buffer),
            SourceBuffer::S64(buffer) => self.compute_encoded::<sample::S64>(buffer),
            SourceBuffer::Float(buffer) => self.compute_encoded::<sample::Float>(buffer),
            SourceBuffer::Double(buffer) => self.compute_encoded::<sample::Double>(buffer),
            SourceBuffer::Complex(buffer) => self.compute_encoded::<sample::Complex>(buffer),
        }
    }

    /// The single algorithm every format runs.
    fn compute_encoded<E: SampleEncoding>(&mut self, source: &mut [E::Storage]) {
        let frames = self.buffer_length;
        if frames == 0 || source.len() < (frames - 1) * self.source_stride + 1 {
            return;
        }

        self.refresh_modulation();
        self.render_oscillator::<E>(source, OscVoice::Osc0);
        self.render_oscillator::<E>(source, OscVoice::Osc1);
        self.apply_pitch::<E>(source);
        self.apply_volume::<E>(source);

        self.offset += frames;
    }

    /// Fill the working buffer of every source with active routing.
    /// Sources without routing are skipped entirely; their buffers are
    /// never read downstream.
    fn refresh_modulation(&mut self) {
        if self.env_0.sends.is_active() {
            Self::drive_envelope(
                &self.env_0,
                &mut self.env_buffer_0,
                self.offset,
                self.frame_count,
                self.samplerate,
            );
        }
        if self.env_1.sends.is_active() {
            Self::drive_envelope(
                &self.env_1,
                &mut self.env_buffer_1,
                self.offset,
                self.frame_count,
                self.samplerate,
            );
        }

        if self.lfo_0.sends.is_active() {
            self.lfo_buffer_0.fill(1.0);
            Lfo {
                frequency: self.lfo_0.frequency,
                depth: self.lfo_0.depth,
                tuning: self.lfo_0.tuning,
                samplerate: self.samplerate,
                offset: self.offset,
            }
            .compute(self.lfo_0.waveform, &mut self.lfo_buffer_0);
        }
        if self.lfo_1.sends.is_active() {
            self.lfo_buffer_1.fill(1.0);
            Lfo {
                frequency: self.lfo_1.frequency,
                depth: self.lfo_1.depth,
                tuning: self.lfo_1.tuning,
                samplerate: self.samplerate,
                offset: self.offset,
            }
            .compute(self.lfo_1.waveform, &mut self.lfo_buffer_1);
        }

        if self.noise.sends.is_active() {
            self.noise_buffer.fill(1.0);
            self.noise_gen.frequency = self.noise.frequency;
            self.noise_gen.volume = self.noise.gain;
            self.noise_gen.samplerate = self.samplerate;
            self.noise_gen.offset = self.offset;
            match self.noise.mode {
                NoiseMode::White => self.noise_gen.compute(&mut self.noise_buffer),
            }
        }
    }

    /// Piecewise ADSR scheduling over the current call window.
    ///
    /// The note is divided into four equal quarters ramping
    /// attack→decay→sustain→release, with a flat release tail covering the
    /// remainder frames. A call may enter mid-quarter, so each ramp starts
    /// from the level interpolated at the entry position. Frames past the
    /// note end keep the multiplicative identity.
    fn drive_envelope(
        config: &EnvelopeConfig,
        buffer: &mut [f64],
        offset: usize,
        frame_count: usize,
        samplerate: u32,
    ) {
        buffer.fill(1.0);
        if frame_count == 0 {
            return;
        }

        let levels = [
            config.attack,
            config.decay,
            config.sustain,
            config.release,
            config.release,
        ];
        let quarter = frame_count / 4;
        let segment_cap = ((samplerate as f64 / config.frequency.max(MIN_FREQUENCY)).round()
            as usize)
            .max(1);

        let mut cursor = 0;
        while cursor < buffer.len() {
            let pos = offset + cursor;
            if pos >= frame_count {
                break;
            }

            let q = (pos / quarter.max(1)).min(3);
            let slope = if quarter == 0 {
                0.0
            } else {
                (levels[q + 1] - levels[q]) / quarter as f64
            };
            let into_quarter = pos - q * quarter;
            let volume = levels[q] + slope * into_quarter as f64;

            let mut span = (buffer.len() - cursor).min(frame_count - pos);
            if quarter > 0 && q < 3 {
                span = span.min((q + 1) * quarter - pos);
            }
            let span = span.min(segment_cap).max(1);

            EnvelopeRamp {
                volume,
                amount: slope,
            }
            .compute(&mut buffer[cursor..cursor + span]);

            cursor += span;
        }
    }

    /// The five modulation sources in their fixed bending priority order.
    fn modulation_sources(&self) -> [ModSource<'_>; 5] {
        [
            (&self.env_0.sends, &self.env_buffer_0, true),
            (&self.env_1.sends, &self.env_buffer_1, true),
            (&self.lfo_0.sends, &self.lfo_buffer_0, false),
            (&self.lfo_1.sends, &self.lfo_buffer_1, false),
            (&self.noise.sends, &self.noise_buffer, false),
        ]
    }

    /// Render one oscillator additively into the buffer, bending its
    /// frequency, phase and volume per frame from the routed sources.
    fn render_oscillator<E: SampleEncoding>(&self, source: &mut [E::Storage], voice: OscVoice) {
        let (osc, freq_target, phase_target, volume_target) = match voice {
            OscVoice::Osc0 => (
                &self.osc_0,
                ModTarget::Osc0Frequency,
                ModTarget::Osc0Phase,
                ModTarget::Osc0Volume,
            ),
            OscVoice::Osc1 => (
                &self.osc_1,
                ModTarget::Osc1Frequency,
                ModTarget::Osc1Phase,
                ModTarget::Osc1Volume,
            ),
        };
        /* OSC1 takes the envelope into its frequency through a bipolar
         * remap where OSC0 uses the raw ratio, making OSC1 behave as a
         * bipolar-FM voice. */
        let bipolar_env_frequency = voice == OscVoice::Osc1;

        let samplerate = self.samplerate as f64;
        let sources = self.modulation_sources();

        for i in 0..self.buffer_length {
            let mut frequency = osc.frequency;
            let mut phase = osc.phase;
            let mut volume = osc.volume;

            for (sends, buffer, is_envelope) in sources {
                let s = buffer[i];
                if sends.routes(freq_target) {
                    frequency *= if is_envelope {
                        if bipolar_env_frequency {
                            2.0 * s - 1.0
                        } else {
                            s
                        }
                    } else {
                        (s + 1.0) / 2.0
                    };
                }
                if sends.routes(phase_target) {
                    phase += if is_envelope { s * TAU } else { (s + 1.0) * PI };
                }
                if sends.routes(volume_target) {
                    volume *= if is_envelope { s } else { (s + 1.0) / 2.0 };
                }
            }

            let frequency = frequency.max(MIN_FREQUENCY);
            let t = (self.offset + i) as f64
                + oscillator::phase_to_frames(phase, frequency, samplerate);
            let value =
                oscillator::evaluate(osc.waveform, t, frequency, samplerate) * E::FULL_SCALE * volume;

            let index = i * self.source_stride;
            source[index] = E::store(E::load(source[index]) + value);
        }
    }

    /// Resample the mixed buffer through the shared 4th-order table,
    /// driven by a fixed-point phase whose increment follows the modulated
    /// tuning per frame.
    fn apply_pitch<E: SampleEncoding>(&mut self, source: &mut [E::Storage]) {
        let mut scratch = std::mem::take(&mut self.pitch_scratch);

        let frames = self.buffer_length;
        let stride = self.source_stride;
        let root = 2f64.powf((self.pitch.base_key - 48.0) / 12.0) * 440.0;
        let sources = self.modulation_sources();
        let table = InterpTable::shared();

        let load = |index: usize| E::load(source[index.min(frames - 1) * stride]);

        let mut phase = FixedPhase::ZERO;
        for (i, out) in scratch.iter_mut().enumerate().take(frames) {
            let mut tuning = self.pitch.tuning;
            for (sends, buffer, is_envelope) in sources {
                if sends.routes(ModTarget::PitchTuning) {
                    let s = buffer[i];
                    tuning += if is_envelope {
                        (2.0 * s - 1.0) * 1200.0
                    } else {
                        ((s + 1.0) / 2.0) * 1200.0
                    };
                }
            }

            let mut ratio =
                2f64.powf((self.pitch.base_key - 48.0 + tuning / 100.0) / 12.0) * 440.0 / root;
            if ratio == 0.0 {
                // Guards the degenerate phase increment downstream.
                ratio = 1.0;
            }

            let index = phase.index();
            let c = table.row(phase.table_row());
            // The first output frame has no previous sample; reads past
            // the last frame clamp to it.
            let x0 = if index == 0 { load(0) } else { load(index - 1) };
            *out = c[0] * x0 + c[1] * load(index) + c[2] * load(index + 1) + c[3] * load(index + 2);

            phase = phase.advance(FixedPhase::from_ratio(ratio));
        }

        for (i, &value) in scratch.iter().enumerate().take(frames) {
            source[i * stride] = E::store(value);
        }

        self.pitch_scratch = scratch;
    }

    /// Final gain stage over the pitch-shifted buffer.
    fn apply_volume<E: SampleEncoding>(&self, source: &mut [E::Storage]) {
        let sources = self.modulation_sources();

        for i in 0..self.buffer_length {
            let mut volume = self.volume;
            for (sends, buffer, is_envelope) in sources {
                if sends.routes(ModTarget::Volume) {
                    let s = buffer[i];
                    volume *= if is_envelope { s } else { (s + 1.0) / 2.0 };
                }
            }

            let index = i * self.source_stride;
            source[index] = E::store(E::load(source[index]) * volume);
        }
    }
}
