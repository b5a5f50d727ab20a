pub mod dsp;
pub mod routing; // Modulation routing table (sends)
pub mod sample; // Sample encodings and format dispatch
pub mod synth; // Per-voice compute engine

/// Destination slots available to a single modulation source.
pub const MAX_SENDS: usize = 8;

/// Oscillator frequencies are clamped to this before any division so the
/// closed-form waveforms never see a degenerate period.
pub(crate) const MIN_FREQUENCY: f64 = 1.0e-9;
