//! Sample-and-hold noise kernel.
//!
//! White noise is drawn from a uniform distribution and held for a whole
//! period of the configured frequency, producing the stepped random
//! signal used for pitch and amplitude modulation. Like the other
//! kernels it multiplies into the buffer in place, so a buffer of ones
//! yields the raw noise signal.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Stateful noise generator.
///
/// The generator owns its RNG and the currently held value, so it must be
/// kept alive across compute passes for the hold periods to line up with
/// the absolute frame counter.
#[derive(Debug, Clone)]
pub struct Noise {
    pub frequency: f64,
    pub volume: f64,
    pub samplerate: u32,
    /// Absolute frame index of the next `buffer[0]`.
    pub offset: usize,
    rng: SmallRng,
    held: f64,
}

impl Noise {
    pub fn new(frequency: f64, volume: f64, samplerate: u32) -> Self {
        Self::seeded(frequency, volume, samplerate, rand::rng().random())
    }

    /// Deterministic generator for tests and reproducible renders.
    pub fn seeded(frequency: f64, volume: f64, samplerate: u32, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let held = rng.random_range(-1.0..=1.0);
        Self {
            frequency,
            volume,
            samplerate,
            offset: 0,
            rng,
            held,
        }
    }

    /// Multiply the held-noise signal into `buffer`, advancing `offset`.
    pub fn compute(&mut self, buffer: &mut [f64]) {
        let frequency = self.frequency.max(crate::MIN_FREQUENCY);
        let period = ((self.samplerate as f64 / frequency).round() as usize).max(1);

        for sample in buffer.iter_mut() {
            if self.offset % period == 0 {
                self.held = self.rng.random_range(-1.0..=1.0);
            }
            *sample *= self.held * self.volume;
            self.offset += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_value_for_whole_period() {
        let mut noise = Noise::seeded(4_410.0, 1.0, 44_100, 7);
        let mut buffer = vec![1.0; 40];
        noise.compute(&mut buffer);

        // 44100 / 4410 = 10 frames per held value.
        for chunk in buffer.chunks(10) {
            assert!(chunk.iter().all(|&s| s == chunk[0]));
        }
        assert_ne!(buffer[0], buffer[10]);
    }

    #[test]
    fn output_stays_within_volume_bounds() {
        let mut noise = Noise::seeded(100.0, 0.25, 44_100, 11);
        let mut buffer = vec![1.0; 4096];
        noise.compute(&mut buffer);
        assert!(buffer.iter().all(|&s| s.abs() <= 0.25));
    }

    #[test]
    fn seeded_generators_agree() {
        let mut a = Noise::seeded(220.0, 1.0, 44_100, 99);
        let mut b = Noise::seeded(220.0, 1.0, 44_100, 99);
        let mut left = vec![1.0; 256];
        let mut right = vec![1.0; 256];
        a.compute(&mut left);
        b.compute(&mut right);
        assert_eq!(left, right);
    }

    #[test]
    fn split_computes_match_single_pass() {
        let mut whole = Noise::seeded(220.0, 1.0, 44_100, 5);
        let mut split = Noise::seeded(220.0, 1.0, 44_100, 5);

        let mut full = vec![1.0; 128];
        whole.compute(&mut full);

        let mut first = vec![1.0; 64];
        let mut second = vec![1.0; 64];
        split.compute(&mut first);
        split.compute(&mut second);

        assert_eq!(&full[..64], &first[..]);
        assert_eq!(&full[64..], &second[..]);
    }

    #[test]
    fn period_never_collapses_to_zero() {
        let mut noise = Noise::seeded(1.0e9, 1.0, 44_100, 3);
        let mut buffer = vec![1.0; 16];
        noise.compute(&mut buffer);
        // A frequency above the samplerate redraws every frame.
        assert!(buffer.windows(2).any(|w| w[0] != w[1]));
    }
}
