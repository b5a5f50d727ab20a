//! Linear gain ramp kernel.
//!
//! The envelope driver slices a note into linear segments and hands each
//! intersecting sub-range of the working buffer to this kernel. The kernel
//! itself is deliberately dumb: it multiplies sample `i` by
//! `volume + i * amount`, nothing more. Degenerate inputs (zero `amount`)
//! simply produce a flat gain — there is no error surface.

/// One linear ramp segment: start gain and per-sample slope.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeRamp {
    /// Gain at the first sample of the range.
    pub volume: f64,
    /// Gain change per sample.
    pub amount: f64,
}

impl EnvelopeRamp {
    /// Multiply the ramp into `buffer` in place.
    pub fn compute(&self, buffer: &mut [f64]) {
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample *= self.volume + i as f64 * self.amount;
        }
    }
}
