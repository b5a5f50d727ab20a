//! Sample encodings and buffer views.
//!
//! Every compute kernel in this crate runs the same algorithm in `f64` and
//! only touches the caller's storage through the [`SampleEncoding`] trait:
//! load a stored sample as a double, store a double back, and scale by the
//! encoding's full-scale amplitude. The engine picks one instantiation per
//! call from the [`SourceBuffer`] tag, so adding an encoding never touches
//! the synthesis code.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use num_complex::Complex64;

/*
Integer full scale and truncation
=================================

Integer encodings scale the unit-amplitude waveform by a full-scale
constant before storing:

    s8      127
    s16     32767
    s24     8388607     (stored in an i32)
    s32     214748363   (historical constant, kept as-is; not 2^31 - 1)
    s64     9223372036854775807

Stores round to the nearest integer and then truncate to the storage width
with a wrapping cast, so an overflowing mix wraps instead of clamping.
Float, double and complex encodings are unscaled (full scale 1.0) and store
the value directly; the complex encoding reads the real part and writes a
purely real value.
*/

/// Tag for the numeric encoding of a sample buffer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    S8,
    S16,
    S24,
    S32,
    S64,
    Float,
    Double,
    Complex,
}

/// Mutable, format-tagged view over the caller's sample buffer.
pub enum SourceBuffer<'a> {
    S8(&'a mut [i8]),
    S16(&'a mut [i16]),
    S24(&'a mut [i32]),
    S32(&'a mut [i32]),
    S64(&'a mut [i64]),
    Float(&'a mut [f32]),
    Double(&'a mut [f64]),
    Complex(&'a mut [Complex64]),
}

impl SourceBuffer<'_> {
    pub fn format(&self) -> SampleFormat {
        match self {
            SourceBuffer::S8(_) => SampleFormat::S8,
            SourceBuffer::S16(_) => SampleFormat::S16,
            SourceBuffer::S24(_) => SampleFormat::S24,
            SourceBuffer::S32(_) => SampleFormat::S32,
            SourceBuffer::S64(_) => SampleFormat::S64,
            SourceBuffer::Float(_) => SampleFormat::Float,
            SourceBuffer::Double(_) => SampleFormat::Double,
            SourceBuffer::Complex(_) => SampleFormat::Complex,
        }
    }

    /// Number of samples in the underlying slice (frames times stride).
    pub fn len(&self) -> usize {
        match self {
            SourceBuffer::S8(b) => b.len(),
            SourceBuffer::S16(b) => b.len(),
            SourceBuffer::S24(b) => b.len(),
            SourceBuffer::S32(b) => b.len(),
            SourceBuffer::S64(b) => b.len(),
            SourceBuffer::Float(b) => b.len(),
            SourceBuffer::Double(b) => b.len(),
            SourceBuffer::Complex(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One numeric instantiation of the compute kernels.
pub trait SampleEncoding {
    type Storage: Copy;

    /// Amplitude a unit waveform is scaled by before storing.
    const FULL_SCALE: f64;

    fn load(sample: Self::Storage) -> f64;

    fn store(value: f64) -> Self::Storage;
}

/// Rounds to nearest, saturating into i64 range first so the cast is defined.
#[inline]
fn quantize(value: f64) -> i64 {
    value.round() as i64
}

pub struct S8;

impl SampleEncoding for S8 {
    type Storage = i8;

    const FULL_SCALE: f64 = 127.0;

    #[inline]
    fn load(sample: i8) -> f64 {
        sample as f64
    }

    #[inline]
    fn store(value: f64) -> i8 {
        quantize(value) as i8
    }
}

pub struct S16;

impl SampleEncoding for S16 {
    type Storage = i16;

    const FULL_SCALE: f64 = 32767.0;

    #[inline]
    fn load(sample: i16) -> f64 {
        sample as f64
    }

    #[inline]
    fn store(value: f64) -> i16 {
        quantize(value) as i16
    }
}

/// 24-bit samples widened into an i32.
pub struct S24;

impl SampleEncoding for S24 {
    type Storage = i32;

    const FULL_SCALE: f64 = 8388607.0;

    #[inline]
    fn load(sample: i32) -> f64 {
        sample as f64
    }

    #[inline]
    fn store(value: f64) -> i32 {
        quantize(value) as i32
    }
}

pub struct S32;

impl SampleEncoding for S32 {
    type Storage = i32;

    // Historical full scale, deliberately not 2^31 - 1.
    const FULL_SCALE: f64 = 214748363.0;

    #[inline]
    fn load(sample: i32) -> f64 {
        sample as f64
    }

    #[inline]
    fn store(value: f64) -> i32 {
        quantize(value) as i32
    }
}

pub struct S64;

impl SampleEncoding for S64 {
    type Storage = i64;

    const FULL_SCALE: f64 = 9223372036854775807.0;

    #[inline]
    fn load(sample: i64) -> f64 {
        sample as f64
    }

    #[inline]
    fn store(value: f64) -> i64 {
        quantize(value)
    }
}

pub struct Float;

impl SampleEncoding for Float {
    type Storage = f32;

    const FULL_SCALE: f64 = 1.0;

    #[inline]
    fn load(sample: f32) -> f64 {
        sample as f64
    }

    #[inline]
    fn store(value: f64) -> f32 {
        value as f32
    }
}

pub struct Double;

impl SampleEncoding for Double {
    type Storage = f64;

    const FULL_SCALE: f64 = 1.0;

    #[inline]
    fn load(sample: f64) -> f64 {
        sample
    }

    #[inline]
    fn store(value: f64) -> f64 {
        value
    }
}

pub struct Complex;

impl SampleEncoding for Complex {
    type Storage = Complex64;

    const FULL_SCALE: f64 = 1.0;

    #[inline]
    fn load(sample: Complex64) -> f64 {
        sample.re
    }

    #[inline]
    fn store(value: f64) -> Complex64 {
        Complex64::new(value, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_store_rounds_to_nearest() {
        assert_eq!(S16::store(0.4), 0);
        assert_eq!(S16::store(0.6), 1);
        assert_eq!(S16::store(-0.6), -1);
        assert_eq!(S8::store(126.5), 127);
    }

    #[test]
    fn full_scale_survives_roundtrip() {
        assert_eq!(S16::store(S16::FULL_SCALE), i16::MAX);
        assert_eq!(S16::load(i16::MAX), 32767.0);
        assert_eq!(S24::store(S24::FULL_SCALE), 8388607);
        assert_eq!(S8::store(-S8::FULL_SCALE), -127);
    }

    #[test]
    fn integer_store_wraps_at_storage_width() {
        // Overflow truncates to the low bits, it does not clamp.
        assert_eq!(S16::store(32768.0), i16::MIN);
        assert_eq!(S8::store(128.0), i8::MIN);
    }

    #[test]
    fn complex_store_is_purely_real() {
        let c = Complex::store(0.25);
        assert_eq!(c.re, 0.25);
        assert_eq!(c.im, 0.0);
        assert_eq!(Complex::load(Complex64::new(0.5, 0.75)), 0.5);
    }

    #[test]
    fn float_encodings_are_unscaled() {
        assert_eq!(Float::FULL_SCALE, 1.0);
        assert_eq!(Double::FULL_SCALE, 1.0);
        assert_eq!(Double::store(0.125), 0.125);
    }

    #[test]
    fn buffer_view_reports_format_and_len() {
        let mut data = [0i16; 4];
        let view = SourceBuffer::S16(&mut data);
        assert_eq!(view.format(), SampleFormat::S16);
        assert_eq!(view.len(), 4);
        assert!(!view.is_empty());
    }
}
