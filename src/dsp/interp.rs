//! Fourth-order interpolation for the pitch stage.
//!
//! Resampling walks the source buffer with a 32.32 fixed-point phase
//! accumulator and reconstructs fractional positions from four
//! neighbouring samples. The four Lagrangian weights depend only on the
//! fractional position, so they are tabulated once for 256 positions and
//! shared read-only for the lifetime of the process.

use std::sync::OnceLock;

/// Number of tabulated fractional positions.
pub const INTERP_ROWS: usize = 256;

/// 32.32 fixed-point phase accumulator.
///
/// The high 32 bits index into the source buffer, the low 32 bits hold
/// the fractional position between samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPhase(u64);

impl FixedPhase {
    pub const ZERO: Self = Self(0);

    /// Build an increment from a playback ratio (1.0 = unchanged pitch).
    pub fn from_ratio(ratio: f64) -> Self {
        Self((ratio * (1u64 << 32) as f64) as u64)
    }

    /// Advance by `step`, wrapping on overflow.
    #[must_use]
    pub fn advance(self, step: Self) -> Self {
        Self(self.0.wrapping_add(step.0))
    }

    /// Integer sample index.
    pub fn index(self) -> usize {
        (self.0 >> 32) as usize
    }

    /// Coefficient table row for the fractional part.
    pub fn table_row(self) -> usize {
        ((self.0 & 0xFFFF_FFFF) >> 24) as usize
    }
}

/// Precomputed fourth-order coefficients, one row per fractional position.
pub struct InterpTable {
    coeffs: [[f64; 4]; INTERP_ROWS],
}

impl InterpTable {
    fn build() -> Self {
        let mut coeffs = [[0.0; 4]; INTERP_ROWS];

        /* Lagrange weights for the point set {-1, 0, 1, 2}, expanded in
         * Horner form around the fractional position x in [0, 1). Row 0
         * reduces to [0, 1, 0, 0], passing the on-grid sample through
         * untouched. */
        for (row, c) in coeffs.iter_mut().enumerate() {
            let x = row as f64 / INTERP_ROWS as f64;
            c[0] = x * (-0.5 + x * (1.0 - 0.5 * x));
            c[1] = 1.0 + x * x * (1.5 * x - 2.5);
            c[2] = x * (0.5 + x * (2.0 - 1.5 * x));
            c[3] = 0.5 * x * x * (x - 1.0);
        }

        Self { coeffs }
    }

    /// Process-wide shared table, built on first use.
    pub fn shared() -> &'static Self {
        static TABLE: OnceLock<InterpTable> = OnceLock::new();
        TABLE.get_or_init(Self::build)
    }

    pub fn row(&self, row: usize) -> &[f64; 4] {
        &self.coeffs[row]
    }
}
