//! Measurement basis and collapse

use rand::Rng;

use crate::qubit::Qubit;

/// A `(base, ortho)` pair. Collapsing onto `base` counts as a match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementBasis {
    base: Qubit,
    ortho: Qubit,
}

impl MeasurementBasis {
    pub fn new(base: Qubit) -> Self {
        Self {
            base,
            ortho: base.ortho(),
        }
    }

    pub fn base(&self) -> Qubit {
        self.base
    }

    pub fn ortho(&self) -> Qubit {
        self.ortho
    }

    /// Swap base and ortho
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.base, &mut self.ortho);
    }

    /// Collapse `qubit` against this basis with exactly one uniform draw.
    pub fn collapse<R: Rng + ?Sized>(&self, qubit: &Qubit, rng: &mut R) -> (Qubit, bool) {
        let sample: f64 = rng.random();
        self.collapse_with(qubit, sample)
    }

    /// Collapse using a caller-supplied sample in `[0, 1)`.
    pub fn collapse_with(&self, qubit: &Qubit, sample: f64) -> (Qubit, bool) {
        if sample < qubit.measure_probability(&self.base) {
            (self.base, true)
        } else {
            (self.ortho, false)
        }
    }
}
