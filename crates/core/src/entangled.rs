//! Entangled pair - a shared two-qubit state
//!
//! The joint state is stored as four amplitudes over `|00⟩, |01⟩, |10⟩, |11⟩`
//! and starts as the Bell state `(|00⟩ + |11⟩)/√2`. Gates act on one half
//! through a Kronecker product with the identity. Measuring either half is a
//! fixed 50/50 draw that does not touch the joint state.

use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::gate::Gate;

/// Which half of an entangled pair a cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Half {
    First,
    Second,
}

impl Half {
    pub fn other(self) -> Self {
        match self {
            Half::First => Half::Second,
            Half::Second => Half::First,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntangledPair {
    amplitudes: [Complex64; 4],
}

impl EntangledPair {
    /// (|00⟩ + |11⟩)/√2
    pub fn bell() -> Self {
        let zero = Complex64::new(0.0, 0.0);
        let amp = Complex64::new(FRAC_1_SQRT_2, 0.0);
        Self {
            amplitudes: [amp, zero, zero, amp],
        }
    }

    pub fn amplitudes(&self) -> &[Complex64; 4] {
        &self.amplitudes
    }

    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Apply `G ⊗ I` (first half) or `I ⊗ G` (second half).
    pub fn apply_gate(&mut self, half: Half, gate: &Gate) {
        let m = gate.matrix();
        let old = self.amplitudes;
        let mut next = [Complex64::new(0.0, 0.0); 4];
        for i in 0..2 {
            for j in 0..2 {
                next[2 * i + j] = match half {
                    Half::First => m[i][0] * old[j] + m[i][1] * old[2 + j],
                    Half::Second => m[j][0] * old[2 * i] + m[j][1] * old[2 * i + 1],
                };
            }
        }
        let norm = next.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        if norm > 0.0 {
            for a in &mut next {
                *a /= norm;
            }
        }
        self.amplitudes = next;
    }

    /// Measure one half. Always a fair coin.
    pub fn measure_half<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.random_bool(0.5)
    }
}

impl Default for EntangledPair {
    fn default() -> Self {
        Self::bell()
    }
}
