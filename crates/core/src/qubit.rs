//! Qubit module - single-qubit state vectors
//!
//! A qubit is a unit-norm pair of complex amplitudes `(α, β)` over the
//! computational basis. Its presentational form is a point on the Bloch
//! sphere: `θ = 2·acos|α|` and `φ = arg β − arg α`.

use std::f64::consts::{FRAC_1_SQRT_2, PI, TAU};

use num_complex::Complex64;
use rand::Rng;

use crate::gate::Gate;
use crate::types::BlochCoords;

/// Tolerance used by the algebraic properties (normalization, equality)
pub const EPSILON: f64 = 1e-9;

/// Distance from a pole below which the azimuth is considered meaningless
pub const POLE_TOLERANCE: f64 = 1.0 / 32.0;

const fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// A single-qubit pure state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Qubit {
    a: Complex64,
    b: Complex64,
}

impl Qubit {
    /// |0⟩, the north pole
    pub const ZERO: Qubit = Qubit::raw(c(1.0, 0.0), c(0.0, 0.0));
    /// |1⟩, the south pole
    pub const ONE: Qubit = Qubit::raw(c(0.0, 0.0), c(1.0, 0.0));
    /// |+⟩
    pub const PLUS: Qubit = Qubit::raw(c(FRAC_1_SQRT_2, 0.0), c(FRAC_1_SQRT_2, 0.0));
    /// |−⟩
    pub const MINUS: Qubit = Qubit::raw(c(FRAC_1_SQRT_2, 0.0), c(-FRAC_1_SQRT_2, 0.0));
    /// |+i⟩
    pub const PLUS_I: Qubit = Qubit::raw(c(FRAC_1_SQRT_2, 0.0), c(0.0, FRAC_1_SQRT_2));
    /// |−i⟩
    pub const MINUS_I: Qubit = Qubit::raw(c(FRAC_1_SQRT_2, 0.0), c(0.0, -FRAC_1_SQRT_2));

    /// The six axis-aligned basis states
    pub const BASIS: [Qubit; 6] = [
        Qubit::ZERO,
        Qubit::ONE,
        Qubit::PLUS,
        Qubit::MINUS,
        Qubit::PLUS_I,
        Qubit::MINUS_I,
    ];

    const fn raw(a: Complex64, b: Complex64) -> Self {
        Self { a, b }
    }

    /// Build a qubit from amplitudes, normalizing them.
    ///
    /// A zero vector has no direction and falls back to |0⟩.
    pub fn new(a: Complex64, b: Complex64) -> Self {
        let norm = (a.norm_sqr() + b.norm_sqr()).sqrt();
        if norm < EPSILON {
            return Self::ZERO;
        }
        Self {
            a: a / norm,
            b: b / norm,
        }
    }

    /// Point on the Bloch sphere at polar angle `theta` and azimuth `phi`
    pub fn from_bloch(theta: f64, phi: f64) -> Self {
        let half = theta / 2.0;
        Self {
            a: c(half.cos(), 0.0),
            b: Complex64::from_polar(half.sin(), phi),
        }
    }

    /// Uniformly distributed point on the Bloch sphere
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let u: f64 = rng.random();
        let v: f64 = rng.random();
        let theta = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();
        Self::from_bloch(theta, TAU * u)
    }

    pub fn alpha(&self) -> Complex64 {
        self.a
    }

    pub fn beta(&self) -> Complex64 {
        self.b
    }

    /// |α|² + |β|²
    pub fn norm_sqr(&self) -> f64 {
        self.a.norm_sqr() + self.b.norm_sqr()
    }

    pub fn is_normalized(&self) -> bool {
        (self.norm_sqr() - 1.0).abs() < EPSILON
    }

    /// Apply a gate, renormalizing to absorb float drift.
    pub fn apply_gate(&self, gate: &Gate) -> Self {
        let [[m00, m01], [m10, m11]] = gate.matrix();
        Self::new(m00 * self.a + m01 * self.b, m10 * self.a + m11 * self.b)
    }

    /// ⟨self|other⟩
    pub fn inner(&self, other: &Qubit) -> Complex64 {
        self.a.conj() * other.a + self.b.conj() * other.b
    }

    /// Probability that measuring `self` against `base` yields `base`
    pub fn measure_probability(&self, base: &Qubit) -> f64 {
        base.inner(self).norm_sqr().clamp(0.0, 1.0)
    }

    /// |⟨a|b⟩|²
    pub fn fidelity(&self, other: &Qubit) -> f64 {
        self.inner(other).norm_sqr()
    }

    /// Equality up to global phase
    pub fn approx_eq(&self, other: &Qubit) -> bool {
        (1.0 - self.fidelity(other)).abs() < 1e-6
    }

    /// The antipodal state on the Bloch sphere.
    pub fn ortho(&self) -> Self {
        Self::raw(-self.b.conj(), self.a.conj())
    }

    /// Bloch coordinates with `phi` pinned to zero at the poles.
    pub fn bloch(&self) -> BlochCoords {
        let theta = 2.0 * self.a.norm().clamp(0.0, 1.0).acos();
        if theta < EPSILON || PI - theta < EPSILON {
            return BlochCoords::new(theta, 0.0);
        }
        let phi = (self.b.arg() - self.a.arg()).rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU
        let phi = if phi >= TAU { 0.0 } else { phi };
        BlochCoords::new(theta, phi)
    }

    /// Bloch coordinates that keep `prev_phi` near the poles, where the
    /// azimuth would otherwise jump around.
    pub fn bloch_with_hint(&self, prev_phi: f64) -> BlochCoords {
        let coords = self.bloch();
        if coords.theta < POLE_TOLERANCE || PI - coords.theta < POLE_TOLERANCE {
            BlochCoords::new(coords.theta, prev_phi)
        } else {
            coords
        }
    }
}

impl Default for Qubit {
    fn default() -> Self {
        Self::ZERO
    }
}
