//! Gate module - single-qubit rotation unitaries
//!
//! Gates are rotations about one of the Bloch-sphere axes:
//!
//! - `Rx(θ) = [[c, −is], [−is, c]]`
//! - `Ry(θ) = [[c, −s], [s, c]]`
//! - `Rz(θ) = [[e^{−iθ/2}, 0], [0, e^{iθ/2}]]`
//!
//! with `c = cos(θ/2)` and `s = sin(θ/2)`.

use num_complex::Complex64;

use crate::types::Axis;

/// A 2×2 complex matrix, row-major
pub type Matrix2 = [[Complex64; 2]; 2];

/// An immutable rotation gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gate {
    axis: Axis,
    angle: f64,
}

impl Gate {
    pub fn rotation(axis: Axis, angle: f64) -> Self {
        Self { axis, angle }
    }

    pub fn identity() -> Self {
        Self::rotation(Axis::Z, 0.0)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn matrix(&self) -> Matrix2 {
        let half = self.angle / 2.0;
        let (s, c) = half.sin_cos();
        let zero = Complex64::new(0.0, 0.0);
        match self.axis {
            Axis::X => [
                [Complex64::new(c, 0.0), Complex64::new(0.0, -s)],
                [Complex64::new(0.0, -s), Complex64::new(c, 0.0)],
            ],
            Axis::Y => [
                [Complex64::new(c, 0.0), Complex64::new(-s, 0.0)],
                [Complex64::new(s, 0.0), Complex64::new(c, 0.0)],
            ],
            Axis::Z => [
                [Complex64::from_polar(1.0, -half), zero],
                [zero, Complex64::from_polar(1.0, half)],
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn is_unitary(m: &Matrix2) -> bool {
        // M†M = I
        for i in 0..2 {
            for j in 0..2 {
                let mut sum = Complex64::new(0.0, 0.0);
                for k in 0..2 {
                    sum += m[k][i].conj() * m[k][j];
                }
                let expected = if i == j { 1.0 } else { 0.0 };
                if (sum.re - expected).abs() > 1e-12 || sum.im.abs() > 1e-12 {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn rotations_are_unitary() {
        for axis in Axis::ALL {
            for k in 0..8 {
                let gate = Gate::rotation(axis, k as f64 * PI / 4.0);
                assert!(is_unitary(&gate.matrix()), "{axis:?} {k}");
            }
        }
    }

    #[test]
    fn identity_matrix() {
        let m = Gate::identity().matrix();
        assert!((m[0][0].re - 1.0).abs() < 1e-12);
        assert!((m[1][1].re - 1.0).abs() < 1e-12);
        assert_eq!(m[0][1].norm(), 0.0);
    }
}
