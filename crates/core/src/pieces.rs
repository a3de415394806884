//! Pieces module - the four kinds of falling piece
//!
//! Pieces are a closed enum; board logic matches on the variant instead of
//! inspecting types at runtime. A piece carries no position: the board owns
//! the anchor cell of whatever is currently falling.
//!
//! - [`QubitPair`]: two qubits occupying two adjacent cells
//! - [`GatePiece`]: a rotation applied to the neighbours of its landing cell
//! - [`MeasurementPiece`]: a probe that starts a chain reaction
//! - [`EntangledPiece`]: two halves of one Bell pair, placed like a qubit pair
//!
//! Rotation here only changes the piece itself. Whether a rotation is legal
//! where the piece currently sits is decided by the board.

use std::f64::consts::FRAC_PI_2;

use rand::Rng;

use crate::entangled::{EntangledPair, Half};
use crate::gate::Gate;
use crate::measurement::MeasurementBasis;
use crate::qubit::Qubit;
use crate::types::{Axis, Orientation, PieceKind, Position};

/// Two qubits. `first` sits at the anchor; `second` above it (vertical) or to
/// its right (horizontal).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QubitPair {
    pub first: Qubit,
    pub second: Qubit,
    pub orientation: Orientation,
}

impl QubitPair {
    pub fn new(first: Qubit, second: Qubit) -> Self {
        Self {
            first,
            second,
            orientation: Orientation::Vertical,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let first = Qubit::random(rng);
        let second = Qubit::random(rng);
        Self::new(first, second)
    }

    /// Toggle orientation. Going horizontal → vertical swaps the qubits so the
    /// pair turns around the anchor instead of flipping over.
    pub fn rotate(&mut self) {
        if self.orientation == Orientation::Horizontal {
            std::mem::swap(&mut self.first, &mut self.second);
        }
        self.orientation = self.orientation.toggled();
    }
}

/// A rotation gate piece. Its angle is `turns · π/2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatePiece {
    axis: Axis,
    turns: u8,
}

impl GatePiece {
    pub fn new(axis: Axis, turns: u8) -> Self {
        Self {
            axis,
            turns: turns % 4,
        }
    }

    /// Random axis and a non-trivial angle
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let axis = Axis::ALL[rng.random_range(0..Axis::ALL.len())];
        Self::new(axis, rng.random_range(1..4))
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn turns(&self) -> u8 {
        self.turns
    }

    pub fn angle(&self) -> f64 {
        self.turns as f64 * FRAC_PI_2
    }

    pub fn gate(&self) -> Gate {
        Gate::rotation(self.axis, self.angle())
    }

    /// Add π/2, wrapping at 2π
    pub fn rotate(&mut self) {
        self.turns = (self.turns + 1) % 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementPiece {
    basis: MeasurementBasis,
}

impl MeasurementPiece {
    pub fn new(base: Qubit) -> Self {
        Self {
            basis: MeasurementBasis::new(base),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(Qubit::random(rng))
    }

    pub fn basis(&self) -> &MeasurementBasis {
        &self.basis
    }

    pub fn flip(&mut self) {
        self.basis.flip();
    }
}

/// Both halves of a fresh entangled pair, falling together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntangledPiece {
    pub pair: EntangledPair,
    pub orientation: Orientation,
    /// Half placed at the anchor cell
    pub anchor_half: Half,
}

impl EntangledPiece {
    pub fn new() -> Self {
        Self {
            pair: EntangledPair::bell(),
            orientation: Orientation::Vertical,
            anchor_half: Half::First,
        }
    }

    pub fn rotate(&mut self) {
        if self.orientation == Orientation::Horizontal {
            self.anchor_half = self.anchor_half.other();
        }
        self.orientation = self.orientation.toggled();
    }
}

impl Default for EntangledPiece {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Piece {
    QubitPair(QubitPair),
    Gate(GatePiece),
    Measurement(MeasurementPiece),
    Entangled(EntangledPiece),
}

impl Piece {
    pub fn kind(&self) -> PieceKind {
        match self {
            Piece::QubitPair(_) => PieceKind::QubitPair,
            Piece::Gate(_) => PieceKind::Gate,
            Piece::Measurement(_) => PieceKind::Measurement,
            Piece::Entangled(_) => PieceKind::Entangled,
        }
    }

    /// Orientation of two-cell pieces
    pub fn orientation(&self) -> Option<Orientation> {
        match self {
            Piece::QubitPair(pair) => Some(pair.orientation),
            Piece::Entangled(piece) => Some(piece.orientation),
            Piece::Gate(_) | Piece::Measurement(_) => None,
        }
    }

    /// Offset of the second cell from the anchor, for two-cell pieces
    pub fn second_offset(&self) -> Option<Position> {
        self.orientation().map(Orientation::second_offset)
    }

    /// Rotate the piece in place, ignoring the board.
    pub fn rotate(&mut self) {
        match self {
            Piece::QubitPair(pair) => pair.rotate(),
            Piece::Gate(gate) => gate.rotate(),
            Piece::Measurement(probe) => probe.flip(),
            Piece::Entangled(piece) => piece.rotate(),
        }
    }
}

impl From<QubitPair> for Piece {
    fn from(pair: QubitPair) -> Self {
        Piece::QubitPair(pair)
    }
}

impl From<GatePiece> for Piece {
    fn from(gate: GatePiece) -> Self {
        Piece::Gate(gate)
    }
}

impl From<MeasurementPiece> for Piece {
    fn from(probe: MeasurementPiece) -> Self {
        Piece::Measurement(probe)
    }
}

impl From<EntangledPiece> for Piece {
    fn from(piece: EntangledPiece) -> Self {
        Piece::Entangled(piece)
    }
}
