//! Levels module - the campaign curriculum
//!
//! Each level restricts which qubits can appear and what a batch of dealt
//! pieces looks like. Levels are plain data; [`Level::deal`] turns one into a
//! batch of pieces using the session RNG.
//!
//! | # | Kind | Qubit pool | Batch |
//! |---|------|------------|-------|
//! | 0 | Intro | \|0⟩, \|1⟩ | 5 pairs, 1 probe |
//! | 1-3 | Primary (X, Y, Z) | quartet | 10 pairs (every combination), 2 gates, 2 probes |
//! | 4 | PrimaryMixed | six basis states | 5 pairs, 1 half-turn gate, 1 probe |
//! | 5-7 | Secondary (X, Y, Z) | octet | 5 pairs, 1 half-turn gate, 1 probe |
//! | 8 | SecondaryMixed | basis + 12 diagonal states | 5 pairs, 1 gate, 1 probe |
//! | 9 | FreePlay | whole sphere | 4 pairs, 1 gate, 1 probe, 1 entangled pair |

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::gate::Gate;
use crate::pieces::{EntangledPiece, GatePiece, MeasurementPiece, Piece, QubitPair};
use crate::qubit::Qubit;
use crate::types::{Axis, LEVEL_PIECE_THRESHOLD};

/// Qubit pool and batch shape of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    Intro,
    Primary(Axis),
    PrimaryMixed,
    Secondary(Axis),
    SecondaryMixed,
    FreePlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub kind: LevelKind,
    /// QubitPair locks needed to leave this level
    pub piece_count_threshold: u32,
    pub score_multiplier: u64,
}

/// The campaign, in order.
pub const CAMPAIGN: [Level; 10] = [
    Level::new(LevelKind::Intro, 1),
    Level::new(LevelKind::Primary(Axis::X), 2),
    Level::new(LevelKind::Primary(Axis::Y), 3),
    Level::new(LevelKind::Primary(Axis::Z), 4),
    Level::new(LevelKind::PrimaryMixed, 5),
    Level::new(LevelKind::Secondary(Axis::X), 6),
    Level::new(LevelKind::Secondary(Axis::Y), 7),
    Level::new(LevelKind::Secondary(Axis::Z), 8),
    Level::new(LevelKind::SecondaryMixed, 9),
    Level::new(LevelKind::FreePlay, 10),
];

/// Level by index, clamped to the last campaign level.
pub fn level(index: usize) -> Level {
    CAMPAIGN[index.min(CAMPAIGN.len() - 1)]
}

fn start_state(axis: Axis) -> Qubit {
    match axis {
        Axis::X | Axis::Y => Qubit::ZERO,
        Axis::Z => Qubit::PLUS,
    }
}

fn rotations(axis: Axis, step: f64, offset: f64, count: usize) -> impl Iterator<Item = Qubit> {
    let start = start_state(axis);
    (0..count).map(move |k| start.apply_gate(&Gate::rotation(axis, k as f64 * step + offset)))
}

/// Four states a quarter turn apart around `axis`
pub fn quartet(axis: Axis) -> [Qubit; 4] {
    let mut out = [Qubit::ZERO; 4];
    for (slot, q) in out.iter_mut().zip(rotations(axis, FRAC_PI_2, 0.0, 4)) {
        *slot = q;
    }
    out
}

/// Eight states an eighth turn apart around `axis`
pub fn octet(axis: Axis) -> [Qubit; 8] {
    let mut out = [Qubit::ZERO; 8];
    for (slot, q) in out.iter_mut().zip(rotations(axis, FRAC_PI_4, 0.0, 8)) {
        *slot = q;
    }
    out
}

/// The six basis states plus the twelve states halfway between them
pub fn diagonal_pool() -> Vec<Qubit> {
    let mut pool = Qubit::BASIS.to_vec();
    for axis in Axis::ALL {
        pool.extend(rotations(axis, FRAC_PI_2, FRAC_PI_4, 4));
    }
    pool
}

fn pick<R: Rng + ?Sized>(pool: &[Qubit], rng: &mut R) -> Qubit {
    pool.choose(rng).copied().unwrap_or_default()
}

fn random_axis<R: Rng + ?Sized>(rng: &mut R) -> Axis {
    Axis::ALL.choose(rng).copied().unwrap_or(Axis::X)
}

fn random_pairs<R: Rng + ?Sized>(pool: &[Qubit], count: usize, rng: &mut R, out: &mut Vec<Piece>) {
    for _ in 0..count {
        let first = pick(pool, rng);
        let second = pick(pool, rng);
        out.push(QubitPair::new(first, second).into());
    }
}

impl Level {
    pub const fn new(kind: LevelKind, score_multiplier: u64) -> Self {
        Self {
            kind,
            piece_count_threshold: LEVEL_PIECE_THRESHOLD,
            score_multiplier,
        }
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.piece_count_threshold = threshold;
        self
    }

    /// One qubit drawn from this level's pool
    pub fn random_qubit<R: Rng + ?Sized>(&self, rng: &mut R) -> Qubit {
        match self.kind {
            LevelKind::Intro => pick(&[Qubit::ZERO, Qubit::ONE], rng),
            LevelKind::Primary(axis) => pick(&quartet(axis), rng),
            LevelKind::PrimaryMixed => pick(&Qubit::BASIS, rng),
            LevelKind::Secondary(axis) => pick(&octet(axis), rng),
            LevelKind::SecondaryMixed => pick(&diagonal_pool(), rng),
            LevelKind::FreePlay => Qubit::random(rng),
        }
    }

    /// One batch of pieces, unshuffled.
    pub fn deal<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Piece> {
        let mut batch = Vec::with_capacity(16);
        match self.kind {
            LevelKind::Intro => {
                random_pairs(&[Qubit::ZERO, Qubit::ONE], 5, rng, &mut batch);
                batch.push(MeasurementPiece::new(self.random_qubit(rng)).into());
            }
            LevelKind::Primary(axis) => {
                let pool = quartet(axis);
                for i in 0..pool.len() {
                    for j in i..pool.len() {
                        batch.push(QubitPair::new(pool[i], pool[j]).into());
                    }
                }
                for _ in 0..2 {
                    batch.push(GatePiece::new(axis, rng.random_range(1..4)).into());
                }
                batch.push(MeasurementPiece::new(pool[0]).into());
                batch.push(MeasurementPiece::new(pool[1]).into());
            }
            LevelKind::PrimaryMixed => {
                random_pairs(&Qubit::BASIS, 5, rng, &mut batch);
                batch.push(GatePiece::new(random_axis(rng), 2).into());
                batch.push(MeasurementPiece::new(pick(&Qubit::BASIS, rng)).into());
            }
            LevelKind::Secondary(axis) => {
                let pool = octet(axis);
                random_pairs(&pool, 5, rng, &mut batch);
                batch.push(GatePiece::new(axis, 2).into());
                batch.push(MeasurementPiece::new(pick(&pool, rng)).into());
            }
            LevelKind::SecondaryMixed => {
                let pool = diagonal_pool();
                random_pairs(&pool, 5, rng, &mut batch);
                batch.push(GatePiece::random(rng).into());
                batch.push(MeasurementPiece::new(pick(&pool, rng)).into());
            }
            LevelKind::FreePlay => {
                for _ in 0..4 {
                    batch.push(QubitPair::random(rng).into());
                }
                batch.push(GatePiece::random(rng).into());
                batch.push(MeasurementPiece::random(rng).into());
                batch.push(EntangledPiece::new().into());
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::GameRng;
    use qaboom_types::PieceKind;
    use rand::SeedableRng;

    fn count(batch: &[Piece], kind: PieceKind) -> usize {
        batch.iter().filter(|p| p.kind() == kind).count()
    }

    #[test]
    fn test_campaign_multipliers_and_thresholds() {
        for (i, lvl) in CAMPAIGN.iter().enumerate() {
            assert_eq!(lvl.score_multiplier, i as u64 + 1);
            assert_eq!(lvl.piece_count_threshold, LEVEL_PIECE_THRESHOLD);
        }
        assert_eq!(level(99).kind, LevelKind::FreePlay);
    }

    #[test]
    fn test_quartet_is_orthogonal_pairs() {
        let q = quartet(Axis::X);
        assert!(q[0].approx_eq(&Qubit::ZERO));
        assert!(q[2].approx_eq(&Qubit::ONE));
        assert!(q[1].fidelity(&q[3]) < 1e-9);

        let z = quartet(Axis::Z);
        assert!(z[0].approx_eq(&Qubit::PLUS));
        assert!(z[2].approx_eq(&Qubit::MINUS));
    }

    #[test]
    fn test_octet_contains_quartet() {
        let o = octet(Axis::Y);
        let q = quartet(Axis::Y);
        for (i, state) in q.iter().enumerate() {
            assert!(o[2 * i].approx_eq(state));
        }
    }

    #[test]
    fn test_diagonal_pool_size() {
        let pool = diagonal_pool();
        assert_eq!(pool.len(), 18);
        for q in pool {
            assert!(q.is_normalized());
        }
    }

    #[test]
    fn test_batch_shapes() {
        let mut rng = GameRng::seed_from_u64(42);

        let intro = level(0).deal(&mut rng);
        assert_eq!(count(&intro, PieceKind::QubitPair), 5);
        assert_eq!(count(&intro, PieceKind::Measurement), 1);
        assert_eq!(intro.len(), 6);

        let primary = level(1).deal(&mut rng);
        assert_eq!(count(&primary, PieceKind::QubitPair), 10);
        assert_eq!(count(&primary, PieceKind::Gate), 2);
        assert_eq!(count(&primary, PieceKind::Measurement), 2);

        for idx in [4, 5, 8] {
            let batch = level(idx).deal(&mut rng);
            assert_eq!(count(&batch, PieceKind::QubitPair), 5, "level {idx}");
            assert_eq!(count(&batch, PieceKind::Gate), 1, "level {idx}");
            assert_eq!(count(&batch, PieceKind::Measurement), 1, "level {idx}");
        }

        let free = level(9).deal(&mut rng);
        assert_eq!(count(&free, PieceKind::QubitPair), 4);
        assert_eq!(count(&free, PieceKind::Entangled), 1);
        assert_eq!(free.len(), 7);
    }

    #[test]
    fn test_primary_gates_stay_on_axis() {
        let mut rng = GameRng::seed_from_u64(8);
        for _ in 0..20 {
            for piece in level(2).deal(&mut rng) {
                if let Piece::Gate(gate) = piece {
                    assert_eq!(gate.axis(), Axis::Y);
                    assert_ne!(gate.turns(), 0);
                }
            }
        }
    }

    #[test]
    fn test_intro_pool_is_computational_basis() {
        let mut rng = GameRng::seed_from_u64(1);
        for _ in 0..50 {
            let q = level(0).random_qubit(&mut rng);
            assert!(q == Qubit::ZERO || q == Qubit::ONE);
        }
    }
}
