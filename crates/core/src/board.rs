//! Board module - grid, falling piece and the resolution state machine
//!
//! ```text
//! Falling ──lands──▶ Locking ──pair──────▶ GravityResolving ──settled──▶ Falling
//!                       │    ──gate──────▶ Falling
//!                       │    ──probe─────▶ Measuring ──exhausted──▶ GravityResolving
//!                       └────topped out──▶ GameOver
//! ```
//!
//! Each phase-specific operation performs at most one step so the caller can
//! pace the chain reaction and gravity and render in between. Calling an
//! operation in the wrong phase is a bug in the caller and returns
//! [`BoardError::WrongPhase`]. Player moves are never errors: an illegal move
//! or rotation is a silent no-op.

use arrayvec::ArrayVec;
use log::debug;
use rand::Rng;
use thiserror::Error;

use crate::entangled::EntangledPair;
use crate::grid::{Grid, Occupant};
use crate::measurement::MeasurementBasis;
use crate::pieces::Piece;
use crate::qubit::Qubit;
use crate::scoring::qubit_score;
use crate::types::{
    Orientation, Phase, PieceKind, Position, BOARD_HEIGHT, BOARD_SIZE, BOARD_WIDTH, SPAWN_POSITION,
};

/// Invariant violations raised by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("{operation} requires phase {expected:?}, board is in {actual:?}")]
    WrongPhase {
        operation: &'static str,
        expected: Phase,
        actual: Phase,
    },
    #[error("{operation} requires an active piece")]
    NoActivePiece { operation: &'static str },
    #[error("spawn while a piece is still in play")]
    PieceInPlay,
    #[error("lock at {position:?} overlaps an occupied cell")]
    Overlap { position: Position },
}

/// What happened when the landed piece was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// A two-cell piece was written into the grid
    Placed(PieceKind),
    /// A gate was applied to this many occupied neighbours
    GateApplied { affected: u8 },
    /// A probe landed and the chain reaction is armed
    MeasurementStarted,
    /// The piece would stick out above the board; nothing was written
    ToppedOut,
}

impl LockOutcome {
    pub fn kind(&self) -> Option<PieceKind> {
        match self {
            LockOutcome::Placed(kind) => Some(*kind),
            LockOutcome::GateApplied { .. } => Some(PieceKind::Gate),
            LockOutcome::MeasurementStarted => Some(PieceKind::Measurement),
            LockOutcome::ToppedOut => None,
        }
    }
}

/// One collapsed cell of a chain-reaction wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredCell {
    pub position: Position,
    pub matched: bool,
    /// State after collapse; `None` for entangled halves
    pub resulting: Option<Qubit>,
}

/// Result of one `measure_step` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wave {
    pub cells: Vec<MeasuredCell>,
    /// Points earned by the matches of this wave
    pub delta: u64,
    /// Cells removed; non-zero only on the exhausting wave
    pub cleared: u32,
    pub exhausted: bool,
}

impl Wave {
    pub fn matches(&self) -> usize {
        self.cells.iter().filter(|c| c.matched).count()
    }
}

/// Totals of a synchronous resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    pub score: u64,
    pub cleared: u32,
    pub waves: u32,
    pub gravity_steps: u32,
}

/// Working sets of the chain reaction in progress.
#[derive(Debug, Clone)]
struct ChainState {
    basis: MeasurementBasis,
    frontier: ArrayVec<Position, BOARD_SIZE>,
    visited: [bool; BOARD_SIZE],
    measured: ArrayVec<Position, BOARD_SIZE>,
    matched: u64,
}

impl ChainState {
    fn new(basis: MeasurementBasis, origin: Position) -> Self {
        let mut frontier = ArrayVec::new();
        frontier.push(origin);
        Self {
            basis,
            frontier,
            visited: [false; BOARD_SIZE],
            measured: ArrayVec::new(),
            matched: 0,
        }
    }

    fn visit(&mut self, pos: Position) -> bool {
        let idx = pos.y as usize * BOARD_WIDTH as usize + pos.x as usize;
        !std::mem::replace(&mut self.visited[idx], true)
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    /// Arena of entangled pairs referenced by grid occupants. A slot is
    /// emptied once neither half remains in the grid and is reused by the
    /// next entangled lock.
    pairs: Vec<Option<EntangledPair>>,
    current: Option<Piece>,
    position: Position,
    phase: Phase,
    chain: Option<ChainState>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            grid: Grid::new(),
            pairs: Vec::new(),
            current: None,
            position: SPAWN_POSITION,
            phase: Phase::Falling,
            chain: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access for scripted setups.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn current(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    /// Anchor cell of the current piece
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn pair(&self, index: usize) -> Option<&EntangledPair> {
        self.pairs.get(index)?.as_ref()
    }

    /// Number of live entangled pairs
    pub fn pair_count(&self) -> usize {
        self.pairs.iter().filter(|slot| slot.is_some()).count()
    }

    fn alloc_pair(&mut self, pair: EntangledPair) -> usize {
        match self.pairs.iter().position(Option::is_none) {
            Some(index) => {
                self.pairs[index] = Some(pair);
                index
            }
            None => {
                self.pairs.push(Some(pair));
                self.pairs.len() - 1
            }
        }
    }

    /// Free a pair slot once no grid cell refers to it.
    fn release_pair_if_orphaned(&mut self, index: usize) {
        let referenced = self
            .grid
            .occupied()
            .any(|(_, occ)| matches!(occ, Occupant::Entangled { pair, .. } if pair == index));
        if !referenced {
            if let Some(slot) = self.pairs.get_mut(index) {
                *slot = None;
            }
        }
    }

    /// Place a qubit directly into the grid.
    pub fn place_qubit(&mut self, pos: Position, qubit: Qubit) -> bool {
        self.grid.set(pos, Some(Occupant::Qubit(qubit)))
    }

    /// Cells measured so far by the running chain reaction
    pub fn pending_clear(&self) -> &[Position] {
        self.chain.as_ref().map_or(&[], |chain| chain.measured.as_slice())
    }

    /// Where the second cell of the current piece sits, if it has one
    pub fn second_position(&self) -> Option<Position> {
        let offset = self.current.as_ref()?.second_offset()?;
        Some(self.position + offset)
    }

    fn expect_phase(&self, operation: &'static str, expected: Phase) -> Result<(), BoardError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(BoardError::WrongPhase {
                operation,
                expected,
                actual: self.phase,
            })
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!("board phase {} -> {}", self.phase.as_str(), phase.as_str());
            self.phase = phase;
        }
    }

    /// Bring a new piece in at the spawn cell.
    ///
    /// The board tops out if the spawn cell is already taken.
    pub fn spawn(&mut self, piece: Piece) -> Result<(), BoardError> {
        self.spawn_at(piece, SPAWN_POSITION)
    }

    /// Bring a new piece in at an arbitrary anchor.
    pub fn spawn_at(&mut self, piece: Piece, position: Position) -> Result<(), BoardError> {
        self.expect_phase("spawn", Phase::Falling)?;
        if self.current.is_some() {
            return Err(BoardError::PieceInPlay);
        }
        if self.grid.is_occupied(position) {
            debug!("spawn cell {position:?} occupied");
            self.set_phase(Phase::GameOver);
            return Ok(());
        }
        self.current = Some(piece);
        self.position = position;
        Ok(())
    }

    /// Remove the falling piece (used by hold).
    pub fn take_current(&mut self) -> Option<Piece> {
        if self.phase != Phase::Falling {
            return None;
        }
        self.current.take()
    }

    /// Second cell of a two-cell piece may sit above the board but must
    /// otherwise be inside the walls, above the floor and free.
    fn second_cell_free(&self, pos: Position) -> bool {
        if pos.x < 0 || pos.x >= BOARD_WIDTH as i8 || pos.y >= BOARD_HEIGHT as i8 {
            return false;
        }
        pos.y < 0 || self.grid.is_empty_cell(pos)
    }

    fn fits(&self, piece: &Piece, anchor: Position) -> bool {
        if !self.grid.is_empty_cell(anchor) {
            return false;
        }
        match piece.second_offset() {
            Some(offset) => self.second_cell_free(anchor + offset),
            None => true,
        }
    }

    /// Shift the falling piece horizontally. Returns false if illegal.
    pub fn try_move(&mut self, dx: i8) -> bool {
        if self.phase != Phase::Falling {
            return false;
        }
        let Some(piece) = self.current.as_ref() else {
            return false;
        };
        let target = Position::new(self.position.x + dx, self.position.y);
        if !self.fits(piece, target) {
            return false;
        }
        self.position = target;
        true
    }

    /// Rotate the falling piece, kicking off the right wall when needed.
    pub fn try_rotate(&mut self) -> bool {
        if self.phase != Phase::Falling {
            return false;
        }
        let anchor = self.position;
        let Some(piece) = self.current.as_mut() else {
            return false;
        };

        match piece.orientation() {
            None => {
                piece.rotate();
                true
            }
            Some(Orientation::Vertical) => {
                let candidates = [anchor, anchor + Position::LEFT, anchor + Position::LEFT + Position::UP];
                let grid = &self.grid;
                let fits = |a: Position| grid.is_empty_cell(a) && grid.is_empty_cell(a + Position::RIGHT);
                let Some(target) = candidates.into_iter().find(|&a| fits(a)) else {
                    return false;
                };
                piece.rotate();
                self.position = target;
                true
            }
            Some(Orientation::Horizontal) => {
                if self.grid.is_occupied(anchor + Position::UP) {
                    return false;
                }
                piece.rotate();
                true
            }
        }
    }

    /// Whether the falling piece rests on something.
    pub fn is_blocked_below(&self) -> bool {
        let below = self.position + Position::DOWN;
        if below.y >= BOARD_HEIGHT as i8 || self.grid.is_occupied(below) {
            return true;
        }
        matches!(
            self.current.as_ref().and_then(Piece::orientation),
            Some(Orientation::Horizontal) if self.grid.is_occupied(below + Position::RIGHT)
        )
    }

    /// One falling step: move down, or enter `Locking` if blocked.
    ///
    /// Returns true if the piece moved.
    pub fn step_down(&mut self) -> Result<bool, BoardError> {
        self.expect_phase("step_down", Phase::Falling)?;
        if self.current.is_none() {
            return Err(BoardError::NoActivePiece {
                operation: "step_down",
            });
        }
        if self.is_blocked_below() {
            self.set_phase(Phase::Locking);
            return Ok(false);
        }
        self.position = self.position + Position::DOWN;
        Ok(true)
    }

    /// Player-driven descent; same rules as the timed step.
    pub fn soft_drop(&mut self) -> Result<bool, BoardError> {
        self.step_down()
    }

    /// Resolve the piece that just landed.
    pub fn resolve_lock(&mut self) -> Result<LockOutcome, BoardError> {
        self.expect_phase("resolve_lock", Phase::Locking)?;
        let piece = self.current.ok_or(BoardError::NoActivePiece {
            operation: "resolve_lock",
        })?;
        let anchor = self.position;

        let outcome = match piece {
            Piece::QubitPair(pair) => {
                let Some(second) = self.two_cell_target(anchor, pair.orientation)? else {
                    return Ok(LockOutcome::ToppedOut);
                };
                self.grid.set(anchor, Some(Occupant::Qubit(pair.first)));
                self.grid.set(second, Some(Occupant::Qubit(pair.second)));
                self.finish_placement(PieceKind::QubitPair)
            }
            Piece::Entangled(ent) => {
                let Some(second) = self.two_cell_target(anchor, ent.orientation)? else {
                    return Ok(LockOutcome::ToppedOut);
                };
                let index = self.alloc_pair(ent.pair);
                let half = ent.anchor_half;
                self.grid.set(anchor, Some(Occupant::Entangled { pair: index, half }));
                self.grid.set(
                    second,
                    Some(Occupant::Entangled {
                        pair: index,
                        half: half.other(),
                    }),
                );
                self.finish_placement(PieceKind::Entangled)
            }
            Piece::Gate(gate_piece) => {
                let gate = gate_piece.gate();
                let mut affected = 0;
                for pos in anchor.moore_neighbors() {
                    if let Some(q) = self.grid.qubit_mut(pos) {
                        *q = q.apply_gate(&gate);
                        affected += 1;
                    } else if let Some(Occupant::Entangled { pair, half }) = self.grid.get(pos) {
                        if let Some(shared) = self.pairs.get_mut(pair).and_then(Option::as_mut) {
                            shared.apply_gate(half, &gate);
                        }
                        affected += 1;
                    }
                }
                debug!("gate {:?} applied to {affected} cells", gate.axis());
                self.current = None;
                self.set_phase(Phase::Falling);
                LockOutcome::GateApplied { affected }
            }
            Piece::Measurement(probe) => {
                self.chain = Some(ChainState::new(*probe.basis(), anchor));
                self.current = None;
                self.set_phase(Phase::Measuring);
                LockOutcome::MeasurementStarted
            }
        };
        Ok(outcome)
    }

    /// Second cell of a landing two-cell piece. `None` means the piece sticks
    /// out above the board and the game is over.
    fn two_cell_target(&mut self, anchor: Position, orientation: Orientation) -> Result<Option<Position>, BoardError> {
        let second = anchor + orientation.second_offset();
        if second.y < 0 {
            self.current = None;
            self.set_phase(Phase::GameOver);
            return Ok(None);
        }
        for pos in [anchor, second] {
            if !self.grid.is_empty_cell(pos) {
                return Err(BoardError::Overlap { position: pos });
            }
        }
        Ok(Some(second))
    }

    fn finish_placement(&mut self, kind: PieceKind) -> LockOutcome {
        self.current = None;
        if self.grid.is_occupied(SPAWN_POSITION) {
            self.set_phase(Phase::GameOver);
        } else {
            self.set_phase(Phase::GravityResolving);
        }
        LockOutcome::Placed(kind)
    }

    /// One chain-reaction wave.
    ///
    /// Every unvisited occupied orthogonal neighbour of the frontier is
    /// collapsed exactly once. Matches score `n × multiplier` where `n` is the
    /// running match count and form the next frontier. A wave without matches
    /// clears every matched cell and hands over to gravity.
    pub fn measure_step<R: Rng + ?Sized>(&mut self, rng: &mut R, multiplier: u64) -> Result<Wave, BoardError> {
        self.expect_phase("measure_step", Phase::Measuring)?;
        let Some(chain) = self.chain.as_mut() else {
            return Err(BoardError::NoActivePiece {
                operation: "measure_step",
            });
        };

        let mut wave = Wave::default();
        let mut next: ArrayVec<Position, BOARD_SIZE> = ArrayVec::new();
        let frontier = std::mem::take(&mut chain.frontier);

        for origin in frontier {
            for pos in origin.orthogonal_neighbors() {
                let Some(occupant) = self.grid.get(pos) else {
                    continue;
                };
                if !chain.visit(pos) {
                    continue;
                }
                let (matched, resulting) = match occupant {
                    Occupant::Qubit(q) => {
                        let (collapsed, matched) = chain.basis.collapse(&q, rng);
                        self.grid.set(pos, Some(Occupant::Qubit(collapsed)));
                        (matched, Some(collapsed))
                    }
                    Occupant::Entangled { pair, .. } => {
                        let matched = self
                            .pairs
                            .get(pair)
                            .and_then(Option::as_ref)
                            .is_some_and(|p| p.measure_half(rng));
                        (matched, None)
                    }
                };
                if matched {
                    chain.matched += 1;
                    wave.delta += qubit_score(chain.matched, multiplier);
                    chain.measured.push(pos);
                    next.push(pos);
                }
                wave.cells.push(MeasuredCell {
                    position: pos,
                    matched,
                    resulting,
                });
            }
        }

        if next.is_empty() {
            let mut touched_pairs: ArrayVec<usize, BOARD_SIZE> = ArrayVec::new();
            for &pos in &chain.measured {
                if let Some(Occupant::Entangled { pair, .. }) = self.grid.take(pos) {
                    if !touched_pairs.contains(&pair) {
                        touched_pairs.push(pair);
                    }
                }
            }
            wave.cleared = chain.measured.len() as u32;
            wave.exhausted = true;
            debug!(
                "chain exhausted after {} matches, clearing {} cells",
                chain.matched, wave.cleared
            );
            self.chain = None;
            for pair in touched_pairs {
                self.release_pair_if_orphaned(pair);
            }
            self.set_phase(Phase::GravityResolving);
        } else {
            debug!("wave matched {} cells, +{}", next.len(), wave.delta);
            chain.frontier = next;
        }
        Ok(wave)
    }

    /// One gravity wave. A wave that moves nothing returns to `Falling`.
    pub fn gravity_step(&mut self) -> Result<bool, BoardError> {
        self.expect_phase("gravity_step", Phase::GravityResolving)?;
        let moved = self.grid.gravity_step();
        if !moved {
            self.set_phase(Phase::Falling);
        }
        Ok(moved)
    }

    /// Run lock, chain reaction and gravity to completion in one call.
    pub fn resolve_to_rest<R: Rng + ?Sized>(&mut self, rng: &mut R, multiplier: u64) -> Result<Resolution, BoardError> {
        let mut totals = Resolution::default();
        loop {
            match self.phase {
                Phase::Falling | Phase::GameOver => return Ok(totals),
                Phase::Locking => {
                    self.resolve_lock()?;
                }
                Phase::Measuring => {
                    let wave = self.measure_step(rng, multiplier)?;
                    totals.score += wave.delta;
                    totals.cleared += wave.cleared;
                    totals.waves += 1;
                }
                Phase::GravityResolving => {
                    if self.gravity_step()? {
                        totals.gravity_steps += 1;
                    }
                }
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entangled::Half;
    use crate::pieces::{EntangledPiece, GatePiece, MeasurementPiece, QubitPair};
    use crate::rng::GameRng;
    use crate::types::Axis;
    use rand::SeedableRng;

    fn pair() -> Piece {
        Piece::from(QubitPair::new(Qubit::ZERO, Qubit::ONE))
    }

    fn drop_to_rest(board: &mut Board) {
        while board.step_down().unwrap() {}
    }

    #[test]
    fn new_board_is_falling_and_empty() {
        let board = Board::new();
        assert_eq!(board.phase(), Phase::Falling);
        assert!(board.current().is_none());
        assert!(board.grid().is_empty());
    }

    #[test]
    fn spawn_places_piece_at_spawn_cell() {
        let mut board = Board::new();
        board.spawn(pair()).unwrap();
        assert_eq!(board.position(), SPAWN_POSITION);
        assert_eq!(board.second_position(), Some(Position::new(2, -1)));
    }

    #[test]
    fn spawn_twice_is_an_error() {
        let mut board = Board::new();
        board.spawn(pair()).unwrap();
        assert_eq!(board.spawn(pair()), Err(BoardError::PieceInPlay));
    }

    #[test]
    fn spawn_on_occupied_cell_is_game_over() {
        let mut board = Board::new();
        board.place_qubit(SPAWN_POSITION, Qubit::ZERO);
        board.spawn(pair()).unwrap();
        assert!(board.is_game_over());
        assert!(board.current().is_none());
    }

    #[test]
    fn move_stops_at_walls() {
        let mut board = Board::new();
        board.spawn(pair()).unwrap();
        while board.try_move(-1) {}
        assert_eq!(board.position().x, 0);
        while board.try_move(1) {}
        assert_eq!(board.position().x, BOARD_WIDTH as i8 - 1);
    }

    #[test]
    fn move_blocked_by_occupied_cell() {
        let mut board = Board::new();
        board.place_qubit(Position::new(3, 0), Qubit::ONE);
        board.spawn(pair()).unwrap();
        assert!(!board.try_move(1));
        assert_eq!(board.position(), SPAWN_POSITION);
    }

    #[test]
    fn rotate_against_right_wall_kicks_left() {
        let mut board = Board::new();
        board.spawn_at(pair(), Position::new(5, 4)).unwrap();
        assert!(board.try_rotate());
        assert_eq!(board.position(), Position::new(4, 4));
        assert_eq!(board.current().and_then(Piece::orientation), Some(Orientation::Horizontal));
    }

    #[test]
    fn rotate_kicks_up_when_left_is_blocked() {
        let mut board = Board::new();
        board.place_qubit(Position::new(4, 4), Qubit::ZERO);
        board.spawn_at(pair(), Position::new(5, 4)).unwrap();
        assert!(board.try_rotate());
        assert_eq!(board.position(), Position::new(4, 3));
    }

    #[test]
    fn rotate_rejected_when_no_kick_fits() {
        let mut board = Board::new();
        board.place_qubit(Position::new(4, 4), Qubit::ZERO);
        board.place_qubit(Position::new(4, 3), Qubit::ZERO);
        board.spawn_at(pair(), Position::new(5, 4)).unwrap();
        assert!(!board.try_rotate());
        assert_eq!(board.position(), Position::new(5, 4));
        assert_eq!(board.current().and_then(Piece::orientation), Some(Orientation::Vertical));
    }

    #[test]
    fn horizontal_to_vertical_blocked_above() {
        let mut board = Board::new();
        board.spawn_at(pair(), Position::new(1, 5)).unwrap();
        assert!(board.try_rotate());
        board.place_qubit(Position::new(1, 4), Qubit::ZERO);
        assert!(!board.try_rotate());
    }

    #[test]
    fn gate_rotation_ignores_board() {
        let mut board = Board::new();
        board.spawn(Piece::from(GatePiece::new(Axis::X, 0))).unwrap();
        assert!(board.try_rotate());
        match board.current() {
            Some(Piece::Gate(gate)) => assert_eq!(gate.turns(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn pair_falls_and_locks_on_floor() {
        let mut board = Board::new();
        board.spawn(pair()).unwrap();
        drop_to_rest(&mut board);
        assert_eq!(board.phase(), Phase::Locking);
        assert_eq!(board.position().y, BOARD_HEIGHT as i8 - 1);

        let outcome = board.resolve_lock().unwrap();
        assert_eq!(outcome, LockOutcome::Placed(PieceKind::QubitPair));
        assert_eq!(board.phase(), Phase::GravityResolving);
        assert_eq!(board.grid().get(Position::new(2, 11)), Some(Occupant::Qubit(Qubit::ZERO)));
        assert_eq!(board.grid().get(Position::new(2, 10)), Some(Occupant::Qubit(Qubit::ONE)));

        assert!(!board.gravity_step().unwrap());
        assert_eq!(board.phase(), Phase::Falling);
    }

    #[test]
    fn horizontal_pair_rests_on_either_cell() {
        let mut board = Board::new();
        board.place_qubit(Position::new(3, 11), Qubit::ZERO);
        board.spawn(pair()).unwrap();
        board.try_rotate();
        drop_to_rest(&mut board);
        assert_eq!(board.position(), Position::new(2, 10));
    }

    #[test]
    fn pair_above_board_tops_out_without_mutation() {
        let mut board = Board::new();
        board.place_qubit(Position::new(2, 1), Qubit::ZERO);
        board.spawn(pair()).unwrap();
        assert!(!board.step_down().unwrap());
        let before = board.grid().clone();
        assert_eq!(board.resolve_lock().unwrap(), LockOutcome::ToppedOut);
        assert!(board.is_game_over());
        assert_eq!(board.grid(), &before);
    }

    #[test]
    fn lock_filling_spawn_cell_is_game_over() {
        let mut board = Board::new();
        board.place_qubit(Position::new(2, 2), Qubit::ZERO);
        board.spawn(pair()).unwrap();
        drop_to_rest(&mut board);
        board.resolve_lock().unwrap();
        assert!(board.is_game_over());
        assert!(board.grid().is_occupied(SPAWN_POSITION));
    }

    #[test]
    fn wrong_phase_is_reported() {
        let mut board = Board::new();
        let mut rng = GameRng::seed_from_u64(0);
        assert_eq!(
            board.measure_step(&mut rng, 1),
            Err(BoardError::WrongPhase {
                operation: "measure_step",
                expected: Phase::Measuring,
                actual: Phase::Falling,
            })
        );
        assert!(matches!(board.resolve_lock(), Err(BoardError::WrongPhase { .. })));
        assert!(matches!(board.gravity_step(), Err(BoardError::WrongPhase { .. })));
        assert_eq!(
            board.step_down(),
            Err(BoardError::NoActivePiece {
                operation: "step_down"
            })
        );
    }

    #[test]
    fn probe_on_matching_column_clears_it() {
        let mut board = Board::new();
        let mut rng = GameRng::seed_from_u64(3);
        for y in 7..12 {
            board.place_qubit(Position::new(2, y), Qubit::ZERO);
        }
        board.spawn(Piece::from(MeasurementPiece::new(Qubit::ZERO))).unwrap();
        drop_to_rest(&mut board);
        assert_eq!(board.position(), Position::new(2, 6));
        assert_eq!(board.resolve_lock().unwrap(), LockOutcome::MeasurementStarted);

        let mut deltas = Vec::new();
        loop {
            let wave = board.measure_step(&mut rng, 2).unwrap();
            if wave.exhausted {
                assert_eq!(wave.cleared, 5);
                break;
            }
            assert_eq!(wave.matches(), 1);
            deltas.push(wave.delta);
            assert_eq!(board.pending_clear().len(), deltas.len());
        }
        assert_eq!(deltas, vec![2, 4, 6, 8, 10]);
        assert!(board.grid().is_empty());
        assert_eq!(board.phase(), Phase::GravityResolving);
    }

    #[test]
    fn unmatched_neighbour_keeps_its_state_and_stops_chain() {
        let mut board = Board::new();
        let mut rng = GameRng::seed_from_u64(5);
        board.place_qubit(Position::new(2, 11), Qubit::ONE);
        board.spawn(Piece::from(MeasurementPiece::new(Qubit::ZERO))).unwrap();
        drop_to_rest(&mut board);
        board.resolve_lock().unwrap();

        let wave = board.measure_step(&mut rng, 1).unwrap();
        assert!(wave.exhausted);
        assert_eq!(wave.delta, 0);
        assert_eq!(wave.cleared, 0);
        assert_eq!(wave.cells.len(), 1);
        assert!(!wave.cells[0].matched);
        match board.grid().get(Position::new(2, 11)) {
            Some(Occupant::Qubit(q)) => assert!(q.approx_eq(&Qubit::ONE)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn gate_rotates_all_eight_moore_neighbours_only() {
        let mut board = Board::new();
        let center = Position::new(2, 10);
        let ring = center.moore_neighbors();
        for pos in ring {
            board.place_qubit(pos, Qubit::PLUS);
        }
        let far = [Position::new(0, 10), Position::new(5, 11)];
        for pos in far {
            board.place_qubit(pos, Qubit::PLUS);
        }
        board.spawn_at(Piece::from(GatePiece::new(Axis::Z, 2)), center).unwrap();
        drop_to_rest(&mut board);
        assert_eq!(board.position(), center);
        assert_eq!(board.resolve_lock().unwrap(), LockOutcome::GateApplied { affected: 8 });
        assert_eq!(board.phase(), Phase::Falling);
        assert!(board.current().is_none());
        assert!(board.grid().is_empty_cell(center));

        for pos in ring {
            match board.grid().get(pos) {
                Some(Occupant::Qubit(q)) => assert!(q.approx_eq(&Qubit::MINUS), "{pos:?}"),
                other => panic!("unexpected {other:?}"),
            }
        }
        for pos in far {
            assert_eq!(board.grid().get(pos), Some(Occupant::Qubit(Qubit::PLUS)));
        }
    }

    fn locked_entangled_column(rng: &mut GameRng) -> Board {
        let mut board = Board::new();
        board.spawn(Piece::from(EntangledPiece::new())).unwrap();
        drop_to_rest(&mut board);
        board.resolve_to_rest(rng, 1).unwrap();
        assert_eq!(board.phase(), Phase::Falling);
        board
    }

    #[test]
    fn gate_acts_on_one_entangled_half_through_the_arena() {
        let mut rng = GameRng::seed_from_u64(2);
        let mut board = locked_entangled_column(&mut rng);
        board.place_qubit(Position::new(3, 11), Qubit::ZERO);
        board.place_qubit(Position::new(3, 10), Qubit::ZERO);
        board.spawn_at(Piece::from(GatePiece::new(Axis::X, 2)), Position::new(3, 0)).unwrap();
        drop_to_rest(&mut board);
        assert_eq!(board.position(), Position::new(3, 9));

        // Only the upper half at (2, 10) touches (3, 9).
        assert_eq!(board.resolve_lock().unwrap(), LockOutcome::GateApplied { affected: 2 });
        assert_eq!(
            board.grid().get(Position::new(2, 10)),
            Some(Occupant::Entangled { pair: 0, half: Half::Second })
        );
        assert_eq!(
            board.grid().get(Position::new(2, 11)),
            Some(Occupant::Entangled { pair: 0, half: Half::First })
        );

        // I ⊗ X maps (|00⟩ + |11⟩)/√2 onto |01⟩ and |10⟩ up to phase.
        let pair = board.pair(0).unwrap();
        assert!((pair.norm_sqr() - 1.0).abs() < 1e-9);
        let amps = pair.amplitudes();
        assert!(amps[0].norm_sqr() < 1e-9);
        assert!((amps[1].norm_sqr() - 0.5).abs() < 1e-9);
        assert!((amps[2].norm_sqr() - 0.5).abs() < 1e-9);
        assert!(amps[3].norm_sqr() < 1e-9);
    }

    #[test]
    fn measurement_draws_entangled_halves_with_a_coin_flip() {
        let mut untouched = 0;
        let mut partner_left = 0;
        let mut both_cleared = 0;
        for seed in 0..64 {
            let mut rng = GameRng::seed_from_u64(seed);
            let mut board = locked_entangled_column(&mut rng);
            board.spawn(Piece::from(MeasurementPiece::new(Qubit::ZERO))).unwrap();
            drop_to_rest(&mut board);
            assert_eq!(board.position(), Position::new(2, 9));
            board.resolve_lock().unwrap();

            let mut matched = Vec::new();
            loop {
                let wave = board.measure_step(&mut rng, 1).unwrap();
                for cell in &wave.cells {
                    assert_eq!(cell.resulting, None);
                    if cell.matched {
                        matched.push(cell.position);
                    }
                }
                if wave.exhausted {
                    assert_eq!(wave.cleared as usize, matched.len());
                    break;
                }
            }

            let upper = board.grid().get(Position::new(2, 10));
            let lower = board.grid().get(Position::new(2, 11));
            match matched.as_slice() {
                [] => {
                    untouched += 1;
                    assert_eq!(upper, Some(Occupant::Entangled { pair: 0, half: Half::Second }));
                    assert_eq!(lower, Some(Occupant::Entangled { pair: 0, half: Half::First }));
                    assert!((board.pair(0).unwrap().norm_sqr() - 1.0).abs() < 1e-9);
                }
                [only] => {
                    partner_left += 1;
                    assert_eq!(*only, Position::new(2, 10));
                    assert_eq!(upper, None);
                    assert_eq!(lower, Some(Occupant::Entangled { pair: 0, half: Half::First }));
                    assert!((board.pair(0).unwrap().norm_sqr() - 1.0).abs() < 1e-9);
                }
                [_, _] => {
                    both_cleared += 1;
                    assert!(board.grid().is_empty());
                    assert!(board.pair(0).is_none());
                }
                other => panic!("unexpected matches {other:?}"),
            }
        }
        assert!(untouched > 0);
        assert!(partner_left > 0);
        assert!(both_cleared > 0);
    }

    #[test]
    fn cleared_pair_slot_is_reused() {
        let (mut board, mut rng) = (0..64)
            .find_map(|seed| {
                let mut rng = GameRng::seed_from_u64(seed);
                let mut board = locked_entangled_column(&mut rng);
                board.spawn(Piece::from(MeasurementPiece::new(Qubit::ZERO))).unwrap();
                drop_to_rest(&mut board);
                board.resolve_to_rest(&mut rng, 1).unwrap();
                board.grid().is_empty().then_some((board, rng))
            })
            .expect("some seed clears both halves");
        assert_eq!(board.pair_count(), 0);

        board.spawn(Piece::from(EntangledPiece::new())).unwrap();
        drop_to_rest(&mut board);
        board.resolve_to_rest(&mut rng, 1).unwrap();
        assert_eq!(board.pair_count(), 1);
        assert_eq!(
            board.grid().get(Position::new(2, 11)),
            Some(Occupant::Entangled { pair: 0, half: Half::First })
        );
        assert_eq!(board.pair(0), Some(&EntangledPair::bell()));
    }

    #[test]
    fn lock_onto_occupied_cell_is_an_overlap_error() {
        let mut board = Board::new();
        board.spawn(pair()).unwrap();
        drop_to_rest(&mut board);
        assert_eq!(board.phase(), Phase::Locking);
        board
            .grid_mut()
            .set(Position::new(2, 10), Some(Occupant::Qubit(Qubit::ONE)));
        assert_eq!(
            board.resolve_lock(),
            Err(BoardError::Overlap {
                position: Position::new(2, 10)
            })
        );
    }

    #[test]
    fn entangled_piece_locks_into_arena() {
        let mut board = Board::new();
        board.spawn(Piece::from(EntangledPiece::new())).unwrap();
        drop_to_rest(&mut board);
        assert_eq!(board.resolve_lock().unwrap(), LockOutcome::Placed(PieceKind::Entangled));
        assert_eq!(
            board.grid().get(Position::new(2, 11)),
            Some(Occupant::Entangled { pair: 0, half: Half::First })
        );
        assert_eq!(
            board.grid().get(Position::new(2, 10)),
            Some(Occupant::Entangled { pair: 0, half: Half::Second })
        );
        assert!(board.pair(0).is_some());
    }

    #[test]
    fn resolve_to_rest_drains_chain_and_gravity() {
        let mut board = Board::new();
        let mut rng = GameRng::seed_from_u64(11);
        board.place_qubit(Position::new(1, 11), Qubit::ZERO);
        board.place_qubit(Position::new(1, 10), Qubit::ZERO);
        board.place_qubit(Position::new(1, 9), Qubit::ONE);
        board.spawn_at(Piece::from(MeasurementPiece::new(Qubit::ZERO)), Position::new(0, 0)).unwrap();
        drop_to_rest(&mut board);

        let totals = board.resolve_to_rest(&mut rng, 1).unwrap();
        assert_eq!(totals.score, 3);
        assert_eq!(totals.cleared, 2);
        assert_eq!(board.phase(), Phase::Falling);
        match board.grid().get(Position::new(1, 11)) {
            Some(Occupant::Qubit(q)) => assert!(q.approx_eq(&Qubit::ONE)),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(board.grid().occupied_count(), 1);
    }
}
