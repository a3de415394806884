//! Snapshot module - presentation projection of a session
//!
//! Renderers never see qubit amplitudes or the entangled arena. They get a
//! fixed-size value keyed by position with Bloch coordinates ready to draw.

use serde::Serialize;

use crate::entangled::Half;
use crate::grid::{Grid, Occupant};
use crate::pieces::Piece;
use crate::qubit::Qubit;
use crate::types::{Axis, BlochCoords, Orientation, Phase, Position, BOARD_HEIGHT, BOARD_WIDTH, DECK_SIZE};

/// What a renderer needs to draw a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CellView {
    Qubit { bloch: BlochCoords },
    Entangled { pair: usize, half: Half },
}

/// What a renderer needs to draw a piece, on or off the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PieceView {
    QubitPair {
        first: BlochCoords,
        second: BlochCoords,
        orientation: Orientation,
    },
    Gate {
        axis: Axis,
        turns: u8,
    },
    Measurement {
        base: BlochCoords,
        ortho: BlochCoords,
    },
    Entangled {
        orientation: Orientation,
        anchor_half: Half,
    },
}

impl From<&Piece> for PieceView {
    fn from(piece: &Piece) -> Self {
        match piece {
            Piece::QubitPair(pair) => PieceView::QubitPair {
                first: pair.first.bloch(),
                second: pair.second.bloch(),
                orientation: pair.orientation,
            },
            Piece::Gate(gate) => PieceView::Gate {
                axis: gate.axis(),
                turns: gate.turns(),
            },
            Piece::Measurement(probe) => PieceView::Measurement {
                base: probe.basis().base().bloch(),
                ortho: probe.basis().ortho().bloch(),
            },
            Piece::Entangled(ent) => PieceView::Entangled {
                orientation: ent.orientation,
                anchor_half: ent.anchor_half,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActiveSnapshot {
    pub piece: PieceView,
    pub anchor: Position,
    /// Second cell of two-cell pieces; may be above the board
    pub second: Option<Position>,
}

pub type BoardView = [[Option<CellView>; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub board: BoardView,
    /// Cells matched by the running chain reaction, cleared when it ends
    pub pending_clear: [[bool; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub active: Option<ActiveSnapshot>,
    pub next_queue: [Option<PieceView>; DECK_SIZE],
    pub hold: Option<PieceView>,
    pub can_hold: bool,
    pub phase: Phase,
    pub score: u64,
    pub level: u32,
    pub pieces_this_level: u32,
    pub rate_multiplier: f64,
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            pending_clear: [[false; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            active: None,
            next_queue: [None; DECK_SIZE],
            hold: None,
            can_hold: true,
            phase: Phase::Falling,
            score: 0,
            level: 0,
            pieces_this_level: 0,
            rate_multiplier: 1.0,
        }
    }
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn cell(&self, pos: Position) -> Option<CellView> {
        if Grid::in_bounds(pos) {
            self.board[pos.y as usize][pos.x as usize]
        } else {
            None
        }
    }

    /// Project `grid` into the board view. Qubits near a pole keep the azimuth
    /// the same cell had in the previous projection.
    pub fn write_board(&mut self, grid: &Grid) {
        let mut next: BoardView = [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        for (pos, occupant) in grid.occupied() {
            let (x, y) = (pos.x as usize, pos.y as usize);
            next[y][x] = Some(match occupant {
                Occupant::Qubit(q) => CellView::Qubit {
                    bloch: project(&q, self.board[y][x]),
                },
                Occupant::Entangled { pair, half } => CellView::Entangled { pair, half },
            });
        }
        self.board = next;
    }

    pub fn write_pending(&mut self, pending: &[Position]) {
        self.pending_clear = [[false; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        for pos in pending.iter().filter(|p| Grid::in_bounds(**p)) {
            self.pending_clear[pos.y as usize][pos.x as usize] = true;
        }
    }
}

fn project(q: &Qubit, previous: Option<CellView>) -> BlochCoords {
    match previous {
        Some(CellView::Qubit { bloch }) => q.bloch_with_hint(bloch.phi),
        _ => q.bloch(),
    }
}
