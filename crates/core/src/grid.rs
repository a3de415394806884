//! Grid module - the cell array under the falling piece
//!
//! The grid is a 6x12 array where each cell is empty or holds an occupant.
//! Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) where x ranges 0..5 (left to right) and y ranges 0..11
//! (top to bottom).
//!
//! Reads outside the grid resolve to "no occupant". Callers that need to tell
//! off-board space from empty cells ask [`Grid::in_bounds`] explicitly.

use arrayvec::ArrayVec;

use crate::entangled::Half;
use crate::qubit::Qubit;
use crate::types::{Position, BOARD_HEIGHT, BOARD_SIZE, BOARD_WIDTH};

/// What a grid cell can hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Occupant {
    Qubit(Qubit),
    /// One half of an entangled pair stored in the board's pair arena
    Entangled { pair: usize, half: Half },
}

pub type Cell = Option<Occupant>;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Row-major (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    #[inline(always)]
    fn index(pos: Position) -> Option<usize> {
        if Self::in_bounds(pos) {
            Some(pos.y as usize * BOARD_WIDTH as usize + pos.x as usize)
        } else {
            None
        }
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    #[inline]
    pub fn in_bounds(pos: Position) -> bool {
        pos.x >= 0 && pos.x < BOARD_WIDTH as i8 && pos.y >= 0 && pos.y < BOARD_HEIGHT as i8
    }

    /// Occupant at `pos`; `None` for empty and out-of-range cells alike
    pub fn get(&self, pos: Position) -> Cell {
        Self::index(pos).and_then(|idx| self.cells[idx])
    }

    /// In range and empty
    pub fn is_empty_cell(&self, pos: Position) -> bool {
        matches!(Self::index(pos), Some(idx) if self.cells[idx].is_none())
    }

    /// In range and filled
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.get(pos).is_some()
    }

    /// Write a cell. Returns false if out of bounds.
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match Self::index(pos) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Remove and return the occupant at `pos`.
    pub fn take(&mut self, pos: Position) -> Cell {
        Self::index(pos).and_then(|idx| self.cells[idx].take())
    }

    /// Mutable access to a plain qubit cell
    pub fn qubit_mut(&mut self, pos: Position) -> Option<&mut Qubit> {
        let idx = Self::index(pos)?;
        match &mut self.cells[idx] {
            Some(Occupant::Qubit(q)) => Some(q),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterate over occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Position, Occupant)> + '_ {
        self.cells.iter().enumerate().filter_map(|(idx, cell)| {
            cell.map(|occ| {
                let x = (idx % BOARD_WIDTH as usize) as i8;
                let y = (idx / BOARD_WIDTH as usize) as i8;
                (Position::new(x, y), occ)
            })
        })
    }

    /// Lowest empty row in column `x` that has an occupant somewhere above it.
    fn lowest_gap(&self, x: i8) -> Option<i8> {
        let mut seen_gap = None;
        for y in (0..BOARD_HEIGHT as i8).rev() {
            let pos = Position::new(x, y);
            if self.is_occupied(pos) {
                if seen_gap.is_some() {
                    return seen_gap;
                }
            } else if seen_gap.is_none() {
                seen_gap = Some(y);
            }
        }
        None
    }

    /// One gravity wave: in every column, everything above the lowest gap
    /// drops one row. Gaps are located from the pre-step grid for all columns.
    ///
    /// Returns true if anything moved.
    pub fn gravity_step(&mut self) -> bool {
        let gaps: ArrayVec<(i8, i8), { BOARD_WIDTH as usize }> = (0..BOARD_WIDTH as i8)
            .filter_map(|x| self.lowest_gap(x).map(|gap| (x, gap)))
            .collect();

        for &(x, gap) in &gaps {
            for y in (1..=gap).rev() {
                let above = self.take(Position::new(x, y - 1));
                self.set(Position::new(x, y), above);
            }
        }

        !gaps.is_empty()
    }

    /// Run gravity until nothing moves. Returns the number of waves.
    pub fn compact(&mut self) -> usize {
        let mut waves = 0;
        while self.gravity_step() {
            waves += 1;
        }
        waves
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
