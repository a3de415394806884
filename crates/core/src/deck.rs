//! Deck module - visible lookahead plus a hidden regenerating buffer
//!
//! The visible queue always holds `DECK_SIZE` pieces. Popping the head pulls
//! one replacement from the buffer; an empty buffer is refilled with a
//! shuffled batch dealt by the active level. Changing the level only affects
//! batches dealt afterwards, so the pieces already queued stay put.

use std::collections::VecDeque;

use arrayvec::ArrayVec;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::levels::Level;
use crate::pieces::Piece;
use crate::types::{PieceKind, DECK_SIZE};

#[derive(Debug, Clone)]
pub struct Deck {
    visible: ArrayVec<Piece, DECK_SIZE>,
    buffer: VecDeque<Piece>,
    level: Level,
}

impl Deck {
    /// Open a deck. The opening queue only ever shows qubit pairs.
    pub fn new<R: Rng + ?Sized>(level: Level, rng: &mut R) -> Self {
        let mut visible = ArrayVec::new();
        while !visible.is_full() {
            let pairs = level
                .deal(rng)
                .into_iter()
                .filter(|p| p.kind() == PieceKind::QubitPair);
            for piece in pairs {
                if visible.try_push(piece).is_err() {
                    break;
                }
            }
        }
        let mut deck = Self {
            visible,
            buffer: VecDeque::new(),
            level,
        };
        deck.regenerate(rng);
        deck
    }

    fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut batch = self.level.deal(rng);
        batch.shuffle(rng);
        self.buffer.extend(batch);
    }

    /// Take the head of the queue and top the queue back up.
    pub fn pop<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Piece {
        if self.buffer.is_empty() {
            self.regenerate(rng);
        }
        let head = self.visible.remove(0);
        if let Some(next) = self.buffer.pop_front() {
            self.visible.push(next);
        }
        head
    }

    /// Upcoming pieces, head first
    pub fn peek(&self) -> &[Piece] {
        &self.visible
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Deal future batches from `level`.
    pub fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
