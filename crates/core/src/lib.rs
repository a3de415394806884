//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the rules of the game: qubit algebra, pieces, the grid
//! and its resolution state machine, the curriculum dealer, scoring, and the
//! tick driver. It has **no dependencies** on terminals, input devices or I/O:
//!
//! - **Deterministic**: all randomness flows through one injected RNG, so a seed replays a game
//! - **Testable**: every phase of the state machine can be stepped by hand
//! - **Portable**: runs the same in the terminal runner, in tests and headless
//!
//! # Module Structure
//!
//! - [`qubit`], [`gate`], [`measurement`], [`entangled`]: single-qubit states,
//!   rotation gates, measurement bases and the Bell-pair primitive
//! - [`pieces`]: the four falling piece kinds
//! - [`grid`]: 6x12 cell array with per-column gravity
//! - [`board`]: falling piece, lock resolution, chain reaction and gravity phases
//! - [`levels`], [`deck`]: campaign curriculum and the lookahead dealer
//! - [`scoring`]: combo scoring and fall-rate scaling
//! - [`game_state`]: a player session paced by elapsed time
//! - [`snapshot`]: presentation projection for renderers
//!
//! # Game Rules
//!
//! - **Pairs** of qubits fall and stack like blocks
//! - **Gates** rotate every qubit around the cell they land on
//! - **Probes** measure their orthogonal neighbours; every match collapses,
//!   scores and spreads the measurement further, one wave at a time
//! - **Matched** qubits are cleared when the chain dies out and columns fall
//!
//! # Example
//!
//! ```
//! use qaboom_core::{GameState, SessionConfig};
//! use qaboom_types::Command;
//!
//! let mut game = GameState::new(SessionConfig::seeded(12345));
//! game.start().unwrap();
//!
//! game.apply_command(Command::MoveLeft);
//! game.apply_command(Command::Rotate);
//! game.tick(16).unwrap();
//!
//! assert_eq!(game.score(), 0);
//! assert!(!game.drain_events().is_empty());
//! ```
//!
//! # Timing
//!
//! - **Falling**: one row every 750ms, scaled by the rate multiplier
//! - **Chain reaction**: one wave every 350ms
//! - **Gravity**: one row every 250ms
//!
//! Call [`GameState::tick`](game_state::GameState::tick) every frame with elapsed time.

pub mod board;
pub mod config;
pub mod deck;
pub mod entangled;
pub mod game_state;
pub mod gate;
pub mod grid;
pub mod levels;
pub mod measurement;
pub mod pieces;
pub mod qubit;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use qaboom_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardError, LockOutcome, Resolution, Wave};
pub use config::SessionConfig;
pub use deck::Deck;
pub use entangled::{EntangledPair, Half};
pub use game_state::GameState;
pub use gate::Gate;
pub use grid::{Grid, Occupant};
pub use levels::{Level, LevelKind, CAMPAIGN};
pub use measurement::MeasurementBasis;
pub use pieces::{EntangledPiece, GatePiece, MeasurementPiece, Piece, QubitPair};
pub use qubit::Qubit;
pub use rng::GameRng;
pub use snapshot::{ActiveSnapshot, CellView, GameSnapshot, PieceView};
