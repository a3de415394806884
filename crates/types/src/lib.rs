//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types shared by the engine and its
//! collaborators (terminal view, input mapping, event consumers). Everything
//! here is plain data: no quantum math and no game rules.
//!
//! # Board Dimensions
//!
//! - **Width**: 6 columns (indexed 0-5)
//! - **Height**: 12 rows (indexed 0-11, row 0 is the top)
//! - **Spawn cell**: (2, 0)
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval of the terminal runner |
//! | `INITIAL_STEP_MS` | 750 | Falling step interval at rate multiplier 1.0 |
//! | `MEASURE_STEP_MS` | 350 | Interval between chain-reaction waves |
//! | `GRAVITY_STEP_MS` | 250 | Interval between gravity waves |
//! | `INPUT_REPEAT_MS` | 120 | Auto-repeat interval of held keys |
//!
//! # Examples
//!
//! ```
//! use qaboom_types::{Axis, Command, Orientation, Position, BOARD_WIDTH, BOARD_HEIGHT};
//!
//! assert_eq!(Command::from_str("moveLeft"), Some(Command::MoveLeft));
//! assert_eq!(Axis::from_str("z"), Some(Axis::Z));
//! assert_eq!(Orientation::Vertical.toggled(), Orientation::Horizontal);
//! assert_eq!(Position::new(2, 3) + Position::UP, Position::new(2, 2));
//!
//! assert_eq!(BOARD_WIDTH, 6);
//! assert_eq!(BOARD_HEIGHT, 12);
//! ```

use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Board width in cells (6 columns)
pub const BOARD_WIDTH: u8 = 6;

/// Board height in cells (12 rows)
pub const BOARD_HEIGHT: u8 = 12;

/// Total number of cells on the board
pub const BOARD_SIZE: usize = BOARD_WIDTH as usize * BOARD_HEIGHT as usize;

/// Cell where every new piece enters the board
pub const SPAWN_POSITION: Position = Position::new((BOARD_WIDTH / 2 - 1) as i8, 0);

/// Number of upcoming pieces visible in the deck
pub const DECK_SIZE: usize = 4;

/// QubitPair locks needed to advance one level
pub const LEVEL_PIECE_THRESHOLD: u32 = 16;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Falling step interval at rate multiplier 1.0
pub const INITIAL_STEP_MS: u32 = 750;

/// Interval between chain-reaction waves
pub const MEASURE_STEP_MS: u32 = 350;

/// Interval between gravity waves
pub const GRAVITY_STEP_MS: u32 = 250;

/// Fall-rate factor applied per level gained after the last curriculum level
pub const RATE_DECAY: f64 = 0.9;

/// Lower bound of the fall-rate multiplier
pub const MIN_RATE_MULTIPLIER: f64 = 0.2;

/// Delay before a held left/right key starts repeating
pub const HORIZONTAL_REPEAT_DELAY_MS: u32 = 300;

/// Delay before a held soft-drop key starts repeating
pub const SOFT_DROP_REPEAT_DELAY_MS: u32 = 120;

/// Auto-repeat interval of held keys
pub const INPUT_REPEAT_MS: u32 = 120;


/// A grid coordinate. `x` grows to the right, `y` grows downward; row 0 is the
/// top of the board. Negative rows are above the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i8,
    pub y: i8,
}

impl Position {
    pub const UP: Position = Position::new(0, -1);
    pub const DOWN: Position = Position::new(0, 1);
    pub const LEFT: Position = Position::new(-1, 0);
    pub const RIGHT: Position = Position::new(1, 0);

    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// The four orthogonally adjacent positions (up, down, left, right).
    pub fn orthogonal_neighbors(self) -> [Position; 4] {
        [
            self + Self::UP,
            self + Self::DOWN,
            self + Self::LEFT,
            self + Self::RIGHT,
        ]
    }

    /// The eight positions surrounding this one.
    pub fn moore_neighbors(self) -> [Position; 8] {
        let mut out = [self; 8];
        let mut i = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                out[i] = Position::new(self.x + dx, self.y + dy);
                i += 1;
            }
        }
        out
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Rotation axis of a single-qubit gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Parse axis from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "z" => Some(Axis::Z),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

/// Orientation of a two-cell piece.
///
/// - **Vertical**: the second cell sits directly above the anchor
/// - **Horizontal**: the second cell sits directly right of the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Horizontal => Orientation::Vertical,
        }
    }

    /// Offset of the second cell relative to the anchor.
    pub fn second_offset(self) -> Position {
        match self {
            Orientation::Vertical => Position::UP,
            Orientation::Horizontal => Position::RIGHT,
        }
    }
}

/// The kinds of falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PieceKind {
    QubitPair,
    Gate,
    Measurement,
    Entangled,
}

impl PieceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::QubitPair => "qubitPair",
            PieceKind::Gate => "gate",
            PieceKind::Measurement => "measurement",
            PieceKind::Entangled => "entangled",
        }
    }
}

/// Abstract player commands.
///
/// Input devices are translated into these by collaborators; the engine never
/// sees raw keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down, locking it if it cannot descend
    SoftDrop,
    /// Rotate a pair, rotate a gate's angle, or flip a measurement basis
    Rotate,
    /// Swap the current piece with the held piece
    Hold,
}

impl Command {
    /// Parse command from string
    ///
    /// # Examples
    ///
    /// ```
    /// use qaboom_types::Command;
    ///
    /// assert_eq!(Command::from_str("softDrop"), Some(Command::SoftDrop));
    /// assert_eq!(Command::from_str("ROTATE"), Some(Command::Rotate));
    /// assert_eq!(Command::from_str("hardDrop"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(Command::MoveLeft),
            "moveright" => Some(Command::MoveRight),
            "softdrop" => Some(Command::SoftDrop),
            "rotate" => Some(Command::Rotate),
            "hold" => Some(Command::Hold),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::MoveLeft => "moveLeft",
            Command::MoveRight => "moveRight",
            Command::SoftDrop => "softDrop",
            Command::Rotate => "rotate",
            Command::Hold => "hold",
        }
    }
}

/// Resolution state of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// A piece is falling and accepts commands
    #[default]
    Falling,
    /// One-shot resolution of the piece that just landed
    Locking,
    /// Chain reaction in progress, one wave per step
    Measuring,
    /// Columns compacting, one row per step
    GravityResolving,
    /// Terminal state
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Falling => "falling",
            Phase::Locking => "locking",
            Phase::Measuring => "measuring",
            Phase::GravityResolving => "gravity",
            Phase::GameOver => "gameOver",
        }
    }
}

/// Bloch-sphere coordinates of a qubit.
///
/// `theta` is the polar angle in `[0, π]` (0 = |0⟩, π = |1⟩) and `phi` the
/// azimuth in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BlochCoords {
    pub theta: f64,
    pub phi: f64,
}

impl BlochCoords {
    pub const fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }
}

/// Lifecycle events surfaced to collaborators (renderers, audio, persistence).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameEvent {
    /// A piece finished falling and was resolved
    PieceLocked { kind: PieceKind },
    /// A grid cell was measured during a chain reaction.
    ///
    /// `resulting` is `None` for entangled halves, which have no single-qubit state.
    QubitMeasured {
        position: Position,
        matched: bool,
        resulting: Option<BlochCoords>,
    },
    /// Points awarded by one chain-reaction wave
    WaveScored { delta: u64 },
    /// Measured cells were removed from the grid
    BoardCleared { count: u32 },
    /// The player reached a new level
    LevelChanged { level: u32 },
    /// The session ended
    GameOver { final_score: u64 },
}
