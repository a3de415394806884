//! Terminal front-end for the puzzle.
//!
//! Renders a [`GameSnapshot`](qaboom_core::GameSnapshot) into a simple
//! framebuffer that is diffed and flushed to the terminal with crossterm.
//! Board cells are two columns wide and colored by their Bloch-sphere
//! coordinates.

pub mod fb;
pub mod game_view;
pub mod palette;
pub mod renderer;

pub use qaboom_core as core;
pub use qaboom_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, GameView, Layout, Viewport};
pub use palette::bloch_color;
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
