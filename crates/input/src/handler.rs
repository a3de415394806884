//! Key-repeat handler for terminal environments.
//!
//! A press emits its command immediately. While the key stays held, left/right
//! start repeating after 300ms and soft drop after 120ms; both then repeat
//! every 120ms. Terminals that never report key releases are handled by
//! releasing every held key once no key event arrived for a short timeout.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use crossterm::event::KeyCode;

use crate::types::{
    Command, HORIZONTAL_REPEAT_DELAY_MS, INPUT_REPEAT_MS, SOFT_DROP_REPEAT_DELAY_MS,
};

/// Direction for horizontal movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalDirection {
    Left,
    Right,
    None,
}

impl HorizontalDirection {
    fn command(self) -> Option<Command> {
        match self {
            HorizontalDirection::Left => Some(Command::MoveLeft),
            HorizontalDirection::Right => Some(Command::MoveRight),
            HorizontalDirection::None => None,
        }
    }
}

/// Held-time bookkeeping for one repeating key.
#[derive(Debug, Clone, Copy)]
struct RepeatTimer {
    delay_ms: u32,
    interval_ms: u32,
    /// Time until the next repeat fires
    until_next_ms: u32,
}

impl RepeatTimer {
    fn new(delay_ms: u32, interval_ms: u32) -> Self {
        Self {
            delay_ms,
            interval_ms: interval_ms.max(1),
            until_next_ms: delay_ms,
        }
    }

    fn restart(&mut self) {
        self.until_next_ms = self.delay_ms;
    }

    /// Number of repeats due after `elapsed_ms` more of holding.
    fn advance(&mut self, mut elapsed_ms: u32) -> usize {
        let mut fired = 0;
        while elapsed_ms >= self.until_next_ms {
            elapsed_ms -= self.until_next_ms;
            self.until_next_ms = self.interval_ms;
            fired += 1;
        }
        self.until_next_ms -= elapsed_ms;
        fired
    }
}

/// Commands produced by one update
pub type Repeats = ArrayVec<Command, 32>;

#[derive(Debug, Clone)]
pub struct InputHandler {
    horizontal: HorizontalDirection,
    down_held: bool,
    last_key_time: Instant,
    horizontal_timer: RepeatTimer,
    down_timer: RepeatTimer,
    key_release_timeout_ms: u32,
}

const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 150;

fn is_left(code: KeyCode) -> bool {
    matches!(code, KeyCode::Left | KeyCode::Char('a' | 'A' | 'h' | 'H'))
}

fn is_right(code: KeyCode) -> bool {
    matches!(code, KeyCode::Right | KeyCode::Char('d' | 'D' | 'l' | 'L'))
}

fn is_down(code: KeyCode) -> bool {
    matches!(code, KeyCode::Down | KeyCode::Char('s' | 'S' | 'j' | 'J'))
}

impl InputHandler {
    pub fn new() -> Self {
        Self::with_delays(HORIZONTAL_REPEAT_DELAY_MS, SOFT_DROP_REPEAT_DELAY_MS, INPUT_REPEAT_MS)
    }

    pub fn with_delays(horizontal_delay_ms: u32, down_delay_ms: u32, repeat_ms: u32) -> Self {
        Self {
            horizontal: HorizontalDirection::None,
            down_held: false,
            last_key_time: Instant::now(),
            horizontal_timer: RepeatTimer::new(horizontal_delay_ms, repeat_ms),
            down_timer: RepeatTimer::new(down_delay_ms, repeat_ms),
            key_release_timeout_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn key_release_timeout_ms(&self) -> u32 {
        self.key_release_timeout_ms
    }

    /// Register a press of a repeatable key. Returns the command to apply now;
    /// repeated press events of an already held key return `None`.
    pub fn handle_key_press(&mut self, code: KeyCode) -> Option<Command> {
        let direction = if is_left(code) {
            HorizontalDirection::Left
        } else if is_right(code) {
            HorizontalDirection::Right
        } else if is_down(code) {
            self.last_key_time = Instant::now();
            if self.down_held {
                return None;
            }
            self.down_held = true;
            self.down_timer.restart();
            return Some(Command::SoftDrop);
        } else {
            return None;
        };

        self.last_key_time = Instant::now();
        if self.horizontal == direction {
            return None;
        }
        self.horizontal = direction;
        self.horizontal_timer.restart();
        direction.command()
    }

    pub fn handle_key_release(&mut self, code: KeyCode) {
        if (is_left(code) && self.horizontal == HorizontalDirection::Left)
            || (is_right(code) && self.horizontal == HorizontalDirection::Right)
        {
            self.horizontal = HorizontalDirection::None;
        } else if is_down(code) {
            self.down_held = false;
        }
    }

    /// Advance held keys by `elapsed_ms` and collect the repeats that fired.
    pub fn update(&mut self, elapsed_ms: u32) -> Repeats {
        let mut commands = Repeats::new();

        if self.last_key_time.elapsed() > Duration::from_millis(self.key_release_timeout_ms as u64) {
            self.horizontal = HorizontalDirection::None;
            self.down_held = false;
        }

        if let Some(command) = self.horizontal.command() {
            for _ in 0..self.horizontal_timer.advance(elapsed_ms) {
                let _ = commands.try_push(command);
            }
        }
        if self.down_held {
            for _ in 0..self.down_timer.advance(elapsed_ms) {
                let _ = commands.try_push(Command::SoftDrop);
            }
        }

        commands
    }

    pub fn reset(&mut self) {
        self.horizontal = HorizontalDirection::None;
        self.down_held = false;
        self.last_key_time = Instant::now();
        self.horizontal_timer.restart();
        self.down_timer.restart();
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
