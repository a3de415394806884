//! Game state module - one player session
//!
//! Ties the board, deck, score and level progression together and paces the
//! board's state machine against elapsed time. Everything a session does
//! happens inside [`GameState::tick`] or [`GameState::apply_command`]; there
//! is no background work. Collaborators observe the session through
//! [`GameState::snapshot`] and the events returned by
//! [`GameState::drain_events`].

use log::{debug, info};
use rand::Rng;

use crate::board::{Board, BoardError, LockOutcome};
use crate::config::SessionConfig;
use crate::deck::Deck;
use crate::levels::{self, Level, CAMPAIGN};
use crate::pieces::Piece;
use crate::rng::{clock_seed, seeded, GameRng};
use crate::scoring::{fall_interval_ms, next_rate_multiplier};
use crate::snapshot::{ActiveSnapshot, GameSnapshot, PieceView};
use crate::types::{Command, GameEvent, PieceKind, Phase};

#[derive(Debug, Clone)]
pub struct GameState<R = GameRng> {
    config: SessionConfig,
    rng: R,
    board: Board,
    deck: Deck,
    hold: Option<Piece>,
    can_hold: bool,
    score: u64,
    level: u32,
    /// QubitPair locks since the last level change
    pieces_this_level: u32,
    rate_multiplier: f64,
    accumulator_ms: u32,
    events: Vec<GameEvent>,
    started: bool,
}

impl GameState<GameRng> {
    /// Create a session seeded from `config.seed`, or the clock if unset.
    pub fn new(config: SessionConfig) -> Self {
        let seed = config.seed.unwrap_or_else(clock_seed);
        debug!("new session with seed {seed}");
        Self::with_rng(config, seeded(seed))
    }
}

impl<R: Rng> GameState<R> {
    /// Create a session drawing from `rng`.
    pub fn with_rng(config: SessionConfig, mut rng: R) -> Self {
        let level = config.start_level;
        let deck = Deck::new(level_for(&config, level), &mut rng);
        Self {
            config,
            rng,
            board: Board::new(),
            deck,
            hold: None,
            can_hold: true,
            score: 0,
            level,
            pieces_this_level: 0,
            rate_multiplier: 1.0,
            accumulator_ms: 0,
            events: Vec::new(),
            started: false,
        }
    }

    /// Start the game and spawn the first piece
    pub fn start(&mut self) -> Result<(), BoardError> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        self.spawn_next()?;
        self.events.push(GameEvent::LevelChanged { level: self.level });
        Ok(())
    }

    /// Throw the session away and start over with the same configuration.
    /// The random stream continues where it was.
    pub fn restart(&mut self) -> Result<(), BoardError> {
        let level = self.config.start_level;
        self.board = Board::new();
        self.deck = Deck::new(level_for(&self.config, level), &mut self.rng);
        self.hold = None;
        self.can_hold = true;
        self.score = 0;
        self.level = level;
        self.pieces_this_level = 0;
        self.rate_multiplier = 1.0;
        self.accumulator_ms = 0;
        self.events.clear();
        self.started = false;
        self.start()
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn game_over(&self) -> bool {
        self.board.is_game_over()
    }

    pub fn phase(&self) -> Phase {
        self.board.phase()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn pieces_this_level(&self) -> u32 {
        self.pieces_this_level
    }

    pub fn rate_multiplier(&self) -> f64 {
        self.rate_multiplier
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn hold_piece(&self) -> Option<&Piece> {
        self.hold.as_ref()
    }

    pub fn next_queue(&self) -> &[Piece] {
        self.deck.peek()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for scripted setups.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Descriptor of the level being played
    pub fn current_level(&self) -> Level {
        level_for(&self.config, self.level)
    }

    /// Return and clear pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Interval until the next step in the current phase
    pub fn step_interval_ms(&self) -> u32 {
        match self.board.phase() {
            Phase::Falling => fall_interval_ms(self.config.initial_step_ms, self.rate_multiplier),
            Phase::Locking => 0,
            Phase::Measuring => self.config.measure_step_ms,
            Phase::GravityResolving => self.config.gravity_step_ms,
            Phase::GameOver => u32::MAX,
        }
    }

    /// Advance the session clock.
    ///
    /// Performs at most one step once the current phase's interval has
    /// elapsed. Returns true if a step ran.
    pub fn tick(&mut self, elapsed_ms: u32) -> Result<bool, BoardError> {
        if !self.started || self.game_over() {
            return Ok(false);
        }
        self.accumulator_ms = self.accumulator_ms.saturating_add(elapsed_ms);
        if self.accumulator_ms < self.step_interval_ms() {
            return Ok(false);
        }
        self.accumulator_ms = 0;
        self.step()?;
        Ok(true)
    }

    /// Perform one step of the current phase immediately.
    pub fn step(&mut self) -> Result<(), BoardError> {
        match self.board.phase() {
            Phase::Falling => {
                if !self.board.step_down()? {
                    self.resolve_lock()?;
                }
            }
            Phase::Locking => self.resolve_lock()?,
            Phase::Measuring => self.measure_wave()?,
            Phase::GravityResolving => {
                self.board.gravity_step()?;
            }
            Phase::GameOver => return Ok(()),
        }
        if self.board.phase() == Phase::Falling && self.board.current().is_none() {
            self.spawn_next()?;
        }
        Ok(())
    }

    /// Step until the next piece is falling or the game is over.
    pub fn settle(&mut self) -> Result<(), BoardError> {
        while !self.game_over() && (self.board.phase() != Phase::Falling || self.board.current().is_none()) {
            self.step()?;
        }
        self.accumulator_ms = 0;
        Ok(())
    }

    /// Apply a player command. Returns false if it was rejected or had no
    /// effect.
    pub fn apply_command(&mut self, command: Command) -> bool {
        if !self.started || self.board.phase() != Phase::Falling || self.board.current().is_none() {
            return false;
        }
        match command {
            Command::MoveLeft => self.board.try_move(-1),
            Command::MoveRight => self.board.try_move(1),
            Command::Rotate => self.board.try_rotate(),
            // a blocked drop leaves the board in Locking for the next tick
            Command::SoftDrop => self.board.soft_drop().is_ok(),
            Command::Hold => self.hold(),
        }
    }

    /// Swap the falling piece with the held one, once per spawned piece.
    pub fn hold(&mut self) -> bool {
        if !self.can_hold {
            return false;
        }
        let Some(current) = self.board.take_current() else {
            return false;
        };
        let next = match self.hold.replace(current) {
            Some(held) => held,
            None => self.deck.pop(&mut self.rng),
        };
        if self.board.spawn(next).is_err() {
            return false;
        }
        self.can_hold = false;
        self.accumulator_ms = 0;
        if self.board.is_game_over() {
            self.finish();
        }
        true
    }

    fn spawn_next(&mut self) -> Result<(), BoardError> {
        let piece = self.deck.pop(&mut self.rng);
        debug!("spawning {}", piece.kind().as_str());
        self.board.spawn(piece)?;
        self.can_hold = true;
        if self.board.is_game_over() {
            self.finish();
        }
        Ok(())
    }

    fn resolve_lock(&mut self) -> Result<(), BoardError> {
        let outcome = self.board.resolve_lock()?;
        if let Some(kind) = outcome.kind() {
            self.events.push(GameEvent::PieceLocked { kind });
        }
        if self.board.is_game_over() {
            self.finish();
        } else if outcome == LockOutcome::Placed(PieceKind::QubitPair) {
            self.count_pair_lock();
        }
        Ok(())
    }

    fn measure_wave(&mut self) -> Result<(), BoardError> {
        let multiplier = self.current_level().score_multiplier;
        let wave = self.board.measure_step(&mut self.rng, multiplier)?;
        for cell in &wave.cells {
            self.events.push(GameEvent::QubitMeasured {
                position: cell.position,
                matched: cell.matched,
                resulting: cell.resulting.map(|q| q.bloch()),
            });
        }
        if wave.delta > 0 {
            self.score += wave.delta;
            self.events.push(GameEvent::WaveScored { delta: wave.delta });
        }
        if wave.cleared > 0 {
            self.events.push(GameEvent::BoardCleared { count: wave.cleared });
        }
        Ok(())
    }

    fn count_pair_lock(&mut self) {
        self.pieces_this_level += 1;
        if self.pieces_this_level < self.current_level().piece_count_threshold.max(1) {
            return;
        }
        self.pieces_this_level = 0;
        self.level += 1;
        if (self.level as usize) < CAMPAIGN.len() {
            self.deck.set_level(self.current_level());
        } else {
            self.rate_multiplier = next_rate_multiplier(
                self.rate_multiplier,
                self.config.rate_decay,
                self.config.min_rate_multiplier,
            );
        }
        info!(
            "level {} reached, rate multiplier {:.3}",
            self.level, self.rate_multiplier
        );
        self.events.push(GameEvent::LevelChanged { level: self.level });
    }

    fn finish(&mut self) {
        info!("game over with score {}", self.score);
        self.events.push(GameEvent::GameOver {
            final_score: self.score,
        });
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut out = GameSnapshot::default();
        self.snapshot_into(&mut out);
        out
    }

    /// Refresh `out` in place. Reusing the previous snapshot keeps the Bloch
    /// azimuth of qubits at the poles stable between frames.
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.write_board(self.board.grid());
        out.write_pending(self.board.pending_clear());
        out.active = self.board.current().map(|piece| ActiveSnapshot {
            piece: PieceView::from(piece),
            anchor: self.board.position(),
            second: self.board.second_position(),
        });
        out.next_queue = [None; crate::types::DECK_SIZE];
        for (slot, piece) in out.next_queue.iter_mut().zip(self.deck.peek()) {
            *slot = Some(PieceView::from(piece));
        }
        out.hold = self.hold.as_ref().map(PieceView::from);
        out.can_hold = self.can_hold;
        out.phase = self.board.phase();
        out.score = self.score;
        out.level = self.level;
        out.pieces_this_level = self.pieces_this_level;
        out.rate_multiplier = self.rate_multiplier;
    }
}

fn level_for(config: &SessionConfig, index: u32) -> Level {
    let level = levels::level(index as usize);
    match config.level_threshold {
        Some(threshold) => level.with_threshold(threshold),
        None => level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::{MeasurementPiece, QubitPair};
    use crate::qubit::Qubit;
    use crate::types::{Position, SPAWN_POSITION};

    fn started(seed: u64) -> GameState {
        let mut game = GameState::new(SessionConfig::seeded(seed));
        game.start().unwrap();
        game
    }

    /// Drop the falling piece straight down and resolve everything after it.
    fn land(game: &mut GameState) {
        while game.board_mut().step_down().unwrap() {}
        game.settle().unwrap();
    }

    #[test]
    fn test_start_spawns_and_announces_level() {
        let mut game = started(1);
        assert!(game.board().current().is_some());
        assert_eq!(game.board().position(), SPAWN_POSITION);
        assert_eq!(game.drain_events(), vec![GameEvent::LevelChanged { level: 0 }]);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_first_piece_is_a_pair() {
        let game = started(2);
        assert_eq!(game.board().current().map(Piece::kind), Some(PieceKind::QubitPair));
    }

    #[test]
    fn test_tick_waits_for_interval() {
        let mut game = started(3);
        let y = game.board().position().y;
        assert!(!game.tick(749).unwrap());
        assert_eq!(game.board().position().y, y);
        assert!(game.tick(1).unwrap());
        assert_eq!(game.board().position().y, y + 1);
    }

    #[test]
    fn test_tick_before_start_is_noop() {
        let mut game = GameState::new(SessionConfig::seeded(4));
        assert!(!game.tick(10_000).unwrap());
        assert!(!game.apply_command(Command::MoveLeft));
    }

    #[test]
    fn test_commands_move_piece() {
        let mut game = started(5);
        assert!(game.apply_command(Command::MoveLeft));
        assert_eq!(game.board().position(), Position::new(1, 0));
        assert!(game.apply_command(Command::MoveRight));
        assert!(game.apply_command(Command::Rotate));
        assert!(game.apply_command(Command::SoftDrop));
        assert_eq!(game.board().position().y, 1);
    }

    #[test]
    fn test_hold_once_per_piece() {
        let mut game = started(6);
        let first = *game.board().current().unwrap();
        assert!(game.apply_command(Command::Hold));
        assert_eq!(game.hold_piece(), Some(&first));
        assert_eq!(game.board().position(), SPAWN_POSITION);
        assert!(!game.apply_command(Command::Hold));
    }

    #[test]
    fn test_hold_swaps_back_after_next_spawn() {
        let mut game = started(7);
        let first = *game.board().current().unwrap();
        game.apply_command(Command::Hold);
        let mut steps = 0;
        while !game.can_hold() {
            game.step().unwrap();
            steps += 1;
            assert!(steps < 100);
        }
        assert!(game.apply_command(Command::Hold));
        assert_eq!(game.board().current(), Some(&first));
    }

    #[test]
    fn test_soft_drop_lock_resolves_on_next_tick() {
        let mut game = started(8);
        for _ in 0..11 {
            assert!(game.apply_command(Command::SoftDrop));
        }
        assert_eq!(game.board().position().y, 11);
        assert!(game.apply_command(Command::SoftDrop));
        assert_eq!(game.phase(), Phase::Locking);
        assert!(!game.apply_command(Command::MoveLeft));
        assert!(game.tick(1).unwrap());
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::PieceLocked {
            kind: PieceKind::QubitPair
        }));
    }

    #[test]
    fn test_pair_locks_advance_level() {
        let mut config = SessionConfig::seeded(9);
        config.level_threshold = Some(1);
        let mut game = GameState::new(config);
        game.start().unwrap();
        game.drain_events();

        game.board_mut().take_current();
        game.board_mut()
            .spawn(QubitPair::new(Qubit::ZERO, Qubit::ONE).into())
            .unwrap();
        land(&mut game);

        assert_eq!(game.level(), 1);
        assert_eq!(game.pieces_this_level(), 0);
        assert!(game.drain_events().contains(&GameEvent::LevelChanged { level: 1 }));
        assert_eq!(game.current_level().score_multiplier, 2);
    }

    #[test]
    fn test_levels_past_campaign_speed_up_falling() {
        let mut config = SessionConfig::seeded(10);
        config.level_threshold = Some(1);
        config.start_level = 9;
        let mut game = GameState::new(config);
        game.start().unwrap();

        game.board_mut().take_current();
        game.board_mut()
            .spawn(QubitPair::new(Qubit::ZERO, Qubit::ONE).into())
            .unwrap();
        land(&mut game);

        assert_eq!(game.level(), 10);
        assert!((game.rate_multiplier() - 0.9).abs() < 1e-12);
        assert_eq!(game.step_interval_ms(), 675);
    }

    #[test]
    fn test_measurement_scores_and_clears() {
        let mut game = started(11);
        game.drain_events();
        for y in 9..12 {
            game.board_mut().place_qubit(Position::new(2, y), Qubit::ZERO);
        }
        game.board_mut().take_current();
        game.board_mut()
            .spawn(MeasurementPiece::new(Qubit::ZERO).into())
            .unwrap();
        land(&mut game);

        assert_eq!(game.score(), 6);
        let events = game.drain_events();
        assert_eq!(
            events.iter().filter(|e| matches!(e, GameEvent::WaveScored { .. })).count(),
            3
        );
        assert!(events.contains(&GameEvent::BoardCleared { count: 3 }));
        assert!(events.contains(&GameEvent::PieceLocked {
            kind: PieceKind::Measurement
        }));
        assert!(game.board().grid().is_empty());
    }

    #[test]
    fn test_restart_resets_session() {
        let mut game = started(12);
        game.apply_command(Command::Hold);
        game.restart().unwrap();
        assert_eq!(game.score(), 0);
        assert!(game.hold_piece().is_none());
        assert_eq!(game.drain_events(), vec![GameEvent::LevelChanged { level: 0 }]);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let game = started(13);
        let snap = game.snapshot();
        assert_eq!(snap.phase, Phase::Falling);
        assert!(snap.active.is_some());
        assert!(snap.next_queue.iter().all(Option::is_some));
        assert_eq!(snap.score, 0);
    }
}
