//! Terminal runner (default binary).
//!
//! Reads a session config from the JSON file named by `QABOOM_CONFIG` (if
//! set) plus `QABOOM_*` overrides, then runs a fixed 16 ms tick loop: poll
//! crossterm events, feed the repeat handler, tick the session, log emitted
//! events and render. Logs go to the file named by `QABOOM_LOG_PATH` since the
//! terminal is in raw alternate-screen mode.

use std::env;
use std::fs::{self, File};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use log::{debug, info, LevelFilter};

use qaboom::core::{GameSnapshot, GameState, SessionConfig};
use qaboom::input::{handle_key_event, should_quit, should_restart, InputHandler};
use qaboom::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use qaboom::types::{Command, TICK_MS};

fn main() -> Result<()> {
    init_logging()?;
    let config = load_config()?;
    info!("starting session with {config:?}");

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging() -> Result<()> {
    let Ok(path) = env::var("QABOOM_LOG_PATH") else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("creating log file {path}"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .filter_module("crossterm", LevelFilter::Warn)
        .try_init()?;
    Ok(())
}

fn load_config() -> Result<SessionConfig> {
    let config = match env::var("QABOOM_CONFIG") {
        Ok(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))?
        }
        Err(_) => SessionConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn run(term: &mut TerminalRenderer, config: SessionConfig) -> Result<()> {
    let mut game = GameState::new(config);
    game.start()?;

    let view = GameView::default();
    let mut input = InputHandler::new();
    let mut snapshot = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        game.snapshot_into(&mut snapshot);
        view.render_into(&snapshot, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press => {
                        if should_quit(key) {
                            return Ok(());
                        }
                        if should_restart(key) {
                            game.restart()?;
                            input.reset();
                            continue;
                        }
                        if let Some(command) = input.handle_key_press(key.code) {
                            game.apply_command(command);
                        } else if let Some(command) = handle_key_event(key) {
                            // Movement keys are owned by the repeat handler.
                            if matches!(command, Command::Rotate | Command::Hold) {
                                game.apply_command(command);
                            }
                        }
                    }
                    // Terminal auto-repeat is ignored; the handler repeats internally.
                    KeyEventKind::Repeat => {}
                    KeyEventKind::Release => input.handle_key_release(key.code),
                },
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            for command in input.update(TICK_MS) {
                game.apply_command(command);
            }
            game.tick(TICK_MS)?;
            for event in game.drain_events() {
                match serde_json::to_string(&event) {
                    Ok(json) => info!("{json}"),
                    Err(err) => debug!("unserializable event {event:?}: {err}"),
                }
            }
        }
    }
}
