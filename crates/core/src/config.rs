//! Session configuration
//!
//! All fields have defaults, so a partial JSON document or an empty
//! environment yields a playable session.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{
    GRAVITY_STEP_MS, INITIAL_STEP_MS, MEASURE_STEP_MS, MIN_RATE_MULTIPLIER, RATE_DECAY,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,
    /// Campaign level to start at
    pub start_level: u32,
    pub initial_step_ms: u32,
    pub measure_step_ms: u32,
    pub gravity_step_ms: u32,
    /// Fall-rate factor applied per level past the end of the campaign
    pub rate_decay: f64,
    pub min_rate_multiplier: f64,
    /// Overrides every level's piece-count threshold when set
    pub level_threshold: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start_level: 0,
            initial_step_ms: INITIAL_STEP_MS,
            measure_step_ms: MEASURE_STEP_MS,
            gravity_step_ms: GRAVITY_STEP_MS,
            rate_decay: RATE_DECAY,
            min_rate_multiplier: MIN_RATE_MULTIPLIER,
            level_threshold: None,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl SessionConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Defaults overridden by `QABOOM_SEED`, `QABOOM_START_LEVEL` and
    /// `QABOOM_LEVEL_THRESHOLD`.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply the environment on top of an existing configuration.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(seed) = env_parse("QABOOM_SEED") {
            self.seed = Some(seed);
        }
        if let Some(level) = env_parse("QABOOM_START_LEVEL") {
            self.start_level = level;
        }
        if let Some(threshold) = env_parse("QABOOM_LEVEL_THRESHOLD") {
            self.level_threshold = Some(threshold);
        }
        self
    }
}
