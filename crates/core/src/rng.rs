//! RNG module - the session's random source
//!
//! Every random decision of a session (qubit sampling, measurement collapse,
//! deals, shuffles, entangled draws) goes through one generator owned by the
//! session. A fixed seed replays a game exactly.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Default generator of a session
pub type GameRng = Pcg32;

pub fn seeded(seed: u64) -> GameRng {
    GameRng::seed_from_u64(seed)
}

/// Seed derived from the wall clock, for sessions without a configured seed.
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9e37_79b9_7f4a_7c15)
}
