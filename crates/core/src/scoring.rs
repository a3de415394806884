//! Scoring module - chain-reaction combo scoring and fall-rate scaling
//!
//! The only source of points is the chain reaction. The n-th match of a chain
//! is worth `n × multiplier`, so a chain of k matches totals
//! `k(k+1)/2 × multiplier`. Gates and plain placements score nothing.

/// Points for the `n`-th match of a chain (1-based)
pub fn qubit_score(n: u64, multiplier: u64) -> u64 {
    n.saturating_mul(multiplier)
}

/// 1 + 2 + ... + k
pub fn triangular(k: u64) -> u64 {
    k.saturating_mul(k + 1) / 2
}

/// Total for a chain of `k` matches
pub fn chain_total(k: u64, multiplier: u64) -> u64 {
    triangular(k).saturating_mul(multiplier)
}

/// Fall-rate multiplier after one more level past the end of the campaign.
pub fn next_rate_multiplier(rate: f64, decay: f64, floor: f64) -> f64 {
    (rate * decay).max(floor)
}

/// Falling step interval for a rate multiplier, in milliseconds.
pub fn fall_interval_ms(base_ms: u32, rate: f64) -> u32 {
    ((base_ms as f64) * rate).round().max(1.0) as u32
}
