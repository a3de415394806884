//! Bloch-sphere palette
//!
//! The azimuth picks a hue around the wheel red → yellow → green → blue → red;
//! the polar angle fades from black at |0⟩ through that hue at the equator to
//! white at |1⟩.

use std::f64::consts::{PI, TAU};

use crate::fb::Rgb;
use crate::types::BlochCoords;

const HUES: [Rgb; 5] = [
    Rgb::new(0xc4, 0x02, 0x33),
    Rgb::new(0xff, 0xd3, 0x00),
    Rgb::new(0x00, 0x9f, 0x6b),
    Rgb::new(0x00, 0x87, 0xbd),
    Rgb::new(0xc4, 0x02, 0x33),
];

/// Hue for an azimuth in radians
pub fn hue(phi: f64) -> Rgb {
    let t = phi.rem_euclid(TAU) / TAU * (HUES.len() - 1) as f64;
    let i = (t.floor() as usize).min(HUES.len() - 2);
    HUES[i].lerp(HUES[i + 1], t - i as f64)
}

pub fn bloch_color(theta: f64, phi: f64) -> Rgb {
    let t = (theta / PI).clamp(0.0, 1.0);
    let base = hue(phi);
    if t <= 0.5 {
        Rgb::BLACK.lerp(base, t * 2.0)
    } else {
        base.lerp(Rgb::WHITE, (t - 0.5) * 2.0)
    }
}

pub fn coords_color(coords: BlochCoords) -> Rgb {
    bloch_color(coords.theta, coords.phi)
}

/// Foreground that stays readable on `bg`
pub fn contrast(bg: Rgb) -> Rgb {
    if bg.luma() > 140 {
        Rgb::BLACK
    } else {
        Rgb::WHITE
    }
}
