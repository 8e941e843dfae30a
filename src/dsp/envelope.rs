//! Peak Envelope Follower
//!
//! One-pole attack/release smoother over the rectified band signal. The
//! coefficients are shared by every band and channel and only change with
//! the sample rate; each follower keeps nothing but its current level.
//!
//! # Time Constants
//! - **Attack** (2 ms): gain reduction engages within a sibilant's onset.
//! - **Release** (80 ms): recovery is slow enough not to flutter between
//!   syllables.

use crate::dsp::utils::one_pole_coeff;

pub const ATTACK_MS: f32 = 2.0;
pub const RELEASE_MS: f32 = 80.0;

/// Attack/release step sizes for the current sample rate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvelopeCoeffs {
    pub attack: f32,
    pub release: f32,
}

impl EnvelopeCoeffs {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_times(ATTACK_MS, RELEASE_MS, sample_rate)
    }

    pub fn with_times(attack_ms: f32, release_ms: f32, sample_rate: f32) -> Self {
        Self {
            attack: one_pole_coeff(attack_ms, sample_rate),
            release: one_pole_coeff(release_ms, sample_rate),
        }
    }
}

/// Tracked amplitude of one band on one channel (linear).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvelopeFollower {
    level: f32,
}

impl EnvelopeFollower {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn process(&mut self, input: f32, coeffs: &EnvelopeCoeffs) -> f32 {
        let peak = input.abs();
        let coeff = if peak > self.level {
            coeffs.attack
        } else {
            coeffs.release
        };
        self.level += coeff * (peak - self.level);
        self.level
    }

    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    #[inline]
    pub fn reset(&mut self) {
        self.level = 0.0;
    }
}
