//! Band Compressor
//!
//! # Perceptual Contract
//! - **Target Source**: One sibilance band, both channels.
//! - **Intended Effect**: Downward gain above the shared threshold, falling by
//!   `1/RATIO` dB per dB of overshoot, blended toward unity by the band's amount.
//! - **Will Not Do**:
//!   - Boost (gain is clamped to 1.0).
//!   - Attenuate beyond -40 dB (gain is clamped to 0.01).
//!
//! # Detection
//! The band engages when the louder channel's envelope crosses the threshold.
//! Once engaged, each channel's gain is computed from its own envelope, so
//! the quieter side of a wide image is reduced less.

use crate::dsp::envelope::{EnvelopeCoeffs, EnvelopeFollower};
use crate::dsp::utils::DB_EPS;

/// Fixed ratio. Gain in dB is `-(overshoot dB) / RATIO`.
pub const RATIO: f32 = 4.0;
/// Gain floor (linear). Must not change: bounds worst-case attenuation.
pub const MIN_GAIN: f32 = 0.01;

/// Raw gain reduction for an envelope above threshold, before blending.
#[inline]
pub fn raw_gain(env: f32, threshold: f32) -> f32 {
    (env / threshold).powf(-1.0 / RATIO)
}

/// Gain for one channel once the band is engaged.
///
/// `amount` linearly interpolates between unity (0.0) and the full
/// reduction (1.0).
#[inline]
pub fn blended_gain(env: f32, threshold: f32, amount: f32) -> f32 {
    if env < DB_EPS {
        return 1.0;
    }
    let gr = raw_gain(env, threshold);
    (1.0 + (gr - 1.0) * amount).clamp(MIN_GAIN, 1.0)
}

/// Stereo compressor for one band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandCompressor {
    env_l: EnvelopeFollower,
    env_r: EnvelopeFollower,
    gain_l: f32,
    gain_r: f32,
}

impl Default for BandCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl BandCompressor {
    pub fn new() -> Self {
        Self {
            env_l: EnvelopeFollower::new(),
            env_r: EnvelopeFollower::new(),
            gain_l: 1.0,
            gain_r: 1.0,
        }
    }

    /// Track both envelopes and return the compressed pair.
    #[inline]
    pub fn process(
        &mut self,
        input_l: f32,
        input_r: f32,
        amount: f32,
        threshold: f32,
        coeffs: &EnvelopeCoeffs,
    ) -> (f32, f32) {
        let env_l = self.env_l.process(input_l, coeffs);
        let env_r = self.env_r.process(input_r, coeffs);

        let max_env = env_l.max(env_r);
        if max_env > DB_EPS && max_env > threshold {
            self.gain_l = blended_gain(env_l, threshold, amount);
            self.gain_r = blended_gain(env_r, threshold, amount);
        } else {
            self.gain_l = 1.0;
            self.gain_r = 1.0;
        }

        (input_l * self.gain_l, input_r * self.gain_r)
    }

    /// Gains applied on the last processed sample (left, right).
    pub fn gains(&self) -> (f32, f32) {
        (self.gain_l, self.gain_r)
    }

    pub fn envelopes(&self) -> (f32, f32) {
        (self.env_l.level(), self.env_r.level())
    }

    pub fn reset(&mut self) {
        self.env_l.reset();
        self.env_r.reset();
        self.gain_l = 1.0;
        self.gain_r = 1.0;
    }

    pub fn is_finite(&self) -> bool {
        self.env_l.level().is_finite() && self.env_r.level().is_finite()
    }
}
