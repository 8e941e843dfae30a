//! Biquad Filter Implementation (IIR 2nd Order)
//!
//! Direct Form I second-order section. Coefficients are normalized so that
//! `a0 == 1` and are written only by the design helpers; the history
//! (`x1, x2, y1, y2`) is written only by [`Biquad::process`] or cleared by
//! [`Biquad::reset`].
//!
//! # Design Notes
//! - Direct Form I keeps input and output history separate, so the band
//!   splitter's subtractions see exactly the same recursion on every branch
//! - All operations are safe for the audio thread (no allocations)

use std::f32::consts::{PI, SQRT_2};

/// Biquad filter implementation (IIR 2nd order, Direct Form I)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// A zeroed section. Outputs silence until coefficients are designed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a single sample
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let out = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = out;

        out
    }

    /// Clear filter history. Coefficients are left alone.
    #[inline]
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// True when every history value is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.x2.is_finite() && self.y1.is_finite() && self.y2.is_finite()
    }

    /// Bilinear-transform Butterworth low-pass (Q = 1/sqrt(2)).
    ///
    /// Two of these in series form one half of a Linkwitz-Riley crossover.
    pub fn update_butterworth_lpf(&mut self, cutoff: f32, sr: f32) {
        let omega = 2.0 * PI * cutoff / sr;
        let k = (omega * 0.5).tan();
        let k2 = k * k;
        let norm = 1.0 / (1.0 + SQRT_2 * k + k2);

        self.b0 = k2 * norm;
        self.b1 = 2.0 * k2 * norm;
        self.b2 = k2 * norm;
        self.a1 = 2.0 * (k2 - 1.0) * norm;
        self.a2 = (1.0 - SQRT_2 * k + k2) * norm;
    }

    /// Magnitude response at `freq` (linear), evaluated on the unit circle.
    pub fn magnitude_at(&self, freq: f32, sr: f32) -> f32 {
        let w = 2.0 * PI * freq / sr;
        let (s1, c1) = w.sin_cos();
        let (s2, c2) = (2.0 * w).sin_cos();

        let num_re = self.b0 + self.b1 * c1 + self.b2 * c2;
        let num_im = -(self.b1 * s1 + self.b2 * s2);
        let den_re = 1.0 + self.a1 * c1 + self.a2 * c2;
        let den_im = -(self.a1 * s1 + self.a2 * s2);

        let num = (num_re * num_re + num_im * num_im).sqrt();
        let den = (den_re * den_re + den_im * den_im).sqrt().max(1e-12);
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    #[test]
    fn test_zeroed_section_is_silent() {
        let mut f = Biquad::new();
        for _ in 0..16 {
            assert_eq!(f.process(1.0), 0.0);
        }
    }

    #[test]
    fn test_lpf_unity_dc_gain() {
        let mut f = Biquad::new();
        f.update_butterworth_lpf(2000.0, SR);

        let mut out = 0.0;
        for _ in 0..4800 {
            out = f.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-4, "dc gain {}", out);
    }

    #[test]
    fn test_lpf_half_power_at_cutoff() {
        let mut f = Biquad::new();
        f.update_butterworth_lpf(4000.0, SR);

        let mag = f.magnitude_at(4000.0, SR);
        assert!((mag - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3, "mag {}", mag);
        assert!(f.magnitude_at(16000.0, SR) < 0.1);
    }

    #[test]
    fn test_reset_clears_history_only() {
        let mut f = Biquad::new();
        f.update_butterworth_lpf(7000.0, SR);
        let fresh = f;

        for i in 0..32 {
            f.process((i as f32 * 0.3).sin());
        }
        assert_ne!(f, fresh);

        f.reset();
        assert_eq!(f, fresh);
    }

    #[test]
    fn test_nan_input_is_detected() {
        let mut f = Biquad::new();
        f.update_butterworth_lpf(7000.0, SR);
        assert!(f.is_finite());
        f.process(f32::NAN);
        assert!(!f.is_finite());
    }
}
