//! Linkwitz-Riley (LR4) low-pass
//!
//! Two identical Butterworth sections in series give a 24 dB/oct low-pass
//! that is -6 dB at the cutoff. Its complement `input - lowpass` is used as
//! the matching high-pass, so low + high always sums back to the input.

use crate::dsp::Biquad;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lr4LowPass {
    stage1: Biquad,
    stage2: Biquad,
}

impl Lr4LowPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Design both stages for `cutoff` at `sr`. History is not touched.
    pub fn update(&mut self, cutoff: f32, sr: f32) {
        self.stage1.update_butterworth_lpf(cutoff, sr);
        self.stage2.update_butterworth_lpf(cutoff, sr);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let s1 = self.stage1.process(input);
        self.stage2.process(s1)
    }

    #[inline]
    pub fn reset(&mut self) {
        self.stage1.reset();
        self.stage2.reset();
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.stage1.is_finite() && self.stage2.is_finite()
    }

    /// Cascade magnitude (linear) at `freq`.
    pub fn magnitude_at(&self, freq: f32, sr: f32) -> f32 {
        self.stage1.magnitude_at(freq, sr) * self.stage2.magnitude_at(freq, sr)
    }
}
