//! HF Safety Limiter
//!
//! # Perceptual Contract
//! - **Target Source**: Recombined output, content above ~6 kHz.
//! - **Intended Effect**: Soft-saturate top-octave overshoot left behind by
//!   per-band gain changes.
//! - **Will Not Do**:
//!   - Touch anything below the 6 kHz split.
//!   - Hard clip (the only bounding nonlinearity is `tanh`).

use crate::dsp::Lr4LowPass;

/// Split point (Hz) between the untouched body and the saturated residual.
pub const HF_LIMITER_FREQ_HZ: f32 = 6000.0;

/// Per-channel HF limiter.
#[derive(Debug, Clone, Copy, Default)]
pub struct HfLimiter {
    lowpass: Lr4LowPass,
}

impl HfLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, sr: f32) {
        self.lowpass.update(HF_LIMITER_FREQ_HZ, sr);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let low = self.lowpass.process(input);
        low + (input - low).tanh()
    }

    pub fn reset(&mut self) {
        self.lowpass.reset();
    }

    pub fn is_finite(&self) -> bool {
        self.lowpass.is_finite()
    }
}
