//! Multiband De-Esser
//!
//! Per-sample pipeline, per channel:
//!
//! ```text
//! split -> compress bands 1..4 (stereo-linked trigger) -> body + bands -> [HF limiter] -> out
//! ```
//!
//! # Lifecycle
//! - **Uninitialized**: no sample rate yet; `process` leaves audio untouched.
//! - **Prepared**: coefficients designed, all history and envelopes zeroed.
//! - **Running**: after the first processed block. `reset` returns to
//!   Prepared without redesigning; `prepare` with a new rate redesigns first.
//!
//! Parameters are a per-block snapshot. Nothing here allocates, locks or
//! loops over data-dependent lengths inside a sample.

use crate::dsp::band_split::{BandSplitter, NUM_BANDS};
use crate::dsp::compressor::BandCompressor;
use crate::dsp::envelope::EnvelopeCoeffs;
use crate::dsp::limiter::HfLimiter;
use crate::dsp::utils::db_to_gain;
use crate::ds_log;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DspState {
    Uninitialized,
    Prepared,
    Running,
}

/// Filter state owned by one channel. No state is shared across channels.
#[derive(Debug, Clone, Copy, Default)]
struct ChannelStrip {
    splitter: BandSplitter,
    hf_limiter: HfLimiter,
}

impl ChannelStrip {
    fn update(&mut self, sr: f32) {
        self.splitter.update(sr);
        self.hf_limiter.update(sr);
    }

    fn reset(&mut self) {
        self.splitter.reset();
        self.hf_limiter.reset();
    }

    fn is_finite(&self) -> bool {
        self.splitter.is_finite() && self.hf_limiter.is_finite()
    }
}

pub struct MultibandDeEsser {
    left: ChannelStrip,
    right: ChannelStrip,
    compressors: [BandCompressor; NUM_BANDS],
    env_coeffs: EnvelopeCoeffs,
    sample_rate: f32,
    state: DspState,
}

impl Default for MultibandDeEsser {
    fn default() -> Self {
        Self::new()
    }
}

impl MultibandDeEsser {
    pub fn new() -> Self {
        Self {
            left: ChannelStrip::default(),
            right: ChannelStrip::default(),
            compressors: [BandCompressor::new(); NUM_BANDS],
            env_coeffs: EnvelopeCoeffs::default(),
            sample_rate: 0.0,
            state: DspState::Uninitialized,
        }
    }

    /// Design every filter and time constant for `sample_rate`, then reset.
    ///
    /// The block size hint is accepted for host symmetry and ignored.
    pub fn prepare(&mut self, sample_rate: f32, _max_block_size: usize) {
        ds_log!(
            "de-esser prepare: sr={} block_hint={}",
            sample_rate,
            _max_block_size
        );

        self.sample_rate = sample_rate;
        self.left.update(sample_rate);
        self.right.update(sample_rate);
        self.env_coeffs = EnvelopeCoeffs::new(sample_rate);
        self.state = DspState::Prepared;
        self.reset();
    }

    /// Zero all filter history and envelopes. Coefficients are kept.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        for comp in &mut self.compressors {
            comp.reset();
        }
        if self.state == DspState::Running {
            self.state = DspState::Prepared;
        }
    }

    pub fn state(&self) -> DspState {
        self.state
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Gains applied to each band on the last sample, as (left, right).
    pub fn band_gains(&self) -> [(f32, f32); NUM_BANDS] {
        let mut out = [(1.0, 1.0); NUM_BANDS];
        for (o, comp) in out.iter_mut().zip(self.compressors.iter()) {
            *o = comp.gains();
        }
        out
    }

    /// Process one block in place.
    ///
    /// `right == None` is the mono rule: left is duplicated into both paths
    /// and only the left result is written back. With mismatched lengths only
    /// the common prefix is processed.
    pub fn process(
        &mut self,
        left: &mut [f32],
        mut right: Option<&mut [f32]>,
        threshold_db: f32,
        band_amounts: &[f32; NUM_BANDS],
        hf_limiter_enabled: bool,
    ) {
        if self.state == DspState::Uninitialized {
            return;
        }
        self.state = DspState::Running;

        let threshold = db_to_gain(threshold_db);
        let len = match right.as_deref() {
            Some(r) => left.len().min(r.len()),
            None => left.len(),
        };

        for i in 0..len {
            let in_l = left[i];
            let in_r = match right.as_deref() {
                Some(r) => r[i],
                None => in_l,
            };

            let (out_l, out_r) =
                self.process_sample(in_l, in_r, threshold, band_amounts, hf_limiter_enabled);

            left[i] = out_l;
            if let Some(r) = right.as_deref_mut() {
                r[i] = out_r;
            }
        }

        if !self.is_finite() {
            ds_log!("de-esser: non-finite state, resetting history");
            self.reset();
        }
    }

    #[inline]
    fn process_sample(
        &mut self,
        in_l: f32,
        in_r: f32,
        threshold: f32,
        band_amounts: &[f32; NUM_BANDS],
        hf_limiter_enabled: bool,
    ) -> (f32, f32) {
        let split_l = self.left.splitter.split(in_l);
        let split_r = self.right.splitter.split(in_r);

        let mut sum_l = split_l.body;
        let mut sum_r = split_r.body;
        for band in 0..NUM_BANDS {
            let (l, r) = self.compressors[band].process(
                split_l.bands[band],
                split_r.bands[band],
                band_amounts[band],
                threshold,
                &self.env_coeffs,
            );
            sum_l += l;
            sum_r += r;
        }

        if hf_limiter_enabled {
            sum_l = self.left.hf_limiter.process(sum_l);
            sum_r = self.right.hf_limiter.process(sum_r);
        }

        (sum_l, sum_r)
    }

    fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.right.is_finite()
            && self.compressors.iter().all(BandCompressor::is_finite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;
    const FLAT: [f32; NUM_BANDS] = [0.0; NUM_BANDS];

    #[test]
    fn test_lifecycle_states() {
        let mut dsp = MultibandDeEsser::new();
        assert_eq!(dsp.state(), DspState::Uninitialized);

        let mut buf = [0.5f32; 8];
        dsp.process(&mut buf, None, -12.0, &FLAT, false);
        assert_eq!(buf, [0.5; 8]);
        assert_eq!(dsp.state(), DspState::Uninitialized);

        dsp.prepare(SR, 512);
        assert_eq!(dsp.state(), DspState::Prepared);
        dsp.process(&mut buf, None, -12.0, &FLAT, false);
        assert_eq!(dsp.state(), DspState::Running);

        dsp.reset();
        assert_eq!(dsp.state(), DspState::Prepared);
        dsp.reset();
        assert_eq!(dsp.state(), DspState::Prepared);
    }

    #[test]
    fn test_recovers_from_nan() {
        let mut dsp = MultibandDeEsser::new();
        dsp.prepare(SR, 64);

        let mut l = [0.1f32; 64];
        let mut r = [0.1f32; 64];
        l[10] = f32::NAN;
        dsp.process(&mut l, Some(&mut r), -12.0, &[1.0; NUM_BANDS], true);
        assert_eq!(dsp.state(), DspState::Prepared);

        let mut l = [0.1f32; 64];
        let mut r = [0.1f32; 64];
        dsp.process(&mut l, Some(&mut r), -12.0, &[1.0; NUM_BANDS], true);
        assert!(l.iter().chain(r.iter()).all(|x| x.is_finite()));
    }

    #[test]
    fn test_mismatched_lengths_use_common_prefix() {
        let mut dsp = MultibandDeEsser::new();
        dsp.prepare(SR, 64);

        let mut l = [0.25f32; 16];
        let mut r = [0.25f32; 8];
        dsp.process(&mut l, Some(&mut r), -12.0, &FLAT, true);
        assert!(l[8..].iter().all(|&x| x == 0.25));
        assert!(l[..8].iter().any(|&x| x != 0.25));
    }

    #[test]
    fn test_prepare_resets_envelopes() {
        let mut dsp = MultibandDeEsser::new();
        dsp.prepare(SR, 64);

        let mut l: Vec<f32> = (0..4800).map(|i| if i % 2 == 0 { 0.9 } else { -0.9 }).collect();
        let mut r = l.clone();
        dsp.process(&mut l, Some(&mut r), -24.0, &[1.0; NUM_BANDS], false);
        assert!(dsp.band_gains()[3].0 < 1.0);

        dsp.prepare(44100.0, 64);
        assert_eq!(dsp.sample_rate(), 44100.0);
        assert!(dsp.band_gains().iter().all(|&g| g == (1.0, 1.0)));
    }
}
