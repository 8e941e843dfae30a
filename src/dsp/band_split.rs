//! Four-band splitter
//!
//! Each LR4 low-pass is fed the same raw input (parallel, not chained).
//! Bands are successive differences of the cumulative low-passes:
//!
//! ```text
//! band1 = lp4k  - lp2k      (2-4 kHz)
//! band2 = lp7k  - lp4k      (4-7 kHz)
//! band3 = lp10k - lp7k      (7-10 kHz)
//! band4 = input - lp10k     (10 kHz+)
//! ```
//!
//! The 2 kHz low-pass itself is returned as the `body` of the split. It is
//! never compressed, and `body + band1 + band2 + band3 + band4` telescopes
//! back to the input.

use crate::dsp::Lr4LowPass;

pub const NUM_BANDS: usize = 4;

/// Crossover frequencies (Hz). Must not change: band labels are tied to them.
pub const CROSSOVER_FREQS_HZ: [f32; NUM_BANDS] = [2000.0, 4000.0, 7000.0, 10_000.0];

/// One sample split into the uncompressed body and the four sibilance bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSplit {
    pub body: f32,
    pub bands: [f32; NUM_BANDS],
}

impl BandSplit {
    #[inline]
    pub fn sum(&self) -> f32 {
        self.body + self.bands[0] + self.bands[1] + self.bands[2] + self.bands[3]
    }
}

/// Per-channel filter bank.
#[derive(Debug, Clone, Copy, Default)]
pub struct BandSplitter {
    lowpasses: [Lr4LowPass; NUM_BANDS],
}

impl BandSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, sr: f32) {
        for (lp, &fc) in self.lowpasses.iter_mut().zip(CROSSOVER_FREQS_HZ.iter()) {
            lp.update(fc, sr);
        }
    }

    #[inline]
    pub fn split(&mut self, input: f32) -> BandSplit {
        let lp2 = self.lowpasses[0].process(input);
        let lp4 = self.lowpasses[1].process(input);
        let lp7 = self.lowpasses[2].process(input);
        let lp10 = self.lowpasses[3].process(input);

        BandSplit {
            body: lp2,
            bands: [lp4 - lp2, lp7 - lp4, lp10 - lp7, input - lp10],
        }
    }

    pub fn reset(&mut self) {
        for lp in &mut self.lowpasses {
            lp.reset();
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lowpasses.iter().all(Lr4LowPass::is_finite)
    }
}
