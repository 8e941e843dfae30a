pub mod band_split;
pub mod biquad;
pub mod compressor;
pub mod crossover;
pub mod de_esser;
pub mod envelope;
pub mod limiter;
pub mod utils;

pub use band_split::{BandSplit, BandSplitter, CROSSOVER_FREQS_HZ, NUM_BANDS};
pub use biquad::Biquad;
pub use compressor::BandCompressor;
pub use crossover::Lr4LowPass;
pub use de_esser::{DspState, MultibandDeEsser};
pub use envelope::{EnvelopeCoeffs, EnvelopeFollower};
pub use limiter::HfLimiter;
