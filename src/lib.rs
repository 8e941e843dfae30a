mod debug;
pub mod dsp;
pub mod presets;

use crate::dsp::MultibandDeEsser;
use crate::presets::{DeEssSettings, DEFAULT_THRESHOLD_DB, THRESHOLD_MAX_DB, THRESHOLD_MIN_DB};
use nih_plug::prelude::*;
use std::sync::Arc;

// -----------------------------------------------------------------------------
// PARAMETERS
// -----------------------------------------------------------------------------
#[derive(Params)]
pub struct DeEsserParams {
    #[id = "threshold"]
    pub threshold: FloatParam,

    #[id = "band1_amount"]
    pub band1_amount: FloatParam,

    #[id = "band2_amount"]
    pub band2_amount: FloatParam,

    #[id = "band3_amount"]
    pub band3_amount: FloatParam,

    #[id = "band4_amount"]
    pub band4_amount: FloatParam,

    #[id = "hf_limit"]
    pub hf_limit: BoolParam,
}

// Helper to format values as "50%" for the DAW display
fn format_percent(v: f32) -> String {
    format!("{:.0}%", v * 100.0)
}

// Helper to format gain in dB
fn format_db(v: f32) -> String {
    format!("{:.1} dB", v)
}

fn amount_param(name: &str) -> FloatParam {
    FloatParam::new(name, 1.0, FloatRange::Linear { min: 0.0, max: 1.0 })
        .with_step_size(0.01)
        .with_value_to_string(Arc::new(format_percent))
}

impl Default for DeEsserParams {
    fn default() -> Self {
        Self {
            threshold: FloatParam::new(
                "Threshold",
                DEFAULT_THRESHOLD_DB,
                FloatRange::Linear {
                    min: THRESHOLD_MIN_DB,
                    max: THRESHOLD_MAX_DB,
                },
            )
            .with_step_size(0.1)
            .with_value_to_string(Arc::new(format_db)),

            band1_amount: amount_param("2-4k"),
            band2_amount: amount_param("4-7k"),
            band3_amount: amount_param("7-10k"),
            band4_amount: amount_param("10k+"),

            hf_limit: BoolParam::new("HF Limit", true),
        }
    }
}

impl DeEsserParams {
    /// Snapshot for one block. Values are held for every sample in it.
    pub fn snapshot(&self) -> DeEssSettings {
        DeEssSettings {
            threshold_db: self.threshold.value(),
            band_amounts: [
                self.band1_amount.value(),
                self.band2_amount.value(),
                self.band3_amount.value(),
                self.band4_amount.value(),
            ],
            hf_limiter: self.hf_limit.value(),
        }
    }
}

// -----------------------------------------------------------------------------
// PLUGIN STRUCT
// -----------------------------------------------------------------------------
pub struct MultibandDeEsserPlugin {
    params: Arc<DeEsserParams>,
    dsp: MultibandDeEsser,
}

impl Default for MultibandDeEsserPlugin {
    fn default() -> Self {
        Self {
            params: Arc::new(DeEsserParams::default()),
            dsp: MultibandDeEsser::new(),
        }
    }
}

impl Plugin for MultibandDeEsserPlugin {
    const NAME: &'static str = "Multiband De-Esser";
    const VENDOR: &'static str = "Andrzej Marczewski";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            ..AudioIOLayout::const_default()
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            ..AudioIOLayout::const_default()
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        #[cfg(feature = "debug")]
        crate::debug::logger::init_logger();

        let ok = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.dsp.prepare(
                buffer_config.sample_rate,
                buffer_config.max_buffer_size as usize,
            );
        }))
        .is_ok();

        #[cfg(feature = "debug")]
        crate::debug::logger::drain_to_file();

        ok
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let settings = self.params.snapshot();
        run_guarded(&mut self.dsp, |dsp| process_buffer(dsp, buffer, &settings));
        ProcessStatus::Normal
    }

    fn reset(&mut self) {
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.dsp.reset();
        }))
        .unwrap_or(());
    }

    fn deactivate(&mut self) {
        #[cfg(feature = "debug")]
        crate::debug::logger::drain_to_file();
    }
}

/// Run `f` with panics caught. A panic resets the DSP history so the next
/// block starts clean. Returns false if `f` panicked.
fn run_guarded<F>(dsp: &mut MultibandDeEsser, f: F) -> bool
where
    F: FnOnce(&mut MultibandDeEsser),
{
    let ok = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&mut *dsp))).is_ok();
    if !ok {
        dsp.reset();
    }
    ok
}

fn process_buffer(dsp: &mut MultibandDeEsser, buffer: &mut Buffer, settings: &DeEssSettings) {
    match buffer.as_slice() {
        [left, right, ..] => dsp.process(
            &mut **left,
            Some(&mut **right),
            settings.threshold_db,
            &settings.band_amounts,
            settings.hf_limiter,
        ),
        [mono] => dsp.process(
            &mut **mono,
            None,
            settings.threshold_db,
            &settings.band_amounts,
            settings.hf_limiter,
        ),
        [] => {}
    }
}

impl ClapPlugin for MultibandDeEsserPlugin {
    const CLAP_ID: &'static str = "com.andrzej.multiband-deesser";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Four-band de-esser with per-band amount and HF safety limiter");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Compressor,
        ClapFeature::Stereo,
        ClapFeature::Mono,
    ];
}

impl Vst3Plugin for MultibandDeEsserPlugin {
    const VST3_CLASS_ID: [u8; 16] = *b"MultiBandDeEsser";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Dynamics];
}

nih_export_clap!(MultibandDeEsserPlugin);
nih_export_vst3!(MultibandDeEsserPlugin);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_defaults_match_settings_defaults() {
        let params = DeEsserParams::default();
        assert_eq!(params.snapshot(), DeEssSettings::default());
    }

    #[test]
    fn test_panic_mid_block_resets_history() {
        let mut dsp = MultibandDeEsser::new();
        dsp.prepare(48000.0, 64);
        let mut block: Vec<f32> = (0..64).map(|i| (i as f32 * 1.3).sin()).collect();

        let ok = run_guarded(&mut dsp, |dsp| {
            dsp.process(&mut block, None, -24.0, &[1.0; 4], true);
            panic!("fault after processing");
        });

        assert!(!ok);
        assert_eq!(dsp.state(), crate::dsp::DspState::Prepared);
        assert_eq!(dsp.band_gains(), [(1.0, 1.0); 4]);
    }

    #[test]
    fn test_guarded_run_passes_through() {
        let mut dsp = MultibandDeEsser::new();
        dsp.prepare(48000.0, 64);
        let mut block = vec![0.25f32; 64];

        let ok = run_guarded(&mut dsp, |dsp| {
            dsp.process(&mut block, None, -12.0, &[0.0; 4], false)
        });

        assert!(ok);
        assert_eq!(dsp.state(), crate::dsp::DspState::Running);
        assert!(block.iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_param_display() {
        assert_eq!(format_percent(0.5), "50%");
        assert_eq!(format_db(-12.0), "-12.0 dB");
    }
}
