use crate::dsp::NUM_BANDS;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// SETTINGS
// =============================================================================

/// Host ranges. Must not change: saved sessions rely on them.
pub const THRESHOLD_MIN_DB: f32 = -24.0;
pub const THRESHOLD_MAX_DB: f32 = 0.0;
pub const DEFAULT_THRESHOLD_DB: f32 = -12.0;

/// One block's worth of parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeEssSettings {
    pub threshold_db: f32,
    pub band_amounts: [f32; NUM_BANDS],
    pub hf_limiter: bool,
}

impl Default for DeEssSettings {
    fn default() -> Self {
        Self {
            threshold_db: DEFAULT_THRESHOLD_DB,
            band_amounts: [1.0; NUM_BANDS],
            hf_limiter: true,
        }
    }
}

impl DeEssSettings {
    /// Parse a settings file. Missing fields take their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let settings: Self = serde_json::from_str(json).context("invalid de-esser settings")?;
        Ok(settings.sanitized())
    }

    /// Clamp into the ranges the host exposes.
    pub fn sanitized(mut self) -> Self {
        self.threshold_db = if self.threshold_db.is_finite() {
            self.threshold_db.clamp(THRESHOLD_MIN_DB, THRESHOLD_MAX_DB)
        } else {
            DEFAULT_THRESHOLD_DB
        };
        for amount in &mut self.band_amounts {
            *amount = if amount.is_finite() {
                amount.clamp(0.0, 1.0)
            } else {
                1.0
            };
        }
        self
    }
}

// =============================================================================
// FACTORY PRESETS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactoryPreset {
    #[serde(rename = "Default")]
    Default,
    #[serde(rename = "Gentle")]
    Gentle,
    #[serde(rename = "Vocal Presence")]
    VocalPresence,
    #[serde(rename = "Bright Mix")]
    BrightMix,
    #[serde(rename = "Broadband")]
    Broadband,
}

impl FactoryPreset {
    pub fn all() -> [FactoryPreset; 5] {
        [
            FactoryPreset::Default,
            FactoryPreset::Gentle,
            FactoryPreset::VocalPresence,
            FactoryPreset::BrightMix,
            FactoryPreset::Broadband,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            FactoryPreset::Default => "Default",
            FactoryPreset::Gentle => "Gentle",
            FactoryPreset::VocalPresence => "Vocal Presence",
            FactoryPreset::BrightMix => "Bright Mix",
            FactoryPreset::Broadband => "Broadband",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FactoryPreset::Default => "All bands at full amount, -12 dB threshold",
            FactoryPreset::Gentle => "Light touch for already-smooth vocals",
            FactoryPreset::VocalPresence => "Focus on the 4-7 kHz 's' region",
            FactoryPreset::BrightMix => "Upper bands only for bright, airy sources",
            FactoryPreset::Broadband => "Low threshold on every band, limiter off",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<FactoryPreset> {
        Self::all()
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug)]
pub struct PresetManager {
    presets: HashMap<String, DeEssSettings>,
}

impl PresetManager {
    /// Load presets from baked-in JSON. This is fallible but non-fatal.
    /// Falls back to the Default preset alone if parsing fails.
    pub fn new() -> Self {
        Self::from_json(include_str!("../presets.json")).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let raw: HashMap<String, DeEssSettings> =
            serde_json::from_str(json).context("invalid preset table")?;
        let presets = raw
            .into_iter()
            .map(|(name, settings)| (name, settings.sanitized()))
            .collect();
        Ok(Self { presets })
    }

    pub fn get(&self, preset: FactoryPreset) -> Option<DeEssSettings> {
        self.presets.get(preset.name()).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<DeEssSettings> {
        FactoryPreset::from_name(name).and_then(|p| self.get(p))
    }
}

impl Default for PresetManager {
    fn default() -> Self {
        let mut presets = HashMap::new();
        presets.insert(
            FactoryPreset::Default.name().to_string(),
            DeEssSettings::default(),
        );
        Self { presets }
    }
}
