//! Scene settings
//!
//! One JSON document configures every component. Missing fields take their
//! defaults, so a document only needs to name what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::effects::EffectKind;
use crate::error::{ConfigError, SettingsError};
use crate::fields::{BarConfig, GridConfig, StickerConfig};
use crate::motion::{CordConfig, FixedStepper};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Fixed simulation rate in ticks per second
    pub fn sim_rate(&self) -> u32 {
        match self {
            QualityPreset::Low => 30,
            QualityPreset::Medium => 60,
            QualityPreset::High => 120,
        }
    }

    /// Cord resolution (points per segment)
    pub fn cord_points_per_segment(&self) -> u32 {
        match self {
            QualityPreset::Low => 3,
            QualityPreset::Medium => 5,
            QualityPreset::High => 8,
        }
    }
}

/// Complete scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Quality preset (simulation rate)
    pub quality: QualityPreset,
    /// Seed of the shared noise field
    pub noise_seed: u64,

    pub cord: CordConfig,
    pub grid: GridConfig,
    pub bars: BarConfig,
    pub stickers: StickerConfig,

    /// Effects evaluated each frame, in order
    pub effects: Vec<EffectKind>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            noise_seed: 0,
            cord: CordConfig::default(),
            grid: GridConfig::default(),
            bars: BarConfig::default(),
            stickers: StickerConfig::default(),
            effects: vec![EffectKind::default()],
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        self.cord.points_per_segment = preset.cord_points_per_segment();
    }

    /// Run every component's validation
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cord.validate()?;
        self.grid.validate()?;
        self.bars.validate()?;
        self.stickers.validate()?;
        Ok(())
    }

    /// Fixed-step driver at the preset's rate
    pub fn stepper(&self) -> Result<FixedStepper, ConfigError> {
        FixedStepper::from_rate(self.quality.sim_rate())
    }

    /// Parse and validate a settings document
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        for effect in &mut settings.effects {
            effect.sanitize();
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded settings from {} ({} quality, {} effects)",
            path.display(),
            settings.quality.as_str(),
            settings.effects.len()
        );
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::FlattenerParams;
    use crate::motion::AdvectionMode;

    #[test]
    fn test_default_is_valid() {
        assert!(Settings::default().validate().is_ok());
        for preset in [QualityPreset::Low, QualityPreset::Medium, QualityPreset::High] {
            assert!(Settings::from_preset(preset).validate().is_ok());
        }
    }

    #[test]
    fn test_preset_rates() {
        assert_eq!(QualityPreset::Low.sim_rate(), 30);
        assert_eq!(QualityPreset::Medium.sim_rate(), 60);
        assert_eq!(QualityPreset::High.sim_rate(), 120);

        let settings = Settings::from_preset(QualityPreset::High);
        let stepper = settings.stepper().unwrap();
        assert!((stepper.step_dt() - 1.0 / 120.0).abs() < 1e-7);
        assert_eq!(settings.cord.points_per_segment, 8);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("LOW"), Some(QualityPreset::Low));
        assert_eq!(QualityPreset::parse("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
    }

    #[test]
    fn test_partial_document() {
        let settings = Settings::from_json(
            r#"{
                "quality": "Low",
                "cord": { "noise_amplitude": 0.2, "advection": "Trail" },
                "stickers": { "population": 8, "texture_count": 4 },
                "effects": [ { "kind": "Flattener", "size": -3.0 } ]
            }"#,
        )
        .unwrap();
        assert_eq!(settings.quality, QualityPreset::Low);
        assert_eq!(settings.cord.noise_amplitude, 0.2);
        assert_eq!(settings.cord.advection, AdvectionMode::Trail);
        assert_eq!(settings.cord.segments, 20);
        assert_eq!(settings.stickers.population, 8);
        assert_eq!(settings.grid, GridConfig::default());
        // Effects come back sanitized
        assert_eq!(
            settings.effects,
            vec![EffectKind::Flattener(FlattenerParams {
                size: 0.0,
                ..Default::default()
            })]
        );
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "cord": { "segments": 0 } }"#),
            Err(SettingsError::Invalid(ConfigError::ZeroCount(_)))
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "bars": { "population": 5000 } }"#),
            Err(SettingsError::Invalid(ConfigError::SeedBandOverflow { .. }))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings::from_preset(QualityPreset::High);
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("fx_motion_settings_{}.json", std::process::id()));
        let settings = Settings {
            noise_seed: 99,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);

        assert!(matches!(
            Settings::load(std::env::temp_dir().join("fx_motion_missing.json")),
            Err(SettingsError::Io(_))
        ));
    }
}
