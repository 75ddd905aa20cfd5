//! Hash-driven scrolling light bars

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::color::hsv_to_rgb;
use crate::error::{ConfigError, require_finite, require_positive};
use crate::motion::hash::{Seed, uniform, uniform_centered};
use crate::vertex::InstanceRaw;

/// Seed band offsets per draw; population must fit below the first one
const HUE_BAND: u32 = 4000;
const SPEED_BAND: u32 = 10000;
const SATURATION: f32 = 0.8;
const EMISSIVE_SCALE: f32 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    pub population: u32,
    pub seed: Seed,
    /// Vertical extent the bars are scattered over
    pub height: f32,
    /// Horizontal extent the bars wrap around in
    pub width: f32,
    /// Mean scroll speed
    pub speed: f32,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            population: 10,
            seed: 0,
            height: 1.0,
            width: 50.0,
            speed: 100.0,
        }
    }
}

impl BarConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population > HUE_BAND {
            return Err(ConfigError::SeedBandOverflow {
                population: self.population,
                band: HUE_BAND,
            });
        }
        require_finite("bar height", self.height)?;
        require_positive("bar width", self.width)?;
        require_finite("bar speed", self.speed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LightBar {
    pub position: Vec3,
    pub color: Vec3,
    pub emissive: Vec3,
    /// Scroll speed of this bar
    pub speed: f32,
}

impl LightBar {
    /// Static part of bar `index`; x is filled in by `scroll`
    pub fn new(config: &BarConfig, index: u32) -> Self {
        let base = config.seed.wrapping_add(index);
        let y = uniform_centered(base, config.height);
        let hue = uniform(base.wrapping_add(HUE_BAND));
        let color = hsv_to_rgb(hue, SATURATION, 1.0);
        Self {
            position: Vec3::new(0.0, y, 0.0),
            color,
            emissive: color * EMISSIVE_SCALE,
            speed: (0.5 + uniform(base.wrapping_add(SPEED_BAND))) * config.speed,
        }
    }

    /// Horizontal position at time `t`, wrapped into `[-width/2, width/2)`
    pub fn scroll(&self, width: f32, t: f32) -> f32 {
        let offset = (self.speed * t).rem_euclid(width);
        // A tiny negative distance rounds up to `width` itself
        let offset = if offset >= width { 0.0 } else { offset };
        offset - width * 0.5
    }
}

#[derive(Debug, Clone)]
pub struct LightBars {
    config: BarConfig,
    bars: Vec<LightBar>,
}

impl LightBars {
    pub fn new(config: BarConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bars = (0..config.population)
            .map(|i| LightBar::new(&config, i))
            .collect();
        log::info!(
            "Light bars: {} bars, seed {}",
            config.population,
            config.seed
        );
        Ok(Self { config, bars })
    }

    pub fn config(&self) -> &BarConfig {
        &self.config
    }

    pub fn bars(&self) -> &[LightBar] {
        &self.bars
    }

    pub fn update(&mut self, t: f32) {
        let width = self.config.width;
        for bar in &mut self.bars {
            bar.position.x = bar.scroll(width, t);
        }
    }

    pub fn write_instances(&self, out: &mut [InstanceRaw]) {
        for (instance, bar) in out.iter_mut().zip(&self.bars) {
            *instance = InstanceRaw::new(bar.position, Quat::IDENTITY, bar.color, 1.0);
        }
    }
}
