//! Noise-driven light grid

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::color::srgb_to_linear;
use crate::error::{ConfigError, require_count, require_positive};
use crate::motion::NoiseField;
use crate::saturate;
use crate::vertex::InstanceRaw;

/// Per-channel response of color to noise amplitude
const AMP_FREQUENCY: Vec3 = Vec3::new(6.783, 7.123, 9.372);
/// Per-channel color drift over time
const TIME_FREQUENCY: Vec3 = Vec3::new(4.324, 3.138, 3.749);
const INTENSITY_SCALE: f32 = 10.0;
const EMISSIVE_SCALE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: u32,
    pub columns: u32,
    /// Distance between neighboring lights
    pub spacing: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            columns: 5,
            spacing: 0.2,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_count("grid rows", self.rows)?;
        require_count("grid columns", self.columns)?;
        require_positive("grid spacing", self.spacing)
    }

    pub fn light_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Local position of the light at column `x`, row `y`
    ///
    /// The grid is centered on `(count - 0.5) / 2`, which leaves it a quarter
    /// cell off true center.
    pub fn position(&self, x: u32, y: u32) -> Vec3 {
        let px = (x as f32 - (self.columns as f32 - 0.5) / 2.0) * self.spacing;
        let py = (y as f32 - (self.rows as f32 - 0.5) / 2.0) * self.spacing;
        Vec3::new(px, py, 0.0)
    }
}

/// One light's state for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GridLight {
    pub position: Vec3,
    /// Linear-space light color
    pub color: Vec3,
    pub intensity: f32,
    /// Emissive color of the light's visible fixture
    pub emissive: Vec3,
}

/// Evaluate the light at `position` for time `t`
pub fn evaluate<N: NoiseField + ?Sized>(noise: &N, position: Vec3, t: f32) -> GridLight {
    let amp = saturate(0.5 + noise.value(Vec3::new(position.x, position.y, t)) * 0.7);
    let phase = AMP_FREQUENCY * amp + TIME_FREQUENCY * t;
    let srgb = Vec3::new(phase.x.sin(), phase.y.sin(), phase.z.sin()) * 0.5 + Vec3::splat(0.5);
    let color = srgb_to_linear(srgb);
    GridLight {
        position,
        color,
        intensity: amp * INTENSITY_SCALE,
        emissive: color * amp * EMISSIVE_SCALE,
    }
}

/// Rows x columns lights colored by a noise field sliced at time `t`
#[derive(Debug, Clone)]
pub struct LightGrid {
    config: GridConfig,
    lights: Vec<GridLight>,
}

impl LightGrid {
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut lights = Vec::with_capacity(config.light_count());
        // Row-major, bottom row first
        for y in 0..config.rows {
            for x in 0..config.columns {
                lights.push(GridLight {
                    position: config.position(x, y),
                    ..Default::default()
                });
            }
        }
        log::info!("Light grid: {}x{} lights", config.columns, config.rows);
        Ok(Self { config, lights })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn lights(&self) -> &[GridLight] {
        &self.lights
    }

    /// Recompute every light for time `t`
    pub fn update<N: NoiseField + ?Sized>(&mut self, noise: &N, t: f32) {
        for light in &mut self.lights {
            *light = evaluate(noise, light.position, t);
        }
    }

    /// Write one instance per light into `out`
    pub fn write_instances(&self, out: &mut [InstanceRaw]) {
        for (instance, light) in out.iter_mut().zip(&self.lights) {
            *instance = InstanceRaw::new(
                light.position,
                glam::Quat::IDENTITY,
                light.color,
                light.intensity,
            );
        }
    }
}
