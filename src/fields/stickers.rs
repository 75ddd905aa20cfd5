//! Keyframe-driven decal stickers
//!
//! Every sticker holds a random spin, tilt and height for one interval, then
//! eases into the next set. All stickers share one keyframe stream: sticker
//! `i` owns seeds `seed + 3i .. seed + 3i + 3` of each bucket.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, require_count, require_finite};
use crate::motion::hash::Seed;
use crate::motion::keyframe::{ChannelRange, KeyframeConfig, KeyframeSampler};
use crate::vertex::InstanceRaw;

const CHANNELS: u32 = 3;
const SPIN: u32 = 0;
const TILT: u32 = 1;
const HEIGHT: u32 = 2;

const SPIN_RANGE: ChannelRange = ChannelRange::new(0.0, 360.0);
/// Tilt range in degrees
const TILT_EXTENT: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerConfig {
    pub population: u32,
    pub seed: Seed,
    /// Vertical extent the stickers wander over
    pub y_range: f32,
    /// Number of textures cycled over the population
    pub texture_count: u32,
    /// Timing and per-sticker seed stride
    pub keyframes: KeyframeConfig,
}

impl Default for StickerConfig {
    fn default() -> Self {
        Self {
            population: 64,
            seed: 0,
            y_range: 1.0,
            texture_count: 1,
            keyframes: KeyframeConfig::default(),
        }
    }
}

impl StickerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sampler().map(|_| ())
    }

    /// Sampler for the whole population's shared stream
    fn sampler(&self) -> Result<KeyframeSampler, ConfigError> {
        require_count("sticker population", self.population)?;
        require_count("sticker texture count", self.texture_count)?;
        require_finite("sticker y range", self.y_range)?;

        let overflow = ConfigError::SeedBandOverflow {
            population: self.population,
            band: u32::MAX / CHANNELS,
        };
        let stride = self
            .population
            .checked_mul(self.keyframes.stride)
            .ok_or_else(|| overflow.clone())?;
        let scalars = self.population.checked_mul(CHANNELS).ok_or(overflow)?;

        KeyframeSampler::new(
            KeyframeConfig {
                stride,
                ..self.keyframes
            },
            scalars,
        )
    }

    /// Seed base of sticker `index`
    fn seed_base(&self, index: u32) -> Seed {
        self.seed
            .wrapping_add(index.wrapping_mul(self.keyframes.stride))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sticker {
    pub position: Vec3,
    pub rotation: Quat,
    /// Spin about +Y in degrees
    pub spin: f32,
    /// Tilt about +Z in degrees
    pub tilt: f32,
    pub texture: u32,
}

impl Default for Sticker {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            spin: 0.0,
            tilt: 0.0,
            texture: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stickers {
    config: StickerConfig,
    sampler: KeyframeSampler,
    stickers: Vec<Sticker>,
}

impl Stickers {
    pub fn new(config: StickerConfig) -> Result<Self, ConfigError> {
        let sampler = config.sampler()?;
        let stickers = (0..config.population)
            .map(|i| Sticker {
                texture: i % config.texture_count,
                ..Default::default()
            })
            .collect();
        log::info!(
            "Stickers: {} stickers over {} textures, {}s interval",
            config.population,
            config.texture_count,
            config.keyframes.interval
        );
        Ok(Self {
            config,
            sampler,
            stickers,
        })
    }

    pub fn config(&self) -> &StickerConfig {
        &self.config
    }

    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    pub fn update(&mut self, t: f32) {
        let height_range = ChannelRange::centered(self.config.y_range);
        let tilt_range = ChannelRange::centered(TILT_EXTENT);
        for (i, sticker) in self.stickers.iter_mut().enumerate() {
            let base = self.config.seed_base(i as u32);
            let spin = self.sampler.sample(t, base, SPIN, SPIN_RANGE);
            let tilt = self.sampler.sample(t, base, TILT, tilt_range);
            let y = self.sampler.sample(t, base, HEIGHT, height_range);

            sticker.position = Vec3::new(0.0, y, 0.0);
            sticker.rotation = Quat::from_axis_angle(Vec3::Y, spin.to_radians())
                * Quat::from_axis_angle(Vec3::Z, tilt.to_radians());
            sticker.spin = spin;
            sticker.tilt = tilt;
        }
    }

    pub fn write_instances(&self, out: &mut [InstanceRaw]) {
        for (instance, sticker) in out.iter_mut().zip(&self.stickers) {
            *instance = InstanceRaw::new(
                sticker.position,
                sticker.rotation,
                Vec3::ONE,
                sticker.texture as f32,
            );
        }
    }
}
