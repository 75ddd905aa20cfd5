//! Keyframe-blend sampler
//!
//! Turns continuous time into "hold a random value, then ease into the next
//! one near the end of each interval". Keyframe k of channel c is drawn from
//! seed `k * stride + seed_base + c`; a bucket blends keyframe k into k + 1,
//! so the value leaving a bucket is exactly the value entering the next one.

use serde::{Deserialize, Serialize};

use super::hash::{Seed, uniform};
use crate::consts::{EASE_END, EASE_START};
use crate::error::{ConfigError, require_count, require_positive};
use crate::{lerp, smoothstep};

/// Relative distance below a boundary, in f32 ULPs, that still counts as on it
const BOUNDARY_ULPS: f64 = 4.0;

/// Sampler timing and seed layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyframeConfig {
    /// Seconds between keyframes
    pub interval: f32,
    /// Fraction of the interval where easing begins
    pub ease_start: f32,
    /// Fraction of the interval where easing completes
    pub ease_end: f32,
    /// Seed distance between consecutive keyframes of the same channel
    pub stride: u32,
}

impl Default for KeyframeConfig {
    fn default() -> Self {
        Self {
            interval: 4.0,
            ease_start: EASE_START,
            ease_end: EASE_END,
            stride: 3,
        }
    }
}

impl KeyframeConfig {
    pub fn validate(&self, scalars_per_bucket: u32) -> Result<(), ConfigError> {
        require_positive("keyframe interval", self.interval)?;
        require_count("keyframe scalars per bucket", scalars_per_bucket)?;

        let window_ok = self.ease_start.is_finite()
            && self.ease_end.is_finite()
            && 0.0 <= self.ease_start
            && self.ease_start < self.ease_end
            && self.ease_end <= 1.0;
        if !window_ok {
            return Err(ConfigError::EaseWindow {
                start: self.ease_start,
                end: self.ease_end,
            });
        }

        if self.stride < scalars_per_bucket {
            return Err(ConfigError::StrideAliasing {
                stride: self.stride,
                scalars_per_bucket,
            });
        }
        Ok(())
    }
}

/// Value range a channel's uniform draws are mapped into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub lo: f32,
    pub hi: f32,
}

impl ChannelRange {
    pub const UNIT: Self = Self { lo: 0.0, hi: 1.0 };

    pub const fn new(lo: f32, hi: f32) -> Self {
        Self { lo, hi }
    }

    /// Range of width `extent` centered on zero
    pub fn centered(extent: f32) -> Self {
        Self::new(-0.5 * extent, 0.5 * extent)
    }

    #[inline]
    pub fn map(&self, u: f32) -> f32 {
        lerp(self.lo, self.hi, u)
    }
}

/// Start/end keyframes of one channel plus the current blend factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframePair {
    /// Uniform draw for the current bucket
    pub start: f32,
    /// Uniform draw for the next bucket
    pub end: f32,
    /// Eased progress from `start` to `end`, in [0, 1]
    pub blend: f32,
}

impl KeyframePair {
    /// Blended value mapped into `range`
    #[inline]
    pub fn value(&self, range: ChannelRange) -> f32 {
        lerp(range.map(self.start), range.map(self.end), self.blend)
    }
}

/// Where a time falls on the keyframe grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketPhase {
    /// Index of the current interval (`floor(t / interval)`)
    pub bucket: i64,
    /// Position inside the interval, in [0, 1)
    pub fraction: f32,
}

/// Validated keyframe sampler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeSampler {
    config: KeyframeConfig,
    scalars_per_bucket: u32,
}

impl KeyframeSampler {
    /// Build a sampler that will draw `scalars_per_bucket` distinct scalars
    /// per keyframe (channels times instances sharing the stream).
    pub fn new(config: KeyframeConfig, scalars_per_bucket: u32) -> Result<Self, ConfigError> {
        config.validate(scalars_per_bucket)?;
        Ok(Self {
            config,
            scalars_per_bucket,
        })
    }

    pub fn config(&self) -> &KeyframeConfig {
        &self.config
    }

    pub fn scalars_per_bucket(&self) -> u32 {
        self.scalars_per_bucket
    }

    /// Locate `t` on the keyframe grid
    ///
    /// Exact multiples of the interval land at fraction 0 of the new bucket,
    /// including multiples that f32 rounding leaves a few ULPs short.
    pub fn phase(&self, t: f32) -> BucketPhase {
        let x = t as f64 / self.config.interval as f64;
        let floor = x.floor();
        let fraction = x - floor;

        if 1.0 - fraction <= x.abs().max(1.0) * BOUNDARY_ULPS * f32::EPSILON as f64 {
            BucketPhase {
                bucket: floor as i64 + 1,
                fraction: 0.0,
            }
        } else {
            BucketPhase {
                bucket: floor as i64,
                fraction: fraction as f32,
            }
        }
    }

    /// Eased blend factor at `t`, in [0, 1]
    pub fn blend(&self, t: f32) -> f32 {
        let phase = self.phase(t);
        smoothstep(self.config.ease_start, self.config.ease_end, phase.fraction)
    }

    /// Seed of keyframe `bucket` for `channel`
    #[inline]
    pub fn keyframe_seed(&self, bucket: i64, seed_base: Seed, channel: u32) -> Seed {
        debug_assert!(channel < self.scalars_per_bucket);
        (bucket as u32)
            .wrapping_mul(self.config.stride)
            .wrapping_add(seed_base)
            .wrapping_add(channel)
    }

    /// Keyframe pair and blend for `channel` at time `t`
    pub fn pair(&self, t: f32, seed_base: Seed, channel: u32) -> KeyframePair {
        let phase = self.phase(t);
        let blend = smoothstep(self.config.ease_start, self.config.ease_end, phase.fraction);
        KeyframePair {
            start: uniform(self.keyframe_seed(phase.bucket, seed_base, channel)),
            end: uniform(self.keyframe_seed(phase.bucket + 1, seed_base, channel)),
            blend,
        }
    }

    /// Blended value of `channel` at time `t`, mapped into `range`
    pub fn sample(&self, t: f32, seed_base: Seed, channel: u32, range: ChannelRange) -> f32 {
        self.pair(t, seed_base, channel).value(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sampler(interval: f32) -> KeyframeSampler {
        KeyframeSampler::new(
            KeyframeConfig {
                interval,
                ..Default::default()
            },
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_blend_across_one_interval() {
        let s = sampler(4.0);

        // Start of bucket: hold the start keyframe exactly
        assert_eq!(s.blend(0.0), 0.0);
        let pair = s.pair(0.0, 7, 0);
        assert_eq!(pair.value(ChannelRange::UNIT), pair.start);

        // Still holding before the easing window opens
        assert_eq!(s.blend(3.0), 0.0);

        // 90% through: inside the 0.8..1.0 window
        let b = s.blend(3.6);
        assert!(b > 0.0 && b < 1.0, "blend at 3.6s = {b}");

        // New bucket resets to its start keyframe
        assert_eq!(s.blend(4.0), 0.0);
        assert_eq!(s.phase(4.0).bucket, 1);
    }

    #[test]
    fn test_end_keyframe_is_next_start_keyframe() {
        let s = sampler(4.0);
        for channel in 0..3 {
            let before = s.pair(3.9, 11, channel);
            let after = s.pair(4.0, 11, channel);
            assert_eq!(before.end.to_bits(), after.start.to_bits());
        }
    }

    #[test]
    fn test_channels_use_distinct_seeds() {
        let s = sampler(2.0);
        let a = s.keyframe_seed(5, 100, 0);
        let b = s.keyframe_seed(5, 100, 1);
        let c = s.keyframe_seed(6, 100, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(c - a, 3);
    }

    #[test]
    fn test_rejects_degenerate_config() {
        let zero = KeyframeConfig {
            interval: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            KeyframeSampler::new(zero, 1),
            Err(ConfigError::NotPositive { .. })
        ));

        let inverted = KeyframeConfig {
            ease_start: 1.0,
            ease_end: 0.8,
            ..Default::default()
        };
        assert!(matches!(
            KeyframeSampler::new(inverted, 1),
            Err(ConfigError::EaseWindow { .. })
        ));

        // Six scalars cannot share a stride of three without reusing seeds
        assert_eq!(
            KeyframeSampler::new(KeyframeConfig::default(), 6),
            Err(ConfigError::StrideAliasing {
                stride: 3,
                scalars_per_bucket: 6
            })
        );
    }

    #[test]
    fn test_negative_time_is_well_defined() {
        let s = sampler(4.0);
        let phase = s.phase(-1.0);
        assert_eq!(phase.bucket, -1);
        assert!((phase.fraction - 0.75).abs() < 1e-6);
        assert!(s.sample(-1.0, 0, 0, ChannelRange::new(0.0, 360.0)).is_finite());
    }

    #[test]
    fn test_rounded_boundaries_start_new_bucket() {
        // 5 * 0.1 rounds to just under 0.5 in f32 and used to report bucket 4
        let mut misses = Vec::new();
        for interval in [0.1f32, 0.2, 0.3, 0.7, 3.0, 5.0] {
            let s = sampler(interval);
            for k in 1..2000i64 {
                let t = k as f32 * interval;
                let phase = s.phase(t);
                if phase.bucket != k || s.blend(t) != 0.0 {
                    misses.push((interval, k, phase.bucket, phase.fraction));
                }
            }
        }
        assert!(misses.is_empty(), "boundary misses: {misses:?}");
    }

    proptest! {
        #[test]
        fn blend_in_unit_interval(t in -1000.0f32..1000.0, interval in 0.01f32..50.0) {
            let b = sampler(interval).blend(t);
            prop_assert!((0.0..=1.0).contains(&b));
        }

        #[test]
        fn blend_is_zero_on_boundaries(k in -1000i32..1000, interval in 0.01f32..50.0) {
            let s = sampler(interval);
            let t = k as f32 * interval;
            prop_assert_eq!(s.blend(t), 0.0);
            prop_assert_eq!(s.phase(t).bucket, k as i64);
        }

        #[test]
        fn output_is_continuous_across_boundaries(k in 1i32..100, seed in any::<u32>(), channel in 0u32..3) {
            let interval = 4.0;
            let s = sampler(interval);
            let range = ChannelRange::new(0.0, 360.0);
            let boundary = k as f32 * interval;
            let before = s.sample(boundary - 1e-3, seed, channel, range);
            let at = s.sample(boundary, seed, channel, range);
            prop_assert!((before - at).abs() < 0.01, "jump {} -> {}", before, at);
        }

        #[test]
        fn blend_is_monotonic_within_bucket(a in 0.0f32..0.999, b in 0.0f32..0.999) {
            let s = sampler(1.0);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(s.blend(lo) <= s.blend(hi));
        }
    }
}
