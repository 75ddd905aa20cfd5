//! FX Motion - deterministic procedural motion for real-time visual effects
//!
//! Core modules:
//! - `motion`: Hash RNG, keyframe blending, coherent noise and the curl-noise cord
//! - `fields`: Per-instance placement and coloring (light grids, light bars, stickers)
//! - `effects`: Effector planes and shader parameter bundles
//! - `settings`: Data-driven configuration (JSON)
//!
//! Everything except the cord interior is a pure function of time, so a host
//! can scrub to any time and get the same answer.

pub mod color;
pub mod effects;
pub mod error;
pub mod fields;
pub mod motion;
pub mod settings;
pub mod vertex;

pub use error::{ConfigError, SettingsError};
pub use settings::{QualityPreset, Settings};

/// Engine configuration constants
pub mod consts {
    /// Maximum host frame delta fed to the fixed-step driver (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default easing window of the keyframe sampler (fraction of each interval)
    pub const EASE_START: f32 = 0.8;
    pub const EASE_END: f32 = 1.0;

    /// Cord defaults
    pub const CORD_SEGMENTS: u32 = 20;
    pub const CORD_POINTS_PER_SEGMENT: u32 = 5;
    /// Phase step between initial cord points along the Lissajous curve
    pub const CORD_INIT_PHASE_STEP: f32 = -1.0 / 60.0;
    /// Constant offset separating the two curl noise samples
    pub const CURL_SAMPLE_OFFSET: f32 = 30.0;

    /// Frame-to-frame jump above which effector history is reset
    pub const LARGE_DELTA: f32 = 100.0;
}

/// Linear interpolation (unclamped)
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep between `edge0` and `edge1`
///
/// Returns 0 below `edge0`, 1 above `edge1`, with zero slope at both edges.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = saturate((x - edge0) / (edge1 - edge0));
    t * t * (3.0 - 2.0 * t)
}

/// Clamp to [0, 1]
#[inline]
pub fn saturate(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.8, 1.0, 0.0), 0.0);
        assert_eq!(smoothstep(0.8, 1.0, 0.8), 0.0);
        assert_eq!(smoothstep(0.8, 1.0, 1.0), 1.0);
        assert!((smoothstep(0.8, 1.0, 0.9) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }
}
