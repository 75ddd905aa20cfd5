//! Deterministic motion primitives
//!
//! Everything here except `cord` is a pure function of its inputs:
//! - Hashed seeds only (no generator state)
//! - Time is an explicit parameter
//! - No rendering or host dependencies

pub mod clock;
pub mod cord;
pub mod hash;
pub mod keyframe;
pub mod noise;

pub use clock::{FixedStepper, FrameTime, LocalClock, Steps};
pub use cord::{
    AdvectionMode, CordConfig, CordSegment, CordState, LightCord, curl_noise, fill_line_strip,
    project_segments, step,
};
pub use hash::{Seed, fold_seed, hash, uniform, uniform_centered, uniform_range};
pub use keyframe::{BucketPhase, ChannelRange, KeyframeConfig, KeyframePair, KeyframeSampler};
pub use noise::{NoiseField, SimplexNoise};
