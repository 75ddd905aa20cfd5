//! Curl-noise cord advection
//!
//! A flexible cord of `segments * points_per_segment + 1` points. The head
//! (last point) follows a closed-form Lissajous orbit; every other point is
//! advected each tick through the divergence-free field
//! `cross(grad n1, grad n2)`, with `n1` and `n2` two drifting samples of the
//! same noise field. Integration is explicit Euler with no substeps, so the
//! caller must keep `delta` small (see `FixedStepper`).
//!
//! Colors and the head are recomputed from absolute time and are exact under
//! scrubbing. Interior points depend on history and are not.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::clock::FrameTime;
use super::noise::{NoiseField, SimplexNoise};
use crate::consts::{CORD_INIT_PHASE_STEP, CORD_POINTS_PER_SEGMENT, CORD_SEGMENTS, CURL_SAMPLE_OFFSET};
use crate::error::{ConfigError, require_count, require_finite, require_positive};
use crate::vertex::LineVertex;

/// Which previous position a point is advected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdvectionMode {
    /// Each point moves from its own previous position
    #[default]
    InPlace,
    /// Each point moves from its successor's previous position, so the
    /// head's path propagates down the cord toward point 0
    Trail,
}

/// Cord topology, orbit and noise parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CordConfig {
    pub segments: u32,
    pub points_per_segment: u32,
    /// Orbit radius of the head
    pub radius: f32,
    /// Per-axis angular frequencies of the head orbit
    pub lissajous: Vec3,
    /// Per-axis color phase step along the cord
    pub palette_spatial: Vec3,
    /// Per-axis color phase speed over time
    pub palette_temporal: Vec3,
    pub noise_frequency: f32,
    /// Drift speed of the two noise sample offsets
    pub noise_motion: f32,
    pub noise_amplitude: f32,
    /// Orbit phase between consecutive points of the rest shape
    pub init_phase_step: f32,
    pub advection: AdvectionMode,
}

impl Default for CordConfig {
    fn default() -> Self {
        Self {
            segments: CORD_SEGMENTS,
            points_per_segment: CORD_POINTS_PER_SEGMENT,
            radius: 1.0,
            lissajous: Vec3::ONE,
            palette_spatial: Vec3::splat(0.1),
            palette_temporal: Vec3::ONE,
            noise_frequency: 0.5,
            noise_motion: 0.5,
            noise_amplitude: 0.01,
            init_phase_step: CORD_INIT_PHASE_STEP,
            advection: AdvectionMode::InPlace,
        }
    }
}

impl CordConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_count("cord segments", self.segments)?;
        require_count("cord points per segment", self.points_per_segment)?;
        require_positive("cord radius", self.radius)?;
        if !self.lissajous.is_finite() {
            return Err(ConfigError::NotFinite("cord lissajous frequencies"));
        }
        if !self.palette_spatial.is_finite() || !self.palette_temporal.is_finite() {
            return Err(ConfigError::NotFinite("cord palette"));
        }
        require_finite("cord noise frequency", self.noise_frequency)?;
        require_finite("cord noise motion", self.noise_motion)?;
        require_finite("cord noise amplitude", self.noise_amplitude)?;
        require_finite("cord init phase step", self.init_phase_step)?;
        Ok(())
    }

    /// Number of points in the cord
    pub fn point_count(&self) -> usize {
        self.segments as usize * self.points_per_segment as usize + 1
    }

    /// Head position at absolute time `t`
    #[inline]
    pub fn orbit(&self, t: f32) -> Vec3 {
        sin3(self.lissajous * t) * self.radius
    }

    /// Color of point `index` at time `t`
    #[inline]
    pub fn palette(&self, index: usize, t: f32) -> Vec3 {
        (sin3(self.palette_spatial * index as f32 + self.palette_temporal * t) + Vec3::ONE) * 0.5
    }
}

#[inline]
fn sin3(v: Vec3) -> Vec3 {
    Vec3::new(v.x.sin(), v.y.sin(), v.z.sin())
}

/// Divergence-free curl-noise velocity at noise-space point `np`
///
/// The two samples are offset along different axes and drift apart over
/// time, so they decorrelate.
pub fn curl_noise<N: NoiseField + ?Sized>(noise: &N, np: Vec3, time: f32, motion: f32) -> Vec3 {
    let drift = time * motion;
    let offset1 = Vec3::new(0.0, drift - CURL_SAMPLE_OFFSET, 0.0);
    let offset2 = Vec3::new(drift + CURL_SAMPLE_OFFSET, 0.0, 0.0);
    noise.gradient(np + offset1).cross(noise.gradient(np + offset2))
}

/// Persistent cord state (the only history-dependent data in the crate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CordState {
    /// Point positions, trailing end first, head last
    positions: Vec<Vec3>,
    /// Point colors, same order as `positions`
    colors: Vec<Vec3>,
    /// Absolute time of the last committed tick
    pub time: f32,
    /// Ticks committed since initialization
    pub ticks: u64,
    /// Back buffer for the next tick's positions
    #[serde(skip)]
    scratch: Vec<Vec3>,
}

impl CordState {
    /// Rest shape: every point on the head orbit at its own phase offset
    pub fn new(config: &CordConfig) -> Self {
        let n = config.point_count();
        let positions: Vec<Vec3> = (0..n)
            .map(|i| config.orbit(i as f32 * config.init_phase_step))
            .collect();
        let colors = (0..n).map(|i| config.palette(i, 0.0)).collect();
        Self {
            positions,
            colors,
            time: 0.0,
            ticks: 0,
            scratch: vec![Vec3::ZERO; n],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Length of whichever buffer differs from `n`, if any
    fn count_mismatch(&self, n: usize) -> Option<usize> {
        [self.positions.len(), self.colors.len()]
            .into_iter()
            .find(|&len| len != n)
    }

    pub fn head(&self) -> Vec3 {
        self.positions.last().copied().unwrap_or(Vec3::ZERO)
    }

    /// Every position and color is finite
    pub fn is_finite(&self) -> bool {
        self.positions.iter().all(|p| p.is_finite()) && self.colors.iter().all(|c| c.is_finite())
    }
}

/// Advance the cord by one tick
///
/// New positions are built in the back buffer and swapped in at the end, so
/// a half-updated cord is never observable.
pub fn step<N: NoiseField + ?Sized>(
    config: &CordConfig,
    noise: &N,
    state: &mut CordState,
    frame: FrameTime,
) {
    let n = config.point_count();
    if let Some(actual) = state.count_mismatch(n) {
        log::warn!(
            "Cord tick skipped: state has {} points, configuration expects {}",
            actual,
            n
        );
        return;
    }
    if n == 0 {
        return;
    }
    // Only after deserialization, which skips the back buffer
    if state.scratch.len() != n {
        state.scratch.resize(n, Vec3::ZERO);
    }

    let t = frame.time;
    let scale = frame.delta * config.noise_amplitude;
    let mut rejected = 0u32;

    for i in 0..n - 1 {
        let source = match config.advection {
            AdvectionMode::InPlace => state.positions[i],
            AdvectionMode::Trail => state.positions[i + 1],
        };
        let curl = curl_noise(noise, source * config.noise_frequency, t, config.noise_motion);
        let displacement = curl * scale;

        state.scratch[i] = if displacement.is_finite() {
            source + displacement
        } else {
            rejected += 1;
            source
        };
    }
    state.scratch[n - 1] = config.orbit(t);

    std::mem::swap(&mut state.positions, &mut state.scratch);

    for (i, color) in state.colors.iter_mut().enumerate() {
        *color = config.palette(i, t);
    }

    state.time = t;
    state.ticks += 1;

    if rejected > 0 {
        log::warn!(
            "Cord tick {}: ignored {} non-finite curl samples",
            state.ticks,
            rejected
        );
    }
}

/// One rigid cord segment as seen by the host (light placement)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CordSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub midpoint: Vec3,
    /// `end - start`
    pub direction: Vec3,
    /// Segment length, also the width of the segment's area light
    pub length: f32,
    /// Rotation taking +X onto `direction`
    pub rotation: Quat,
    /// Color of the segment's first point
    pub color: Vec3,
}

impl Default for CordSegment {
    fn default() -> Self {
        Self {
            start: Vec3::ZERO,
            end: Vec3::ZERO,
            midpoint: Vec3::ZERO,
            direction: Vec3::ZERO,
            length: 0.0,
            rotation: Quat::IDENTITY,
            color: Vec3::ZERO,
        }
    }
}

impl CordSegment {
    fn between(start: Vec3, end: Vec3, color: Vec3) -> Self {
        let direction = end - start;
        let rotation = direction
            .try_normalize()
            .map(|d| Quat::from_rotation_arc(Vec3::X, d))
            .unwrap_or(Quat::IDENTITY);
        Self {
            start,
            end,
            midpoint: (start + end) * 0.5,
            direction,
            length: direction.length(),
            rotation,
            color,
        }
    }
}

/// Project the cord into segments, transformed by `local_to_world`
///
/// `out` must hold exactly `config.segments` entries.
pub fn project_segments(
    config: &CordConfig,
    state: &CordState,
    local_to_world: &Mat4,
    out: &mut [CordSegment],
) {
    let pps = config.points_per_segment as usize;
    debug_assert_eq!(out.len(), config.segments as usize);
    for (s, segment) in out.iter_mut().enumerate() {
        let (i0, i1) = (s * pps, (s + 1) * pps);
        let (Some(&p0), Some(&p1)) = (state.positions.get(i0), state.positions.get(i1)) else {
            continue;
        };
        *segment = CordSegment::between(
            local_to_world.transform_point3(p0),
            local_to_world.transform_point3(p1),
            state.colors.get(i0).copied().unwrap_or(Vec3::ONE),
        );
    }
}

/// Write the cord as a line strip into `out` (one vertex per point)
pub fn fill_line_strip(state: &CordState, out: &mut [LineVertex]) {
    for ((vertex, &p), &c) in out.iter_mut().zip(&state.positions).zip(&state.colors) {
        *vertex = LineVertex::from_point(p, c);
    }
}

/// A cord plus its per-frame output buffers
///
/// Buffers are sized once from the configuration and rewritten in place.
#[derive(Debug, Clone)]
pub struct LightCord<N: NoiseField = SimplexNoise> {
    config: CordConfig,
    noise: N,
    state: CordState,
    local_to_world: Mat4,
    segments: Vec<CordSegment>,
    line: Vec<LineVertex>,
}

impl LightCord<SimplexNoise> {
    /// Cord over seeded simplex noise
    pub fn new(config: CordConfig, noise_seed: u64) -> Result<Self, ConfigError> {
        Self::with_noise(config, SimplexNoise::new(noise_seed))
    }
}

impl<N: NoiseField> LightCord<N> {
    pub fn with_noise(config: CordConfig, noise: N) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = CordState::new(&config);
        log::info!(
            "Light cord: {} segments x {} points ({} total), {:?} advection",
            config.segments,
            config.points_per_segment,
            state.len(),
            config.advection
        );
        let mut cord = Self {
            segments: vec![CordSegment::default(); config.segments as usize],
            line: vec![LineVertex::default(); state.len()],
            config,
            noise,
            state,
            local_to_world: Mat4::IDENTITY,
        };
        cord.refresh_outputs();
        Ok(cord)
    }

    pub fn config(&self) -> &CordConfig {
        &self.config
    }

    pub fn state(&self) -> &CordState {
        &self.state
    }

    pub fn noise(&self) -> &N {
        &self.noise
    }

    /// Advance one tick and refresh the output buffers
    pub fn tick(&mut self, frame: FrameTime) {
        step(&self.config, &self.noise, &mut self.state, frame);
        self.refresh_outputs();
    }

    /// Return to the rest shape
    pub fn reset(&mut self) {
        self.state = CordState::new(&self.config);
        self.refresh_outputs();
    }

    /// Copy of the current state for save or replay
    pub fn snapshot(&self) -> CordState {
        self.state.clone()
    }

    /// Replace the state with a snapshot of the same topology
    pub fn restore(&mut self, state: CordState) -> Result<(), ConfigError> {
        let expected = self.config.point_count();
        if let Some(actual) = state.count_mismatch(expected) {
            return Err(ConfigError::PointCountMismatch { expected, actual });
        }
        self.state = state;
        self.refresh_outputs();
        Ok(())
    }

    /// Transform applied to segment outputs (cord space to world)
    pub fn set_transform(&mut self, local_to_world: Mat4) {
        self.local_to_world = local_to_world;
        self.refresh_outputs();
    }

    pub fn segments(&self) -> &[CordSegment] {
        &self.segments
    }

    /// Line strip in cord space
    pub fn line_vertices(&self) -> &[LineVertex] {
        &self.line
    }

    fn refresh_outputs(&mut self) {
        project_segments(&self.config, &self.state, &self.local_to_world, &mut self.segments);
        fill_line_strip(&self.state, &mut self.line);
    }
}
