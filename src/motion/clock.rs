//! Time inputs: scrub overrides and the fixed-step driver
//!
//! Stateless paths take a plain time value. `LocalClock` decides which time a
//! component sees (global or scrubbed); `FixedStepper` turns variable host
//! frame deltas into bounded integration steps for the cord.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};
use crate::error::{ConfigError, require_count, require_positive};

/// Time handed to a step function for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameTime {
    /// Absolute time in seconds
    pub time: f32,
    /// Seconds since the previous tick
    pub delta: f32,
}

impl FrameTime {
    pub const fn new(time: f32, delta: f32) -> Self {
        Self { time, delta }
    }
}

/// Per-component time source with an optional scrub override
///
/// Scrubbing is exact for every stateless output. The cord interior depends
/// on integrated history and only follows the override approximately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalClock {
    control_time: Option<f32>,
    playing: bool,
}

impl Default for LocalClock {
    fn default() -> Self {
        Self {
            control_time: None,
            playing: true,
        }
    }
}

impl LocalClock {
    /// Clock that is not playing (editor preview); resolves to 0 unless scrubbed
    pub fn stopped() -> Self {
        Self {
            control_time: None,
            playing: false,
        }
    }

    /// Override the time for this component
    pub fn set_time(&mut self, time: f32) {
        self.control_time = Some(time);
    }

    /// Drop the override and follow global time again
    pub fn stop_control(&mut self) {
        self.control_time = None;
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn is_scrubbing(&self) -> bool {
        self.control_time.is_some()
    }

    /// Time this component should evaluate at
    pub fn resolve(&self, global_time: f32) -> f32 {
        match self.control_time {
            Some(t) => t,
            None if self.playing => global_time,
            None => 0.0,
        }
    }
}

/// Fixed-timestep accumulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedStepper {
    step_dt: f32,
    max_substeps: u32,
    accumulator: f32,
    sim_time: f32,
}

impl FixedStepper {
    pub fn new(step_dt: f32, max_substeps: u32) -> Result<Self, ConfigError> {
        require_positive("step dt", step_dt)?;
        require_count("max substeps", max_substeps)?;
        Ok(Self {
            step_dt,
            max_substeps,
            accumulator: 0.0,
            sim_time: 0.0,
        })
    }

    /// Stepper running at `hz` ticks per second
    pub fn from_rate(hz: u32) -> Result<Self, ConfigError> {
        require_count("simulation rate", hz)?;
        Self::new(1.0 / hz as f32, MAX_SUBSTEPS)
    }

    pub fn step_dt(&self) -> f32 {
        self.step_dt
    }

    /// Simulated time after all steps handed out so far
    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    /// Feed one host frame and get the ticks to run for it
    pub fn advance(&mut self, frame_dt: f32) -> Steps {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut count = 0;
        while self.accumulator >= self.step_dt && count < self.max_substeps {
            self.accumulator -= self.step_dt;
            count += 1;
        }

        // Drop backlog we could not catch up on
        if count == self.max_substeps && self.accumulator >= self.step_dt {
            log::debug!(
                "Dropping {:.4}s of simulation backlog",
                self.accumulator - self.step_dt
            );
            self.accumulator = self.accumulator.min(self.step_dt);
        }

        let start = self.sim_time;
        self.sim_time += count as f32 * self.step_dt;

        Steps {
            start,
            step_dt: self.step_dt,
            remaining: count,
            index: 0,
        }
    }

    /// Fraction of a step left in the accumulator (for render interpolation)
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step_dt).clamp(0.0, 1.0)
    }
}

/// Ticks produced by one `FixedStepper::advance`
#[derive(Debug, Clone)]
pub struct Steps {
    start: f32,
    step_dt: f32,
    remaining: u32,
    index: u32,
}

impl Iterator for Steps {
    type Item = FrameTime;

    fn next(&mut self) -> Option<FrameTime> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.index += 1;
        Some(FrameTime::new(
            self.start + self.index as f32 * self.step_dt,
            self.step_dt,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for Steps {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_clock_override() {
        let mut clock = LocalClock::default();
        assert_eq!(clock.resolve(12.5), 12.5);

        clock.set_time(3.0);
        assert!(clock.is_scrubbing());
        assert_eq!(clock.resolve(12.5), 3.0);

        clock.stop_control();
        assert_eq!(clock.resolve(12.5), 12.5);
    }

    #[test]
    fn test_stopped_clock_resolves_to_zero() {
        let mut clock = LocalClock::stopped();
        assert_eq!(clock.resolve(42.0), 0.0);
        clock.set_time(1.5);
        assert_eq!(clock.resolve(42.0), 1.5);
    }

    #[test]
    fn test_stepper_accumulates() {
        let mut stepper = FixedStepper::from_rate(60).unwrap();
        // Less than one step: nothing to run yet
        assert_eq!(stepper.advance(0.01).len(), 0);
        // Crosses one step boundary
        let steps: Vec<_> = stepper.advance(0.01).collect();
        assert_eq!(steps.len(), 1);
        assert!((steps[0].delta - 1.0 / 60.0).abs() < 1e-7);
        assert!((steps[0].time - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_stepper_bounds_substeps() {
        let mut stepper = FixedStepper::new(0.001, 8).unwrap();
        // A huge stall is clamped and capped
        let steps = stepper.advance(5.0);
        assert_eq!(steps.len(), 8);
        assert!(stepper.alpha() <= 1.0);
        // Backlog was dropped
        assert!(stepper.advance(0.0).len() <= 1);
    }

    #[test]
    fn test_stepper_ignores_bad_deltas() {
        let mut stepper = FixedStepper::from_rate(30).unwrap();
        assert_eq!(stepper.advance(f32::NAN).len(), 0);
        assert_eq!(stepper.advance(-1.0).len(), 0);
        assert_eq!(stepper.sim_time(), 0.0);
    }

    #[test]
    fn test_stepper_times_are_monotonic() {
        let mut stepper = FixedStepper::from_rate(120).unwrap();
        let mut last = 0.0;
        for _ in 0..100 {
            for step in stepper.advance(1.0 / 50.0) {
                assert!(step.time > last);
                last = step.time;
            }
        }
        assert!((stepper.sim_time() - last).abs() < 1e-5);
    }

    #[test]
    fn test_rejects_zero_rate() {
        assert!(FixedStepper::from_rate(0).is_err());
        assert!(FixedStepper::new(0.0, 4).is_err());
        assert!(FixedStepper::new(0.01, 0).is_err());
    }
}
