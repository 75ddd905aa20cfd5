//! Effector planes and their frame-to-frame history

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::consts::LARGE_DELTA;

/// Far-away plane used before the first frame, so the first real plane is
/// always treated as a jump
pub const INITIAL_PREVIOUS_PLANE: Vec4 = Vec4::new(1e5, 1e5, 1e5, 0.0);
pub const INITIAL_PREVIOUS_TIME: f32 = 1e5;

/// Oriented activation plane `dot(normal, p) = distance`
///
/// The normal is the transform's forward axis divided by its z scale, so
/// stretching the effector along z widens the transition band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectorPlane {
    pub normal: Vec3,
    pub distance: f32,
}

impl EffectorPlane {
    pub fn from_transform(local_to_world: &Mat4) -> Self {
        // z column is forward * scale.z, so forward / scale.z = z / |z|^2
        let z = local_to_world.z_axis.truncate();
        let len_sq = z.length_squared();
        let normal = if len_sq > 0.0 && len_sq.is_finite() {
            z / len_sq
        } else {
            Vec3::ZERO
        };
        let origin = local_to_world.w_axis.truncate();
        Self {
            normal,
            distance: normal.dot(origin),
        }
    }

    /// Signed activation of point `p` (zero on the plane)
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) - self.distance
    }

    pub fn to_vec4(self) -> Vec4 {
        self.normal.extend(self.distance)
    }
}

/// Current and previous plane and time for one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaneFrame {
    pub current: Vec4,
    pub previous: Vec4,
    pub time: f32,
    pub previous_time: f32,
}

/// Previous frame's plane and time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneHistory {
    pub plane: Vec4,
    pub time: f32,
}

impl Default for PlaneHistory {
    fn default() -> Self {
        Self {
            plane: INITIAL_PREVIOUS_PLANE,
            time: INITIAL_PREVIOUS_TIME,
        }
    }
}

impl PlaneHistory {
    /// Pair this frame's plane and time with the previous ones
    ///
    /// A jump larger than `LARGE_DELTA` in either the plane or the time
    /// replaces the previous value with the current one, so a teleport or a
    /// timeline seek never smears across the whole scene.
    pub fn advance(self, plane: Vec4, time: f32) -> (PlaneHistory, PlaneFrame) {
        let fresh = self == Self::default();

        let previous = if (self.plane - plane).length() > LARGE_DELTA {
            if !fresh {
                log::warn!("Effector plane jumped from {} to {}", self.plane, plane);
            }
            plane
        } else {
            self.plane
        };
        let previous_time = if (self.time - time).abs() > LARGE_DELTA {
            if !fresh {
                log::warn!("Effect time jumped from {} to {}", self.time, time);
            }
            time
        } else {
            self.time
        };

        let frame = PlaneFrame {
            current: plane,
            previous,
            time,
            previous_time,
        };
        (PlaneHistory { plane, time }, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_identity_transform() {
        let plane = EffectorPlane::from_transform(&Mat4::IDENTITY);
        assert_eq!(plane.normal, Vec3::Z);
        assert_eq!(plane.distance, 0.0);
    }

    #[test]
    fn test_scaled_translated_transform() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(3.0, 3.0, 2.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::new(4.0, 1.0, 0.0),
        );
        let plane = EffectorPlane::from_transform(&m);
        // Forward rotates onto +X, divided by z scale
        assert!((plane.normal - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
        assert!((plane.distance - 2.0).abs() < 1e-5);
        assert!(plane.signed_distance(Vec3::new(4.0, 7.0, -3.0)).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_scale_is_total() {
        let m = Mat4::from_scale(Vec3::new(1.0, 1.0, 0.0));
        let plane = EffectorPlane::from_transform(&m);
        assert!(plane.to_vec4().is_finite());
    }

    #[test]
    fn test_first_frame_snaps_history() {
        let plane = Vec4::new(0.0, 0.0, 1.0, 0.5);
        let (history, frame) = PlaneHistory::default().advance(plane, 2.0);
        assert_eq!(frame.previous, plane);
        assert_eq!(frame.previous_time, 2.0);
        assert_eq!(history.plane, plane);
    }

    #[test]
    fn test_small_motion_keeps_previous() {
        let a = Vec4::new(0.0, 0.0, 1.0, 0.0);
        let b = Vec4::new(0.0, 0.0, 1.0, 0.25);
        let (history, _) = PlaneHistory::default().advance(a, 1.0);
        let (_, frame) = history.advance(b, 1.1);
        assert_eq!(frame.previous, a);
        assert_eq!(frame.current, b);
        assert_eq!(frame.previous_time, 1.0);
    }

    #[test]
    fn test_large_jump_is_filtered() {
        let a = Vec4::new(0.0, 0.0, 1.0, 0.0);
        let far = Vec4::new(0.0, 0.0, 1.0, 500.0);
        let (history, _) = PlaneHistory::default().advance(a, 1.0);
        let (_, frame) = history.advance(far, 300.0);
        assert_eq!(frame.previous, far);
        assert_eq!(frame.previous_time, 300.0);
    }
}
