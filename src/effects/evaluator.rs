//! Configuration-driven effect evaluator
//!
//! One evaluator per effect instance. Each frame it resolves the effect's
//! local time, derives the effector plane, pairs it with the previous frame
//! and writes the effect's parameter list.

use glam::{Mat4, Vec3, Vec4};

use super::params::{EffectKind, ShaderParams};
use super::plane::{EffectorPlane, PlaneFrame, PlaneHistory};
use crate::color::hsvm;
use crate::motion::LocalClock;

/// Transforms an effect reads each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectInputs {
    /// Effector local-to-world
    pub effector: Mat4,
    /// Origin local-to-world (flattener space, transporter target)
    pub origin: Option<Mat4>,
    /// Orientation of regenerator cells
    pub cell_direction: Option<Mat4>,
}

impl Default for EffectInputs {
    fn default() -> Self {
        Self {
            effector: Mat4::IDENTITY,
            origin: None,
            cell_direction: None,
        }
    }
}

impl EffectInputs {
    pub fn new(effector: Mat4) -> Self {
        Self {
            effector,
            ..Default::default()
        }
    }
}

/// Flattener space for one renderer: origin world-to-local times the
/// renderer's local-to-world
pub fn effect_space(origin: Option<&Mat4>, renderer_local_to_world: &Mat4) -> Mat4 {
    let world_to_origin = origin.map_or(Mat4::IDENTITY, Mat4::inverse);
    world_to_origin * *renderer_local_to_world
}

fn unit_axis(axis: Vec3, fallback: Vec3) -> Vec4 {
    axis.try_normalize().unwrap_or(fallback).extend(0.0)
}

#[derive(Debug, Clone)]
pub struct EffectEvaluator {
    kind: EffectKind,
    clock: LocalClock,
    history: PlaneHistory,
    params: ShaderParams,
}

impl EffectEvaluator {
    pub fn new(kind: EffectKind) -> Self {
        let kind = kind.sanitized();
        log::info!("Effect evaluator: {}", kind.name());
        Self {
            kind,
            clock: LocalClock::default(),
            history: PlaneHistory::default(),
            params: ShaderParams::with_capacity(12),
        }
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    /// Replace the parameters (sanitized); history is kept
    pub fn set_kind(&mut self, kind: EffectKind) {
        self.kind = kind.sanitized();
    }

    pub fn clock(&self) -> &LocalClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut LocalClock {
        &mut self.clock
    }

    pub fn history(&self) -> &PlaneHistory {
        &self.history
    }

    pub fn reset_history(&mut self) {
        self.history = PlaneHistory::default();
    }

    /// Parameters written by the last `evaluate`
    pub fn params(&self) -> &ShaderParams {
        &self.params
    }

    /// Evaluate one frame and return the shared parameter list
    pub fn evaluate(&mut self, inputs: &EffectInputs, global_time: f32) -> &ShaderParams {
        let time = self.clock.resolve(global_time);
        let plane = EffectorPlane::from_transform(&inputs.effector).to_vec4();
        let (history, frame) = self.history.advance(plane, time);
        self.history = history;

        self.params.clear();
        write_params(&self.kind, inputs, &frame, &mut self.params);
        &self.params
    }

    /// Per-renderer parameters; `out` is cleared first
    ///
    /// Only the flattener has any (`_EffSpace`).
    pub fn renderer_params(
        &self,
        inputs: &EffectInputs,
        renderer_local_to_world: &Mat4,
        out: &mut ShaderParams,
    ) {
        out.clear();
        if let EffectKind::Flattener(_) = self.kind {
            out.set_matrix(
                "_EffSpace",
                effect_space(inputs.origin.as_ref(), renderer_local_to_world),
            );
        }
    }
}

fn write_params(kind: &EffectKind, inputs: &EffectInputs, frame: &PlaneFrame, out: &mut ShaderParams) {
    match kind {
        EffectKind::Effector(p) => {
            out.set_float("_Extrusion", p.extrusion);
            out.set_vector("_Effector", frame.current);
            out.set_float("_LocalTime", frame.time);
        }
        EffectKind::Flattener(p) => {
            let s = &p.style;
            out.set_vector("_BaseParams", Vec4::new(p.density, p.size, s.highlight, 0.0));
            out.set_vector("_AnimParams", Vec4::new(p.inflation, 0.0, 0.0, 0.0));
            out.set_vector("_TimeParams", Vec4::new(frame.time, frame.previous_time, 0.0, 0.0));
            out.set_vector("_EffPlaneC", frame.current);
            out.set_vector("_EffPlaneP", frame.previous);
            out.set_vector("_EffHSVM", hsvm(s.emission));
            out.set_vector("_EdgeHSVM", hsvm(s.edge));
            out.set_float("_EdgeWidth", s.edge_width);
            out.set_float("_HueShift", s.hue_shift);
        }
        EffectKind::Transporter(p) => {
            let s = &p.style;
            let origin = inputs
                .origin
                .map_or(Vec3::ZERO, |m| m.w_axis.truncate());
            out.set_vector("_CellParams", Vec4::new(p.cell_density, p.cell_size, s.highlight, 0.0));
            out.set_vector("_AnimParams", Vec4::new(p.inflation, p.swirl, p.scatter, 0.0));
            out.set_vector("_EffectOrigin", origin.extend(0.0));
            out.set_vector("_EffectPlane", frame.current);
            out.set_vector("_EffectPlanePrev", frame.previous);
            out.set_vector("_EmissionHSVM", hsvm(s.emission));
            out.set_vector("_EdgeHSVM", hsvm(s.edge));
            out.set_float("_EdgeWidth", s.edge_width);
            out.set_float("_HueShift", s.hue_shift);
            out.set_float("_LocalTime", frame.time);
        }
        EffectKind::Regenerator(p) => {
            let s = &p.style;
            let (right, up) = inputs.cell_direction.map_or((Vec3::X, Vec3::Y), |m| {
                (m.x_axis.truncate(), m.y_axis.truncate())
            });
            out.set_vector("_CellParams", Vec4::new(p.cell_density, p.cell_size, s.highlight, 0.0));
            out.set_vector("_AnimParams", Vec4::new(p.inflation, p.stretch, 0.0, 0.0));
            out.set_vector("_CellSpace1", unit_axis(right, Vec3::X));
            out.set_vector("_CellSpace2", unit_axis(up, Vec3::Y));
            out.set_vector("_EffectPlane", frame.current);
            out.set_vector("_EffectPlanePrev", frame.previous);
            out.set_vector("_EmissionHSVM", hsvm(s.emission));
            out.set_vector("_EdgeHSVM", hsvm(s.edge));
            out.set_float("_EdgeWidth", s.edge_width);
            out.set_float("_HueShift", s.hue_shift);
            out.set_float("_LocalTime", frame.time);
        }
        EffectKind::Voxelizer(p) => {
            out.set_vector("_VoxelParams", Vec4::new(p.density, p.scale, 0.0, 0.0));
            out.set_vector("_AnimParams", Vec4::new(p.stretch, p.fall_distance, p.fluctuation, 0.0));
            out.set_vector("_EmissionHsvm1", hsvm(p.emission1));
            out.set_vector("_EmissionHsvm2", hsvm(p.emission2));
            out.set_vector("_TransitionColor", p.transition.extend(1.0));
            out.set_vector("_LineColor", p.line.extend(1.0));
            out.set_vector("_EffectorPlane", frame.current);
            out.set_vector("_PrevEffectorPlane", frame.previous);
            out.set_float("_LocalTime", frame.time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::params::{
        EffectorParams, FlattenerParams, RegeneratorParams, TransporterParams, VoxelizerParams,
    };
    use glam::Quat;

    fn names(evaluator: &EffectEvaluator) -> Vec<&'static str> {
        evaluator.params().names().collect()
    }

    #[test]
    fn test_effector_bundle() {
        let mut e = EffectEvaluator::new(EffectKind::Effector(EffectorParams::default()));
        let inputs = EffectInputs::new(Mat4::from_translation(Vec3::new(0.0, 0.0, 3.0)));
        let params = e.evaluate(&inputs, 1.5);
        assert_eq!(params.float("_Extrusion"), Some(0.1));
        assert_eq!(params.vector("_Effector"), Some(Vec4::new(0.0, 0.0, 1.0, 3.0)));
        assert_eq!(params.float("_LocalTime"), Some(1.5));
        assert_eq!(names(&e), vec!["_Extrusion", "_Effector", "_LocalTime"]);
    }

    #[test]
    fn test_flattener_tracks_previous_frame() {
        let mut e = EffectEvaluator::new(EffectKind::Flattener(FlattenerParams::default()));
        let a = EffectInputs::new(Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0)));
        let b = EffectInputs::new(Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)));

        let first = e.evaluate(&a, 0.0).clone();
        assert_eq!(first.vector("_EffPlaneP"), first.vector("_EffPlaneC"));
        assert_eq!(first.vector("_TimeParams"), Some(Vec4::ZERO));

        let second = e.evaluate(&b, 0.5);
        assert_eq!(second.vector("_EffPlaneC"), Some(Vec4::new(0.0, 0.0, 1.0, 2.0)));
        assert_eq!(second.vector("_EffPlaneP"), Some(Vec4::new(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(second.vector("_TimeParams"), Some(Vec4::new(0.5, 0.0, 0.0, 0.0)));
        assert_eq!(
            second.vector("_BaseParams"),
            Some(Vec4::new(0.05, 0.05, 0.2, 0.0))
        );
    }

    #[test]
    fn test_scrub_overrides_global_time() {
        let mut e = EffectEvaluator::new(EffectKind::Transporter(TransporterParams::default()));
        e.clock_mut().set_time(7.0);
        let params = e.evaluate(&EffectInputs::default(), 100.0);
        assert_eq!(params.float("_LocalTime"), Some(7.0));

        e.clock_mut().stop_control();
        let params = e.evaluate(&EffectInputs::default(), 100.0);
        assert_eq!(params.float("_LocalTime"), Some(100.0));
    }

    #[test]
    fn test_transporter_origin() {
        let mut e = EffectEvaluator::new(EffectKind::Transporter(TransporterParams::default()));
        let params = e.evaluate(&EffectInputs::default(), 0.0);
        assert_eq!(params.vector("_EffectOrigin"), Some(Vec4::ZERO));

        let inputs = EffectInputs {
            origin: Some(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))),
            ..Default::default()
        };
        let params = e.evaluate(&inputs, 0.0);
        assert_eq!(params.vector("_EffectOrigin"), Some(Vec4::new(1.0, 2.0, 3.0, 0.0)));
    }

    #[test]
    fn test_regenerator_cell_space() {
        let mut e = EffectEvaluator::new(EffectKind::Regenerator(RegeneratorParams::default()));
        let params = e.evaluate(&EffectInputs::default(), 0.0);
        assert_eq!(params.vector("_CellSpace1"), Some(Vec4::X));
        assert_eq!(params.vector("_CellSpace2"), Some(Vec4::Y));

        let inputs = EffectInputs {
            cell_direction: Some(Mat4::from_scale_rotation_translation(
                Vec3::splat(4.0),
                Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
                Vec3::ZERO,
            )),
            ..Default::default()
        };
        let params = e.evaluate(&inputs, 0.0);
        let right = params.vector("_CellSpace1").unwrap();
        assert!((right - Vec4::Y).length() < 1e-6);
    }

    #[test]
    fn test_voxelizer_black_emission_is_finite() {
        let mut e = EffectEvaluator::new(EffectKind::Voxelizer(VoxelizerParams::default()));
        let params = e.evaluate(&EffectInputs::default(), 0.0);
        let hsvm1 = params.vector("_EmissionHsvm1").unwrap();
        assert!(hsvm1.is_finite());
        assert_eq!(params.vector("_LineColor"), Some(Vec4::ONE));
        assert_eq!(params.len(), 9);
    }

    #[test]
    fn test_effect_space() {
        let renderer = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(effect_space(None, &renderer), renderer);

        let origin = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
        let space = effect_space(Some(&origin), &renderer);
        let p = space.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_renderer_params_only_for_flattener() {
        let inputs = EffectInputs::default();
        let mut out = ShaderParams::default();

        let flattener = EffectEvaluator::new(EffectKind::Flattener(FlattenerParams::default()));
        flattener.renderer_params(&inputs, &Mat4::IDENTITY, &mut out);
        assert_eq!(out.matrix("_EffSpace"), Some(Mat4::IDENTITY));

        let voxelizer = EffectEvaluator::new(EffectKind::Voxelizer(VoxelizerParams::default()));
        voxelizer.renderer_params(&inputs, &Mat4::IDENTITY, &mut out);
        assert!(out.is_empty());
    }
}
