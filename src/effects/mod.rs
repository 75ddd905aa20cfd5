//! Effector planes and shader parameter bundles
//!
//! The only state here is the previous frame's plane and time, held
//! explicitly in `PlaneHistory`.

pub mod evaluator;
pub mod params;
pub mod plane;

pub use evaluator::{EffectEvaluator, EffectInputs, effect_space};
pub use params::{
    EdgeStyle, EffectKind, EffectorParams, FlattenerParams, ParamValue, RegeneratorParams,
    ShaderParams, TransporterParams, VoxelizerParams,
};
pub use plane::{EffectorPlane, PlaneFrame, PlaneHistory};
