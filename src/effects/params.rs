//! Effect parameter bundles and the shader-facing parameter list

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// One shader uniform value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ParamValue {
    Float(f32),
    Vector(Vec4),
    Matrix(Mat4),
}

/// Ordered `(name, value)` list for one property block
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShaderParams {
    entries: Vec<(&'static str, ParamValue)>,
}

impl ShaderParams {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn set_float(&mut self, name: &'static str, value: f32) {
        self.entries.push((name, ParamValue::Float(value)));
    }

    pub fn set_vector(&mut self, name: &'static str, value: Vec4) {
        self.entries.push((name, ParamValue::Vector(value)));
    }

    pub fn set_matrix(&mut self, name: &'static str, value: Mat4) {
        self.entries.push((name, ParamValue::Matrix(value)));
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            ParamValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn vector(&self, name: &str) -> Option<Vec4> {
        match self.get(name)? {
            ParamValue::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn matrix(&self, name: &str) -> Option<Mat4> {
        match self.get(name)? {
            ParamValue::Matrix(v) => Some(v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, ParamValue)> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn clamp_range(x: f32, lo: f32, hi: f32) -> f32 {
    if x.is_nan() { lo } else { x.clamp(lo, hi) }
}

fn non_negative(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.max(0.0) }
}

/// Emission and edge styling shared by the cell effects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeStyle {
    /// HDR emission color
    pub emission: Vec3,
    /// HDR edge color
    pub edge: Vec3,
    pub edge_width: f32,
    pub hue_shift: f32,
    pub highlight: f32,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            emission: Vec3::ZERO,
            edge: Vec3::ONE,
            edge_width: 1.0,
            hue_shift: 0.0,
            highlight: 0.2,
        }
    }
}

impl EdgeStyle {
    fn sanitize(&mut self) {
        self.edge_width = clamp_range(self.edge_width, 0.0, 8.0);
        self.hue_shift = clamp_range(self.hue_shift, 0.0, 1.0);
        self.highlight = clamp_range(self.highlight, 0.0, 1.0);
    }
}

/// Plain extrusion away from the effector plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectorParams {
    pub extrusion: f32,
}

impl Default for EffectorParams {
    fn default() -> Self {
        Self { extrusion: 0.1 }
    }
}

/// Flattens the surface into cells as the plane sweeps over it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenerParams {
    pub density: f32,
    pub size: f32,
    pub inflation: f32,
    #[serde(flatten)]
    pub style: EdgeStyle,
}

impl Default for FlattenerParams {
    fn default() -> Self {
        Self {
            density: 0.05,
            size: 0.05,
            inflation: 1.0,
            style: EdgeStyle::default(),
        }
    }
}

/// Breaks the surface into swirling cells drawn toward an origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransporterParams {
    pub cell_density: f32,
    pub cell_size: f32,
    pub inflation: f32,
    pub swirl: f32,
    pub scatter: f32,
    #[serde(flatten)]
    pub style: EdgeStyle,
}

impl Default for TransporterParams {
    fn default() -> Self {
        Self {
            cell_density: 0.05,
            cell_size: 0.1,
            inflation: 1.0,
            swirl: 1.0,
            scatter: 1.0,
            style: EdgeStyle::default(),
        }
    }
}

/// Regrows the surface from stretched cells along a cell direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegeneratorParams {
    pub cell_density: f32,
    pub cell_size: f32,
    pub inflation: f32,
    pub stretch: f32,
    #[serde(flatten)]
    pub style: EdgeStyle,
}

impl Default for RegeneratorParams {
    fn default() -> Self {
        Self {
            cell_density: 0.05,
            cell_size: 0.1,
            inflation: 1.0,
            stretch: 5.0,
            style: EdgeStyle::default(),
        }
    }
}

/// Turns the surface into falling voxels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxelizerParams {
    pub density: f32,
    pub scale: f32,
    pub stretch: f32,
    pub fall_distance: f32,
    pub fluctuation: f32,
    pub emission1: Vec3,
    pub emission2: Vec3,
    pub transition: Vec3,
    pub line: Vec3,
}

impl Default for VoxelizerParams {
    fn default() -> Self {
        Self {
            density: 0.05,
            scale: 3.0,
            stretch: 5.0,
            fall_distance: 1.0,
            fluctuation: 1.0,
            emission1: Vec3::ZERO,
            emission2: Vec3::ZERO,
            transition: Vec3::ONE,
            line: Vec3::ONE,
        }
    }
}

/// Every effect the evaluator knows how to feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EffectKind {
    Effector(EffectorParams),
    Flattener(FlattenerParams),
    Transporter(TransporterParams),
    Regenerator(RegeneratorParams),
    Voxelizer(VoxelizerParams),
}

impl Default for EffectKind {
    fn default() -> Self {
        EffectKind::Effector(EffectorParams::default())
    }
}

impl EffectKind {
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Effector(_) => "effector",
            EffectKind::Flattener(_) => "flattener",
            EffectKind::Transporter(_) => "transporter",
            EffectKind::Regenerator(_) => "regenerator",
            EffectKind::Voxelizer(_) => "voxelizer",
        }
    }

    /// Clamp every field into its valid range
    pub fn sanitize(&mut self) {
        match self {
            EffectKind::Effector(p) => {
                if !p.extrusion.is_finite() {
                    p.extrusion = 0.0;
                }
            }
            EffectKind::Flattener(p) => {
                p.density = clamp_range(p.density, 0.0, 1.0);
                p.size = non_negative(p.size);
                p.inflation = non_negative(p.inflation);
                p.style.sanitize();
            }
            EffectKind::Transporter(p) => {
                p.cell_density = clamp_range(p.cell_density, 0.0, 1.0);
                p.cell_size = non_negative(p.cell_size);
                p.inflation = non_negative(p.inflation);
                p.style.sanitize();
            }
            EffectKind::Regenerator(p) => {
                p.cell_density = clamp_range(p.cell_density, 0.0, 1.0);
                p.cell_size = non_negative(p.cell_size);
                p.inflation = non_negative(p.inflation);
                p.stretch = non_negative(p.stretch);
                p.style.sanitize();
            }
            EffectKind::Voxelizer(p) => {
                p.density = clamp_range(p.density, 0.0, 1.0);
                p.scale = clamp_range(p.scale, 0.0, 10.0);
                p.stretch = clamp_range(p.stretch, 0.0, 20.0);
                p.fall_distance = clamp_range(p.fall_distance, 0.0, 1000.0);
                p.fluctuation = clamp_range(p.fluctuation, 0.0, 10.0);
            }
        }
    }

    /// Returns a sanitized copy
    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }
}
