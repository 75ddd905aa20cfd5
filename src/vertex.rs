//! Vertex and instance types handed to the host for upload

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};

/// Line-strip vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }

    pub fn from_point(position: Vec3, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            color: color.extend(1.0).to_array(),
        }
    }
}

/// Per-instance transform and color for instanced draws
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub position: [f32; 3],
    pub intensity: f32,
    pub rotation: [f32; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub fn new(position: Vec3, rotation: Quat, color: Vec3, intensity: f32) -> Self {
        Self {
            position: position.to_array(),
            intensity,
            rotation: rotation.to_array(),
            color: color.extend(1.0).to_array(),
        }
    }
}
