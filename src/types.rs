use glam::Mat4;

use crate::camera::PerspectiveCamera;
use crate::scene::{Material, Scene};

/// Per-frame uniform shared by every draw
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub _pad0: f32,
    pub light_direction: [f32; 3], // Surface to light
    pub shadow_texel: f32,         // 1 / shadow map size
    pub light_color: [f32; 3],     // Colour times intensity
    pub shadows_enabled: f32,
    pub ambient: [f32; 3],
    pub _pad1: f32,
}

impl FrameUniform {
    /// `shadow_map_size` is the edge of the shadow texture actually allocated,
    /// which may be smaller than the requested size on limited devices.
    pub fn new(camera: &PerspectiveCamera, scene: &Scene, shadow_map_size: u32) -> Self {
        let sun = &scene.sun;
        let ambient = &scene.ambient;
        let map_size = shadow_map_size.max(1) as f32;
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            light_view_proj: sun.shadow_view_projection().to_cols_array_2d(),
            camera_position: camera.position.to_array(),
            _pad0: 0.0,
            light_direction: sun.to_light().to_array(),
            shadow_texel: 1.0 / map_size,
            light_color: sun.color.map(|c| c * sun.intensity),
            shadows_enabled: if sun.cast_shadow { 1.0 } else { 0.0 },
            ambient: ambient.color.map(|c| c * ambient.intensity),
            _pad1: 0.0,
        }
    }
}

/// Per-mesh uniform: placement and material
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    pub receive_shadow: f32,
    pub _pad: f32,
}

impl MeshUniform {
    pub fn new(model: Mat4, material: &Material, receive_shadow: bool) -> Self {
        let normal_matrix = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            base_color: material.base_color,
            roughness: material.roughness,
            metalness: material.metalness,
            receive_shadow: if receive_shadow { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }
}
