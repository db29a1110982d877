//! Scene graph: lights plus a flat list of top-level nodes.

mod mesh;

pub use mesh::{compute_normals, Material, Mesh, TextureData, Vertex};

use glam::{EulerRot, Mat4, Quat, Vec3};
use std::fmt;

use crate::math::AABB;

/// Stable handle of a top-level node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles in radians, applied X then Y then Z
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub meshes: Vec<Mesh>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            meshes,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn local_bounds(&self) -> AABB {
        self.meshes
            .iter()
            .map(Mesh::bounds)
            .fold(AABB::empty(), |acc, b| acc.union(&b))
    }

    pub fn world_bounds(&self) -> AABB {
        self.local_bounds().transformed(&self.transform.matrix())
    }

    pub fn set_shadows(&mut self, cast: bool, receive: bool) {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
    }

    /// Shifts the node along X and Z so its world bounds are centred on the
    /// vertical axis. Height is left as authored.
    pub fn center_horizontally(&mut self) {
        let bounds = self.world_bounds();
        if bounds.is_empty() {
            return;
        }
        let center = bounds.center();
        self.transform.translation.x -= center.x;
        self.transform.translation.z -= center.z;
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct ShadowSettings {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    /// Half width/height of the orthographic shadow camera
    pub extent: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub cast_shadow: bool,
    pub shadow: ShadowSettings,
}

impl DirectionalLight {
    /// Unit vector from the lit surface towards the light
    pub fn to_light(&self) -> Vec3 {
        (self.position - self.target).try_normalize().unwrap_or(Vec3::Y)
    }

    pub fn shadow_view_projection(&self) -> Mat4 {
        let e = self.shadow.extent;
        let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
        let proj = Mat4::orthographic_rh(-e, e, -e, e, self.shadow.near, self.shadow.far);
        proj * view
    }
}

pub struct Scene {
    /// Linear RGB clear colour
    pub background: [f32; 3],
    pub ambient: AmbientLight,
    pub sun: DirectionalLight,
    nodes: Vec<(NodeId, SceneNode)>,
    next_id: u64,
}

impl Scene {
    pub fn new(background: [f32; 3], ambient: AmbientLight, sun: DirectionalLight) -> Self {
        Self {
            background,
            ambient,
            sun,
            nodes: Vec::new(),
            next_id: 0,
        }
    }

    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push((id, node));
        id
    }

    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let index = self.nodes.iter().position(|(node_id, _)| *node_id == id)?;
        Some(self.nodes.remove(index).1)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|(node_id, _)| *node_id == id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|(node_id, _)| *node_id == id).map(|(_, n)| n)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|(node_id, _)| *node_id == id).map(|(_, n)| n)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
