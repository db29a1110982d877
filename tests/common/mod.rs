#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use model_viewer::config::ViewerConfig;
use model_viewer::loaders::{LoadError, LoadProgress, LoadSlot};
use model_viewer::scene::{Material, Mesh, NodeId, Scene, SceneNode};
use model_viewer::viewer::build_scene;
use model_viewer::{AssetLoader, LoadEvent, LoadRequest};

#[derive(Default)]
struct FakeQueue {
    requests: Vec<LoadRequest>,
    pending: VecDeque<LoadEvent>,
}

/// Loader double: records requests and replays queued events on poll.
/// Clones share one queue so a test can keep a handle after boxing it.
#[derive(Clone, Default)]
pub struct FakeLoader(Rc<RefCell<FakeQueue>>);

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<LoadRequest> {
        self.0.borrow().requests.clone()
    }

    pub fn push(&self, event: LoadEvent) {
        self.0.borrow_mut().pending.push_back(event);
    }
}

impl AssetLoader for FakeLoader {
    fn begin_load(&mut self, request: LoadRequest) {
        self.0.borrow_mut().requests.push(request);
    }

    fn poll_events(&mut self) -> Vec<LoadEvent> {
        self.0.borrow_mut().pending.drain(..).collect()
    }
}

pub fn progress(slot: LoadSlot, loaded: u64, total: Option<u64>) -> LoadEvent {
    LoadEvent::Progress {
        slot,
        progress: LoadProgress::new(loaded, total),
    }
}

pub fn loaded(slot: LoadSlot, node: SceneNode) -> LoadEvent {
    LoadEvent::Loaded { slot, node }
}

pub fn failed(slot: LoadSlot, url: &str) -> LoadEvent {
    LoadEvent::Failed {
        slot,
        error: LoadError::new(url, "404 Not Found"),
    }
}

/// Box node whose geometry sits off-centre, spanning `min..min + size`
pub fn offset_box(name: &str, min: [f32; 3], size: f32) -> SceneNode {
    let mut mesh = Mesh::cuboid(size, size, size, Material::default());
    let shift = glam::Vec3::from(min) + glam::Vec3::splat(size / 2.0);
    for v in &mut mesh.vertices {
        v.position = (glam::Vec3::from(v.position) + shift).to_array();
    }
    SceneNode::new(name, vec![mesh])
}

pub fn default_scene() -> (Scene, NodeId) {
    build_scene(&ViewerConfig::default())
}

pub fn count_named(scene: &Scene, name: &str) -> usize {
    scene.nodes().filter(|(_, node)| node.name == name).count()
}

/// Binary glTF holding one indexed triangle mesh under a node with `translation`
pub fn glb_from_triangles(positions: &[[f32; 3]], indices: &[u32], translation: [f32; 3]) -> Vec<u8> {
    let mut bin: Vec<u8> = Vec::new();
    for p in positions {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    let positions_len = bin.len();
    for i in indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let indices_len = bin.len() - positions_len;

    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in positions {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }

    let json = serde_json::json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "translation": translation }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": positions_len, "target": 34962 },
            { "buffer": 0, "byteOffset": positions_len, "byteLength": indices_len, "target": 34963 }
        ],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": positions.len(),
                "type": "VEC3",
                "min": min,
                "max": max
            },
            {
                "bufferView": 1,
                "componentType": 5125,
                "count": indices.len(),
                "type": "SCALAR"
            }
        ]
    });

    let mut json_bytes = serde_json::to_vec(&json).expect("serialize glTF json");
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json_bytes.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F_534Au32.to_le_bytes());
    glb.extend_from_slice(&json_bytes);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E_4942u32.to_le_bytes());
    glb.extend_from_slice(&bin);
    glb
}

/// Axis-aligned cube of edge `size` with its minimum corner at `min`
pub fn cube_glb(min: [f32; 3], size: f32, translation: [f32; 3]) -> Vec<u8> {
    let [x0, y0, z0] = min;
    let (x1, y1, z1) = (x0 + size, y0 + size, z0 + size);
    let positions = [
        [x0, y0, z0],
        [x1, y0, z0],
        [x1, y1, z0],
        [x0, y1, z0],
        [x0, y0, z1],
        [x1, y0, z1],
        [x1, y1, z1],
        [x0, y1, z1],
    ];
    let indices = [
        0, 2, 1, 0, 3, 2, // back
        4, 5, 6, 4, 6, 7, // front
        0, 1, 5, 0, 5, 4, // bottom
        3, 7, 6, 3, 6, 2, // top
        0, 4, 7, 0, 7, 3, // left
        1, 2, 6, 1, 6, 5, // right
    ];
    glb_from_triangles(&positions, &indices, translation)
}
