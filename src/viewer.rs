//! Viewer model: the scene, camera and UI state advanced once per frame.

use glam::Vec3;

use crate::camera::{CameraPose, PerspectiveCamera};
use crate::config::ViewerConfig;
use crate::controls::OrbitControls;
use crate::input::{Button, PointerInput};
use crate::loaders::AssetLoader;
use crate::loading::{DisplayedNode, LoadPhase, ModelLoadState, RetryBudget};
use crate::math::hex_to_linear;
use crate::scene::{AmbientLight, DirectionalLight, Mesh, Material, NodeId, Scene, SceneNode, ShadowSettings};
use crate::status::StatusLine;
use crate::viewport::Viewport;

pub const ROTATION_ON_LABEL: &str = "Stop Rotation";
pub const ROTATION_OFF_LABEL: &str = "Toggle Rotation";

/// Pixels a middle-button drag needs to move for one zoom step
const DOLLY_PIXELS_PER_STEP: f32 = 10.0;

/// UI-facing state: the rotation toggle and the status line.
#[derive(Debug, Clone)]
pub struct ViewerState {
    rotating: bool,
    rotation_label: &'static str,
    pub status: StatusLine,
}

impl ViewerState {
    pub fn new() -> Self {
        Self {
            rotating: false,
            rotation_label: ROTATION_OFF_LABEL,
            status: StatusLine::new(),
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    pub fn rotation_label(&self) -> &'static str {
        self.rotation_label
    }

    /// Flips the flag and relabels the button. Returns the new flag.
    pub fn toggle_rotation(&mut self) -> bool {
        self.rotating = !self.rotating;
        self.rotation_label = if self.rotating {
            ROTATION_ON_LABEL
        } else {
            ROTATION_OFF_LABEL
        };
        self.rotating
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the static part of the scene and returns it with the placeholder id.
pub fn build_scene(config: &ViewerConfig) -> (Scene, NodeId) {
    let lights = &config.lights;
    let background = hex_to_linear(config.background);
    let ambient = AmbientLight {
        color: hex_to_linear(lights.ambient_color),
        intensity: lights.ambient_intensity,
    };
    let sun = DirectionalLight {
        color: hex_to_linear(lights.sun_color),
        intensity: lights.sun_intensity,
        position: Vec3::from(lights.sun_position),
        target: Vec3::ZERO,
        cast_shadow: true,
        shadow: ShadowSettings {
            map_size: lights.shadow_map_size,
            near: lights.shadow_near,
            far: lights.shadow_far,
            extent: lights.shadow_extent,
        },
    };
    let mut scene = Scene::new(background, ambient, sun);

    let ground_config = &config.ground;
    let ground_material = Material::new(
        hex_to_linear(ground_config.color),
        ground_config.roughness,
        ground_config.metalness,
    );
    let mut ground = SceneNode::new(
        "ground",
        vec![Mesh::plane(ground_config.size, ground_config.size, ground_material)],
    );
    ground.transform.rotation.x = -std::f32::consts::FRAC_PI_2;
    ground.transform.translation.y = ground_config.height;
    ground.set_shadows(false, true);
    scene.add(ground);

    let s = config.placeholder_size;
    let placeholder_material = Material::new(hex_to_linear(config.placeholder_color), 1.0, 0.0);
    let placeholder = SceneNode::new("placeholder", vec![Mesh::cuboid(s, s, s, placeholder_material)]);
    let placeholder_id = scene.add(placeholder);

    (scene, placeholder_id)
}

pub struct Viewer {
    pub config: ViewerConfig,
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub viewport: Viewport,
    pub state: ViewerState,
    initial_pose: CameraPose,
    loads: ModelLoadState,
    loader: Box<dyn AssetLoader>,
}

impl Viewer {
    pub fn new(config: ViewerConfig, loader: Box<dyn AssetLoader>, width: u32, height: u32) -> Self {
        let (scene, placeholder) = build_scene(&config);

        let viewport = Viewport::new(width.max(1), height.max(1));
        let camera_config = &config.camera;
        let initial_pose = CameraPose::new(
            Vec3::from(camera_config.position),
            Vec3::from(camera_config.target),
        );
        let mut camera = PerspectiveCamera::new(
            camera_config.fov,
            viewport.aspect_ratio(),
            camera_config.near,
            camera_config.far,
        );
        camera.set_pose(initial_pose);

        let controls = OrbitControls::new(config.orbit, initial_pose.target);

        let loads = ModelLoadState::new(
            placeholder,
            config.primary_model.clone(),
            config.fallback_model.clone(),
            RetryBudget::new(config.fallback_budget),
        );

        Self {
            config,
            scene,
            camera,
            controls,
            viewport,
            state: ViewerState::new(),
            initial_pose,
            loads,
            loader,
        }
    }

    pub fn load_phase(&self) -> LoadPhase {
        self.loads.phase()
    }

    pub fn displayed(&self) -> DisplayedNode {
        self.loads.displayed()
    }

    pub fn load_state(&self) -> &ModelLoadState {
        &self.loads
    }

    /// Starts the primary model load.
    pub fn start(&mut self) {
        self.loads.start(self.loader.as_mut(), &mut self.state.status);
    }

    /// Applies every load event the loader has produced so far.
    pub fn pump_loader(&mut self) -> usize {
        let events = self.loader.poll_events();
        let count = events.len();
        for event in events {
            self.loads
                .handle_event(event, &mut self.scene, self.loader.as_mut(), &mut self.state.status);
        }
        count
    }

    /// One frame of model work: load events, camera damping, auto-rotation.
    pub fn tick(&mut self) {
        self.pump_loader();
        self.controls.update(&mut self.camera);

        let (id, step) = match self.loads.displayed() {
            DisplayedNode::Model { id, .. } if self.state.is_rotating() => (id, self.config.model_spin),
            DisplayedNode::Model { .. } => return,
            DisplayedNode::Placeholder(id) => (id, self.config.placeholder_spin),
        };
        if let Some(node) = self.scene.get_mut(id) {
            node.transform.rotation.y += step;
        }
    }

    /// Back to the startup pose, dropping any pending orbit motion.
    pub fn reset_camera(&mut self) {
        self.camera.set_pose(self.initial_pose);
        self.controls.target = self.initial_pose.target;
        self.controls.clear_motion();
        self.controls.update(&mut self.camera);
    }

    pub fn toggle_rotation(&mut self) -> bool {
        let rotating = self.state.toggle_rotation();
        log::debug!("Model rotation {}", if rotating { "on" } else { "off" });
        rotating
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.viewport.resize(width, height, &mut self.camera)
    }

    /// Left drag orbits, right drag pans, middle drag and the wheel zoom.
    pub fn apply_pointer(&mut self, input: &PointerInput) {
        let (dx, dy) = input.mouse_delta();
        let height = self.viewport.height() as f32;

        if input.is_down(Button::MouseLeft) {
            self.controls.rotate_by_pixels(dx, dy, height);
        } else if input.is_down(Button::MouseRight) {
            self.controls.pan_by_pixels(dx, dy, height, &self.camera);
        } else if input.is_down(Button::MouseMiddle) {
            self.controls.zoom(-dy / DOLLY_PIXELS_PER_STEP);
        }

        self.controls.zoom(input.scroll_delta());
    }

    /// Background colour for the clear pass, in linear space.
    pub fn clear_color(&self) -> [f32; 3] {
        self.scene.background
    }
}
