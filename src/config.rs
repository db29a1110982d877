//! Compiled-in viewer parameters.

use serde::Serialize;

use crate::controls::OrbitSettings;
use crate::loading::DEFAULT_FALLBACK_BUDGET;

pub const DEFAULT_PRIMARY_MODEL: &str = "models/simple_castle.glb";
pub const DEFAULT_FALLBACK_MODEL: &str = "models/test_cube.glb";
pub const INITIAL_WINDOW_WIDTH: u32 = 800;
pub const INITIAL_WINDOW_HEIGHT: u32 = 600;

#[derive(Debug, Clone, Serialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct LightConfig {
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub sun_color: u32,
    pub sun_intensity: f32,
    pub sun_position: [f32; 3],
    pub shadow_map_size: u32,
    pub shadow_near: f32,
    pub shadow_far: f32,
    pub shadow_extent: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroundConfig {
    pub size: f32,
    pub color: u32,
    pub roughness: f32,
    pub metalness: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewerConfig {
    /// Directory or `http(s)://` base URL that model paths are relative to
    pub asset_root: String,
    pub primary_model: String,
    pub fallback_model: String,
    pub fallback_budget: u32,
    pub background: u32,
    pub camera: CameraConfig,
    pub orbit: OrbitSettings,
    pub lights: LightConfig,
    pub ground: GroundConfig,
    pub placeholder_size: f32,
    pub placeholder_color: u32,
    /// Yaw added per frame to the loaded model while rotation is on
    pub model_spin: f32,
    /// Yaw added per frame to the placeholder while nothing is loaded
    pub placeholder_spin: f32,
    pub msaa_samples: u32,
    pub show_ui: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_root: ".".to_string(),
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            fallback_budget: DEFAULT_FALLBACK_BUDGET,
            background: 0x87ceeb,
            camera: CameraConfig {
                fov: 45.0,
                near: 0.1,
                far: 1000.0,
                position: [5.0, 5.0, 5.0],
                target: [0.0, 0.0, 0.0],
            },
            orbit: OrbitSettings::default(),
            lights: LightConfig {
                ambient_color: 0xffffff,
                ambient_intensity: 0.5,
                sun_color: 0xffffff,
                sun_intensity: 1.0,
                sun_position: [5.0, 10.0, 5.0],
                shadow_map_size: 2048,
                shadow_near: 0.5,
                shadow_far: 50.0,
                shadow_extent: 10.0,
            },
            ground: GroundConfig {
                size: 50.0,
                color: 0x8b4513,
                roughness: 0.8,
                metalness: 0.2,
                height: -0.1,
            },
            placeholder_size: 1.0,
            placeholder_color: 0xff0000,
            model_spin: 0.005,
            placeholder_spin: 0.01,
            msaa_samples: 4,
            show_ui: true,
        }
    }
}

impl ViewerConfig {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
