use glam::Vec3;
use serde::Serialize;
use std::f32::consts::PI;

use crate::camera::PerspectiveCamera;

const EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitSettings {
    pub enable_damping: bool,
    pub damping_factor: f32,
    /// When off, panning moves the target in the horizontal plane
    pub screen_space_panning: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            screen_space_panning: false,
            min_distance: 3.0,
            max_distance: 20.0,
            min_polar_angle: 0.0,
            max_polar_angle: PI / 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
        }
    }
}

/// Spherical coordinates around +Y: `phi` from the pole, `theta` around it
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    const ZERO: Self = Self {
        radius: 0.0,
        phi: 0.0,
        theta: 0.0,
    };

    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self { radius, ..Self::ZERO };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keeps `phi` off the poles so the view direction never aligns with up
    fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

/// Damped orbit camera: rotates, zooms and pans around a look-at target.
///
/// Input handlers only accumulate motion; [`OrbitControls::update`] applies
/// it to the camera once per frame.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub settings: OrbitSettings,
    pub target: Vec3,
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    pub fn new(settings: OrbitSettings, target: Vec3) -> Self {
        Self {
            settings,
            target,
            spherical_delta: Spherical::ZERO,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Drag of `(dx, dy)` pixels; a drag the height of the viewport is one
    /// full turn.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let speed = self.settings.rotate_speed;
        self.rotate_left(2.0 * PI * dx * speed / viewport_height);
        self.rotate_up(2.0 * PI * dy * speed / viewport_height);
    }

    /// Moves the target so the point under the cursor follows the drag.
    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32, camera: &PerspectiveCamera) {
        if viewport_height <= 0.0 {
            return;
        }
        let offset = camera.position - self.target;
        let target_distance = offset.length() * (camera.fov.to_radians() / 2.0).tan();
        let speed = self.settings.pan_speed;

        let left = 2.0 * dx * speed * target_distance / viewport_height;
        let up = 2.0 * dy * speed * target_distance / viewport_height;

        let right = camera.right();
        self.pan_offset += right * -left;

        let up_dir = if self.settings.screen_space_panning {
            right.cross(camera.forward())
        } else {
            camera.up.cross(right)
        };
        self.pan_offset += up_dir * up;
    }

    /// Wheel input; positive steps zoom in.
    pub fn zoom(&mut self, steps: f32) {
        if steps == 0.0 {
            return;
        }
        let zoom_scale = 0.95f32.powf(self.settings.zoom_speed * steps.abs());
        if steps > 0.0 {
            self.scale *= zoom_scale;
        } else {
            self.scale /= zoom_scale;
        }
    }

    /// Drops any motion not yet applied to the camera.
    pub fn clear_motion(&mut self) {
        self.spherical_delta = Spherical::ZERO;
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
    }

    /// Applies accumulated motion to `camera`. Returns whether it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let settings = self.settings;
        let last_position = camera.position;

        let mut spherical = Spherical::from_offset(camera.position - self.target);

        if settings.enable_damping {
            spherical.theta += self.spherical_delta.theta * settings.damping_factor;
            spherical.phi += self.spherical_delta.phi * settings.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }

        spherical.phi = spherical.phi.clamp(settings.min_polar_angle, settings.max_polar_angle);
        spherical.make_safe();

        spherical.radius = (spherical.radius * self.scale).clamp(settings.min_distance, settings.max_distance);

        if settings.enable_damping {
            self.target += self.pan_offset * settings.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if settings.enable_damping {
            let decay = 1.0 - settings.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::ZERO;
            self.pan_offset = Vec3::ZERO;
        }

        let zoomed = self.scale != 1.0;
        self.scale = 1.0;

        zoomed || last_position.distance_squared(camera.position) > EPS
    }
}
