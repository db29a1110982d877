use crate::camera::PerspectiveCamera;

/// Size of the drawing surface in physical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0 {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }

    /// Records the new size and updates `camera`'s aspect ratio. Zero-sized
    /// requests (minimised windows) are ignored and return `false`.
    pub fn resize(&mut self, width: u32, height: u32, camera: &mut PerspectiveCamera) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        camera.aspect = self.aspect_ratio();
        true
    }
}
