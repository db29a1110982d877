use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Pointer button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    MouseLeft,
    MouseRight,
    MouseMiddle,
}

/// Accumulates pointer input from Winit events between frames
#[derive(Debug, Clone)]
pub struct PointerInput {
    pressed: HashSet<Button>,
    /// Current mouse position (relative to window)
    mouse_position: Option<(f32, f32)>,
    /// Mouse movement since last reset
    mouse_delta: (f32, f32),
    /// Wheel steps since last reset, positive away from the user
    scroll_delta: f32,
}

impl PointerInput {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            mouse_position: None,
            mouse_delta: (0.0, 0.0),
            scroll_delta: 0.0,
        }
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(btn) = Self::mouse_button_to_button(*button) {
                    self.set_pressed(btn, *state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_to(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    // One step per event, like a browser wheel event
                    MouseScrollDelta::PixelDelta(pos) => pos.y.signum() as f32,
                };
            }
            WindowEvent::Focused(false) => {
                self.pressed.clear();
            }
            _ => {}
        }
    }

    /// Handles an event the UI overlay already consumed. Releases, the cursor
    /// leaving and focus loss still apply so no button stays latched; presses,
    /// motion and wheel belong to the overlay.
    pub fn process_consumed_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            }
            | WindowEvent::CursorLeft { .. }
            | WindowEvent::Focused(false) => self.process_event(event),
            _ => {}
        }
    }

    pub fn set_pressed(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.pressed.insert(button);
        } else {
            self.pressed.remove(&button);
        }
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        if let Some((old_x, old_y)) = self.mouse_position {
            self.mouse_delta.0 += x - old_x;
            self.mouse_delta.1 += y - old_y;
        }
        self.mouse_position = Some((x, y));
    }

    pub fn scroll(&mut self, steps: f32) {
        self.scroll_delta += steps;
    }

    /// Reset per-frame state (mouse and wheel deltas)
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.scroll_delta = 0.0;
    }

    pub fn is_down(&self, button: Button) -> bool {
        self.pressed.contains(&button)
    }

    pub fn mouse_position(&self) -> Option<(f32, f32)> {
        self.mouse_position
    }

    pub fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    fn mouse_button_to_button(button: MouseButton) -> Option<Button> {
        match button {
            MouseButton::Left => Some(Button::MouseLeft),
            MouseButton::Right => Some(Button::MouseRight),
            MouseButton::Middle => Some(Button::MouseMiddle),
            _ => None,
        }
    }
}

impl Default for PointerInput {
    fn default() -> Self {
        Self::new()
    }
}
