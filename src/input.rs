use glam::Vec2;
use serde::{Deserialize, Serialize};
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta};

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Pointer input consumed by the orbit controller, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed(MouseButton),
    Released(MouseButton),
    Moved(Vec2),
    /// Vertical scroll; negative values scroll up (towards the scene).
    Wheel(f32),
}

pub fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    let index = match button {
        WinitMouseButton::Left => 0,
        WinitMouseButton::Right => 1,
        WinitMouseButton::Middle => 2,
        WinitMouseButton::Back => 3,
        WinitMouseButton::Forward => 4,
        WinitMouseButton::Other(value) => value.min(u8::MAX as u16) as u8,
    };
    MouseButton::new(index)
}

pub fn map_button_event(state: ElementState, button: WinitMouseButton) -> PointerEvent {
    let button = map_mouse_button(button);
    match state {
        ElementState::Pressed => PointerEvent::Pressed(button),
        ElementState::Released => PointerEvent::Released(button),
    }
}

/// Line deltas are scaled to the roughly 100 pixels per notch browsers report.
const PIXELS_PER_LINE: f32 = 100.0;

/// Converts a winit scroll into DOM-style `deltaY` (positive scrolls down).
pub fn map_scroll(delta: MouseScrollDelta) -> PointerEvent {
    let delta_y = match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
        MouseScrollDelta::PixelDelta(position) => -position.y as f32,
    };
    PointerEvent::Wheel(delta_y)
}
