use std::collections::HashSet;

use super::types::{Key, MouseButton};

/// Per-frame input deltas.
///
/// `InputState` provides the current state (held keys/buttons, pointer position).
/// `InputFrame` accumulates transitions until the runtime clears it after a frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Keys pressed this frame; repeats are not included.
    pub keys_pressed: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,

    /// Pointer motion in logical pixels.
    pub pointer_delta: (f32, f32),

    /// Vertical wheel travel in lines.
    pub wheel_lines: f32,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.pointer_delta = (0.0, 0.0);
        self.wheel_lines = 0.0;
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }
}
