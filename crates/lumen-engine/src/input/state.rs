use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{ButtonState, InputEvent, Key, MouseButton};

/// Current input state for a single window.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies an event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = f;
                if !f {
                    // Avoids stuck keys/buttons when focus changes mid-press.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => {
                if let Some((px, py)) = self.pointer_pos {
                    frame.pointer_delta.0 += x - px;
                    frame.pointer_delta.1 += y - py;
                }
                self.pointer_pos = Some((x, y));
            }

            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Key { key, state, repeat } => match state {
                ButtonState::Pressed => {
                    if self.keys_down.insert(key) && !repeat {
                        frame.keys_pressed.insert(key);
                    }
                }
                ButtonState::Released => {
                    self.keys_down.remove(&key);
                }
            },

            InputEvent::PointerButton { button, state } => match state {
                ButtonState::Pressed => {
                    if self.buttons_down.insert(button) {
                        frame.buttons_pressed.insert(button);
                    }
                }
                ButtonState::Released => {
                    if self.buttons_down.remove(&button) {
                        frame.buttons_released.insert(button);
                    }
                }
            },

            InputEvent::Wheel(delta) => frame.wheel_lines += delta.lines_y(),
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseWheelDelta;

    fn apply(state: &mut InputState, frame: &mut InputFrame, events: &[InputEvent]) {
        for ev in events {
            state.apply_event(frame, ev.clone());
        }
    }

    #[test]
    fn pointer_delta_accumulates_after_first_position() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        apply(
            &mut state,
            &mut frame,
            &[
                InputEvent::PointerMoved { x: 10.0, y: 10.0 },
                InputEvent::PointerMoved { x: 13.0, y: 8.0 },
                InputEvent::PointerMoved { x: 15.0, y: 8.0 },
            ],
        );
        assert_eq!(frame.pointer_delta, (5.0, -2.0));
        assert_eq!(state.pointer_pos, Some((15.0, 8.0)));

        frame.clear();
        assert_eq!(frame.pointer_delta, (0.0, 0.0));
    }

    #[test]
    fn repeats_do_not_count_as_presses() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        apply(
            &mut state,
            &mut frame,
            &[
                InputEvent::Key { key: Key::R, state: ButtonState::Pressed, repeat: false },
                InputEvent::Key { key: Key::R, state: ButtonState::Pressed, repeat: true },
            ],
        );
        assert!(frame.key_pressed(Key::R));
        assert!(state.key_down(Key::R));

        frame.clear();
        state.apply_event(
            &mut frame,
            InputEvent::Key { key: Key::R, state: ButtonState::Pressed, repeat: true },
        );
        assert!(!frame.key_pressed(Key::R));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        apply(
            &mut state,
            &mut frame,
            &[
                InputEvent::PointerButton { button: MouseButton::Left, state: ButtonState::Pressed },
                InputEvent::Key { key: Key::Space, state: ButtonState::Pressed, repeat: false },
                InputEvent::Focused(false),
            ],
        );
        assert!(!state.button_down(MouseButton::Left));
        assert!(!state.key_down(Key::Space));
    }

    #[test]
    fn wheel_pixels_convert_to_lines() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        apply(
            &mut state,
            &mut frame,
            &[
                InputEvent::Wheel(MouseWheelDelta::Line { x: 0.0, y: 1.0 }),
                InputEvent::Wheel(MouseWheelDelta::Pixel { x: 0.0, y: 80.0 }),
            ],
        );
        assert!((frame.wheel_lines - 3.0).abs() < 1e-6);
    }
}
