use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Input state snapshot fed by window events and read by the per-tick update.
///
/// The renderer never looks at window events directly; the shell forwards
/// each event here and hands `&Input` to [`crate::Renderer::tick`].
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_position: Option<Vec2>,
    drag: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears edge-triggered state. Call once per tick after reading it.
    pub fn end_tick(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.set_key_down(key, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    self.mouse_buttons_down.insert(*button);
                }
                ElementState::Released => {
                    self.mouse_buttons_down.remove(button);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::Focused(false) => {
                // Releases are not delivered to an unfocused window.
                self.keys_down.clear();
                self.mouse_buttons_down.clear();
            }
            _ => {}
        }
    }

    /// Records a key transition.
    pub fn set_key_down(&mut self, key: KeyCode, down: bool) {
        if down {
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else {
            self.keys_down.remove(&key);
        }
    }

    /// Records a cursor move; accumulates drag distance while the left button is held.
    pub fn cursor_moved(&mut self, position: Vec2) {
        if let Some(last) = self.mouse_position
            && self.mouse_down(MouseButton::Left)
        {
            self.drag += position - last;
        }
        self.mouse_position = Some(position);
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key went down since the last [`Self::end_tick`].
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the mouse button is currently held down.
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    pub fn mouse_position(&self) -> Option<Vec2> {
        self.mouse_position
    }

    /// Takes the drag distance accumulated since the last call, if any.
    pub fn take_drag(&mut self) -> Option<Vec2> {
        let drag = std::mem::take(&mut self.drag);
        (drag != Vec2::ZERO).then_some(drag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_is_edge_triggered() {
        let mut input = Input::new();
        input.set_key_down(KeyCode::KeyW, true);
        input.set_key_down(KeyCode::KeyW, true);
        assert!(input.key_down(KeyCode::KeyW));
        assert!(input.key_pressed(KeyCode::KeyW));

        input.end_tick();
        assert!(input.key_down(KeyCode::KeyW));
        assert!(!input.key_pressed(KeyCode::KeyW));

        input.set_key_down(KeyCode::KeyW, false);
        assert!(!input.key_down(KeyCode::KeyW));
    }

    #[test]
    fn drag_only_accumulates_with_left_button() {
        let mut input = Input::new();
        input.cursor_moved(Vec2::new(10.0, 10.0));
        input.cursor_moved(Vec2::new(20.0, 10.0));
        assert_eq!(input.take_drag(), None);

        input.mouse_buttons_down.insert(MouseButton::Left);
        input.cursor_moved(Vec2::new(25.0, 4.0));
        input.cursor_moved(Vec2::new(30.0, 8.0));
        assert_eq!(input.take_drag(), Some(Vec2::new(10.0, -2.0)));
        assert_eq!(input.take_drag(), None);
    }
}
