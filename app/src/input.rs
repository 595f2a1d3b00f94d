//! Keyboard input for examples.
//!
//! Maps winit key codes to the handful of keys the examples react to and
//! collects presses between frames.

use std::collections::HashSet;

use winit::keyboard;

/// Keys the examples use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
}

/// Convert a winit [`keyboard::KeyCode`] to a [`Key`], if a mapping exists.
pub fn map_winit_key(key: keyboard::KeyCode) -> Option<Key> {
    Some(match key {
        keyboard::KeyCode::ArrowLeft => Key::Left,
        keyboard::KeyCode::ArrowRight => Key::Right,
        keyboard::KeyCode::ArrowUp => Key::Up,
        keyboard::KeyCode::ArrowDown => Key::Down,
        keyboard::KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

/// Keys pressed since the last update.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pressed: HashSet<Key>,
}

impl InputState {
    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    /// Whether `key` went down since the previous frame.
    pub fn just_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_winit_key(keyboard::KeyCode::ArrowLeft), Some(Key::Left));
        assert_eq!(map_winit_key(keyboard::KeyCode::Escape), Some(Key::Escape));
        assert_eq!(map_winit_key(keyboard::KeyCode::KeyA), None);
    }

    #[test]
    fn test_presses_clear_per_frame() {
        let mut input = InputState::default();
        input.press(Key::Right);
        assert!(input.just_pressed(Key::Right));
        assert!(!input.just_pressed(Key::Left));
        input.clear();
        assert!(!input.just_pressed(Key::Right));
    }
}
