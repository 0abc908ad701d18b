//! Keyboard state
//!
//! The simulation only asks level-triggered questions ("is left held?").
//! Start and restart are edge-triggered: a key press counts once, on the
//! next frame, even if the key was released in between.

use std::collections::HashSet;

/// Input queries consumed by the tick
pub trait InputSource {
    fn is_left_pressed(&self) -> bool;
    fn is_right_pressed(&self) -> bool;

    fn is_start_pressed(&self) -> bool {
        false
    }

    fn is_restart_pressed(&self) -> bool {
        false
    }
}

const LEFT_KEYS: [&str; 2] = ["ArrowLeft", "KeyA"];
const RIGHT_KEYS: [&str; 2] = ["ArrowRight", "KeyD"];
const START_KEYS: [&str; 2] = ["Enter", "Space"];
const RESTART_KEYS: [&str; 1] = ["KeyR"];

/// Held and freshly pressed keys, by `KeyboardEvent.code`
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<String>,
    pressed: HashSet<String>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the game handles this key
    pub fn key_down(&mut self, code: &str) -> bool {
        if !self.held.contains(code) {
            self.pressed.insert(code.to_string());
        }
        self.held.insert(code.to_string());
        is_bound(code)
    }

    pub fn key_up(&mut self, code: &str) {
        self.held.remove(code);
    }

    /// Forget everything, e.g. when the window loses focus
    pub fn clear(&mut self) {
        self.held.clear();
        self.pressed.clear();
    }

    /// Call once the frame's input has been consumed
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }

    fn any_held(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.held.contains(*k))
    }

    fn any_pressed(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.pressed.contains(*k))
    }
}

impl InputSource for KeyState {
    fn is_left_pressed(&self) -> bool {
        self.any_held(&LEFT_KEYS)
    }

    fn is_right_pressed(&self) -> bool {
        self.any_held(&RIGHT_KEYS)
    }

    fn is_start_pressed(&self) -> bool {
        self.any_pressed(&START_KEYS)
    }

    fn is_restart_pressed(&self) -> bool {
        self.any_pressed(&RESTART_KEYS)
    }
}

fn is_bound(code: &str) -> bool {
    LEFT_KEYS
        .iter()
        .chain(&RIGHT_KEYS)
        .chain(&START_KEYS)
        .chain(&RESTART_KEYS)
        .any(|k| *k == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_keys_are_level_triggered() {
        let mut keys = KeyState::new();
        assert!(keys.key_down("ArrowLeft"));
        keys.end_frame();
        assert!(keys.is_left_pressed());
        assert!(!keys.is_right_pressed());

        keys.key_up("ArrowLeft");
        assert!(!keys.is_left_pressed());
        assert!(!keys.key_down("KeyQ"));
    }

    #[test]
    fn test_start_counts_once() {
        let mut keys = KeyState::new();
        keys.key_down("Space");
        keys.key_up("Space");
        assert!(keys.is_start_pressed());
        keys.end_frame();
        assert!(!keys.is_start_pressed());

        // Auto-repeat while held does not re-trigger
        keys.key_down("Enter");
        keys.end_frame();
        keys.key_down("Enter");
        assert!(!keys.is_start_pressed());
    }

    #[test]
    fn test_clear_on_blur() {
        let mut keys = KeyState::new();
        keys.key_down("KeyD");
        keys.key_down("KeyR");
        keys.clear();
        assert!(!keys.is_right_pressed());
        assert!(!keys.is_restart_pressed());
    }
}
