//! Logical input state handed to the simulation by the input collaborator.

use std::collections::BTreeMap;

/// Logical identifiers for the actions the simulation reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Move along the camera's facing direction.
    Forward,
    /// Move against the camera's facing direction.
    Backward,
    /// Strafe to the left.
    Left,
    /// Strafe to the right.
    Right,
    /// Jump while walking, ascend while flying.
    Jump,
    /// Crouch while walking, descend while flying.
    Crouch,
    /// Primary fire.
    Fire,
    /// Secondary input held to aim.
    Aim,
}

/// Pressed-state mapping plus the relative mouse movement for one sample.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    pressed: BTreeMap<Key, bool>,
    mouse_delta: (f32, f32),
}

impl InputState {
    /// Creates an input state with nothing pressed and no mouse movement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `key` marked as pressed.
    #[must_use]
    pub fn with_pressed(mut self, key: Key) -> Self {
        self.set(key, true);
        self
    }

    /// Returns a copy carrying the provided relative mouse movement.
    #[must_use]
    pub fn with_mouse_delta(mut self, dx: f32, dy: f32) -> Self {
        self.mouse_delta = (dx, dy);
        self
    }

    /// Records the pressed state of a key.
    pub fn set(&mut self, key: Key, pressed: bool) {
        let _ = self.pressed.insert(key, pressed);
    }

    /// Reports whether the key is currently held. Unknown keys are released.
    #[must_use]
    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.get(&key).copied().unwrap_or(false)
    }

    /// Relative mouse movement since the previous sample.
    #[must_use]
    pub const fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }
}
