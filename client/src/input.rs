//! Keyboard sampling for the simulation tick.

use macroquad::prelude::*;

/// What the player is asking for this frame. `jump` is an edge, not a
/// held state: it fires once per press and the grounded check in the
/// physics decides whether anything happens.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSample {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

pub struct InputManager {
    prev_jump_held: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_jump_held: false,
        }
    }

    /// Samples the keyboard. Movement supports both WASD and arrows.
    pub fn sample(&mut self) -> InputSample {
        let left = is_key_down(KeyCode::A) || is_key_down(KeyCode::Left);
        let right = is_key_down(KeyCode::D) || is_key_down(KeyCode::Right);

        let jump_held = is_key_down(KeyCode::Space);
        let jump = jump_held && !self.prev_jump_held;
        self.prev_jump_held = jump_held;

        InputSample { left, right, jump }
    }

    pub fn quit_requested(&self) -> bool {
        is_key_down(KeyCode::Escape)
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
