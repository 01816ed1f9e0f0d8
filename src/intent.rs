//! Motor input component.
//!
//! [`MotorInput`] is the only way input reaches the motor. The host (or
//! [`MotorInputPlugin`](crate::input::MotorInputPlugin)) writes it each frame;
//! the motor reads it once per tick.

use bevy::prelude::*;

/// Raw input for one first-person controller.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use fps_motor::prelude::*;
///
/// let mut input = MotorInput::new();
/// input.set_move(1.0, 1.0);
/// // Diagonal input is no faster than straight input.
/// assert!(input.move_axes().length() <= 1.0 + 1e-6);
///
/// input.add_look(2.0, -1.0);
/// assert_eq!(input.take_look(), Vec2::new(2.0, -1.0));
/// assert_eq!(input.take_look(), Vec2::ZERO);
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct MotorInput {
    /// Lateral axis (-1.0 = left, 1.0 = right).
    pub horizontal: f32,
    /// Forward axis (-1.0 = back, 1.0 = forward).
    pub vertical: f32,
    /// Accumulated look delta in degrees (x = yaw, y = pitch; positive y looks up).
    pub look_delta: Vec2,
    /// Whether the jump key is currently held. Written through
    /// [`MotorInput::set_jump_pressed`].
    pub(crate) jump_pressed: bool,
    /// Latched key-down, held until the next tick takes it.
    pub(crate) jump_down: bool,
    /// Whether the ski trigger is currently held.
    pub ski_held: bool,
}

impl MotorInput {
    /// Create an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both movement axes. Each axis is clamped to [-1, 1].
    pub fn set_move(&mut self, horizontal: f32, vertical: f32) {
        self.horizontal = horizontal.clamp(-1.0, 1.0);
        self.vertical = vertical.clamp(-1.0, 1.0);
    }

    /// Movement input with its magnitude clamped to 1.
    ///
    /// `x` is the lateral axis and `y` the forward axis.
    pub fn move_axes(&self) -> Vec2 {
        clamp_move_axes(Vec2::new(self.horizontal, self.vertical))
    }

    /// Whether there is any movement input.
    pub fn is_moving(&self) -> bool {
        self.horizontal.abs() > 0.001 || self.vertical.abs() > 0.001
    }

    /// Accumulate a look delta (degrees).
    pub fn add_look(&mut self, yaw: f32, pitch: f32) {
        self.look_delta += Vec2::new(yaw, pitch);
    }

    /// Take and reset the accumulated look delta.
    pub fn take_look(&mut self) -> Vec2 {
        std::mem::take(&mut self.look_delta)
    }

    /// Set the jump key level. Call every frame with the current state.
    ///
    /// A rising edge is latched, so a press released again before the next
    /// tick still counts as one key-down.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        if pressed && !self.jump_pressed {
            self.jump_down = true;
        }
        self.jump_pressed = pressed;
    }

    /// Whether the jump key is currently held.
    pub fn is_jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    /// Set the ski trigger level.
    pub fn set_ski_held(&mut self, held: bool) {
        self.ski_held = held;
    }

    /// Whether the jump key went down since the previous tick, and reset the
    /// latch. Called once per tick by the motor.
    pub(crate) fn take_jump_edge(&mut self) -> bool {
        std::mem::take(&mut self.jump_down)
    }

    /// Clear movement and look input. Held buttons are left alone.
    pub fn clear(&mut self) {
        self.horizontal = 0.0;
        self.vertical = 0.0;
        self.look_delta = Vec2::ZERO;
    }
}

/// Clamp a movement vector to magnitude 1 so diagonals are not faster.
#[inline]
pub fn clamp_move_axes(axes: Vec2) -> Vec2 {
    if !axes.is_finite() {
        return Vec2::ZERO;
    }
    axes.clamp_length_max(1.0)
}
