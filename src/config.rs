//! Motor configuration.
//!
//! [`MotorSettings`] holds every tunable of the controller. It is loaded once
//! when the controller is spawned and never mutated by the motor systems.
//!
//! # Units
//!
//! The motor works in per-tick displacement units: the velocity it hands to
//! the motion executor is already scaled by the tick duration. `jump_force`
//! and `sticky_ground_force` are assigned to that velocity directly, while
//! `gravity`, the accelerations and the slope parameters are multiplied by
//! `dt` first.
//!
//! # Stability
//!
//! The horizontal velocity is a running accumulator damped by friction. For
//! every friction coefficient in use, `coefficient * dt` must stay below 1 or
//! the accumulator overshoots and diverges. This is a precondition on the
//! values, not something the motor checks.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::intent::MotorInput;
use crate::state::MotionState;

/// Tunable parameters of the first-person motor.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[reflect(Component)]
#[require(MotionState, MotorInput, Transform)]
#[serde(default)]
pub struct MotorSettings {
    /// Version of the settings record. Must equal [`MotorSettings::VERSION`].
    pub version: u32,

    // === Jump & Gravity ===
    /// Whether the jump key raises jump requests at all.
    pub can_jump: bool,
    /// Downward acceleration applied while airborne.
    pub gravity: f32,
    /// Vertical velocity assigned when a jump is consumed.
    pub jump_force: f32,
    /// Magnitude of the constant downward velocity applied while grounded.
    ///
    /// Keeps the character pressed onto downward slopes and stops it from
    /// flickering against the ground check.
    pub sticky_ground_force: f32,

    // === Movement ===
    /// Scale applied to the weighted input vector.
    pub movement_acceleration: f32,
    /// Weight of the lateral (strafe) input axis.
    pub horizontal_accel_weight: f32,
    /// Weight of the forward input axis.
    pub vertical_accel_weight: f32,
    /// Scale applied to input acceleration while airborne.
    pub air_movement_multiplier: f32,

    // === Friction ===
    /// Friction coefficient while grounded and not skiing.
    pub friction_on_ground: f32,
    /// Friction coefficient while airborne.
    pub friction_in_air: f32,
    /// Compute friction from the horizontal part of the previous velocity only.
    ///
    /// When `false` (the default) friction also damps the vertical component,
    /// which couples vertical and horizontal motion.
    pub planar_friction: bool,

    // === Slopes ===
    /// Slope angle (degrees, measured from up to the downhill tangent) above
    /// which the slope pushes the character.
    pub min_angle_for_slope: f32,
    /// Scale of the slope push.
    pub slope_acceleration: f32,
    /// Additional scale of the slope push.
    pub slope_boost_factor: f32,

    // === Ground Probe ===
    /// Radius of the sphere cast beneath the character.
    pub ground_raycast_radius: f32,
    /// Maximum distance of the sphere cast.
    pub ground_raycast_distance: f32,

    // === Skiing ===
    /// Button that must be held for skiing.
    pub ski_mouse_button: MouseButton,
    /// Input acceleration multiplier while skiing.
    pub ski_speed_multiplier: f32,
    /// Friction coefficient while skiing.
    pub ski_friction_coefficient: f32,

    // === Camera ===
    /// Lowest camera pitch, in degrees.
    pub min_camera_tilt: f32,
    /// Highest camera pitch, in degrees.
    pub max_camera_tilt: f32,

    // === Fall Recovery ===
    /// Vertical position below which the character is teleported back up.
    pub fall_reset_height: f32,
    /// Vertical position the character is teleported to.
    pub reset_position_height: f32,

    // === Device Input ===
    /// Key that raises jump requests.
    pub jump_key: KeyCode,
    /// Degrees of look rotation per pixel of mouse motion.
    pub look_sensitivity: f32,
    /// Lock and hide the cursor on the primary window when the controller
    /// is spawned.
    pub lock_cursor_on_startup: bool,
    /// Lock and hide the cursor whenever the window gains focus.
    pub lock_cursor_on_focus: bool,
}

impl Default for MotorSettings {
    fn default() -> Self {
        Self {
            version: Self::VERSION,

            // Jump & gravity
            can_jump: true,
            gravity: 0.05,
            jump_force: 0.02,
            sticky_ground_force: 0.01,

            // Movement
            movement_acceleration: 10.0,
            horizontal_accel_weight: 1.0,
            vertical_accel_weight: 1.0,
            air_movement_multiplier: 0.25,

            // Friction
            friction_on_ground: 0.3,
            friction_in_air: 0.001,
            planar_friction: false,

            // Slopes
            min_angle_for_slope: 95.0,
            slope_acceleration: 5.0,
            slope_boost_factor: 0.01,

            // Ground probe
            ground_raycast_radius: 2.0,
            ground_raycast_distance: 10.0,

            // Skiing
            ski_mouse_button: MouseButton::Right,
            ski_speed_multiplier: 1.5,
            ski_friction_coefficient: 0.0,

            // Camera
            min_camera_tilt: -90.0,
            max_camera_tilt: 90.0,

            // Fall recovery
            fall_reset_height: -50.0,
            reset_position_height: 50.0,

            // Device input
            jump_key: KeyCode::Space,
            look_sensitivity: 0.1,
            lock_cursor_on_startup: false,
            lock_cursor_on_focus: false,
        }
    }
}

impl MotorSettings {
    /// Current version of the settings record.
    pub const VERSION: u32 = 1;

    /// Parse a settings record from RON.
    ///
    /// Missing fields take their default value. A record of another version
    /// is rejected.
    pub fn from_ron_str(source: &str) -> Result<Self, SettingsError> {
        let settings: Self = ron::from_str(source)?;
        if settings.version != Self::VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                expected: Self::VERSION,
            });
        }
        Ok(settings)
    }

    /// Read and parse a RON settings record from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_ron_str(&source)?;
        debug!("Loaded motor settings from {:?}", path);
        Ok(settings)
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Friction coefficient for the given contact state.
    pub fn friction_for(&self, grounded: bool, skiing: bool) -> f32 {
        if !grounded {
            self.friction_in_air
        } else if skiing {
            self.ski_friction_coefficient
        } else {
            self.friction_on_ground
        }
    }

    /// Clamp a pitch value into the camera tilt range.
    #[inline]
    pub fn clamp_pitch(&self, pitch: f32) -> f32 {
        pitch.clamp(self.min_camera_tilt, self.max_camera_tilt)
    }

    /// Builder: set gravity and jump force.
    pub fn with_jump(mut self, gravity: f32, jump_force: f32) -> Self {
        self.gravity = gravity;
        self.jump_force = jump_force;
        self
    }

    /// Builder: enable or disable jumping.
    pub fn with_can_jump(mut self, can_jump: bool) -> Self {
        self.can_jump = can_jump;
        self
    }

    /// Builder: set the sticky ground force.
    pub fn with_sticky_ground_force(mut self, force: f32) -> Self {
        self.sticky_ground_force = force;
        self
    }

    /// Builder: set movement acceleration.
    pub fn with_movement_acceleration(mut self, acceleration: f32) -> Self {
        self.movement_acceleration = acceleration;
        self
    }

    /// Builder: set the per-axis input weights.
    pub fn with_axis_weights(mut self, horizontal: f32, vertical: f32) -> Self {
        self.horizontal_accel_weight = horizontal;
        self.vertical_accel_weight = vertical;
        self
    }

    /// Builder: set the airborne input multiplier.
    pub fn with_air_movement(mut self, multiplier: f32) -> Self {
        self.air_movement_multiplier = multiplier;
        self
    }

    /// Builder: set ground and air friction.
    pub fn with_friction(mut self, on_ground: f32, in_air: f32) -> Self {
        self.friction_on_ground = on_ground;
        self.friction_in_air = in_air;
        self
    }

    /// Builder: compute friction from the horizontal velocity only.
    pub fn with_planar_friction(mut self, planar: bool) -> Self {
        self.planar_friction = planar;
        self
    }

    /// Builder: set slope parameters.
    pub fn with_slope(mut self, min_angle: f32, acceleration: f32, boost: f32) -> Self {
        self.min_angle_for_slope = min_angle;
        self.slope_acceleration = acceleration;
        self.slope_boost_factor = boost;
        self
    }

    /// Builder: set the ground probe shape.
    pub fn with_ground_probe(mut self, radius: f32, distance: f32) -> Self {
        self.ground_raycast_radius = radius;
        self.ground_raycast_distance = distance;
        self
    }

    /// Builder: set ski parameters.
    pub fn with_ski(mut self, speed_multiplier: f32, friction: f32) -> Self {
        self.ski_speed_multiplier = speed_multiplier;
        self.ski_friction_coefficient = friction;
        self
    }

    /// Builder: set the camera tilt range.
    pub fn with_camera_tilt(mut self, min: f32, max: f32) -> Self {
        self.min_camera_tilt = min;
        self.max_camera_tilt = max;
        self
    }

    /// Builder: set fall recovery heights.
    pub fn with_fall_reset(mut self, fall_height: f32, reset_height: f32) -> Self {
        self.fall_reset_height = fall_height;
        self.reset_position_height = reset_height;
        self
    }

    /// Builder: set when the device input plugin locks the cursor.
    pub fn with_cursor_lock(mut self, on_startup: bool, on_focus: bool) -> Self {
        self.lock_cursor_on_startup = on_startup;
        self.lock_cursor_on_focus = on_focus;
        self
    }

    /// Builder: set the jump key.
    pub fn with_jump_key(mut self, key: KeyCode) -> Self {
        self.jump_key = key;
        self
    }

    /// Builder: set the ski button.
    pub fn with_ski_button(mut self, button: MouseButton) -> Self {
        self.ski_mouse_button = button;
        self
    }
}
