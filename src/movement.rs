//! Vertical and horizontal velocity integration.
//!
//! These are plain functions over [`MotionState`] so they can be stepped
//! without an ECS world. The motor systems call them once per tick, vertical
//! first, in that order.
//!
//! Every delta summed into the velocity is already multiplied by `dt`: the
//! result is the displacement the motion executor applies this tick.

use bevy::prelude::*;

use crate::config::MotorSettings;
use crate::detection::GroundSlope;
use crate::intent::clamp_move_axes;
use crate::state::{MotionState, VerticalPhase};

/// Facing of the body, used to bring input into world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facing {
    pub right: Vec3,
    pub forward: Vec3,
}

impl Default for Facing {
    fn default() -> Self {
        Self {
            right: Vec3::X,
            forward: Vec3::NEG_Z,
        }
    }
}

impl Facing {
    /// Facing of a transform.
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            right: *transform.right(),
            forward: *transform.forward(),
        }
    }

    /// Turn a local (lateral, 0, forward) vector into world space.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.right * local.x + Vec3::Y * local.y + self.forward * local.z
    }
}

/// Breakdown of one horizontal step, for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepDeltas {
    pub movement: Vec3,
    pub friction: Vec3,
    pub slope: Vec3,
}

/// Step the vertical velocity. Returns `true` when a jump was consumed.
///
/// Grounded: the velocity is pinned to `-sticky_ground_force`, or set to
/// `jump_force` when a jump is pending (which clears the request).
/// Airborne: gravity is integrated with explicit Euler; skipped when `dt` is 0.
pub fn integrate_vertical(state: &mut MotionState, settings: &MotorSettings, dt: f32) -> bool {
    match state.phase() {
        VerticalPhase::Grounded => {
            if state.jump_requested {
                state.vertical_velocity = settings.jump_force;
                state.jump_requested = false;
                true
            } else {
                state.vertical_velocity = -settings.sticky_ground_force;
                false
            }
        }
        VerticalPhase::Airborne => {
            if dt > 0.0 {
                state.vertical_velocity -= settings.gravity * dt;
            }
            false
        }
    }
}

/// Input acceleration in world space, before the tick scaling.
pub fn input_acceleration(axes: Vec2, facing: Facing, settings: &MotorSettings) -> Vec3 {
    let axes = clamp_move_axes(axes);
    let local = Vec3::new(
        axes.x * settings.horizontal_accel_weight,
        0.0,
        axes.y * settings.vertical_accel_weight,
    ) * settings.movement_acceleration;
    facing.to_world(local)
}

/// Slope push for this tick. Zero unless the slope exceeds `min_angle_for_slope`.
///
/// The magnitude grows with the angle without bound, so steep surfaces shed
/// the character ever harder.
pub fn slope_delta(slope: &GroundSlope, settings: &MotorSettings, dt: f32) -> Vec3 {
    if !slope.exceeds(settings.min_angle_for_slope) {
        return Vec3::ZERO;
    }
    slope.direction
        * slope.angle
        * settings.slope_boost_factor
        * settings.slope_acceleration
        * dt
}

/// Friction for this tick, opposing the previous velocity.
///
/// `-(last / dt) * coefficient * dt` reduces to `-last * coefficient`; with
/// `dt == 0` there is no tick and no friction.
pub fn friction_delta(last_velocity: Vec3, coefficient: f32, planar: bool, dt: f32) -> Vec3 {
    if dt <= 0.0 {
        return Vec3::ZERO;
    }
    let source = if planar {
        Vec3::new(last_velocity.x, 0.0, last_velocity.z)
    } else {
        last_velocity
    };
    -source * coefficient
}

/// Step the velocity accumulator. [`integrate_vertical`] must run first.
///
/// The result is added to the existing `velocity`: the planar components are
/// never reset, friction is what brings them back down.
pub fn integrate_horizontal(
    state: &mut MotionState,
    settings: &MotorSettings,
    axes: Vec2,
    facing: Facing,
    dt: f32,
) -> StepDeltas {
    let speed_multiplier = if state.skiing {
        settings.ski_speed_multiplier
    } else {
        1.0
    };

    let mut movement = input_acceleration(axes, facing, settings) * speed_multiplier * dt;
    if !state.grounded {
        movement *= settings.air_movement_multiplier;
    }

    let slope = slope_delta(&state.slope, settings, dt);

    let coefficient = settings.friction_for(state.grounded, state.skiing);
    let friction = friction_delta(state.last_velocity, coefficient, settings.planar_friction, dt);

    state.velocity.y = state.vertical_velocity;
    state.velocity += movement + friction + slope;

    StepDeltas {
        movement,
        friction,
        slope,
    }
}
