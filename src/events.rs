//! Notifications published by the motor.
//!
//! The motor only writes these; nothing in the crate reads them back.

use bevy::prelude::*;

/// A pending jump was consumed and the controller left the ground.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct Jumped {
    pub entity: Entity,
    /// Vertical velocity assigned by the jump.
    pub vertical_velocity: f32,
}

/// The controller fell below the reset height and was teleported back up.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct FellOutOfBounds {
    pub entity: Entity,
    pub from: Vec3,
    pub to: Vec3,
}
