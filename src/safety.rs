//! Out-of-bounds recovery.

use bevy::prelude::*;

use crate::config::MotorSettings;

/// Where a character at `position` must be teleported to, if anywhere.
///
/// Below `fall_reset_height` the character goes to `reset_position_height`,
/// keeping its horizontal position.
pub fn fall_reset_target(position: Vec3, settings: &MotorSettings) -> Option<Vec3> {
    (position.y < settings.fall_reset_height)
        .then(|| Vec3::new(position.x, settings.reset_position_height, position.z))
}
