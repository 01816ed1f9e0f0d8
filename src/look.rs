//! Camera pitch and body yaw.
//!
//! Pitch is accumulated in [`MotionState::camera_pitch`](crate::state::MotionState)
//! and clamped; it is written to the look node's local rotation about its
//! lateral axis only. Yaw is not accumulated: each tick's delta is composed
//! onto the body's current rotation.

use bevy::prelude::*;

use crate::config::MotorSettings;

/// New pitch after a look delta. `delta_y` is positive when looking up.
#[inline]
pub fn next_pitch(pitch: f32, delta_y: f32, settings: &MotorSettings) -> f32 {
    settings.clamp_pitch(pitch - delta_y)
}

/// Replace the pitch of a look node's local rotation, keeping its yaw and roll.
///
/// `pitch` is in degrees and positive looks down.
pub fn apply_pitch(rotation: Quat, pitch: f32) -> Quat {
    let (yaw, _, roll) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_euler(EulerRot::YXZ, yaw, -pitch.to_radians(), roll)
}

/// Rotate a body about world up. Positive `delta_x` turns right.
pub fn apply_yaw(transform: &mut Transform, delta_x: f32) {
    if delta_x != 0.0 {
        transform.rotate_y(-delta_x.to_radians());
    }
}
