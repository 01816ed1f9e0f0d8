//! Physics backend abstraction.
//!
//! The motor never resolves collisions itself. A backend supplies the motion
//! executor (move, teleport, enable/disable) and the collider's own "resting
//! on a surface" test through [`MotorBackend`], and registers a ground probe
//! system in [`MotorSet::Sensors`](crate::MotorSet::Sensors) from its plugin.

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// All methods are associated functions over the ECS world so the motor
/// systems can stay generic over the engine. For an implementation, see
/// `Rapier3dBackend` in the `rapier` module (feature `rapier3d`).
pub trait MotorBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend, including its ground probe.
    fn plugin() -> impl Plugin;

    /// Whether the character collider is resting on a surface, as of its
    /// last move.
    fn is_resting(world: &World, entity: Entity) -> bool;

    /// Request a collision-resolved translation of the character by `displacement`.
    fn move_by(world: &mut World, entity: Entity, displacement: Vec3);

    /// Enable or disable the executor's collision response for the character.
    fn set_motion_enabled(world: &mut World, entity: Entity, enabled: bool);

    /// Current position of the character.
    fn get_position(world: &World, entity: Entity) -> Vec3;

    /// Place the character at `position` without collision resolution.
    fn set_position(world: &mut World, entity: Entity, position: Vec3);

    /// Duration of the current tick, in seconds. May be zero (paused).
    fn get_timestep(world: &World) -> f32;
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}

/// Read a position from `Transform`, falling back to `GlobalTransform`.
pub fn transform_position(world: &World, entity: Entity) -> Vec3 {
    world
        .get::<Transform>(entity)
        .map(|t| t.translation)
        .or_else(|| world.get::<GlobalTransform>(entity).map(|t| t.translation()))
        .unwrap_or(Vec3::ZERO)
}

/// Write a position to `Transform`, and to `GlobalTransform` when present so
/// the new position is visible before transform propagation runs.
pub fn write_transform_position(world: &mut World, entity: Entity, position: Vec3) {
    if let Some(mut transform) = world.get_mut::<Transform>(entity) {
        transform.translation = position;
    }
    if let Some(mut global) = world.get_mut::<GlobalTransform>(entity) {
        let (scale, rotation, _) = global.to_scale_rotation_translation();
        *global = GlobalTransform::from(Transform {
            translation: position,
            rotation,
            scale,
        });
    }
}
