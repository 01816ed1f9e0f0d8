//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D, built on its
//! kinematic character controller. Enable with the `rapier3d` feature.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::backend::{transform_position, write_transform_position, MotorBackend};
use crate::collision::CollisionData;
use crate::config::MotorSettings;
use crate::state::{MotionState, MotorReady};
use crate::MotorSet;

/// Rapier3D physics backend for the motor.
///
/// Moves go through [`KinematicCharacterController`] and are resolved by
/// Rapier during its own step, after the motor tick. The resting test is the
/// `grounded` flag of the last [`KinematicCharacterControllerOutput`]. Ground
/// probing is done by a dedicated system that receives `RapierContext` as a
/// system parameter.
///
/// Run Rapier in the fixed schedule
/// (`RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule()`) so
/// every motor tick is followed by exactly one physics step. With the default
/// per-frame step, moves of several ticks are summed and resolved together,
/// and the resting test can lag behind by more than one tick.
pub struct Rapier3dBackend;

impl MotorBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn is_resting(world: &World, entity: Entity) -> bool {
        world
            .get::<KinematicCharacterControllerOutput>(entity)
            .is_some_and(|output| output.grounded)
    }

    fn move_by(world: &mut World, entity: Entity, displacement: Vec3) {
        if let Some(mut controller) = world.get_mut::<KinematicCharacterController>(entity) {
            // Ticks without a physics step in between add up.
            let pending = controller.translation.unwrap_or(Vec3::ZERO);
            controller.translation = Some(pending + displacement);
        }
    }

    /// The character controller only runs during Rapier's step, so it cannot
    /// fight a teleport made within the motor tick. Disabling drops any move
    /// still pending from earlier ticks; enabling has nothing to restore.
    fn set_motion_enabled(world: &mut World, entity: Entity, enabled: bool) {
        if enabled {
            return;
        }
        if let Some(mut controller) = world.get_mut::<KinematicCharacterController>(entity) {
            controller.translation = None;
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        transform_position(world, entity)
    }

    fn set_position(world: &mut World, entity: Entity, position: Vec3) {
        write_transform_position(world, entity, position);
        // A pending move from before the teleport would be applied from the
        // new position.
        if let Some(mut controller) = world.get_mut::<KinematicCharacterController>(entity) {
            controller.translation = None;
        }
    }

    fn get_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .unwrap_or(0.0)
    }
}

/// Plugin that sets up the Rapier3D backend.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, rapier_ground_probe.in_set(MotorSet::Sensors));
        // With Rapier in the fixed schedule, the whole motor tick runs before
        // the step that resolves its move.
        app.configure_sets(FixedUpdate, MotorSet::Sync.before(PhysicsSet::SyncBackend));
    }
}

/// Collision groups for the ground probe: everything the character collides
/// with, except its own layer.
pub fn probe_groups(groups: &CollisionGroups) -> CollisionGroups {
    CollisionGroups::new(groups.memberships, groups.filters & !groups.memberships)
}

/// Sweep a sphere straight down from the character's center.
fn rapier_shapecast(
    context: &RapierContext,
    origin: Vec3,
    radius: f32,
    max_distance: f32,
    exclude_entity: Entity,
    collision_groups: Option<&CollisionGroups>,
) -> Option<CollisionData> {
    let mut filter = QueryFilter::default()
        .exclude_rigid_body(exclude_entity)
        .exclude_collider(exclude_entity)
        .exclude_sensors();

    if let Some(groups) = collision_groups {
        filter = filter.groups(probe_groups(groups));
    }

    let direction = Vec3::NEG_Y;
    context
        .cast_shape(
            origin,
            Quat::IDENTITY,
            direction,
            &Collider::ball(radius),
            ShapeCastOptions {
                max_time_of_impact: max_distance,
                stop_at_penetration: false,
                ..default()
            },
            filter,
        )
        .map(|(hit_entity, hit)| {
            let normal = hit.details.map(|d| d.normal1).unwrap_or(-direction);
            let hit_point = origin + direction * hit.time_of_impact;
            CollisionData::new(hit.time_of_impact, normal, hit_point, Some(hit_entity))
        })
}

/// Rapier-specific ground probe.
///
/// Stores the hit (or its absence) in [`MotionState`], which also refreshes
/// the ground slope.
fn rapier_ground_probe(
    rapier_context: ReadRapierContext,
    mut q_motors: Query<
        (
            Entity,
            &GlobalTransform,
            &MotorSettings,
            &mut MotionState,
            Option<&CollisionGroups>,
        ),
        With<MotorReady>,
    >,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, settings, mut state, collision_groups) in &mut q_motors {
        let hit = rapier_shapecast(
            &context,
            transform.translation(),
            settings.ground_raycast_radius,
            settings.ground_raycast_distance,
            entity,
            collision_groups,
        );
        state.set_ground_hit(hit);
    }
}

/// Bundle of Rapier components needed by a motor-driven character.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use fps_motor::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     let camera = commands
///         .spawn((Camera3d::default(), Transform::from_xyz(0.0, 0.8, 0.0)))
///         .id();
///     commands
///         .spawn((
///             Transform::from_xyz(0.0, 2.0, 0.0),
///             MotorSettings::default(),
///             MotorCamera(camera),
///             Rapier3dMotorBundle::new(),
///             Collider::capsule_y(0.5, 0.4),
///         ))
///         .add_child(camera);
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier3dMotorBundle {
    /// Should stay [`RigidBody::KinematicPositionBased`]; the motor moves the
    /// body, Rapier only resolves collisions.
    pub rigid_body: RigidBody,
    /// Executor of the motor's per-tick displacement.
    pub controller: KinematicCharacterController,
}

impl Default for Rapier3dMotorBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier3dMotorBundle {
    /// Kinematic body with a default character controller (up is +Y).
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::KinematicPositionBased,
            controller: KinematicCharacterController {
                up: Vec3::Y,
                ..default()
            },
        }
    }

    /// Replace the character controller, e.g. to tune autostep or snapping.
    pub fn with_controller(mut self, controller: KinematicCharacterController) -> Self {
        self.controller = controller;
        self
    }

    /// Set the skin width kept between the collider and obstacles.
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.controller.offset = CharacterLength::Absolute(offset);
        self
    }
}
