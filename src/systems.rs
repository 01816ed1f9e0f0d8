//! Core motor systems.
//!
//! These run in `FixedUpdate`, one [`MotorSet`](crate::MotorSet) after the
//! other. Systems that talk to the physics backend are exclusive and generic
//! over it, so every backend call sees a consistent world.

use bevy::prelude::*;

use crate::backend::MotorBackend;
use crate::config::MotorSettings;
use crate::error::MotorSetupError;
use crate::events::{FellOutOfBounds, Jumped};
use crate::intent::MotorInput;
use crate::look::{apply_pitch, apply_yaw, next_pitch};
use crate::movement::{integrate_horizontal, integrate_vertical, Facing};
use crate::safety::fall_reset_target;
use crate::state::{Airborne, Grounded, MotionState, MotorCamera, MotorFault, MotorReady, Skiing};

/// Check the collaborators of newly added controllers, once.
///
/// A controller without a usable look node is tagged with [`MotorFault`] and
/// ignored from then on.
pub fn validate_motor_setup(
    mut commands: Commands,
    q_new: Query<
        (Entity, Option<&MotorCamera>),
        (With<MotorSettings>, Without<MotorReady>, Without<MotorFault>),
    >,
    q_cameras: Query<(), With<Transform>>,
) {
    for (entity, camera) in &q_new {
        let result = match camera {
            None => Err(MotorSetupError::MissingCameraLink { body: entity }),
            Some(link) if !q_cameras.contains(link.0) => Err(MotorSetupError::MissingCamera {
                body: entity,
                camera: link.0,
            }),
            Some(_) => Ok(()),
        };

        match result {
            Ok(()) => {
                debug!("Motor {entity} ready");
                commands.entity(entity).insert(MotorReady);
            }
            Err(err) => {
                error!("Motor setup failed: {err}");
                commands.entity(entity).insert(MotorFault(err));
            }
        }
    }
}

/// Teleport controllers that fell below the reset height.
///
/// The executor's collision response is disabled around the teleport so it
/// cannot fight the instantaneous position change.
pub fn apply_fall_safety<B: MotorBackend>(world: &mut World) {
    let entities: Vec<(Entity, MotorSettings)> = world
        .query_filtered::<(Entity, &MotorSettings), With<MotorReady>>()
        .iter(world)
        .map(|(e, settings)| (e, *settings))
        .collect();

    for (entity, settings) in entities {
        let position = B::get_position(world, entity);
        let Some(target) = fall_reset_target(position, &settings) else {
            continue;
        };

        B::set_motion_enabled(world, entity, false);
        B::set_position(world, entity, target);
        B::set_motion_enabled(world, entity, true);

        warn!("Motor {entity} fell out of bounds at {position}, reset to {target}");
        world.send_event(FellOutOfBounds {
            entity,
            from: position,
            to: target,
        });
    }
}

/// Sample the collider's own resting test into [`MotionState::grounded`].
///
/// This is deliberately not derived from the ground probe.
pub fn update_ground_contact<B: MotorBackend>(world: &mut World) {
    let entities: Vec<Entity> = world
        .query_filtered::<Entity, (With<MotionState>, With<MotorReady>)>()
        .iter(world)
        .collect();

    for entity in entities {
        let grounded = B::is_resting(world, entity);
        if let Some(mut state) = world.get_mut::<MotionState>(entity) {
            state.grounded = grounded;
        }
    }
}

/// Turn this tick's input into motor intent: jump requests and ski mode.
///
/// A jump is requested only on key-down, while grounded, with jumping enabled.
/// Skiing is re-evaluated every tick and never latches.
pub fn capture_input(
    mut q_motors: Query<(&mut MotorInput, &mut MotionState, &MotorSettings), With<MotorReady>>,
) {
    for (mut input, mut state, settings) in &mut q_motors {
        let jump_edge = input.take_jump_edge();
        if jump_edge && settings.can_jump && state.grounded {
            state.jump_requested = true;
        }
        state.skiing = input.ski_held && state.grounded;
    }
}

/// Step vertical then horizontal velocity.
pub fn integrate_motion<B: MotorBackend>(world: &mut World) {
    let dt = B::get_timestep(world);

    let mut jumps = Vec::new();
    let mut q_motors = world.query_filtered::<(
        Entity,
        &MotorSettings,
        &MotorInput,
        &Transform,
        &mut MotionState,
    ), With<MotorReady>>();

    for (entity, settings, input, transform, mut state) in q_motors.iter_mut(world) {
        if integrate_vertical(&mut state, settings, dt) {
            jumps.push(Jumped {
                entity,
                vertical_velocity: state.vertical_velocity,
            });
        }

        let facing = Facing::from_transform(transform);
        let deltas = integrate_horizontal(&mut state, settings, input.move_axes(), facing, dt);
        trace!(
            "Motor {entity}: movement={} friction={} slope={} velocity={}",
            deltas.movement,
            deltas.friction,
            deltas.slope,
            state.velocity
        );
    }

    for jump in jumps {
        debug!("Motor {} jumped", jump.entity);
        world.send_event(jump);
    }
}

/// Hand the velocity to the motion executor and remember it for friction.
pub fn apply_motion<B: MotorBackend>(world: &mut World) {
    let entities: Vec<(Entity, Vec3)> = world
        .query_filtered::<(Entity, &MotionState), With<MotorReady>>()
        .iter(world)
        .map(|(e, state)| (e, state.velocity))
        .collect();

    for (entity, velocity) in entities {
        B::move_by(world, entity, velocity);
        if let Some(mut state) = world.get_mut::<MotionState>(entity) {
            state.last_velocity = velocity;
        }
    }
}

/// Apply look input: clamped pitch on the camera, free yaw on the body.
pub fn apply_look(
    mut q_motors: Query<
        (
            &mut MotorInput,
            &mut MotionState,
            &MotorSettings,
            &MotorCamera,
            &mut Transform,
        ),
        With<MotorReady>,
    >,
    mut q_cameras: Query<&mut Transform, Without<MotionState>>,
) {
    for (mut input, mut state, settings, camera, mut body) in &mut q_motors {
        let look = input.take_look();

        state.camera_pitch = next_pitch(state.camera_pitch, look.y, settings);
        apply_yaw(&mut body, look.x);

        if let Ok(mut camera_transform) = q_cameras.get_mut(camera.0) {
            camera_transform.rotation = apply_pitch(camera_transform.rotation, state.camera_pitch);
        }
    }
}

/// Sync state marker components with [`MotionState`].
pub fn sync_state_markers(
    mut commands: Commands,
    q_motors: Query<
        (Entity, &MotionState, Has<Grounded>, Has<Airborne>, Has<Skiing>),
        With<MotorReady>,
    >,
) {
    for (entity, state, has_grounded, has_airborne, has_skiing) in &q_motors {
        if state.grounded && !has_grounded {
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
        } else if !state.grounded && !has_airborne {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }

        if state.skiing && !has_skiing {
            commands.entity(entity).insert(Skiing);
        } else if !state.skiing && has_skiing {
            commands.entity(entity).remove::<Skiing>();
        }
    }
}
