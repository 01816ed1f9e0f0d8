//! # `fps_motor`
//!
//! A first-person kinematic character motor with physics backend abstraction.
//!
//! The motor turns player input into a per-tick displacement for a kinematic
//! character collider:
//! - Walks with acceleration and friction, with reduced control in the air
//! - Jumps on key-down while grounded, with constant gravity while airborne
//! - Slides down steep ground and "skis" (low friction, speed boost) on demand
//! - Pitches a camera node within limits and yaws the body freely
//! - Teleports characters that fall out of the world back up
//!
//! Collision resolution is left to the backend (Rapier3D included).
//!
//! ## Architecture
//!
//! Every fixed tick runs the [`MotorSet`]s in order:
//! 1. **Preparation**: validate newly spawned controllers
//! 2. **Safety**: out-of-bounds reset
//! 3. **Sensors**: resting test and ground probe
//! 4. **Intent**: jump requests and ski mode from input
//! 5. **Integrate**: vertical then horizontal velocity
//! 6. **Move**: hand the velocity to the motion executor
//! 7. **Look**: camera pitch and body yaw
//! 8. **Sync**: state marker components
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use fps_motor::prelude::*;
//!
//! let settings = MotorSettings::default().with_jump(20.0, 5.0);
//! let mut input = MotorInput::default();
//! input.set_move(0.0, 1.0);
//!
//! // Spawn `settings` on the body (MotionState and MotorInput are added
//! // automatically) together with a `MotorCamera` pointing at the camera.
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod detection;
pub mod error;
pub mod events;
pub mod input;
pub mod intent;
pub mod look;
pub mod movement;
pub mod safety;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::MotorBackend;
    pub use crate::collision::CollisionData;
    pub use crate::config::MotorSettings;
    pub use crate::detection::GroundSlope;
    pub use crate::error::{MotorSetupError, SettingsError};
    pub use crate::events::{FellOutOfBounds, Jumped};
    pub use crate::input::MotorInputPlugin;
    pub use crate::intent::MotorInput;
    pub use crate::state::{
        Airborne, Grounded, MotionState, MotorCamera, MotorFault, Skiing, VerticalPhase,
    };
    pub use crate::{MotorPlugin, MotorSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dMotorBundle};
}

/// Ordered phases of a motor tick, run in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorSet {
    Preparation,
    Safety,
    Sensors,
    Intent,
    Integrate,
    Move,
    Look,
    Sync,
}

/// Main plugin for the motor.
///
/// This plugin is generic over a physics backend `B` which provides the
/// motion executor and the collider's resting test.
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With Rapier3D backend:
/// ```rust,ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use fps_motor::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
///     .add_plugins(MotorPlugin::<Rapier3dBackend>::default())
///     .add_plugins(MotorInputPlugin)
///     .run();
/// ```
pub struct MotorPlugin<B: backend::MotorBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::MotorBackend> Default for MotorPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::MotorBackend> Plugin for MotorPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::MotorSettings>();
        app.register_type::<intent::MotorInput>();
        app.register_type::<state::MotionState>();
        app.register_type::<state::MotorCamera>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::Skiing>();
        app.register_type::<detection::GroundSlope>();

        app.add_event::<events::Jumped>();
        app.add_event::<events::FellOutOfBounds>();

        app.configure_sets(
            FixedUpdate,
            (
                MotorSet::Preparation,
                MotorSet::Safety,
                MotorSet::Sensors,
                MotorSet::Intent,
                MotorSet::Integrate,
                MotorSet::Move,
                MotorSet::Look,
                MotorSet::Sync,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            (
                systems::validate_motor_setup.in_set(MotorSet::Preparation),
                systems::apply_fall_safety::<B>.in_set(MotorSet::Safety),
                systems::update_ground_contact::<B>.in_set(MotorSet::Sensors),
                systems::capture_input.in_set(MotorSet::Intent),
                systems::integrate_motion::<B>.in_set(MotorSet::Integrate),
                systems::apply_motion::<B>.in_set(MotorSet::Move),
                systems::apply_look.in_set(MotorSet::Look),
                systems::sync_state_markers.in_set(MotorSet::Sync),
            ),
        );
    }
}
