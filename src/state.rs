//! Motion state and state marker components.
//!
//! [`MotionState`] is owned by the motor systems and mutated once per tick.
//! The marker components mirror it for use in queries and are synced at the
//! end of every tick.

use bevy::prelude::*;

use crate::collision::CollisionData;
use crate::detection::GroundSlope;
use crate::error::MotorSetupError;

/// Per-controller motion state.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct MotionState {
    /// Camera pitch in degrees. Positive looks down.
    pub camera_pitch: f32,
    /// Vertical velocity, in per-tick displacement units.
    pub vertical_velocity: f32,
    /// Running velocity accumulator handed to the motion executor.
    pub velocity: Vec3,
    /// Velocity of the previous tick, used for friction.
    pub last_velocity: Vec3,
    /// Whether the collider reported resting on a surface at the start of
    /// this tick.
    pub grounded: bool,
    /// Slope of the surface under the probe, or [`GroundSlope::NONE`].
    pub slope: GroundSlope,
    /// Probe hit of this tick, if any.
    #[reflect(ignore)]
    pub ground_hit: Option<CollisionData>,
    /// Pending jump request, consumed by the next grounded tick.
    pub jump_requested: bool,
    /// Whether the ski modifier is active this tick.
    pub skiing: bool,
}

/// Vertical phase of the controller, derived from [`MotionState::grounded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalPhase {
    Grounded,
    Airborne,
}

impl MotionState {
    /// Create a zeroed state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state with an initial camera pitch.
    pub fn with_pitch(pitch: f32) -> Self {
        Self {
            camera_pitch: pitch,
            ..default()
        }
    }

    /// Current vertical phase.
    pub fn phase(&self) -> VerticalPhase {
        if self.grounded {
            VerticalPhase::Grounded
        } else {
            VerticalPhase::Airborne
        }
    }

    /// Store this tick's probe result. A miss clears the slope to the sentinel.
    pub fn set_ground_hit(&mut self, hit: Option<CollisionData>) {
        self.slope = GroundSlope::from_hit(hit.as_ref());
        self.ground_hit = hit;
    }

    /// Whether the probe found anything this tick.
    pub fn ground_detected(&self) -> bool {
        self.ground_hit.is_some()
    }

    /// Distance to the probe hit, or `f32::MAX` when nothing was hit.
    pub fn ground_distance(&self) -> f32 {
        self.ground_hit.map(|h| h.distance).unwrap_or(f32::MAX)
    }

    /// Planar speed of the accumulator.
    pub fn horizontal_speed(&self) -> f32 {
        Vec2::new(self.velocity.x, self.velocity.z).length()
    }
}

/// Link from a controller body to the look node (camera) it pitches.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
pub struct MotorCamera(pub Entity);

/// Marker: the controller is resting on a surface.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker: the controller is airborne. Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker: the ski modifier is active.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Skiing;

/// Marker: the controller has been validated.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MotorReady;

/// The controller failed validation and is skipped by every motor system.
#[derive(Component, Debug, Clone)]
pub struct MotorFault(pub MotorSetupError);
