//! Ground probe results and slope derivation.
//!
//! The probe casts a sphere straight down from the character. When it hits,
//! the contact normal is turned into a [`GroundSlope`]: the downhill tangent
//! of the surface and its angle from world up, in degrees.
//!
//! The probe hit is a separate signal from the collider's own "resting on a
//! surface" test that drives [`MotionState::grounded`](crate::state::MotionState).
//! Near steps and ledges the two can disagree for a tick; they are kept apart.

use bevy::prelude::*;

use crate::collision::CollisionData;

/// Squared length below which the derived slope direction is treated as zero.
const FLAT_EPSILON: f32 = 1.0e-6;

/// Slope descriptor of the surface beneath the character.
///
/// `direction` is not normalized; its length is the sine of the incline.
/// `angle` is measured between `direction` and world up, in degrees, and is
/// always within `[0, 180]`.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct GroundSlope {
    /// Downhill tangent of the surface.
    pub direction: Vec3,
    /// Angle between `direction` and world up, in degrees.
    pub angle: f32,
}

impl Default for GroundSlope {
    fn default() -> Self {
        Self::NONE
    }
}

impl GroundSlope {
    /// Sentinel for "no slope": flat ground or nothing under the character.
    pub const NONE: Self = Self {
        direction: Vec3::ZERO,
        angle: 0.0,
    };

    /// Derive the slope from a contact normal.
    ///
    /// `tangent = n × up`, `direction = n × tangent`, `angle = ∠(direction, up)`.
    /// A normal parallel to up collapses both cross products to zero; that case
    /// returns [`GroundSlope::NONE`] instead of an undefined angle.
    pub fn from_normal(normal: Vec3) -> Self {
        let tangent = normal.cross(Vec3::Y);
        let direction = normal.cross(tangent);

        if !direction.is_finite() || direction.length_squared() < FLAT_EPSILON {
            return Self::NONE;
        }

        let cos = (direction.dot(Vec3::Y) / direction.length()).clamp(-1.0, 1.0);
        let angle = cos.acos().to_degrees();
        if !angle.is_finite() {
            return Self::NONE;
        }

        Self {
            direction,
            angle: angle.clamp(0.0, 180.0),
        }
    }

    /// Derive the slope from an optional probe hit. A miss yields the sentinel.
    pub fn from_hit(hit: Option<&CollisionData>) -> Self {
        hit.map(|h| Self::from_normal(h.normal))
            .unwrap_or(Self::NONE)
    }

    /// Whether this is the "no slope" sentinel.
    pub fn is_none(&self) -> bool {
        self.direction == Vec3::ZERO && self.angle == 0.0
    }

    /// Whether the slope is steep enough to push the character.
    pub fn exceeds(&self, min_angle: f32) -> bool {
        self.angle > min_angle
    }
}
