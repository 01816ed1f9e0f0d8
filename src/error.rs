//! Error types.
//!
//! The per-tick path never fails. Errors only arise while loading a settings
//! record or while validating a controller's collaborators the first time it
//! is seen.

use std::path::PathBuf;

use bevy::prelude::*;

/// Error loading a [`MotorSettings`](crate::config::MotorSettings) record.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read motor settings from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse motor settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("unsupported motor settings version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// A required collaborator of a controller is missing.
///
/// Reported once, when the controller is first seen. The controller is then
/// tagged with [`MotorFault`](crate::state::MotorFault) and skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MotorSetupError {
    #[error("controller {body} has no MotorCamera")]
    MissingCameraLink { body: Entity },
    #[error("controller {body} refers to camera {camera}, which does not exist or has no Transform")]
    MissingCamera { body: Entity, camera: Entity },
}
