//! Device input for the motor.
//!
//! Maps keyboard and mouse state onto [`MotorInput`] every frame:
//!
//! ## Controls
//! - **A/D** or **Left/Right**: Strafe
//! - **W/S** or **Up/Down**: Forward / back
//! - **Mouse**: Look (scaled by `look_sensitivity`)
//! - **`jump_key`** (Space by default): Jump
//! - **`ski_mouse_button`** (right button by default, hold): Ski
//!
//! The cursor is locked when a controller is spawned with
//! `lock_cursor_on_startup`, and whenever a window gains focus with
//! `lock_cursor_on_focus`.
//!
//! Hosts that drive [`MotorInput`] themselves (AI, replays, networking) simply
//! don't add this plugin.

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::input::InputSystem;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow, WindowFocused};

use crate::config::MotorSettings;
use crate::intent::MotorInput;
use crate::state::MotorFault;

/// Plugin that feeds [`MotorInput`] from the keyboard and mouse.
pub struct MotorInputPlugin;

impl Plugin for MotorInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreUpdate, gather_device_input.after(InputSystem));
        app.add_systems(Update, (lock_cursor_on_startup, lock_cursor_on_focus));
    }
}

/// Axis value from a pair of opposing key groups.
fn axis(keys: &ButtonInput<KeyCode>, negative: [KeyCode; 2], positive: [KeyCode; 2]) -> f32 {
    let mut value = 0.0;
    if keys.any_pressed(negative) {
        value -= 1.0;
    }
    if keys.any_pressed(positive) {
        value += 1.0;
    }
    value
}

/// Writes the current device state into every healthy controller's input.
///
/// Missing input resources (headless apps) are treated as no input.
pub fn gather_device_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    motion: Option<Res<AccumulatedMouseMotion>>,
    mut q_motors: Query<(&mut MotorInput, &MotorSettings), Without<MotorFault>>,
) {
    let mouse_delta = motion.map(|m| m.delta).unwrap_or(Vec2::ZERO);

    for (mut input, settings) in &mut q_motors {
        let (horizontal, vertical, jump) = match keys.as_deref() {
            Some(keys) => (
                axis(keys, [KeyCode::KeyA, KeyCode::ArrowLeft], [KeyCode::KeyD, KeyCode::ArrowRight]),
                axis(keys, [KeyCode::KeyS, KeyCode::ArrowDown], [KeyCode::KeyW, KeyCode::ArrowUp]),
                keys.pressed(settings.jump_key),
            ),
            None => (0.0, 0.0, false),
        };
        let ski = buttons
            .as_deref()
            .is_some_and(|b| b.pressed(settings.ski_mouse_button));

        input.set_move(horizontal, vertical);
        input.set_jump_pressed(jump);
        input.set_ski_held(ski);

        if mouse_delta != Vec2::ZERO {
            // Screen y grows downward; look input is positive when looking up.
            input.add_look(
                mouse_delta.x * settings.look_sensitivity,
                -mouse_delta.y * settings.look_sensitivity,
            );
        }
    }
}

fn lock_cursor(window: &mut Window) {
    window.cursor_options.grab_mode = CursorGrabMode::Locked;
    window.cursor_options.visible = false;
}

/// Locks and hides the cursor on the primary window when a controller that
/// asks for it is spawned.
fn lock_cursor_on_startup(
    q_new: Query<&MotorSettings, Added<MotorSettings>>,
    mut q_windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if !q_new.iter().any(|s| s.lock_cursor_on_startup) {
        return;
    }
    if let Ok(mut window) = q_windows.single_mut() {
        lock_cursor(&mut window);
        debug!("Cursor locked on startup");
    }
}

/// Locks and hides the cursor when a window gains focus, if any controller
/// asks for it.
fn lock_cursor_on_focus(
    mut focus_events: EventReader<WindowFocused>,
    q_settings: Query<&MotorSettings>,
    mut q_windows: Query<&mut Window>,
) {
    let wants_lock = q_settings.iter().any(|s| s.lock_cursor_on_focus);

    for event in focus_events.read() {
        if !event.focused || !wants_lock {
            continue;
        }
        if let Ok(mut window) = q_windows.get_mut(event.window) {
            lock_cursor(&mut window);
            debug!("Cursor locked on window {}", event.window);
        }
    }
}
