//! Integration tests for the motor.
//!
//! These run the full `FixedUpdate` pipeline against a scripted backend: the
//! tests decide when the collider is resting, what the ground probe sees and
//! how long a tick is, and read back what the motor asked the executor to do.

use bevy::prelude::*;
use fps_motor::prelude::*;

// ==================== Scripted backend ====================

struct TestBackend;

/// Duration of the next ticks.
#[derive(Resource)]
struct TestTimestep(f32);

/// Scripted resting flag of the collider.
#[derive(Component, Default)]
struct Resting(bool);

/// Surface normal under the probe, if any.
#[derive(Component)]
struct ScriptedGround(Option<Vec3>);

/// Everything the motor handed to the executor.
#[derive(Component, Default)]
struct ExecutorLog {
    moves: Vec<Vec3>,
    toggles: Vec<bool>,
}

impl MotorBackend for TestBackend {
    fn plugin() -> impl Plugin {
        TestBackendPlugin
    }

    fn is_resting(world: &World, entity: Entity) -> bool {
        world.get::<Resting>(entity).is_some_and(|r| r.0)
    }

    fn move_by(world: &mut World, entity: Entity, displacement: Vec3) {
        if let Some(mut log) = world.get_mut::<ExecutorLog>(entity) {
            log.moves.push(displacement);
        }
    }

    fn set_motion_enabled(world: &mut World, entity: Entity, enabled: bool) {
        if let Some(mut log) = world.get_mut::<ExecutorLog>(entity) {
            log.toggles.push(enabled);
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        fps_motor::backend::transform_position(world, entity)
    }

    fn set_position(world: &mut World, entity: Entity, position: Vec3) {
        fps_motor::backend::write_transform_position(world, entity, position);
    }

    fn get_timestep(world: &World) -> f32 {
        world.get_resource::<TestTimestep>().map(|t| t.0).unwrap_or(0.0)
    }
}

struct TestBackendPlugin;

impl Plugin for TestBackendPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(TestTimestep(0.02));
        app.add_systems(FixedUpdate, scripted_probe.in_set(MotorSet::Sensors));
    }
}

fn scripted_probe(mut q: Query<(&ScriptedGround, &mut MotionState)>) {
    for (ground, mut state) in &mut q {
        let hit = ground
            .0
            .map(|normal| CollisionData::new(1.0, normal, Vec3::ZERO, None));
        state.set_ground_hit(hit);
    }
}

// ==================== Helpers ====================

fn create_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MotorPlugin::<TestBackend>::default());

    app.finish();
    app.cleanup();
    app
}

/// Spawn a grounded controller on flat ground, with a camera.
fn spawn_motor(app: &mut App, position: Vec3, settings: MotorSettings) -> (Entity, Entity) {
    let camera = app
        .world_mut()
        .spawn(Transform::from_xyz(0.0, 0.8, 0.0))
        .id();
    let body = app
        .world_mut()
        .spawn((
            Transform::from_translation(position),
            settings,
            MotorCamera(camera),
            Resting(true),
            ScriptedGround(Some(Vec3::Y)),
            ExecutorLog::default(),
        ))
        .id();
    (body, camera)
}

/// Run one fixed tick.
fn tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        tick(app);
    }
}

fn state(app: &App, entity: Entity) -> &MotionState {
    app.world().get::<MotionState>(entity).unwrap()
}

fn input(app: &mut App, entity: Entity) -> Mut<'_, MotorInput> {
    app.world_mut().get_mut::<MotorInput>(entity).unwrap()
}

fn set_resting(app: &mut App, entity: Entity, resting: bool) {
    app.world_mut().get_mut::<Resting>(entity).unwrap().0 = resting;
}

fn log(app: &App, entity: Entity) -> &ExecutorLog {
    app.world().get::<ExecutorLog>(entity).unwrap()
}

fn sent<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world()
        .resource::<Events<E>>()
        .iter_current_update_events()
        .cloned()
        .collect()
}

// ==================== Setup ====================

mod setup {
    use super::*;

    #[test]
    fn required_components_are_added() {
        let mut app = create_test_app();
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, MotorSettings::default());

        assert!(app.world().get::<MotionState>(body).is_some());
        assert!(app.world().get::<MotorInput>(body).is_some());
    }

    #[test]
    fn healthy_motor_runs_first_tick() {
        let mut app = create_test_app();
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, MotorSettings::default());

        tick(&mut app);

        assert!(app.world().get::<MotorFault>(body).is_none());
        assert_eq!(log(&app, body).moves.len(), 1);
        assert!(app.world().get::<Grounded>(body).is_some());
    }

    #[test]
    fn missing_camera_link_faults_and_skips() {
        let mut app = create_test_app();
        let body = app
            .world_mut()
            .spawn((MotorSettings::default(), Resting(false), ExecutorLog::default()))
            .id();

        run_ticks(&mut app, 3);

        let fault = app.world().get::<MotorFault>(body).unwrap();
        assert_eq!(fault.0, MotorSetupError::MissingCameraLink { body });
        assert!(log(&app, body).moves.is_empty());
        assert_eq!(state(&app, body).vertical_velocity, 0.0);
    }

    #[test]
    fn dangling_camera_faults() {
        let mut app = create_test_app();
        let camera = app.world_mut().spawn_empty().id();
        app.world_mut().despawn(camera);
        let body = app
            .world_mut()
            .spawn((MotorSettings::default(), MotorCamera(camera), ExecutorLog::default()))
            .id();

        tick(&mut app);

        let fault = app.world().get::<MotorFault>(body).unwrap();
        assert_eq!(fault.0, MotorSetupError::MissingCamera { body, camera });
        assert!(log(&app, body).moves.is_empty());
    }
}

// ==================== Jumping ====================

mod jumping {
    use super::*;

    #[test]
    fn jump_then_gravity_sequence() {
        let mut app = create_test_app();
        let settings = MotorSettings::default().with_jump(20.0, 5.0);
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, settings);

        input(&mut app, body).set_jump_pressed(true);
        tick(&mut app);
        assert!((state(&app, body).vertical_velocity - 5.0).abs() < 1e-5);

        // The executor lifts the character off the ground.
        set_resting(&mut app, body, false);
        tick(&mut app);
        assert!((state(&app, body).vertical_velocity - 4.6).abs() < 1e-5);
        tick(&mut app);
        assert!((state(&app, body).vertical_velocity - 4.2).abs() < 1e-5);

        // The first move already carries the jump.
        assert!((log(&app, body).moves[0].y - 5.0).abs() < 1e-5);
    }

    #[test]
    fn held_jump_is_consumed_once() {
        let mut app = create_test_app();
        let settings = MotorSettings::default().with_jump(20.0, 5.0);
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, settings);

        input(&mut app, body).set_jump_pressed(true);
        run_ticks(&mut app, 4);

        let jumps = sent::<Jumped>(&app);
        assert_eq!(jumps.len(), 1);
        assert_eq!(jumps[0].entity, body);
        assert!(!state(&app, body).jump_requested);
        // Still resting per the script, so back to the sticky force.
        assert!((state(&app, body).vertical_velocity + settings.sticky_ground_force).abs() < 1e-6);

        // Release and press again for a second jump.
        input(&mut app, body).set_jump_pressed(false);
        tick(&mut app);
        input(&mut app, body).set_jump_pressed(true);
        tick(&mut app);
        assert_eq!(sent::<Jumped>(&app).len(), 2);
    }

    #[test]
    fn tap_between_ticks_still_jumps() {
        let mut app = create_test_app();
        let settings = MotorSettings::default().with_jump(20.0, 5.0);
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, settings);
        tick(&mut app);

        // Pressed and released within one frame, before the next tick.
        input(&mut app, body).set_jump_pressed(true);
        input(&mut app, body).set_jump_pressed(false);
        tick(&mut app);

        assert_eq!(sent::<Jumped>(&app).len(), 1);
        assert!((state(&app, body).vertical_velocity - 5.0).abs() < 1e-5);
    }

    #[test]
    fn airborne_press_is_not_buffered() {
        let mut app = create_test_app();
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, MotorSettings::default());
        set_resting(&mut app, body, false);

        input(&mut app, body).set_jump_pressed(true);
        tick(&mut app);
        assert!(!state(&app, body).jump_requested);

        set_resting(&mut app, body, true);
        run_ticks(&mut app, 3);
        assert!(sent::<Jumped>(&app).is_empty());
    }

    #[test]
    fn jumping_disabled() {
        let mut app = create_test_app();
        let settings = MotorSettings::default().with_can_jump(false);
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, settings);

        input(&mut app, body).set_jump_pressed(true);
        run_ticks(&mut app, 2);

        assert!(sent::<Jumped>(&app).is_empty());
        assert!(state(&app, body).vertical_velocity <= 0.0);
    }
}

// ==================== Walking ====================

mod walking {
    use super::*;

    #[test]
    fn no_drift_at_rest() {
        let mut app = create_test_app();
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, MotorSettings::default());

        run_ticks(&mut app, 100);

        assert_eq!(state(&app, body).horizontal_speed(), 0.0);
        for moved in &log(&app, body).moves {
            assert_eq!(moved.x, 0.0);
            assert_eq!(moved.z, 0.0);
        }
    }

    #[test]
    fn forward_input_follows_body_yaw() {
        let mut app = create_test_app();
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, MotorSettings::default());

        // Turn right by 90 degrees: forward becomes +X.
        input(&mut app, body).add_look(90.0, 0.0);
        tick(&mut app);

        input(&mut app, body).set_move(0.0, 1.0);
        tick(&mut app);

        let velocity = state(&app, body).velocity;
        assert!(velocity.x > 0.0, "velocity {velocity:?}");
        assert!(velocity.z.abs() < 1e-5, "velocity {velocity:?}");
    }

    #[test]
    fn friction_stops_after_release() {
        let mut app = create_test_app();
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, MotorSettings::default());

        input(&mut app, body).set_move(1.0, 0.0);
        run_ticks(&mut app, 20);
        let moving = state(&app, body).horizontal_speed();
        assert!(moving > 0.0);

        input(&mut app, body).set_move(0.0, 0.0);
        run_ticks(&mut app, 200);
        assert!(state(&app, body).horizontal_speed() < moving * 1e-3);
    }

    #[test]
    fn zero_timestep_moves_nothing_new() {
        let mut app = create_test_app();
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, MotorSettings::default());
        set_resting(&mut app, body, false);
        app.world_mut().insert_resource(TestTimestep(0.0));

        input(&mut app, body).set_move(1.0, 1.0);
        run_ticks(&mut app, 5);

        let state = state(&app, body);
        assert_eq!(state.vertical_velocity, 0.0);
        assert_eq!(state.velocity, Vec3::ZERO);
    }

    #[test]
    fn steep_slope_pushes_downhill() {
        let mut app = create_test_app();
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, MotorSettings::default());
        let tilt = 30.0_f32.to_radians();
        app.world_mut().get_mut::<ScriptedGround>(body).unwrap().0 =
            Some(Vec3::new(tilt.sin(), tilt.cos(), 0.0));

        tick(&mut app);

        let state = state(&app, body);
        assert!(state.slope.angle > 95.0);
        assert!(state.velocity.x > 0.0, "velocity {:?}", state.velocity);
    }
}

// ==================== Skiing ====================

mod skiing {
    use super::*;

    #[test]
    fn ski_marker_follows_button_and_ground() {
        let mut app = create_test_app();
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, MotorSettings::default());

        input(&mut app, body).set_ski_held(true);
        tick(&mut app);
        assert!(state(&app, body).skiing);
        assert!(app.world().get::<Skiing>(body).is_some());

        // Leaving the ground ends skiing even with the button held.
        set_resting(&mut app, body, false);
        tick(&mut app);
        assert!(!state(&app, body).skiing);
        assert!(app.world().get::<Skiing>(body).is_none());
        assert!(app.world().get::<Airborne>(body).is_some());

        set_resting(&mut app, body, true);
        input(&mut app, body).set_ski_held(false);
        tick(&mut app);
        assert!(!state(&app, body).skiing);
        assert!(app.world().get::<Skiing>(body).is_none());
    }

    #[test]
    fn skiing_keeps_speed() {
        let mut app = create_test_app();
        let settings = MotorSettings::default().with_ski(1.5, 0.0);
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, settings);

        input(&mut app, body).set_move(0.0, 1.0);
        run_ticks(&mut app, 10);
        input(&mut app, body).set_move(0.0, 0.0);
        input(&mut app, body).set_ski_held(true);
        tick(&mut app);
        let before = state(&app, body).horizontal_speed();

        run_ticks(&mut app, 50);
        let after = state(&app, body).horizontal_speed();
        assert!((after - before).abs() < 1e-4, "before {before}, after {after}");
    }
}

// ==================== Looking ====================

mod looking {
    use super::*;

    #[test]
    fn pitch_clamps_on_camera() {
        let mut app = create_test_app();
        let settings = MotorSettings::default().with_camera_tilt(-80.0, 80.0);
        let (body, camera) = spawn_motor(&mut app, Vec3::ZERO, settings);

        // Look far down.
        input(&mut app, body).add_look(0.0, -500.0);
        tick(&mut app);

        assert_eq!(state(&app, body).camera_pitch, 80.0);
        let forward = app.world().get::<Transform>(camera).unwrap().forward();
        assert!((forward.y + 80.0_f32.to_radians().sin()).abs() < 1e-4, "forward {forward:?}");
        // The body itself never pitches.
        let body_forward = app.world().get::<Transform>(body).unwrap().forward();
        assert!(body_forward.y.abs() < 1e-6);
    }

    #[test]
    fn look_delta_is_consumed() {
        let mut app = create_test_app();
        let (body, _) = spawn_motor(&mut app, Vec3::ZERO, MotorSettings::default());

        input(&mut app, body).add_look(10.0, 5.0);
        tick(&mut app);
        let pitch = state(&app, body).camera_pitch;
        tick(&mut app);

        assert_eq!(state(&app, body).camera_pitch, pitch);
        assert_eq!(app.world().get::<MotorInput>(body).unwrap().look_delta, Vec2::ZERO);
    }
}

// ==================== Fall safety ====================

mod fall_safety {
    use super::*;

    #[test]
    fn fall_reset_keeps_horizontal_position() {
        let mut app = create_test_app();
        let settings = MotorSettings::default().with_fall_reset(-50.0, 50.0);
        let (body, _) = spawn_motor(&mut app, Vec3::new(3.0, -60.0, -4.0), settings);
        set_resting(&mut app, body, false);

        tick(&mut app);

        let position = app.world().get::<Transform>(body).unwrap().translation;
        assert_eq!(position, Vec3::new(3.0, 50.0, -4.0));
        assert_eq!(log(&app, body).toggles, vec![false, true]);

        let falls = sent::<FellOutOfBounds>(&app);
        assert_eq!(falls.len(), 1);
        assert_eq!(falls[0].from, Vec3::new(3.0, -60.0, -4.0));
        assert_eq!(falls[0].to, Vec3::new(3.0, 50.0, -4.0));
    }

    #[test]
    fn in_bounds_is_left_alone() {
        let mut app = create_test_app();
        let (body, _) = spawn_motor(&mut app, Vec3::new(0.0, -49.0, 0.0), MotorSettings::default());

        tick(&mut app);

        assert!(log(&app, body).toggles.is_empty());
        assert!(sent::<FellOutOfBounds>(&app).is_empty());
    }
}
