use nalgebra_glm as glm;
use viewctl_rs::controls::{Mode, ViewController, ViewEvent};
use viewctl_rs::input::{
    InputEvent, Key, KeyEvent, ModifierKey, Modifiers, PointerButton, PointerEvent, Surface,
    WheelEvent,
};
use viewctl_rs::scene::demo::{self, DemoScene};
use viewctl_rs::scene::Scene;
use viewctl_rs::settings::ViewSettings;

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;

fn session(settings: ViewSettings) -> (DemoScene, ViewController) {
    let mut demo = demo::build(WIDTH / HEIGHT).unwrap();
    let mut controls = ViewController::new(
        &mut demo.scene,
        demo.camera,
        Surface::new(WIDTH, HEIGHT),
        settings,
    )
    .unwrap();
    let floor = demo.floor;
    controls.set_pick_filter(move |hit| hit.object != floor);
    (demo, controls)
}

/// Pointer event sitting over a world point.
fn pointer_at(
    scene: &Scene,
    controls: &ViewController,
    point: glm::Vec3,
    modifiers: Modifiers,
) -> PointerEvent {
    let ndc = scene.project(controls.camera(), &point).unwrap();
    let x = (ndc.x + 1.0) * 0.5 * WIDTH;
    let y = (1.0 - ndc.y) * 0.5 * HEIGHT;
    controls
        .surface()
        .pointer(x, y, PointerButton::Primary, modifiers)
}

fn alt() -> Modifiers {
    Modifiers::none().with(ModifierKey::Alt)
}

fn key(key: Key) -> KeyEvent {
    KeyEvent {
        key,
        modifiers: Modifiers::none(),
    }
}

fn assert_close(a: &glm::Vec3, b: &glm::Vec3, tolerance: f32) {
    assert!(glm::distance(a, b) < tolerance, "{a:?} != {b:?}");
}

/// Alt-clicks the first sign post and ticks until the controller settles.
fn focus_sign_post(demo: &mut DemoScene, controls: &mut ViewController) -> usize {
    let click = pointer_at(&demo.scene, controls, glm::vec3(0.0, 0.5, 6.0), alt());
    let response = controls
        .handle_input(&mut demo.scene, &InputEvent::PointerDown(click))
        .unwrap();
    assert!(response.prevent_default);
    assert!(matches!(controls.mode(), Mode::FocusTransition(_)));

    let mut ticks = 0;
    while !controls.mode().is_focused() {
        controls.update(&mut demo.scene).unwrap();
        ticks += 1;
        assert!(ticks <= 20, "focus still running after {ticks} ticks");
    }
    ticks
}

#[test]
fn focus_orbit_and_return_to_saved_pose() {
    let (mut demo, mut controls) = session(ViewSettings::default());
    let camera = demo.camera;
    let saved = *controls.saved_pose();
    let eye = demo.scene.world_position(camera).unwrap();

    focus_sign_post(&mut demo, &mut controls);
    assert_eq!(*controls.mode(), Mode::Orbiting);

    let events = controls.drain_events();
    let focus = match events.as_slice() {
        [ViewEvent::Focused(focus)] => *focus,
        other => panic!("expected a focus event, got {other:?}"),
    };
    assert_eq!(focus.object, demo.signs[0].post);

    let scene = &demo.scene;
    assert_close(&scene.world_position(controls.pivot()).unwrap(), &focus.point, 1e-4);
    assert_close(&scene.world_position(camera).unwrap(), &eye, 1e-3);
    let forward = glm::quat_rotate_vec3(
        &scene.world_rotation(camera).unwrap(),
        &glm::vec3(0.0, 0.0, -1.0),
    );
    assert_close(&forward, &glm::normalize(&(focus.point - eye)), 1e-3);
    assert_eq!(scene.parent(camera).unwrap(), Some(controls.holder()));

    // Sideways drag yaws around the focused point at a fixed distance.
    let radius = glm::distance(&eye, &focus.point);
    let drag = controls
        .surface()
        .pointer(0.0, 0.0, PointerButton::Primary, alt())
        .with_movement(40.0, 0.0);
    controls
        .handle_input(&mut demo.scene, &InputEvent::PointerMove(drag))
        .unwrap();
    for _ in 0..10 {
        controls.update(&mut demo.scene).unwrap();
    }
    let orbited = demo.scene.world_position(camera).unwrap();
    assert!(glm::distance(&orbited, &eye) > 1e-2, "camera did not move");
    assert!((glm::distance(&orbited, &focus.point) - radius).abs() < 1e-3);

    let up = controls.surface().pointer(0.0, 0.0, PointerButton::Primary, Modifiers::none());
    controls
        .handle_input(&mut demo.scene, &InputEvent::PointerUp(up))
        .unwrap();
    assert_eq!(*controls.mode(), Mode::Focused);
    assert!(!controls.surface().pointer_locked());

    controls
        .handle_input(&mut demo.scene, &InputEvent::KeyDown(key(Key::Escape)))
        .unwrap();
    assert!(matches!(controls.mode(), Mode::ResetTransition(_)));
    assert_eq!(controls.focus(), None);

    let mut ticks = 0;
    while *controls.mode() != Mode::Idle {
        controls.update(&mut demo.scene).unwrap();
        ticks += 1;
        assert!(ticks <= 200, "reset still running after {ticks} ticks");
    }
    let node = demo.scene.node(camera).unwrap();
    assert_eq!(node.parent(), Some(saved.parent));
    assert_eq!(node.position, saved.position);
    assert_eq!(node.rotation, saved.rotation);
    assert_eq!(node.scale, saved.scale);
}

#[test]
fn releasing_during_transition_still_focuses() {
    let (mut demo, mut controls) = session(ViewSettings::default());
    let click = pointer_at(&demo.scene, &controls, glm::vec3(0.0, 0.5, 6.0), alt());
    controls
        .handle_input(&mut demo.scene, &InputEvent::PointerDown(click))
        .unwrap();
    controls.update(&mut demo.scene).unwrap();
    controls
        .handle_input(&mut demo.scene, &InputEvent::KeyUp(key(Key::Modifier(ModifierKey::Alt))))
        .unwrap();
    assert!(!controls.is_gesture_active());

    for _ in 0..20 {
        controls.update(&mut demo.scene).unwrap();
    }
    assert_eq!(*controls.mode(), Mode::Focused);
    assert!(matches!(controls.drain_events()[..], [ViewEvent::Focused(_)]));
}

#[test]
fn activation_click_on_floor_only_is_not_a_focus() {
    let (mut demo, mut controls) = session(ViewSettings::default());
    let click = pointer_at(&demo.scene, &controls, glm::vec3(-1.5, 0.0, -4.0), alt());
    controls
        .handle_input(&mut demo.scene, &InputEvent::PointerDown(click))
        .unwrap();
    assert_eq!(*controls.mode(), Mode::Idle);
    assert!(!controls.is_gesture_active());
}

#[test]
fn focus_beyond_max_distance_is_refused() {
    let settings = ViewSettings {
        max_focus_distance: 1.0,
        ..ViewSettings::default()
    };
    let (mut demo, mut controls) = session(settings);
    let click = pointer_at(&demo.scene, &controls, glm::vec3(0.0, 0.5, 6.0), alt());
    controls
        .handle_input(&mut demo.scene, &InputEvent::PointerDown(click))
        .unwrap();
    assert_eq!(*controls.mode(), Mode::Idle);
}

#[test]
fn wheel_dollies_once_and_respects_max_step() {
    let settings = ViewSettings {
        max_dolly_speed: 0.5,
        ..ViewSettings::default()
    };
    let (mut demo, mut controls) = session(settings);
    let camera = demo.camera;
    let before = demo.scene.node(camera).unwrap().position;

    let wheel = WheelEvent {
        delta_x: 0.0,
        delta_y: 100.0,
        modifiers: Modifiers::none(),
    };
    let response = controls
        .handle_input(&mut demo.scene, &InputEvent::Wheel(wheel))
        .unwrap();
    assert!(response.prevent_default);
    assert!(response.repaint);
    let after = demo.scene.node(camera).unwrap().position;
    assert!((glm::distance(&before, &after) - 0.5).abs() < 1e-4);
    // Scrolling down moves away from the origin.
    assert!(glm::length(&after) > glm::length(&before));

    let still = WheelEvent {
        delta_y: 0.0,
        ..wheel
    };
    controls
        .handle_input(&mut demo.scene, &InputEvent::Wheel(still))
        .unwrap();
    assert_eq!(demo.scene.node(camera).unwrap().position, after);
}

#[test]
fn wheel_is_ignored_while_transitioning() {
    let (mut demo, mut controls) = session(ViewSettings::default());
    let click = pointer_at(&demo.scene, &controls, glm::vec3(0.0, 0.5, 6.0), alt());
    controls
        .handle_input(&mut demo.scene, &InputEvent::PointerDown(click))
        .unwrap();
    let before = demo.scene.node(demo.camera).unwrap().position;
    let wheel = WheelEvent {
        delta_x: 0.0,
        delta_y: -100.0,
        modifiers: alt(),
    };
    controls
        .handle_input(&mut demo.scene, &InputEvent::Wheel(wheel))
        .unwrap();
    assert_eq!(demo.scene.node(demo.camera).unwrap().position, before);
}

#[test]
fn orbit_velocity_comes_to_rest() {
    let (mut demo, mut controls) = session(ViewSettings::default());
    focus_sign_post(&mut demo, &mut controls);

    let drag = controls
        .surface()
        .pointer(0.0, 0.0, PointerButton::Primary, alt())
        .with_movement(120.0, -15.0);
    controls
        .handle_input(&mut demo.scene, &InputEvent::PointerMove(drag))
        .unwrap();
    assert!(!controls.velocity().is_at_rest());

    let mut ticks = 0;
    while !controls.velocity().is_at_rest() {
        controls.update(&mut demo.scene).unwrap();
        ticks += 1;
        assert!(ticks <= 40);
    }
}

#[test]
fn precision_key_maps_vertical_motion_to_pitch() {
    let (mut demo, mut controls) = session(ViewSettings::default());
    focus_sign_post(&mut demo, &mut controls);

    let drag = controls
        .surface()
        .pointer(0.0, 0.0, PointerButton::Primary, alt().with(ModifierKey::Control))
        .with_movement(0.0, 10.0);
    controls
        .handle_input(&mut demo.scene, &InputEvent::PointerMove(drag))
        .unwrap();
    let v = controls.velocity();
    assert!((v.x - 1.0).abs() < 1e-6);
    assert_eq!(v.z, 0.0);
}

#[test]
fn vertical_drag_dollies_toward_focus() {
    let (mut demo, mut controls) = session(ViewSettings::default());
    focus_sign_post(&mut demo, &mut controls);
    let pivot = demo.scene.world_position(controls.pivot()).unwrap();
    let start = glm::distance(&demo.scene.world_position(demo.camera).unwrap(), &pivot);

    let drag = controls
        .surface()
        .pointer(0.0, 0.0, PointerButton::Primary, alt())
        .with_movement(0.0, -50.0);
    controls
        .handle_input(&mut demo.scene, &InputEvent::PointerMove(drag))
        .unwrap();
    for _ in 0..5 {
        controls.update(&mut demo.scene).unwrap();
    }
    let end = glm::distance(&demo.scene.world_position(demo.camera).unwrap(), &pivot);
    assert!(end < start, "{end} >= {start}");
    assert!(end >= controls.min_camera_distance());
}

#[test]
fn escape_without_auto_return_keeps_focus() {
    let settings = ViewSettings {
        auto_return: false,
        ..ViewSettings::default()
    };
    let (mut demo, mut controls) = session(settings);
    focus_sign_post(&mut demo, &mut controls);
    controls
        .handle_input(&mut demo.scene, &InputEvent::KeyDown(key(Key::Escape)))
        .unwrap();
    assert!(controls.mode().is_focused());
}

#[test]
fn saved_pose_follows_save_state() {
    let (mut demo, mut controls) = session(ViewSettings::default());
    let camera = demo.camera;
    demo.scene.node_mut(camera).unwrap().position = glm::vec3(1.0, 2.0, 9.0);
    controls.save_state(&demo.scene).unwrap();
    controls.save_state(&demo.scene).unwrap();
    assert_eq!(controls.saved_pose().position, glm::vec3(1.0, 2.0, 9.0));

    focus_sign_post(&mut demo, &mut controls);
    controls.exit(&mut demo.scene).unwrap();
    for _ in 0..200 {
        controls.update(&mut demo.scene).unwrap();
    }
    assert_eq!(*controls.mode(), Mode::Idle);
    assert_eq!(demo.scene.node(camera).unwrap().position, glm::vec3(1.0, 2.0, 9.0));
}

#[test]
fn exit_during_focus_transition_returns_home() {
    let (mut demo, mut controls) = session(ViewSettings::default());
    let camera = demo.camera;
    let saved = *controls.saved_pose();

    let click = pointer_at(&demo.scene, &controls, glm::vec3(0.0, 0.5, 6.0), alt());
    controls
        .handle_input(&mut demo.scene, &InputEvent::PointerDown(click))
        .unwrap();
    for _ in 0..3 {
        controls.update(&mut demo.scene).unwrap();
    }
    assert!(matches!(controls.mode(), Mode::FocusTransition(_)));

    controls.exit(&mut demo.scene).unwrap();
    assert!(matches!(controls.mode(), Mode::ResetTransition(_)));
    assert!(!controls.is_gesture_active());

    let mut ticks = 0;
    while *controls.mode() != Mode::Idle {
        controls.update(&mut demo.scene).unwrap();
        ticks += 1;
        assert!(ticks <= 200, "reset still running after {ticks} ticks");
    }
    assert!(controls.drain_events().is_empty());
    let node = demo.scene.node(camera).unwrap();
    assert_eq!(node.parent(), Some(saved.parent));
    assert_eq!(node.position, saved.position);
    assert_eq!(node.rotation, saved.rotation);
}

#[test]
fn new_focus_while_orbiting_replaces_the_old_one() {
    let (mut demo, mut controls) = session(ViewSettings::default());
    let camera = demo.camera;
    focus_sign_post(&mut demo, &mut controls);
    controls.drain_events();
    let eye = demo.scene.world_position(camera).unwrap();

    let click = pointer_at(&demo.scene, &controls, glm::vec3(3.0, 1.0, 1.0), alt());
    controls
        .handle_input(&mut demo.scene, &InputEvent::PointerDown(click))
        .unwrap();
    assert!(matches!(controls.mode(), Mode::FocusTransition(_)));
    assert_eq!(demo.scene.parent(camera).unwrap(), Some(demo.scene.root()));

    let mut ticks = 0;
    while !controls.mode().is_focused() {
        controls.update(&mut demo.scene).unwrap();
        ticks += 1;
        assert!(ticks <= 20);
    }
    assert_eq!(*controls.mode(), Mode::Orbiting);

    let focus = match controls.drain_events().as_slice() {
        [ViewEvent::Focused(focus)] => *focus,
        other => panic!("expected a focus event, got {other:?}"),
    };
    assert_eq!(focus.object, demo.boxes[0]);
    assert_close(&demo.scene.world_position(camera).unwrap(), &eye, 1e-3);
    assert_close(
        &demo.scene.world_position(controls.pivot()).unwrap(),
        &focus.point,
        1e-4,
    );
}

#[test]
fn focus_click_interrupts_reset() {
    let (mut demo, mut controls) = session(ViewSettings::default());
    focus_sign_post(&mut demo, &mut controls);
    controls.drain_events();
    controls.exit(&mut demo.scene).unwrap();
    for _ in 0..5 {
        controls.update(&mut demo.scene).unwrap();
    }
    assert!(matches!(controls.mode(), Mode::ResetTransition(_)));

    focus_sign_post(&mut demo, &mut controls);
    assert_eq!(*controls.mode(), Mode::Orbiting);
    assert!(matches!(controls.drain_events()[..], [ViewEvent::Focused(_)]));
    assert_eq!(
        demo.scene.parent(demo.camera).unwrap(),
        Some(controls.holder())
    );
}
