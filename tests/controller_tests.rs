//! Controller Integration Tests
//!
//! Tests for:
//! - Attaching/detaching controllers and the bidirectional link
//! - Three-phase notification order
//! - Lifecycle hooks, including hooks that re-enter the scene
//! - Typed controller lookup
//! - Controller and node destruction

use std::cell::RefCell;
use std::rc::Rc;

use arbor::prelude::*;
use arbor::{ErrorKind, SceneError};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

type Trace = Rc<RefCell<Vec<(&'static str, NodeHandle)>>>;

/// Stand-in for a rendering behavior. Records its hook calls.
#[derive(Default)]
struct Renderer {
    hooks: RefCell<Vec<(&'static str, TargetEvent)>>,
}

impl Controller for Renderer {
    fn name(&self) -> &str {
        "Renderer"
    }

    fn on_target_added(&self, _scene: &mut Scene, event: &TargetEvent) {
        self.hooks.borrow_mut().push(("added", *event));
    }

    fn on_target_removed(&self, _scene: &mut Scene, event: &TargetEvent) {
        self.hooks.borrow_mut().push(("removed", *event));
    }
}

struct Orbit;

impl Controller for Orbit {}

/// Writes its hook calls into a shared trace.
struct Tracer {
    trace: Trace,
}

impl Controller for Tracer {
    fn on_target_added(&self, _scene: &mut Scene, event: &TargetEvent) {
        self.trace.borrow_mut().push(("target_added", event.target));
    }

    fn on_target_removed(&self, _scene: &mut Scene, event: &TargetEvent) {
        self.trace.borrow_mut().push(("target_removed", event.target));
    }
}

/// Watches its targets for new children.
#[derive(Default)]
struct ChildWatcher {
    slots: RefCell<Vec<SignalSlot>>,
    seen: Rc<RefCell<Vec<NodeHandle>>>,
}

impl Controller for ChildWatcher {
    fn on_target_added(&self, scene: &mut Scene, event: &TargetEvent) {
        let seen = Rc::clone(&self.seen);
        if let Some(signals) = scene.signals(event.target) {
            let slot = signals
                .added
                .connect(move |_, ev| seen.borrow_mut().push(ev.node));
            self.slots.borrow_mut().push(slot);
        }
    }

    fn on_target_removed(&self, _scene: &mut Scene, _event: &TargetEvent) {
        self.slots.borrow_mut().clear();
    }
}

/// Creates a helper child under every target it is attached to.
struct Spawner;

impl Controller for Spawner {
    fn on_target_added(&self, scene: &mut Scene, event: &TargetEvent) {
        let gizmo = scene.create_node_with_name("gizmo");
        scene.add_child(event.target, gizmo).unwrap();
    }
}

fn trace_controller_signals(scene: &Scene, nodes: &[NodeHandle], trace: &Trace) -> Vec<SignalSlot> {
    let mut slots = Vec::new();
    for &n in nodes {
        let signals = scene.signals(n).unwrap();

        let added = Rc::clone(trace);
        slots.push(
            signals
                .controller_added
                .connect(move |_, ev| added.borrow_mut().push(("controller_added", ev.target))),
        );

        let removed = Rc::clone(trace);
        slots.push(
            signals
                .controller_removed
                .connect(move |_, ev| removed.borrow_mut().push(("controller_removed", ev.target))),
        );
    }
    slots
}

// ============================================================================
// Attach / Detach
// ============================================================================

#[test]
fn renderer_attached_to_camera() {
    init();
    let mut scene = Scene::new();
    let camera = scene.create_node_with_name("camera");
    let renderer = scene.create_controller(Renderer::default());

    let fired: Rc<RefCell<Vec<TargetEvent>>> = Rc::default();
    let log = Rc::clone(&fired);
    let _slot = scene
        .controller_signals(renderer)
        .unwrap()
        .target_added
        .connect(move |_, event| log.borrow_mut().push(*event));

    let returned = scene.add_controller(camera, renderer).unwrap();

    let expected = TargetEvent {
        controller: renderer,
        target: camera,
    };
    assert_eq!(returned, camera);
    assert_eq!(*fired.borrow(), vec![expected]);
    assert!(scene.has_controller(camera, renderer));
    assert_eq!(scene.controllers(camera), &[renderer]);
    assert_eq!(scene.targets(renderer), &[camera]);

    let behavior = scene.controller::<Renderer>(renderer).unwrap();
    assert_eq!(*behavior.hooks.borrow(), vec![("added", expected)]);
}

#[test]
fn duplicate_attachment_is_rejected() {
    let mut scene = Scene::new();
    let node = scene.create_node();
    let controller = scene.create_controller(Orbit);

    scene.add_controller(node, controller).unwrap();
    let err = scene.add_controller(node, controller).unwrap_err();

    assert!(matches!(err, SceneError::ControllerAlreadyAttached { .. }));
    assert_eq!(err.kind(), ErrorKind::Logic);
    assert_eq!(scene.controllers(node).len(), 1);
    assert_eq!(scene.targets(controller).len(), 1);
}

#[test]
fn controller_on_many_targets() {
    let mut scene = Scene::new();
    let a = scene.create_node();
    let b = scene.create_node();
    let c = scene.create_node();
    let orbit = scene.create_controller(Orbit);

    for node in [a, b, c] {
        scene.add_controller(node, orbit).unwrap();
    }
    assert_eq!(scene.targets(orbit), &[a, b, c]);

    scene.remove_controller(b, orbit).unwrap();
    assert_eq!(scene.targets(orbit), &[a, c]);
    assert!(!scene.has_controller(b, orbit));
}

#[test]
fn remove_controller_unlinks_and_fires() {
    let mut scene = Scene::new();
    let camera = scene.create_node();
    let renderer = scene.create_controller(Renderer::default());
    scene.add_controller(camera, renderer).unwrap();

    let returned = scene.remove_controller(camera, renderer).unwrap();

    assert_eq!(returned, camera);
    assert!(!scene.has_controller(camera, renderer));
    assert!(scene.targets(renderer).is_empty());

    let hooks = scene.controller::<Renderer>(renderer).unwrap().hooks.borrow();
    assert_eq!(hooks.len(), 2);
    assert_eq!(hooks[1].0, "removed");
    assert_eq!(hooks[1].1.target, camera);
}

#[test]
fn remove_unattached_controller_fails() {
    let mut scene = Scene::new();
    let node = scene.create_node();
    let other = scene.create_node();
    let controller = scene.create_controller(Orbit);
    scene.add_controller(other, controller).unwrap();

    let err = scene.remove_controller(node, controller).unwrap_err();

    assert!(matches!(err, SceneError::ControllerNotAttached { .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(scene.targets(controller), &[other]);
}

// ============================================================================
// Notification Order
// ============================================================================

#[test]
fn add_controller_three_phase_order() {
    init();
    let mut scene = Scene::new();
    let grandparent = scene.create_node();
    let parent = scene.create_node();
    let node = scene.create_node();
    let child = scene.create_node();
    let grandchild = scene.create_node();
    scene.add_child(grandparent, parent).unwrap();
    scene.add_child(parent, node).unwrap();
    scene.add_child(node, child).unwrap();
    scene.add_child(child, grandchild).unwrap();

    let trace = Trace::default();
    let _slots = trace_controller_signals(
        &scene,
        &[grandparent, parent, node, child, grandchild],
        &trace,
    );
    let tracer = scene.create_controller(Tracer {
        trace: Rc::clone(&trace),
    });

    scene.add_controller(node, tracer).unwrap();

    assert_eq!(
        *trace.borrow(),
        vec![
            ("controller_added", node),
            ("controller_added", child),
            ("controller_added", grandchild),
            ("controller_added", parent),
            ("controller_added", grandparent),
            ("target_added", node),
        ]
    );

    trace.borrow_mut().clear();
    scene.remove_controller(node, tracer).unwrap();

    assert_eq!(
        *trace.borrow(),
        vec![
            ("controller_removed", node),
            ("controller_removed", child),
            ("controller_removed", grandchild),
            ("controller_removed", parent),
            ("controller_removed", grandparent),
            ("target_removed", node),
        ]
    );
}

#[test]
fn own_controller_added_fires_once() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let node = scene.create_node();
    scene.add_child(parent, node).unwrap();

    let events: Rc<RefCell<Vec<ControllerEvent>>> = Rc::default();
    let log = Rc::clone(&events);
    let _slot = scene
        .signals(node)
        .unwrap()
        .controller_added
        .connect(move |_, ev| log.borrow_mut().push(*ev));

    let orbit = scene.create_controller(Orbit);
    scene.add_controller(node, orbit).unwrap();

    assert_eq!(
        *events.borrow(),
        vec![ControllerEvent {
            target: node,
            node,
            controller: orbit,
        }]
    );
}

#[test]
fn failed_attachment_fires_nothing() {
    let mut scene = Scene::new();
    let node = scene.create_node();
    let trace = Trace::default();
    let _slots = trace_controller_signals(&scene, &[node], &trace);
    let tracer = scene.create_controller(Tracer {
        trace: Rc::clone(&trace),
    });
    scene.add_controller(node, tracer).unwrap();
    trace.borrow_mut().clear();

    assert!(scene.add_controller(node, tracer).is_err());
    assert!(trace.borrow().is_empty());
}

// ============================================================================
// Hooks Re-entering the Scene
// ============================================================================

#[test]
fn hook_connects_to_target_signals() {
    let mut scene = Scene::new();
    let node = scene.create_node();
    let watcher = scene.create_controller(ChildWatcher::default());
    scene.add_controller(node, watcher).unwrap();

    let child = scene.create_node();
    scene.add_child(node, child).unwrap();

    let seen = Rc::clone(&scene.controller::<ChildWatcher>(watcher).unwrap().seen);
    assert_eq!(*seen.borrow(), vec![child]);

    // Detaching drops the watcher's slots.
    scene.remove_controller(node, watcher).unwrap();
    let late = scene.create_node();
    scene.add_child(node, late).unwrap();
    assert_eq!(*seen.borrow(), vec![child]);
}

#[test]
fn hook_mutates_structure() {
    init();
    let mut scene = Scene::new();
    let node = scene.create_node();
    let spawner = scene.create_controller(Spawner);

    scene.add_controller(node, spawner).unwrap();

    let children = scene.children(node);
    assert_eq!(children.len(), 1);
    assert_eq!(scene.name(children[0]), Some("gizmo"));
    assert_eq!(scene.root(children[0]), Some(node));
}

// ============================================================================
// Typed Lookup
// ============================================================================

#[test]
fn typed_controller_lookup() {
    let mut scene = Scene::new();
    let node = scene.create_node();
    let renderer = scene.create_controller(Renderer::default());
    let orbit = scene.create_controller(Orbit);
    scene.add_controller(node, orbit).unwrap();
    scene.add_controller(node, renderer).unwrap();

    assert!(scene.controller::<Renderer>(renderer).is_some());
    assert!(scene.controller::<Orbit>(renderer).is_none());
    assert_eq!(scene.controller_of::<Renderer>(node), Some(renderer));
    assert_eq!(scene.controller_of::<Orbit>(node), Some(orbit));
    assert_eq!(scene.controller_of::<ChildWatcher>(node), None);

    let shared = scene.controller_rc::<Renderer>(renderer).unwrap();
    assert_eq!(shared.hooks.borrow().len(), 1);
    assert_eq!(scene.behavior(renderer).unwrap().name(), "Renderer");
}

#[test]
fn shared_behavior_registered_by_rc() {
    let mut scene = Scene::new();
    let node = scene.create_node();
    let renderer = Rc::new(Renderer::default());
    let handle = scene.insert_controller(Rc::clone(&renderer) as Rc<dyn Controller>);

    scene.add_controller(node, handle).unwrap();

    assert_eq!(renderer.hooks.borrow().len(), 1);
}

// ============================================================================
// Destruction
// ============================================================================

#[test]
fn destroy_controller_detaches_every_target() {
    let mut scene = Scene::new();
    let a = scene.create_node();
    let b = scene.create_node();
    let renderer = scene.create_controller(Renderer::default());
    scene.add_controller(a, renderer).unwrap();
    scene.add_controller(b, renderer).unwrap();

    let shared = scene.controller_rc::<Renderer>(renderer).unwrap();
    scene.destroy_controller(renderer).unwrap();

    assert!(!scene.contains_controller(renderer));
    assert!(scene.controllers(a).is_empty());
    assert!(scene.controllers(b).is_empty());

    let removed: Vec<_> = shared
        .hooks
        .borrow()
        .iter()
        .filter(|(kind, _)| *kind == "removed")
        .map(|(_, ev)| ev.target)
        .collect();
    assert_eq!(removed, vec![a, b]);

    let err = scene.add_controller(a, renderer).unwrap_err();
    assert!(matches!(err, SceneError::ControllerNotFound(_)));
}

#[test]
fn destroy_node_detaches_controllers() {
    init();
    let mut scene = Scene::new();
    let root = scene.create_node();
    let child = scene.create_node();
    scene.add_child(root, child).unwrap();

    let renderer = scene.create_controller(Renderer::default());
    let orbit = scene.create_controller(Orbit);
    scene.add_controller(child, renderer).unwrap();
    scene.add_controller(child, orbit).unwrap();
    scene.add_controller(root, orbit).unwrap();

    scene.destroy_node(child).unwrap();

    assert!(scene.targets(renderer).is_empty());
    assert_eq!(scene.targets(orbit), &[root]);
    assert!(scene.contains_controller(renderer));

    let hooks = scene.controller::<Renderer>(renderer).unwrap().hooks.borrow();
    assert_eq!(hooks.last().map(|(kind, ev)| (*kind, ev.target)), Some(("removed", child)));
}
