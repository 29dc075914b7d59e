//! Controllers
//!
//! A controller is a behavior that can be attached to any number of nodes.
//! The scene graph only depends on the [`Controller`] trait; concrete
//! behaviors (renderers, cameras, scripts, ...) live in other crates.
//!
//! # Lifecycle
//!
//! Every controller owns two signals, `target_added` and `target_removed`.
//! They are fired by [`Scene::add_controller`] and
//! [`Scene::remove_controller`] as the last phase of the notification,
//! after the node's descendants and ancestors heard `controller_added` /
//! `controller_removed`. A controller never fires them itself.
//!
//! The trait hooks [`Controller::on_target_added`] and
//! [`Controller::on_target_removed`] are wired as the first subscribers of
//! those signals when the controller is registered with
//! [`Scene::create_controller`]. The usual pattern is to connect to the
//! target's signals in `on_target_added` and drop the slots in
//! `on_target_removed`:
//!
//! ```rust,ignore
//! struct Spin { slots: RefCell<Vec<SignalSlot>> }
//!
//! impl Controller for Spin {
//!     fn on_target_added(&self, scene: &mut Scene, event: &TargetEvent) {
//!         if let Some(signals) = scene.signals(event.target) {
//!             self.slots.borrow_mut().push(signals.added.connect(|_, ev| {
//!                 log::info!("{:?} joined the subtree", ev.node);
//!             }));
//!         }
//!     }
//!
//!     fn on_target_removed(&self, _scene: &mut Scene, _event: &TargetEvent) {
//!         self.slots.borrow_mut().clear();
//!     }
//! }
//! ```
//!
//! [`Scene::add_controller`]: crate::Scene::add_controller
//! [`Scene::remove_controller`]: crate::Scene::remove_controller
//! [`Scene::create_controller`]: crate::Scene::create_controller

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use arbor_core::Signal;

use crate::scene::Scene;
use crate::{ControllerHandle, NodeHandle};

/// Arguments of the controller lifecycle signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetEvent {
    pub controller: ControllerHandle,
    pub target: NodeHandle,
}

/// A behavior attachable to scene nodes.
pub trait Controller: Any {
    /// Display name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called when this controller has been attached to `event.target`.
    fn on_target_added(&self, _scene: &mut Scene, _event: &TargetEvent) {}

    /// Called when this controller has been detached from `event.target`.
    fn on_target_removed(&self, _scene: &mut Scene, _event: &TargetEvent) {}
}

/// Lifecycle signals owned by every controller.
#[derive(Debug, Default)]
pub struct ControllerSignals {
    pub target_added: Signal<Scene, TargetEvent>,
    pub target_removed: Signal<Scene, TargetEvent>,
}

/// Arena record of a registered controller.
pub(crate) struct ControllerEntry {
    pub(crate) behavior: Rc<dyn Controller>,
    pub(crate) targets: Vec<NodeHandle>,
    pub(crate) signals: ControllerSignals,
}

impl ControllerEntry {
    pub(crate) fn new(behavior: Rc<dyn Controller>) -> Self {
        let signals = ControllerSignals::default();

        let hook = Rc::clone(&behavior);
        signals
            .target_added
            .connect(move |scene, event| hook.on_target_added(scene, event))
            .detach();

        let hook = Rc::clone(&behavior);
        signals
            .target_removed
            .connect(move |scene, event| hook.on_target_removed(scene, event))
            .detach();

        Self {
            behavior,
            targets: Vec::new(),
            signals,
        }
    }

    /// Typed view of the behavior.
    pub(crate) fn downcast<T: Controller>(&self) -> Option<&T> {
        let behavior: &dyn Controller = self.behavior.as_ref();
        let any: &dyn Any = behavior;
        any.downcast_ref::<T>()
    }

    /// Shared typed handle to the behavior.
    pub(crate) fn downcast_rc<T: Controller>(&self) -> Option<Rc<T>> {
        let behavior: Rc<dyn Any> = Rc::clone(&self.behavior) as Rc<dyn Any>;
        behavior.downcast::<T>().ok()
    }
}

impl fmt::Debug for ControllerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerEntry")
            .field("name", &self.behavior.name())
            .field("targets", &self.targets)
            .field("signals", &self.signals)
            .finish()
    }
}
