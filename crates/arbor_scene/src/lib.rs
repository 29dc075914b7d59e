//! Hierarchical scene graph.
//!
//! - [`Scene`]: arena owning every node and controller, entry point of all edits
//! - [`Node`]: hierarchy links, tags, data bindings and structural signals
//! - [`NodeSet`]: ordered, duplicate-free traversal queries
//! - [`Controller`]: behaviors attachable to any number of nodes
//! - [`SceneNode`]: chainable wrapper returned by [`Scene::node`]

pub mod controller;
pub mod errors;
pub mod node;
pub mod node_set;
pub mod scene;
pub mod settings;
pub mod wrapper;

use slotmap::new_key_type;

new_key_type! {
    /// Generational handle of a node in a [`Scene`].
    pub struct NodeHandle;
    /// Generational handle of a controller registered with a [`Scene`].
    pub struct ControllerHandle;
}

pub use controller::{Controller, ControllerSignals, TargetEvent};
pub use errors::{ErrorKind, Result, SceneError};
pub use node::{ControllerEvent, Node, NodeEvent, NodeSignals, TagsEvent};
pub use node_set::NodeSet;
pub use scene::Scene;
pub use settings::SceneSettings;
pub use wrapper::SceneNode;
