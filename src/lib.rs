//! # Arbor
//!
//! Scene graph core of the Arbor engine: a hierarchy of nodes with
//! attachable controller behaviors, where every structural change is
//! announced through typed signals in a fixed propagation order.
//!
//! ```rust,ignore
//! use arbor::prelude::*;
//!
//! let mut scene = Scene::new();
//! let root = scene.create_node_with_name("root");
//! let camera = scene.create_node_with_name("camera");
//!
//! let _slot = scene.signals(root).unwrap().added.connect(|scene, event| {
//!     log::info!("{:?} joined {:?}", scene.name(event.node), event.target);
//! });
//!
//! scene.node(root).add_child(camera)?;
//! ```
//!
//! The member crates are re-exported whole:
//! - [`arbor_core`]: signals, tags, data bindings and node ids
//! - [`arbor_scene`]: the scene graph itself

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub use arbor_core;
pub use arbor_scene;
pub use glam as math;

pub use arbor_core::{DataBindings, DataError, Signal, SignalSlot, Tag, Tags, Value, tag};
pub use arbor_scene::{
    Controller, ControllerEvent, ControllerHandle, ControllerSignals, ErrorKind, Node, NodeEvent,
    NodeHandle, NodeSet, NodeSignals, Scene, SceneError, SceneNode, SceneSettings, TagsEvent,
    TargetEvent,
};

pub mod prelude {
    pub use arbor_core::{DataBindings, Signal, SignalSlot, Tag, Tags, Value, tag};
    pub use arbor_scene::{
        Controller, ControllerEvent, ControllerHandle, NodeEvent, NodeHandle, NodeSet, Scene,
        SceneError, SceneSettings, TagsEvent, TargetEvent,
    };

    pub use glam::{Mat4, Vec2, Vec3, Vec4};
}
