//! Chainable node operation wrapper.
//!
//! [`SceneNode`] borrows a [`Scene`] mutably and forwards structural edits
//! to it, returning itself so calls can be chained with `?`:
//!
//! ```rust,ignore
//! scene.node(root)
//!     .add_child(camera)?
//!     .add_child(mesh)?
//!     .add_controller(renderer)?
//!     .add_tag(tag("world"))?;
//! ```
//!
//! Unlike the scene methods, which return the handle they were called on,
//! every wrapper method keeps the borrow alive. Notifications fire exactly
//! as they would for the underlying [`Scene`] call.
#![allow(clippy::return_self_not_must_use)]

use arbor_core::{DataBindings, Tag};

use crate::errors::Result;
use crate::scene::Scene;
use crate::{ControllerHandle, NodeHandle};

/// Temporary mutable borrow of a scene node for chainable operations.
pub struct SceneNode<'a> {
    scene: &'a mut Scene,
    handle: NodeHandle,
}

impl<'a> SceneNode<'a> {
    #[inline]
    pub fn new(scene: &'a mut Scene, handle: NodeHandle) -> Self {
        Self { scene, handle }
    }

    /// Returns the underlying handle.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// Releases the borrow and returns the scene.
    #[inline]
    pub fn scene(self) -> &'a mut Scene {
        self.scene
    }

    // -- Structure --

    pub fn add_child(self, child: NodeHandle) -> Result<Self> {
        self.scene.add_child(self.handle, child)?;
        Ok(self)
    }

    pub fn remove_child(self, child: NodeHandle) -> Result<Self> {
        self.scene.remove_child(self.handle, child)?;
        Ok(self)
    }

    /// Links this node under `parent`.
    pub fn attach_to(self, parent: NodeHandle) -> Result<Self> {
        self.scene.add_child(parent, self.handle)?;
        Ok(self)
    }

    // -- Controllers --

    pub fn add_controller(self, controller: ControllerHandle) -> Result<Self> {
        self.scene.add_controller(self.handle, controller)?;
        Ok(self)
    }

    pub fn remove_controller(self, controller: ControllerHandle) -> Result<Self> {
        self.scene.remove_controller(self.handle, controller)?;
        Ok(self)
    }

    // -- Identity & tags --

    pub fn set_name(self, name: &str) -> Result<Self> {
        self.scene.set_name(self.handle, name)?;
        Ok(self)
    }

    pub fn add_tag(self, tag: Tag) -> Result<Self> {
        self.scene.add_tag(self.handle, tag)?;
        Ok(self)
    }

    pub fn remove_tag(self, tag: Tag) -> Result<Self> {
        self.scene.remove_tag(self.handle, tag)?;
        Ok(self)
    }

    /// Edits the node's data bindings in place. No-op for a stale handle.
    pub fn with_data(self, f: impl FnOnce(&mut DataBindings)) -> Self {
        if let Some(data) = self.scene.data_mut(self.handle) {
            f(data);
        }
        self
    }
}
