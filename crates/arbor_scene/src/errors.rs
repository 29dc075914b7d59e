//! Error Types
//!
//! All failures in the scene graph are caller-contract violations raised
//! synchronously at the offending call. Every check runs before any
//! mutation, so a failed call leaves the graph exactly as it was.
//!
//! # Taxonomy
//!
//! [`SceneError::kind`] maps each variant onto one of three families:
//! - [`ErrorKind::InvalidArgument`]: a handle or relationship the call
//!   requires does not hold (removing a non-child, detaching a controller
//!   that is not attached, stale handles, self-attachment, cycles)
//! - [`ErrorKind::Logic`]: attaching the same controller to the same node twice
//! - [`ErrorKind::Settings`]: invalid or unparsable [`SceneSettings`]
//!
//! [`SceneSettings`]: crate::SceneSettings

use thiserror::Error;

use crate::{ControllerHandle, NodeHandle};

/// Error family, independent of the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    Logic,
    Settings,
}

/// The error type for scene graph operations.
#[derive(Error, Debug)]
pub enum SceneError {
    // ========================================================================
    // Invalid Arguments
    // ========================================================================
    /// The node handle does not refer to a live node.
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeHandle),

    /// The controller handle does not refer to a live controller.
    #[error("Controller not found: {0:?}")]
    ControllerNotFound(ControllerHandle),

    /// `remove_child` was called with a node that is not a direct child.
    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// The node `remove_child` was called on
        parent: NodeHandle,
        /// The node that was expected among its children
        child: NodeHandle,
    },

    /// `remove_controller` was called with a controller that is not attached.
    #[error("Controller {controller:?} is not attached to node {node:?}")]
    ControllerNotAttached {
        node: NodeHandle,
        controller: ControllerHandle,
    },

    /// A node cannot be its own child.
    #[error("Node {0:?} cannot be added as a child of itself")]
    SelfAttachment(NodeHandle),

    /// The child is an ancestor of the parent; linking them would form a cycle.
    #[error("Adding {child:?} under {parent:?} would create a cycle")]
    HierarchyCycle {
        parent: NodeHandle,
        child: NodeHandle,
    },

    // ========================================================================
    // Logic Errors
    // ========================================================================
    /// The same controller cannot be added twice to the same node.
    #[error("Controller {controller:?} is already attached to node {node:?}")]
    ControllerAlreadyAttached {
        node: NodeHandle,
        controller: ControllerHandle,
    },

    // ========================================================================
    // Settings Errors
    // ========================================================================
    /// Settings failed validation.
    #[error("Invalid scene settings: {0}")]
    InvalidSettings(String),

    /// Settings JSON could not be parsed.
    #[error("Settings parse error: {0}")]
    SettingsParse(#[from] serde_json::Error),
}

impl SceneError {
    /// The family this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SceneError::NodeNotFound(_)
            | SceneError::ControllerNotFound(_)
            | SceneError::NotAChild { .. }
            | SceneError::ControllerNotAttached { .. }
            | SceneError::SelfAttachment(_)
            | SceneError::HierarchyCycle { .. } => ErrorKind::InvalidArgument,
            SceneError::ControllerAlreadyAttached { .. } => ErrorKind::Logic,
            SceneError::InvalidSettings(_) | SceneError::SettingsParse(_) => ErrorKind::Settings,
        }
    }
}

/// Alias for `Result<T, SceneError>`.
pub type Result<T> = std::result::Result<T, SceneError>;
