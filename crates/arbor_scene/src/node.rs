use arbor_core::{DataBindings, Signal, Tags};

use crate::scene::Scene;
use crate::{ControllerHandle, NodeHandle};

/// Arguments of the `added` and `removed` signals.
///
/// `target` is the node whose signal fires; `node` and `parent` describe
/// the edge that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeEvent {
    pub target: NodeHandle,
    pub node: NodeHandle,
    pub parent: NodeHandle,
}

/// Arguments of the `controller_added` and `controller_removed` signals.
///
/// `node` is the node the controller was attached to or detached from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerEvent {
    pub target: NodeHandle,
    pub node: NodeHandle,
    pub controller: ControllerHandle,
}

/// Arguments of the `tags_changed` signal. `node` is the node whose tags changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagsEvent {
    pub target: NodeHandle,
    pub node: NodeHandle,
}

/// The structural signals every node owns.
///
/// Handlers receive the scene mutably and may re-enter any scene operation.
#[derive(Debug, Default)]
pub struct NodeSignals {
    /// A child subtree was linked to this node, one of its ancestors, or
    /// this node itself was linked under a new parent.
    pub added: Signal<Scene, NodeEvent>,
    /// Mirror of `added` for unlinking.
    pub removed: Signal<Scene, NodeEvent>,
    pub controller_added: Signal<Scene, ControllerEvent>,
    pub controller_removed: Signal<Scene, ControllerEvent>,
    /// The tag set of this node or of one of its descendants changed.
    pub tags_changed: Signal<Scene, TagsEvent>,
}

/// A scene graph vertex.
///
/// Nodes live in the [`Scene`] arena and refer to each other through
/// handles only. Structure is read-only from outside; all edits go
/// through [`Scene`] so both ends of every edge stay in sync and
/// observers get notified.
///
/// # Hierarchy
///
/// - `parent`: `None` for detached nodes
/// - `children`: insertion order, never contains duplicates
/// - `root`: cached topmost ancestor, the node itself when detached
#[derive(Debug)]
pub struct Node {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) tags: Tags,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
    pub(crate) root: NodeHandle,

    pub(crate) controllers: Vec<ControllerHandle>,

    /// Property bindings read by controllers and the renderer.
    pub data: DataBindings,

    pub(crate) signals: NodeSignals,
}

impl Node {
    pub(crate) fn new(handle: NodeHandle, id: u32, name: String) -> Self {
        Self {
            id,
            name,
            tags: Tags::new(),
            parent: None,
            children: Vec::new(),
            root: handle,
            controllers: Vec::new(),
            data: DataBindings::new(),
            signals: NodeSignals::default(),
        }
    }

    /// Process-unique sequential id assigned at creation.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Returns the parent node handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns a read-only slice of child node handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Returns the cached topmost ancestor.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Attached controllers, in attachment order.
    #[inline]
    #[must_use]
    pub fn controllers(&self) -> &[ControllerHandle] {
        &self.controllers
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &DataBindings {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn signals(&self) -> &NodeSignals {
        &self.signals
    }
}
