use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use arbor_core::{DataBindings, Signal, Tag, Tags, next_node_id};
use slotmap::SlotMap;

use crate::controller::{Controller, ControllerEntry, ControllerSignals, TargetEvent};
use crate::errors::{Result, SceneError};
use crate::node::{ControllerEvent, Node, NodeEvent, NodeSignals, TagsEvent};
use crate::node_set::NodeSet;
use crate::settings::SceneSettings;
use crate::wrapper::SceneNode;
use crate::{ControllerHandle, NodeHandle};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Scene graph storage and mutation entry point.
///
/// The scene owns every node and controller in two arenas and links them
/// with generational handles, so parent/child and controller/target edges
/// never form ownership cycles and a stale handle can never alias a newer
/// node.
///
/// # Notification
///
/// Every structural mutation notifies observers in a fixed order:
///
/// | Operation           | Phase 1                          | Phase 2                          | Phase 3          |
/// |---------------------|----------------------------------|----------------------------------|------------------|
/// | `add_child`         | `added` on child subtree         | `added` on parent + ancestors    |                  |
/// | `remove_child`      | `removed` on child subtree       | `removed` on parent + ancestors  |                  |
/// | `add_controller`    | `controller_added` on subtree    | `controller_added` on ancestors  | `target_added`   |
/// | `remove_controller` | `controller_removed` on subtree  | `controller_removed` on ancestors| `target_removed` |
///
/// The node set of each phase is computed before its first handler runs.
/// Handlers get `&mut Scene` and may mutate the graph; such changes do not
/// alter the set of nodes still to be notified, and a node destroyed by a
/// handler is skipped for the rest of the pass.
pub struct Scene {
    pub(crate) id: u32,

    nodes: SlotMap<NodeHandle, Node>,
    controllers: SlotMap<ControllerHandle, ControllerEntry>,

    settings: SceneSettings,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::build(SceneSettings::default())
    }

    pub fn with_settings(settings: SceneSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    fn build(settings: SceneSettings) -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: SlotMap::with_key(),
            controllers: SlotMap::with_key(),
            settings,
        }
    }

    /// Process-unique id of this scene.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    // ========================================================================
    // Node Creation & Lookup
    // ========================================================================

    /// Creates a detached node named `{prefix}_{id}`.
    pub fn create_node(&mut self) -> NodeHandle {
        let id = next_node_id();
        let name = format!("{}_{}", self.settings.name_prefix, id);
        self.insert_node(id, name)
    }

    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let id = next_node_id();
        self.insert_node(id, name.to_owned())
    }

    fn insert_node(&mut self, id: u32, name: String) -> NodeHandle {
        let handle = self
            .nodes
            .insert_with_key(|handle| Node::new(handle, id, name));
        log::debug!("Created node {id} ({handle:?})");
        handle
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    /// Whether `handle` refers to a live node.
    #[inline]
    #[must_use]
    pub fn contains_node(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    /// Number of live nodes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over every live node, in no particular order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    /// Chainable operations on `handle`.
    pub fn node(&mut self, handle: NodeHandle) -> SceneNode<'_> {
        SceneNode::new(self, handle)
    }

    fn node_ref(&self, handle: NodeHandle) -> Result<&Node> {
        self.nodes.get(handle).ok_or(SceneError::NodeNotFound(handle))
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut Node> {
        self.nodes
            .get_mut(handle)
            .ok_or(SceneError::NodeNotFound(handle))
    }

    // ========================================================================
    // Identity
    // ========================================================================

    #[must_use]
    pub fn id_of(&self, handle: NodeHandle) -> Option<u32> {
        self.nodes.get(handle).map(Node::id)
    }

    #[must_use]
    pub fn name(&self, handle: NodeHandle) -> Option<&str> {
        self.nodes.get(handle).map(Node::name)
    }

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) -> Result<()> {
        self.node_mut(handle)?.name = name.to_owned();
        Ok(())
    }

    /// First node named `name` in the subtree of `root` (inclusive),
    /// depth-first pre-order.
    #[must_use]
    pub fn find_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        NodeSet::new(root)
            .descendants(self, true)
            .into_iter()
            .find(|&handle| self.name(handle) == Some(name))
    }

    // ========================================================================
    // Hierarchy Queries
    // ========================================================================

    #[must_use]
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).and_then(Node::parent)
    }

    /// Children of `handle`; empty for a stale handle.
    #[must_use]
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.nodes.get(handle).map(Node::children).unwrap_or(&[])
    }

    #[must_use]
    pub fn root(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).map(Node::root)
    }

    #[must_use]
    pub fn is_root(&self, handle: NodeHandle) -> bool {
        self.nodes.get(handle).is_some_and(|n| n.parent.is_none())
    }

    /// Whether `node` is a direct child of `parent`.
    #[must_use]
    pub fn contains(&self, parent: NodeHandle, node: NodeHandle) -> bool {
        self.nodes
            .get(parent)
            .is_some_and(|p| p.children.contains(&node))
    }

    // ========================================================================
    // Structural Mutation
    // ========================================================================

    /// Links `child` under `parent`, returning `parent` for chaining.
    ///
    /// A child that already has a parent is first removed from it, which
    /// fires `removed` for that edge. Then `added` fires on the child's
    /// subtree (child first) and afterwards on `parent` and its ancestors.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<NodeHandle> {
        self.check_link(parent, child)?;

        // Handlers of the implicit removal may re-parent the child again.
        while let Some(old_parent) = self.node_ref(child)?.parent {
            self.remove_child(old_parent, child)?;
            self.check_link(parent, child)?;
        }

        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.update_root(child);

        log::debug!("Linked {child:?} under {parent:?}");

        let event = |target| NodeEvent {
            target,
            node: child,
            parent,
        };

        let descendants = NodeSet::new(child).descendants(self, true);
        self.dispatch(&descendants, "added", |s| &s.added, event);

        let ancestors = NodeSet::new(parent).ancestors(self, true);
        self.dispatch(&ancestors, "added", |s| &s.added, event);

        Ok(parent)
    }

    /// Unlinks `child` from `parent`, returning `parent` for chaining.
    pub fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<NodeHandle> {
        let position = self
            .node_ref(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(SceneError::NotAChild { parent, child })?;

        self.node_mut(parent)?.children.remove(position);
        self.node_mut(child)?.parent = None;
        self.update_root(child);

        log::debug!("Unlinked {child:?} from {parent:?}");

        let event = |target| NodeEvent {
            target,
            node: child,
            parent,
        };

        let descendants = NodeSet::new(child).descendants(self, true);
        self.dispatch(&descendants, "removed", |s| &s.removed, event);

        let ancestors = NodeSet::new(parent).ancestors(self, true);
        self.dispatch(&ancestors, "removed", |s| &s.removed, event);

        Ok(parent)
    }

    fn check_link(&self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        self.node_ref(parent)?;
        self.node_ref(child)?;

        if parent == child {
            return Err(SceneError::SelfAttachment(child));
        }

        let mut current = self.parent(parent);
        while let Some(ancestor) = current {
            if ancestor == child {
                return Err(SceneError::HierarchyCycle { parent, child });
            }
            current = self.parent(ancestor);
        }
        Ok(())
    }

    /// Refreshes the cached root of `handle` and its whole subtree.
    fn update_root(&mut self, handle: NodeHandle) {
        let root = match self.parent(handle) {
            Some(parent) => self.root(parent).unwrap_or(parent),
            None => handle,
        };

        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current) {
                node.root = root;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    // ========================================================================
    // Controllers
    // ========================================================================

    /// Registers a behavior and returns its handle. The controller starts
    /// with no targets.
    pub fn create_controller<C: Controller>(&mut self, behavior: C) -> ControllerHandle {
        self.insert_controller(Rc::new(behavior))
    }

    /// Registers an already shared behavior.
    pub fn insert_controller(&mut self, behavior: Rc<dyn Controller>) -> ControllerHandle {
        let name = behavior.name().to_owned();
        let handle = self.controllers.insert(ControllerEntry::new(behavior));
        log::debug!("Created controller {name} ({handle:?})");
        handle
    }

    /// Attaches `controller` to `node`, returning `node` for chaining.
    ///
    /// Fires `controller_added` on the node's subtree (node first), then on
    /// its ancestors (node excluded), then the controller's `target_added`.
    pub fn add_controller(
        &mut self,
        node: NodeHandle,
        controller: ControllerHandle,
    ) -> Result<NodeHandle> {
        if self.node_ref(node)?.controllers.contains(&controller) {
            return Err(SceneError::ControllerAlreadyAttached { node, controller });
        }
        self.controller_entry(controller)?;

        self.node_mut(node)?.controllers.push(controller);
        self.controller_entry_mut(controller)?.targets.push(node);

        log::debug!("Attached controller {controller:?} to {node:?}");

        let event = |target| ControllerEvent {
            target,
            node,
            controller,
        };

        let descendants = NodeSet::new(node).descendants(self, true);
        self.dispatch(&descendants, "controller_added", |s| &s.controller_added, event);

        let ancestors = NodeSet::new(node).ancestors(self, false);
        self.dispatch(&ancestors, "controller_added", |s| &s.controller_added, event);

        self.dispatch_lifecycle(controller, node, "target_added", |s| &s.target_added);

        Ok(node)
    }

    /// Detaches `controller` from `node`, returning `node` for chaining.
    pub fn remove_controller(
        &mut self,
        node: NodeHandle,
        controller: ControllerHandle,
    ) -> Result<NodeHandle> {
        let position = self
            .node_ref(node)?
            .controllers
            .iter()
            .position(|&c| c == controller)
            .ok_or(SceneError::ControllerNotAttached { node, controller })?;

        let entry = self.controller_entry_mut(controller)?;
        if let Some(i) = entry.targets.iter().position(|&t| t == node) {
            entry.targets.remove(i);
        }
        self.node_mut(node)?.controllers.remove(position);

        log::debug!("Detached controller {controller:?} from {node:?}");

        let event = |target| ControllerEvent {
            target,
            node,
            controller,
        };

        let descendants = NodeSet::new(node).descendants(self, true);
        self.dispatch(&descendants, "controller_removed", |s| &s.controller_removed, event);

        let ancestors = NodeSet::new(node).ancestors(self, false);
        self.dispatch(&ancestors, "controller_removed", |s| &s.controller_removed, event);

        self.dispatch_lifecycle(controller, node, "target_removed", |s| &s.target_removed);

        Ok(node)
    }

    #[must_use]
    pub fn has_controller(&self, node: NodeHandle, controller: ControllerHandle) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|n| n.controllers.contains(&controller))
    }

    /// Controllers attached to `node`; empty for a stale handle.
    #[must_use]
    pub fn controllers(&self, node: NodeHandle) -> &[ControllerHandle] {
        self.nodes.get(node).map(Node::controllers).unwrap_or(&[])
    }

    /// Nodes `controller` is attached to, in attachment order.
    #[must_use]
    pub fn targets(&self, controller: ControllerHandle) -> &[NodeHandle] {
        self.controllers
            .get(controller)
            .map(|entry| entry.targets.as_slice())
            .unwrap_or(&[])
    }

    /// Typed access to a controller's behavior.
    #[must_use]
    pub fn controller<T: Controller>(&self, controller: ControllerHandle) -> Option<&T> {
        self.controllers.get(controller)?.downcast::<T>()
    }

    /// Shared typed handle to a controller's behavior, usable while the
    /// scene is borrowed mutably.
    #[must_use]
    pub fn controller_rc<T: Controller>(&self, controller: ControllerHandle) -> Option<Rc<T>> {
        self.controllers.get(controller)?.downcast_rc::<T>()
    }

    /// The behavior of `controller`, untyped.
    #[must_use]
    pub fn behavior(&self, controller: ControllerHandle) -> Option<Rc<dyn Controller>> {
        self.controllers
            .get(controller)
            .map(|entry| Rc::clone(&entry.behavior))
    }

    /// First controller attached to `node` whose behavior is a `T`.
    #[must_use]
    pub fn controller_of<T: Controller>(&self, node: NodeHandle) -> Option<ControllerHandle> {
        self.controllers(node).iter().copied().find(|&handle| {
            self.controllers
                .get(handle)
                .is_some_and(|entry| entry.downcast::<T>().is_some())
        })
    }

    #[must_use]
    pub fn contains_controller(&self, controller: ControllerHandle) -> bool {
        self.controllers.contains_key(controller)
    }

    #[must_use]
    pub fn controller_signals(&self, controller: ControllerHandle) -> Option<&ControllerSignals> {
        self.controllers.get(controller).map(|entry| &entry.signals)
    }

    /// Detaches `controller` from every target, with the full notification
    /// for each, then frees it.
    pub fn destroy_controller(&mut self, controller: ControllerHandle) -> Result<()> {
        while let Some(&target) = self.controller_entry(controller)?.targets.first() {
            self.remove_controller(target, controller)?;
        }
        self.controllers.remove(controller);
        log::debug!("Destroyed controller {controller:?}");
        Ok(())
    }

    fn controller_entry(&self, handle: ControllerHandle) -> Result<&ControllerEntry> {
        self.controllers
            .get(handle)
            .ok_or(SceneError::ControllerNotFound(handle))
    }

    fn controller_entry_mut(&mut self, handle: ControllerHandle) -> Result<&mut ControllerEntry> {
        self.controllers
            .get_mut(handle)
            .ok_or(SceneError::ControllerNotFound(handle))
    }

    // ========================================================================
    // Tags
    // ========================================================================

    #[must_use]
    pub fn tags(&self, handle: NodeHandle) -> Option<&Tags> {
        self.nodes.get(handle).map(Node::tags)
    }

    #[must_use]
    pub fn has_tag(&self, handle: NodeHandle, tag: Tag) -> bool {
        self.nodes.get(handle).is_some_and(|n| n.tags.contains(tag))
    }

    /// Replaces the tag set. Returns whether it changed.
    pub fn set_tags(&mut self, handle: NodeHandle, tags: Tags) -> Result<bool> {
        let node = self.node_mut(handle)?;
        if node.tags == tags {
            return Ok(false);
        }
        node.tags = tags;
        self.notify_tags_changed(handle);
        Ok(true)
    }

    /// Adds `tag`. Returns whether the set changed.
    pub fn add_tag(&mut self, handle: NodeHandle, tag: Tag) -> Result<bool> {
        let changed = self.node_mut(handle)?.tags.insert(tag);
        if changed {
            self.notify_tags_changed(handle);
        }
        Ok(changed)
    }

    /// Removes `tag`. Returns whether the set changed.
    pub fn remove_tag(&mut self, handle: NodeHandle, tag: Tag) -> Result<bool> {
        let changed = self.node_mut(handle)?.tags.remove(tag);
        if changed {
            self.notify_tags_changed(handle);
        }
        Ok(changed)
    }

    fn notify_tags_changed(&mut self, node: NodeHandle) {
        let ancestors = NodeSet::new(node).ancestors(self, true);
        self.dispatch(&ancestors, "tags_changed", |s| &s.tags_changed, |target| {
            TagsEvent { target, node }
        });
    }

    // ========================================================================
    // Data & Signals
    // ========================================================================

    #[must_use]
    pub fn data(&self, handle: NodeHandle) -> Option<&DataBindings> {
        self.nodes.get(handle).map(Node::data)
    }

    pub fn data_mut(&mut self, handle: NodeHandle) -> Option<&mut DataBindings> {
        self.nodes.get_mut(handle).map(|n| &mut n.data)
    }

    #[must_use]
    pub fn signals(&self, handle: NodeHandle) -> Option<&NodeSignals> {
        self.nodes.get(handle).map(Node::signals)
    }

    // ========================================================================
    // Destruction
    // ========================================================================

    /// Releases `handle` and its whole subtree.
    ///
    /// The node is first unlinked from its parent (firing `removed`), then
    /// every controller is detached from every node of the subtree, most
    /// recently attached first (firing `controller_removed` and
    /// `target_removed`). Handlers may re-link the node or attach new
    /// controllers meanwhile, so both steps repeat until a full round fires
    /// nothing. Only then is the subtree collected and freed, which drops
    /// the signals and disconnects every remaining subscriber.
    ///
    /// Returns the number of nodes freed.
    pub fn destroy_node(&mut self, handle: NodeHandle) -> Result<usize> {
        self.node_ref(handle)?;

        loop {
            if let Some(parent) = self.parent(handle) {
                self.remove_child(parent, handle)?;
                continue;
            }

            let mut stripped = false;
            for node in &NodeSet::new(handle).descendants(self, true) {
                while let Some(&controller) = self.controllers(node).last() {
                    self.remove_controller(node, controller)?;
                    stripped = true;
                }
            }
            if !stripped {
                break;
            }
        }

        // No handler runs past this point, so the subtree is final.
        let subtree = NodeSet::new(handle).descendants(self, true);
        for node in &subtree {
            if let Some(removed) = self.nodes.remove(node) {
                debug_assert!(removed.controllers.is_empty());
            }
        }

        log::debug!("Destroyed {} node(s) rooted at {handle:?}", subtree.len());
        Ok(subtree.len())
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Fires the signal picked by `select` on every node of `nodes`, in order.
    fn dispatch<A: 'static>(
        &mut self,
        nodes: &NodeSet,
        label: &'static str,
        select: impl Fn(&NodeSignals) -> &Signal<Scene, A>,
        make_event: impl Fn(NodeHandle) -> A,
    ) {
        if nodes.len() > self.settings.propagation_warn_threshold {
            log::warn!(
                "'{label}' propagation touches {} nodes (threshold {})",
                nodes.len(),
                self.settings.propagation_warn_threshold
            );
        }

        for target in nodes {
            let Some(node) = self.nodes.get(target) else {
                log::trace!("Skipping '{label}' on {target:?}: destroyed during dispatch");
                continue;
            };

            let subscribers = select(&node.signals).subscribers();
            if subscribers.is_empty() {
                continue;
            }
            if self.settings.trace_dispatch {
                log::trace!("'{label}' -> {target:?} ({} subscriber(s))", subscribers.len());
            }

            let event = make_event(target);
            for handler in subscribers {
                handler(self, &event);
            }
        }
    }

    fn dispatch_lifecycle(
        &mut self,
        controller: ControllerHandle,
        target: NodeHandle,
        label: &'static str,
        select: impl Fn(&ControllerSignals) -> &Signal<Scene, TargetEvent>,
    ) {
        let Some(entry) = self.controllers.get(controller) else {
            log::trace!("Skipping '{label}' on {controller:?}: destroyed during dispatch");
            return;
        };

        let subscribers = select(&entry.signals).subscribers();
        if self.settings.trace_dispatch {
            log::trace!("'{label}' -> {controller:?} ({} subscriber(s))", subscribers.len());
        }

        let event = TargetEvent { controller, target };
        for handler in subscribers {
            handler(self, &event);
        }
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("nodes", &self.nodes.len())
            .field("controllers", &self.controllers.len())
            .field("settings", &self.settings)
            .finish()
    }
}
