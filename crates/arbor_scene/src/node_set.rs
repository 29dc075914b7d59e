//! Node Sets
//!
//! A [`NodeSet`] is an ordered, duplicate-free list of node handles computed
//! from one or more seed nodes. Queries are pure: they read the current
//! structure of the scene, never mutate it, and return a new set.
//!
//! The scene uses node sets to materialize the affected nodes of a
//! structural change before any signal is dispatched; the same queries
//! are available to callers:
//!
//! ```rust,ignore
//! let lights = NodeSet::new(root)
//!     .descendants(&scene, false)
//!     .with_tag(&scene, tag("light"));
//!
//! for light in &lights {
//!     // ...
//! }
//! ```
//!
//! Seeds or handles that no longer refer to a live node are skipped.

use arbor_core::Tag;
use rustc_hash::FxHashSet;

use crate::NodeHandle;
use crate::node::Node;
use crate::scene::Scene;

/// Ordered, duplicate-free collection of nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: Vec<NodeHandle>,
}

/// Keeps insertion order while rejecting duplicates.
struct Collector {
    nodes: Vec<NodeHandle>,
    seen: FxHashSet<NodeHandle>,
}

impl Collector {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            seen: FxHashSet::default(),
        }
    }

    #[inline]
    fn push(&mut self, handle: NodeHandle) -> bool {
        if self.seen.insert(handle) {
            self.nodes.push(handle);
            true
        } else {
            false
        }
    }

    fn finish(self) -> NodeSet {
        NodeSet { nodes: self.nodes }
    }
}

impl NodeSet {
    /// A set holding a single seed.
    #[must_use]
    pub fn new(seed: NodeHandle) -> Self {
        Self { nodes: vec![seed] }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A set holding `nodes` in order, duplicates dropped.
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeHandle>) -> Self {
        let mut collector = Collector::new();
        for handle in nodes {
            collector.push(handle);
        }
        collector.finish()
    }

    /// Every node reachable through child links, depth-first pre-order
    /// following child insertion order.
    ///
    /// With `include_self` each seed precedes its own subtree.
    #[must_use]
    pub fn descendants(&self, scene: &Scene, include_self: bool) -> NodeSet {
        let mut collector = Collector::new();
        let mut stack: Vec<NodeHandle> = Vec::new();

        for &seed in &self.nodes {
            let Some(node) = scene.get_node(seed) else {
                continue;
            };
            if include_self {
                collector.push(seed);
            }

            // Reversed so the first child is popped first.
            stack.extend(node.children.iter().rev().copied());
            while let Some(handle) = stack.pop() {
                let Some(node) = scene.get_node(handle) else {
                    continue;
                };
                if !collector.push(handle) {
                    // Subtree already collected through an earlier seed.
                    continue;
                }
                stack.extend(node.children.iter().rev().copied());
            }
        }

        collector.finish()
    }

    /// The parent chain of every seed, nearest ancestor first.
    ///
    /// With `include_self` each seed precedes its own chain. Ancestors
    /// shared by several seeds appear once, at their first position.
    #[must_use]
    pub fn ancestors(&self, scene: &Scene, include_self: bool) -> NodeSet {
        let mut collector = Collector::new();

        for &seed in &self.nodes {
            let Some(node) = scene.get_node(seed) else {
                continue;
            };
            if include_self {
                collector.push(seed);
            }

            let mut current = node.parent;
            while let Some(handle) = current {
                collector.push(handle);
                current = scene.get_node(handle).and_then(Node::parent);
            }
        }

        collector.finish()
    }

    /// Direct children of every seed.
    #[must_use]
    pub fn children(&self, scene: &Scene, include_self: bool) -> NodeSet {
        let mut collector = Collector::new();

        for &seed in &self.nodes {
            let Some(node) = scene.get_node(seed) else {
                continue;
            };
            if include_self {
                collector.push(seed);
            }
            for &child in &node.children {
                collector.push(child);
            }
        }

        collector.finish()
    }

    /// The cached root of every seed.
    #[must_use]
    pub fn roots(&self, scene: &Scene) -> NodeSet {
        let mut collector = Collector::new();
        for &seed in &self.nodes {
            if let Some(node) = scene.get_node(seed) {
                collector.push(node.root);
            }
        }
        collector.finish()
    }

    /// Nodes for which `predicate` holds.
    #[must_use]
    pub fn filter<F>(&self, scene: &Scene, mut predicate: F) -> NodeSet
    where
        F: FnMut(NodeHandle, &Node) -> bool,
    {
        let nodes = self
            .nodes
            .iter()
            .copied()
            .filter(|&handle| {
                scene
                    .get_node(handle)
                    .is_some_and(|node| predicate(handle, node))
            })
            .collect();
        NodeSet { nodes }
    }

    /// Nodes carrying `tag`.
    #[must_use]
    pub fn with_tag(&self, scene: &Scene, tag: Tag) -> NodeSet {
        self.filter(scene, |_, node| node.tags.contains(tag))
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    #[inline]
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, NodeHandle>> {
        self.nodes.iter().copied()
    }

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

    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains(&handle)
    }
}

impl IntoIterator for NodeSet {
    type Item = NodeHandle;
    type IntoIter = std::vec::IntoIter<NodeHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = NodeHandle;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeHandle>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<NodeHandle> for NodeSet {
    fn from_iter<I: IntoIterator<Item = NodeHandle>>(iter: I) -> Self {
        Self::from_nodes(iter)
    }
}
