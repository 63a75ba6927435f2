//! Typed "nearest provider" lookup over a component tree.
//!
//! A product root provides its [`crate::SelectionStore`] under a
//! [`ScopeToken`]; option groups rendered anywhere below it, including inside
//! shadow roots, resolve the store by walking outward from their own node.
//! A shadow root's outward step is its host element.

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle to a node in a [`NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy)]
enum Node {
    Element { parent: Option<NodeId> },
    ShadowRoot { host: NodeId },
}

/// Parent and shadow-host structure of a rendered component tree.
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: Vec<Node>,
}

impl NodeTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached element with no parent.
    pub fn add_root(&mut self) -> NodeId {
        self.push(Node::Element { parent: None })
    }

    /// Adds an element under `parent`, which may be an element or a shadow root.
    pub fn add_child(&mut self, parent: NodeId) -> NodeId {
        self.push(Node::Element {
            parent: Some(parent),
        })
    }

    /// Attaches a shadow root to `host` and returns it.
    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        self.push(Node::ShadowRoot { host })
    }

    /// Iterates from `start` outward: the node itself, then each parent,
    /// stepping from a shadow root to its host.
    pub fn outward(&self, start: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.nodes.get(start.0).map(|_| start);
        std::iter::successors(first, move |id| match self.nodes.get(id.0)? {
            Node::Element { parent } => *parent,
            Node::ShadowRoot { host } => Some(*host),
        })
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0);

/// Unique key under which values of type `T` are provided.
#[derive(Debug)]
pub struct ScopeToken<T> {
    id: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ScopeToken<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ScopeToken<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Values provided at scope roots, keyed by node and token.
#[derive(Default)]
pub struct ScopeRegistry {
    entries: HashMap<(NodeId, u64), Box<dyn Any + Send>>,
}

impl ScopeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provides `value` at `scope_root`, replacing any earlier value for the same token.
    pub fn provide<T: Any + Send>(&mut self, scope_root: NodeId, token: &ScopeToken<T>, value: T) {
        self.entries.insert((scope_root, token.id), Box::new(value));
    }

    /// Removes and returns the value provided at `scope_root`.
    pub fn withdraw<T: Any + Send>(
        &mut self,
        scope_root: NodeId,
        token: &ScopeToken<T>,
    ) -> Option<T> {
        let boxed = self.entries.remove(&(scope_root, token.id))?;
        boxed.downcast::<T>().ok().map(|b| *b)
    }

    /// Nearest node at or above `start` that provides `token`.
    #[must_use]
    pub fn provider_of<T: Any>(
        &self,
        tree: &NodeTree,
        start: NodeId,
        token: &ScopeToken<T>,
    ) -> Option<NodeId> {
        tree.outward(start).find(|node| self.entries.contains_key(&(*node, token.id)))
    }

    #[must_use]
    pub fn resolve<T: Any>(
        &self,
        tree: &NodeTree,
        start: NodeId,
        token: &ScopeToken<T>,
    ) -> Option<&T> {
        let node = self.provider_of(tree, start, token)?;
        self.entries.get(&(node, token.id))?.downcast_ref::<T>()
    }

    pub fn resolve_mut<T: Any>(
        &mut self,
        tree: &NodeTree,
        start: NodeId,
        token: &ScopeToken<T>,
    ) -> Option<&mut T> {
        let node = self.provider_of(tree, start, token)?;
        self.entries.get_mut(&(node, token.id))?.downcast_mut::<T>()
    }
}
