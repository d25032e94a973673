// ABOUTME: The tree model: root node, derived pane registry, and focus state.
// ABOUTME: Read access is public; mutation is crate-private so it only happens through commands.

use std::collections::{HashMap, HashSet};

use msplit_core::{NodeId, PaneId};

use crate::algorithms::{self, node_at_path, node_at_path_mut};
use crate::error::LayoutError;
use crate::events::LayoutEvent;
use crate::node::{LeafNode, Node, SplitNode};

/// Derived per-leaf index entry. `parent` is a non-owning reference by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub parent: Option<NodeId>,
    pub path: Vec<usize>,
    pub depth: usize,
}

/// Full copy of the structural state, used for undo and transaction savepoints
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    root: Option<Node>,
    focused: Option<PaneId>,
}

impl Snapshot {
    pub fn new(root: Option<Node>, focused: Option<PaneId>) -> Self {
        Self { root, focused }
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn focused(&self) -> Option<&PaneId> {
        self.focused.as_ref()
    }
}

/// How focus is settled after a structural change
#[derive(Debug)]
pub(crate) enum FocusPolicy {
    /// Keep the current focus; if it vanished use the fallback (or clear)
    Keep { fallback: Option<PaneId> },
    /// Focus exactly this pane (cleared if it is not present)
    Set(Option<PaneId>),
}

#[derive(Debug, Default)]
pub struct TreeModel {
    root: Option<Node>,
    registry: HashMap<PaneId, RegistryEntry>,
    order: Vec<PaneId>,
    focused: Option<PaneId>,
    pending: Vec<LayoutEvent>,
}

impl TreeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from a snapshot, rejecting malformed trees
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, LayoutError> {
        if let Some(root) = &snapshot.root {
            let errors = algorithms::validate_structure(root);
            if !errors.is_empty() {
                return Err(LayoutError::Validation(errors));
            }
        }
        let mut model = Self {
            root: snapshot.root,
            ..Self::default()
        };
        model.rebuild_registry();
        if let Some(focused) = snapshot.focused {
            if !model.registry.contains_key(&focused) {
                return Err(LayoutError::PaneNotFound(focused));
            }
            model.focused = Some(focused);
        }
        Ok(model)
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn get_pane(&self, pane_id: &PaneId) -> Option<&LeafNode> {
        let entry = self.registry.get(pane_id)?;
        node_at_path(self.root.as_ref()?, &entry.path)?.as_leaf()
    }

    pub fn contains_pane(&self, pane_id: &PaneId) -> bool {
        self.registry.contains_key(pane_id)
    }

    /// Pane ids in depth-first order
    pub fn get_all_pane_ids(&self) -> Vec<PaneId> {
        self.order.clone()
    }

    pub fn pane_count(&self) -> usize {
        self.order.len()
    }

    pub fn registry_entry(&self, pane_id: &PaneId) -> Option<&RegistryEntry> {
        self.registry.get(pane_id)
    }

    pub fn parent_of(&self, pane_id: &PaneId) -> Option<&NodeId> {
        self.registry.get(pane_id)?.parent.as_ref()
    }

    pub fn find_split(&self, node_id: &NodeId) -> Option<&SplitNode> {
        algorithms::find_split(self.root.as_ref()?, node_id)
    }

    /// The split with this id, as a node
    pub fn find_node(&self, node_id: &NodeId) -> Option<&Node> {
        let root = self.root.as_ref()?;
        node_at_path(root, &algorithms::path_to_split(root, node_id)?)
    }

    pub fn leaf_count(&self) -> usize {
        self.root.as_ref().map(Node::leaf_count).unwrap_or(0)
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map(algorithms::max_depth).unwrap_or(0)
    }

    pub fn focused_pane(&self) -> Option<&PaneId> {
        self.focused.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.root.clone(), self.focused.clone())
    }

    /// Structural check plus registry and focus consistency
    pub fn validate(&self) -> (bool, Vec<String>) {
        let mut errors = match &self.root {
            Some(root) => algorithms::validate_structure(root),
            None => Vec::new(),
        };

        let reachable: HashSet<&PaneId> = self
            .root
            .as_ref()
            .map(|root| {
                algorithms::collect_leaves(root)
                    .into_iter()
                    .map(LeafNode::pane_id)
                    .collect()
            })
            .unwrap_or_default();
        let registered: HashSet<&PaneId> = self.registry.keys().collect();
        for orphan in registered.difference(&reachable) {
            errors.push(format!("registry contains unreachable pane {}", orphan));
        }
        for missing in reachable.difference(&registered) {
            errors.push(format!("pane {} is missing from the registry", missing));
        }
        if let Some(focused) = &self.focused {
            if !reachable.contains(focused) {
                errors.push(format!("focused pane {} is not in the tree", focused));
            }
        }

        (errors.is_empty(), errors)
    }

    /// Returns false, without changing anything, if the pane is unknown
    pub(crate) fn set_focused_pane(&mut self, pane_id: Option<PaneId>) -> bool {
        if let Some(id) = &pane_id {
            if !self.registry.contains_key(id) {
                return false;
            }
        }
        if self.focused != pane_id {
            let old = std::mem::replace(&mut self.focused, pane_id.clone());
            self.pending.push(LayoutEvent::FocusChanged { old, new: pane_id });
        }
        true
    }

    /// Recompute the pane index from a full traversal
    pub(crate) fn rebuild_registry(&mut self) {
        self.registry.clear();
        self.order.clear();
        let Some(root) = &self.root else {
            return;
        };
        let registry = &mut self.registry;
        let order = &mut self.order;
        algorithms::walk(root, &mut |node, ctx| {
            if let Node::Leaf(leaf) = node {
                registry.insert(
                    leaf.pane_id().clone(),
                    RegistryEntry {
                        parent: ctx.parent.cloned(),
                        path: ctx.path.to_vec(),
                        depth: ctx.depth,
                    },
                );
                order.push(leaf.pane_id().clone());
            }
        });
    }

    /// Rebuild the registry after a structural mutation and queue the resulting events
    pub(crate) fn commit_structure(&mut self, focus: FocusPolicy) {
        let previous: HashSet<PaneId> = self.registry.keys().cloned().collect();
        self.rebuild_registry();

        let mut removed: Vec<&PaneId> = previous
            .iter()
            .filter(|id| !self.registry.contains_key(*id))
            .collect();
        removed.sort();
        let mut events: Vec<LayoutEvent> = removed
            .into_iter()
            .map(|id| LayoutEvent::PaneRemoved(id.clone()))
            .collect();
        events.extend(
            self.order
                .iter()
                .filter(|id| !previous.contains(*id))
                .map(|id| LayoutEvent::PaneAdded(id.clone())),
        );
        events.push(LayoutEvent::StructureChanged);
        self.pending.extend(events);

        let target = match focus {
            FocusPolicy::Keep { fallback } => match &self.focused {
                Some(current) if self.registry.contains_key(current) => Some(current.clone()),
                _ => fallback.filter(|id| self.registry.contains_key(id)),
            },
            FocusPolicy::Set(target) => target.filter(|id| self.registry.contains_key(id)),
        };
        self.set_focused_pane(target);
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.root = snapshot.root;
        self.commit_structure(FocusPolicy::Set(snapshot.focused));
    }

    pub(crate) fn set_root(&mut self, root: Option<Node>) {
        self.root = root;
    }

    pub(crate) fn node_at_path_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        node_at_path_mut(self.root.as_mut()?, path)
    }

    pub(crate) fn leaf_mut(&mut self, pane_id: &PaneId) -> Option<&mut LeafNode> {
        let path = self.registry.get(pane_id)?.path.clone();
        match self.node_at_path_mut(&path)? {
            Node::Leaf(leaf) => Some(leaf),
            Node::Split(_) => None,
        }
    }

    pub(crate) fn split_mut(&mut self, node_id: &NodeId) -> Option<&mut SplitNode> {
        let path = algorithms::path_to_split(self.root.as_ref()?, node_id)?;
        match self.node_at_path_mut(&path)? {
            Node::Split(split) => Some(split),
            Node::Leaf(_) => None,
        }
    }

    pub(crate) fn emit(&mut self, event: LayoutEvent) {
        self.pending.push(event);
    }

    pub(crate) fn take_events(&mut self) -> Vec<LayoutEvent> {
        std::mem::take(&mut self.pending)
    }
}
