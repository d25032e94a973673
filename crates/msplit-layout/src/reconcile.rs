// ABOUTME: Tree reconciler: compares two trees by pane identity in a single pass.
// ABOUTME: Reports which panes were added, removed, moved to another parent, or given another widget.

use std::collections::HashMap;

use msplit_core::{NodeId, PaneId, WidgetId};

use crate::algorithms;
use crate::node::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafInfo {
    pub widget_id: WidgetId,
    pub parent: Option<NodeId>,
}

/// Flattened view of a tree: every leaf keyed by pane id
pub type LeafIndex = HashMap<PaneId, LeafInfo>;

pub fn index_leaves(root: Option<&Node>) -> LeafIndex {
    let mut index = LeafIndex::new();
    if let Some(root) = root {
        algorithms::walk(root, &mut |node, ctx| {
            if let Node::Leaf(leaf) = node {
                index.insert(
                    leaf.pane_id().clone(),
                    LeafInfo {
                        widget_id: leaf.widget_id().clone(),
                        parent: ctx.parent.cloned(),
                    },
                );
            }
        });
    }
    index
}

/// Pane-level changes between two trees; each list is sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    pub added: Vec<PaneId>,
    pub removed: Vec<PaneId>,
    /// Same pane, different parent split
    pub moved: Vec<PaneId>,
    /// Same pane, different widget
    pub modified: Vec<PaneId>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.moved.is_empty()
            && self.modified.is_empty()
    }
}

pub fn diff(old: &LeafIndex, new: &LeafIndex) -> TreeDiff {
    let mut out = TreeDiff::default();
    for (pane_id, info) in new {
        match old.get(pane_id) {
            None => out.added.push(pane_id.clone()),
            Some(previous) => {
                if previous.parent != info.parent {
                    out.moved.push(pane_id.clone());
                }
                if previous.widget_id != info.widget_id {
                    out.modified.push(pane_id.clone());
                }
            }
        }
    }
    out.removed = old
        .keys()
        .filter(|id| !new.contains_key(*id))
        .cloned()
        .collect();

    out.added.sort();
    out.removed.sort();
    out.moved.sort();
    out.modified.sort();
    out
}

/// Remembers the last tree it saw so each pass only reports what changed since
#[derive(Debug, Default)]
pub struct Reconciler {
    previous: LeafIndex,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconcile(&mut self, root: Option<&Node>) -> TreeDiff {
        let current = index_leaves(root);
        let changes = diff(&self.previous, &current);
        self.previous = current;
        changes
    }

    pub fn reset(&mut self) {
        self.previous.clear();
    }

    pub fn known(&self) -> &LeafIndex {
        &self.previous
    }
}
