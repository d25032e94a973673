// ABOUTME: Pure traversal and validation functions over the pane tree.
// ABOUTME: Leaf collection, depth, ratio checks, structural validation, and id/path lookups.

use std::collections::HashSet;

use msplit_core::{NodeId, PaneId};

use crate::node::{LeafNode, Node, SplitNode};

/// Allowed deviation of a split's ratio sum from 1.0
pub const RATIO_TOLERANCE: f64 = 0.001;

/// Where the walker currently is
#[derive(Debug)]
pub struct VisitContext<'a, 'p> {
    /// 1 for the root
    pub depth: usize,
    /// Enclosing split, `None` for the root
    pub parent: Option<&'a NodeId>,
    /// Child indices leading from the root to this node
    pub path: &'p [usize],
}

/// Pre-order depth-first walk, children visited in order
pub fn walk<'a, F>(root: &'a Node, visit: &mut F)
where
    F: for<'p> FnMut(&'a Node, &VisitContext<'a, 'p>),
{
    let mut path = Vec::new();
    walk_inner(root, None, 1, &mut path, visit);
}

fn walk_inner<'a, F>(
    node: &'a Node,
    parent: Option<&'a NodeId>,
    depth: usize,
    path: &mut Vec<usize>,
    visit: &mut F,
) where
    F: for<'p> FnMut(&'a Node, &VisitContext<'a, 'p>),
{
    visit(
        node,
        &VisitContext {
            depth,
            parent,
            path: path.as_slice(),
        },
    );
    if let Node::Split(split) = node {
        for (index, child) in split.children().iter().enumerate() {
            path.push(index);
            walk_inner(child, Some(split.node_id()), depth + 1, path, visit);
            path.pop();
        }
    }
}

/// Leaves in focus order: depth-first, left-to-right / top-to-bottom
pub fn collect_leaves(root: &Node) -> Vec<&LeafNode> {
    let mut leaves = Vec::new();
    walk(root, &mut |node, _| {
        if let Node::Leaf(leaf) = node {
            leaves.push(leaf);
        }
    });
    leaves
}

/// A lone leaf has depth 1
pub fn max_depth(root: &Node) -> usize {
    let mut depth = 0;
    walk(root, &mut |_, ctx| depth = depth.max(ctx.depth));
    depth
}

pub fn validate_ratios(ratios: &[f64]) -> Result<(), String> {
    if ratios.is_empty() {
        return Err("ratio list is empty".to_string());
    }
    if let Some((index, ratio)) = ratios
        .iter()
        .enumerate()
        .find(|(_, r)| !r.is_finite() || **r <= 0.0)
    {
        return Err(format!("ratio {} at index {} must be positive", ratio, index));
    }
    let sum: f64 = ratios.iter().sum();
    if (sum - 1.0).abs() >= RATIO_TOLERANCE {
        return Err(format!("ratios sum to {:.4}, expected 1.0", sum));
    }
    Ok(())
}

/// Rescale so the ratios sum to 1.0. Unusable input becomes equal shares.
pub fn normalize_ratios(ratios: &mut [f64]) {
    if ratios.is_empty() {
        return;
    }
    let usable = ratios.iter().all(|r| r.is_finite() && *r > 0.0);
    let sum: f64 = ratios.iter().sum();
    if !usable || sum <= 0.0 {
        let share = 1.0 / ratios.len() as f64;
        ratios.iter_mut().for_each(|r| *r = share);
        return;
    }
    ratios.iter_mut().for_each(|r| *r /= sum);
}

/// Human-readable list of everything wrong with the tree; empty when valid
pub fn validate_structure(root: &Node) -> Vec<String> {
    let mut errors = Vec::new();
    let mut panes = HashSet::new();
    let mut nodes = HashSet::new();

    walk(root, &mut |node, _| match node {
        Node::Leaf(leaf) => {
            if !panes.insert(leaf.pane_id()) {
                errors.push(format!("duplicate pane id {}", leaf.pane_id()));
            }
            if let Err(e) = leaf.constraints().validate() {
                errors.push(format!("pane {}: {}", leaf.pane_id(), e));
            }
        }
        Node::Split(split) => {
            let id = split.node_id();
            if !nodes.insert(id) {
                errors.push(format!("duplicate node id {}", id));
            }
            if split.children().len() < 2 {
                errors.push(format!(
                    "split {} has {} children, needs at least 2",
                    id,
                    split.children().len()
                ));
            }
            if split.ratios().len() != split.children().len() {
                errors.push(format!(
                    "split {} has {} ratios for {} children",
                    id,
                    split.ratios().len(),
                    split.children().len()
                ));
            } else if let Err(e) = validate_ratios(split.ratios()) {
                errors.push(format!("split {}: {}", id, e));
            }
        }
    });

    errors
}

pub fn find_leaf<'a>(root: &'a Node, pane_id: &PaneId) -> Option<&'a LeafNode> {
    match root {
        Node::Leaf(leaf) if leaf.pane_id() == pane_id => Some(leaf),
        Node::Leaf(_) => None,
        Node::Split(split) => split
            .children()
            .iter()
            .find_map(|child| find_leaf(child, pane_id)),
    }
}

pub fn find_split<'a>(root: &'a Node, node_id: &NodeId) -> Option<&'a SplitNode> {
    match root {
        Node::Leaf(_) => None,
        Node::Split(split) if split.node_id() == node_id => Some(split),
        Node::Split(split) => split
            .children()
            .iter()
            .find_map(|child| find_split(child, node_id)),
    }
}

/// Child-index path from the root to the given split
pub fn path_to_split(root: &Node, node_id: &NodeId) -> Option<Vec<usize>> {
    let mut found = None;
    walk(root, &mut |node, ctx| {
        if found.is_none() {
            if let Node::Split(split) = node {
                if split.node_id() == node_id {
                    found = Some(ctx.path.to_vec());
                }
            }
        }
    });
    found
}

pub fn node_at_path<'a>(root: &'a Node, path: &[usize]) -> Option<&'a Node> {
    path.iter().try_fold(root, |node, &index| match node {
        Node::Split(split) => split.children().get(index),
        Node::Leaf(_) => None,
    })
}

pub(crate) fn node_at_path_mut<'a>(root: &'a mut Node, path: &[usize]) -> Option<&'a mut Node> {
    path.iter().try_fold(root, |node, &index| match node {
        Node::Split(split) => split.children_mut().get_mut(index),
        Node::Leaf(_) => None,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::three_panes;
    use super::*;
    use crate::node::Orientation;

    fn ids(leaves: &[&LeafNode]) -> Vec<String> {
        leaves.iter().map(|l| l.pane_id().to_string()).collect()
    }

    #[test]
    fn leaves_are_collected_depth_first() {
        let root = three_panes();
        assert_eq!(ids(&collect_leaves(&root)), vec!["a", "b", "c"]);
    }

    #[test]
    fn depth_counts_levels() {
        assert_eq!(max_depth(&Node::leaf("a", "w")), 1);
        assert_eq!(max_depth(&three_panes()), 3);
    }

    #[test]
    fn walk_reports_parent_and_path() {
        let root = three_panes();
        let mut seen = Vec::new();
        walk(&root, &mut |node, ctx| {
            if let Node::Leaf(leaf) = node {
                seen.push((
                    leaf.pane_id().to_string(),
                    ctx.parent.map(|p| p.to_string()),
                    ctx.path.to_vec(),
                ));
            }
        });
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), Some("root".to_string()), vec![0]),
                ("b".to_string(), Some("right".to_string()), vec![1, 0]),
                ("c".to_string(), Some("right".to_string()), vec![1, 1]),
            ]
        );
    }

    #[test]
    fn ratio_validation() {
        assert!(validate_ratios(&[0.5, 0.5]).is_ok());
        assert!(validate_ratios(&[0.3333, 0.3333, 0.3334]).is_ok());
        assert!(validate_ratios(&[0.6, 0.6]).is_err());
        assert!(validate_ratios(&[1.0, 0.0]).is_err());
        assert!(validate_ratios(&[1.2, -0.2]).is_err());
        assert!(validate_ratios(&[f64::NAN, 1.0]).is_err());
        assert!(validate_ratios(&[]).is_err());
    }

    #[test]
    fn normalize_rescales_and_repairs() {
        let mut ratios = vec![0.2, 0.2];
        normalize_ratios(&mut ratios);
        assert_eq!(ratios, vec![0.5, 0.5]);

        let mut broken = vec![0.0, -1.0, 3.0, 1.0];
        normalize_ratios(&mut broken);
        assert_eq!(broken, vec![0.25; 4]);
    }

    #[test]
    fn structure_errors_are_reported() {
        let bad = Node::Split(SplitNode::with_id(
            NodeId::from("s"),
            Orientation::Horizontal,
            vec![Node::leaf("a", "w"), Node::leaf("a", "w")],
            vec![0.7, 0.7, 0.1],
        ));
        let errors = validate_structure(&bad);
        assert!(errors.iter().any(|e| e.contains("duplicate pane id a")));
        assert!(errors.iter().any(|e| e.contains("3 ratios for 2 children")));

        let lonely = Node::Split(SplitNode::with_id(
            NodeId::from("s"),
            Orientation::Vertical,
            vec![Node::leaf("a", "w")],
            vec![1.0],
        ));
        assert!(validate_structure(&lonely)[0].contains("needs at least 2"));
        assert!(validate_structure(&three_panes()).is_empty());
    }

    #[test]
    fn lookups_by_id_and_path() {
        let root = three_panes();
        assert_eq!(
            find_leaf(&root, &PaneId::from("c")).map(|l| l.widget_id().as_str()),
            Some("wc")
        );
        assert!(find_leaf(&root, &PaneId::from("zz")).is_none());
        assert_eq!(
            find_split(&root, &NodeId::from("right")).map(|s| s.orientation()),
            Some(Orientation::Vertical)
        );
        assert_eq!(path_to_split(&root, &NodeId::from("right")), Some(vec![1]));
        assert_eq!(path_to_split(&root, &NodeId::from("root")), Some(vec![]));
        let node = node_at_path(&root, &[1, 1]).and_then(Node::as_leaf);
        assert_eq!(node.map(|l| l.pane_id().as_str()), Some("c"));
        assert!(node_at_path(&root, &[0, 0]).is_none());
    }
}
