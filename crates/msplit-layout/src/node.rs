// ABOUTME: Node types of the pane tree: leaf panes and ordered split containers.
// ABOUTME: Splits own their children by value; parents are only ever found through the registry.

use msplit_core::{NodeId, PaneId, WidgetId};
use serde::{Deserialize, Serialize};

/// Direction in which a split lays out its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Children side by side, left to right
    Horizontal,
    /// Children stacked, top to bottom
    Vertical,
}

impl Orientation {
    pub fn perpendicular(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Pixel size limits for a leaf. Maximums are optional; minimums default to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeConstraints {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl SizeConstraints {
    pub fn min(min_width: u32, min_height: u32) -> Self {
        Self {
            min_width,
            min_height,
            ..Self::default()
        }
    }

    pub fn with_max(mut self, max_width: Option<u32>, max_height: Option<u32>) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }

    /// Minimum along the axis a split of `orientation` divides
    pub fn min_along(&self, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::Horizontal => self.min_width,
            Orientation::Vertical => self.min_height,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(max) = self.max_width {
            if max < self.min_width {
                return Err(format!(
                    "max_width {} is smaller than min_width {}",
                    max, self.min_width
                ));
            }
        }
        if let Some(max) = self.max_height {
            if max < self.min_height {
                return Err(format!(
                    "max_height {} is smaller than min_height {}",
                    max, self.min_height
                ));
            }
        }
        Ok(())
    }
}

/// One visible pane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafNode {
    pane_id: PaneId,
    widget_id: WidgetId,
    #[serde(default)]
    constraints: SizeConstraints,
}

impl LeafNode {
    pub fn new(pane_id: PaneId, widget_id: WidgetId) -> Self {
        Self {
            pane_id,
            widget_id,
            constraints: SizeConstraints::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: SizeConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn pane_id(&self) -> &PaneId {
        &self.pane_id
    }

    pub fn widget_id(&self) -> &WidgetId {
        &self.widget_id
    }

    pub fn constraints(&self) -> &SizeConstraints {
        &self.constraints
    }

    pub(crate) fn replace_widget(&mut self, widget_id: WidgetId) -> WidgetId {
        std::mem::replace(&mut self.widget_id, widget_id)
    }

    pub(crate) fn set_constraints(&mut self, constraints: SizeConstraints) -> SizeConstraints {
        std::mem::replace(&mut self.constraints, constraints)
    }
}

/// A division of space into two or more ordered children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitNode {
    node_id: NodeId,
    orientation: Orientation,
    ratios: Vec<f64>,
    children: Vec<Node>,
}

impl SplitNode {
    pub fn new(orientation: Orientation, children: Vec<Node>, ratios: Vec<f64>) -> Self {
        Self::with_id(NodeId::generate(), orientation, children, ratios)
    }

    pub fn with_id(
        node_id: NodeId,
        orientation: Orientation,
        children: Vec<Node>,
        ratios: Vec<f64>,
    ) -> Self {
        Self {
            node_id,
            orientation,
            ratios,
            children,
        }
    }

    /// Split with every child given the same share
    pub fn even(orientation: Orientation, children: Vec<Node>) -> Self {
        let share = 1.0 / children.len().max(1) as f64;
        let ratios = vec![share; children.len()];
        Self::new(orientation, children, ratios)
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub(crate) fn ratios_mut(&mut self) -> &mut Vec<f64> {
        &mut self.ratios
    }

    pub(crate) fn set_ratios(&mut self, ratios: Vec<f64>) -> Vec<f64> {
        std::mem::replace(&mut self.ratios, ratios)
    }
}

/// A node of the pane tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Leaf(LeafNode),
    Split(SplitNode),
}

impl Node {
    pub fn leaf(pane_id: impl Into<PaneId>, widget_id: impl Into<WidgetId>) -> Self {
        Node::Leaf(LeafNode::new(pane_id.into(), widget_id.into()))
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Split(_) => None,
        }
    }

    pub fn as_split(&self) -> Option<&SplitNode> {
        match self {
            Node::Split(split) => Some(split),
            Node::Leaf(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Leftmost / topmost leaf of this subtree
    pub fn first_leaf(&self) -> Option<&LeafNode> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Split(split) => split.children.first().and_then(Node::first_leaf),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Split(split) => split.children.iter().map(Node::leaf_count).sum(),
        }
    }
}
