// ABOUTME: Geometry engine: turns the tree and a viewport into exact pixel rectangles.
// ABOUTME: Pure and deterministic; children and divider gaps always tile their parent.

use std::collections::{BTreeMap, HashMap};

use msplit_core::{GeometrySettings, NodeId, PaneId, Point, Rect};

use crate::node::{LeafNode, Node, Orientation, SplitNode};

/// Temporary ratios keyed by split id, used for drag previews
pub type RatioOverrides = HashMap<NodeId, Vec<f64>>;

/// The gap between two adjacent children of a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DividerGeometry {
    pub node_id: NodeId,
    /// Sits between child `index` and child `index + 1`
    pub index: usize,
    pub orientation: Orientation,
    /// Exactly the handle-width gap
    pub rect: Rect,
    /// `rect` widened by the hit-area padding, clipped to the split
    pub hit_rect: Rect,
    /// Length the split distributes among its children (handles excluded)
    pub span: i32,
}

/// Non-fatal constraint problems found during a layout pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// Children's combined minimum sizes do not fit in the split
    InsufficientSpace {
        node_id: NodeId,
        required: i32,
        available: i32,
    },
    /// A leaf was given less room than its minimum and overflows its slot
    BelowMinimum {
        pane_id: PaneId,
        orientation: Orientation,
        required: i32,
        available: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutGeometry {
    pub viewport: Rect,
    /// Leaf rectangles in depth-first order (back to front)
    pub panes: Vec<(PaneId, Rect)>,
    pub dividers: BTreeMap<NodeId, Vec<DividerGeometry>>,
    /// Full rectangle of every split
    pub splits: HashMap<NodeId, Rect>,
    pub violations: Vec<ConstraintViolation>,
}

impl LayoutGeometry {
    pub fn pane_rect(&self, pane_id: &PaneId) -> Option<Rect> {
        self.panes
            .iter()
            .find(|(id, _)| id == pane_id)
            .map(|(_, rect)| *rect)
    }

    pub fn divider(&self, node_id: &NodeId, index: usize) -> Option<&DividerGeometry> {
        self.dividers.get(node_id)?.get(index)
    }

    pub fn all_dividers(&self) -> impl Iterator<Item = &DividerGeometry> {
        self.dividers.values().flatten()
    }

    pub fn pane_at(&self, point: Point) -> Option<&PaneId> {
        self.panes
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(point))
            .map(|(id, _)| id)
    }

    /// Divider whose grab area contains the point. A hit on the visible
    /// handle wins; otherwise the divider whose handle is nearest.
    pub fn hit_test_divider(&self, point: Point) -> Option<&DividerGeometry> {
        if let Some(exact) = self.all_dividers().find(|d| d.rect.contains(point)) {
            return Some(exact);
        }
        self.all_dividers()
            .filter(|d| d.hit_rect.contains(point))
            .min_by_key(|d| distance_to_handle(d, point))
    }
}

fn distance_to_handle(divider: &DividerGeometry, point: Point) -> i32 {
    let r = divider.rect;
    match divider.orientation {
        Orientation::Horizontal => (point.x - r.x).abs().min((point.x - r.right()).abs()),
        Orientation::Vertical => (point.y - r.y).abs().min((point.y - r.bottom()).abs()),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryEngine {
    settings: GeometrySettings,
}

impl GeometryEngine {
    pub fn new(settings: GeometrySettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GeometrySettings {
        &self.settings
    }

    pub fn compute(&self, root: Option<&Node>, viewport: Rect) -> LayoutGeometry {
        self.compute_with_overrides(root, viewport, &RatioOverrides::new())
    }

    /// Same as [`compute`](Self::compute) but with some splits' ratios replaced
    pub fn compute_with_overrides(
        &self,
        root: Option<&Node>,
        viewport: Rect,
        overrides: &RatioOverrides,
    ) -> LayoutGeometry {
        let mut out = LayoutGeometry {
            viewport,
            ..LayoutGeometry::default()
        };
        if let Some(root) = root {
            let pass = Pass {
                handle: self.settings.handle_width as i32,
                padding: self.settings.hit_area_padding as i32,
                overrides,
            };
            pass.layout(root, viewport, &mut out);
        }
        out
    }
}

struct Pass<'o> {
    handle: i32,
    padding: i32,
    overrides: &'o RatioOverrides,
}

impl Pass<'_> {
    fn layout(&self, node: &Node, rect: Rect, out: &mut LayoutGeometry) {
        match node {
            Node::Leaf(leaf) => self.place_leaf(leaf, rect, out),
            Node::Split(split) => self.place_split(split, rect, out),
        }
    }

    fn place_leaf(&self, leaf: &LeafNode, slot: Rect, out: &mut LayoutGeometry) {
        let c = leaf.constraints();
        let mut rect = slot;

        let min_w = c.min_width as i32;
        if rect.width < min_w {
            out.violations.push(ConstraintViolation::BelowMinimum {
                pane_id: leaf.pane_id().clone(),
                orientation: Orientation::Horizontal,
                required: min_w,
                available: rect.width,
            });
            rect.width = min_w;
        } else if let Some(max) = c.max_width {
            rect.width = rect.width.min(max as i32);
        }

        let min_h = c.min_height as i32;
        if rect.height < min_h {
            out.violations.push(ConstraintViolation::BelowMinimum {
                pane_id: leaf.pane_id().clone(),
                orientation: Orientation::Vertical,
                required: min_h,
                available: rect.height,
            });
            rect.height = min_h;
        } else if let Some(max) = c.max_height {
            rect.height = rect.height.min(max as i32);
        }

        out.panes.push((leaf.pane_id().clone(), rect));
    }

    fn place_split(&self, split: &SplitNode, rect: Rect, out: &mut LayoutGeometry) {
        let orientation = split.orientation();
        let children = split.children();
        if children.is_empty() {
            return;
        }
        out.splits.insert(split.node_id().clone(), rect);

        let length = match orientation {
            Orientation::Horizontal => rect.width,
            Orientation::Vertical => rect.height,
        }
        .max(0);
        // Handles shrink only when the split cannot even fit them
        let slots = children.len() as i32 - 1;
        let handle = if slots > 0 && self.handle * slots > length {
            length / slots
        } else {
            self.handle
        };
        let available = length - handle * slots;

        let ratios = self
            .overrides
            .get(split.node_id())
            .filter(|r| r.len() == children.len())
            .map(Vec::as_slice)
            .unwrap_or(split.ratios());
        let mins: Vec<i32> = children
            .iter()
            .map(|child| min_extent(child, orientation, self.handle))
            .collect();

        let mut sizes = proportional_sizes(available, ratios);
        let required: i32 = mins.iter().sum();
        if required > available {
            out.violations.push(ConstraintViolation::InsufficientSpace {
                node_id: split.node_id().clone(),
                required,
                available,
            });
        } else {
            enforce_minimums(&mut sizes, &mins);
        }

        let mut dividers = Vec::with_capacity(children.len() - 1);
        let mut offset = 0;
        for (index, (child, size)) in children.iter().zip(&sizes).enumerate() {
            let child_rect = match orientation {
                Orientation::Horizontal => Rect::new(rect.x + offset, rect.y, *size, rect.height),
                Orientation::Vertical => Rect::new(rect.x, rect.y + offset, rect.width, *size),
            };
            self.layout(child, child_rect, out);
            offset += size;

            if index + 1 < children.len() {
                dividers.push(self.divider(split, index, rect, offset, handle, available));
                offset += handle;
            }
        }
        out.dividers.insert(split.node_id().clone(), dividers);
    }

    fn divider(
        &self,
        split: &SplitNode,
        index: usize,
        parent: Rect,
        offset: i32,
        handle: i32,
        span: i32,
    ) -> DividerGeometry {
        let (rect, hit_rect) = match split.orientation() {
            Orientation::Horizontal => {
                let x = parent.x + offset;
                let hit_left = (x - self.padding).max(parent.x);
                let hit_right = (x + handle + self.padding).min(parent.right());
                (
                    Rect::new(x, parent.y, handle, parent.height),
                    Rect::new(hit_left, parent.y, hit_right - hit_left, parent.height),
                )
            }
            Orientation::Vertical => {
                let y = parent.y + offset;
                let hit_top = (y - self.padding).max(parent.y);
                let hit_bottom = (y + handle + self.padding).min(parent.bottom());
                (
                    Rect::new(parent.x, y, parent.width, handle),
                    Rect::new(parent.x, hit_top, parent.width, hit_bottom - hit_top),
                )
            }
        };
        DividerGeometry {
            node_id: split.node_id().clone(),
            index,
            orientation: split.orientation(),
            rect,
            hit_rect,
            span,
        }
    }
}

/// Smallest extent a subtree can take along the axis a split of `orientation` divides
pub fn min_extent(node: &Node, orientation: Orientation, handle: i32) -> i32 {
    match node {
        Node::Leaf(leaf) => leaf.constraints().min_along(orientation) as i32,
        Node::Split(split) => {
            let mins = split
                .children()
                .iter()
                .map(|child| min_extent(child, orientation, handle));
            if split.orientation() == orientation {
                let gaps = handle * (split.children().len() as i32 - 1).max(0);
                mins.sum::<i32>() + gaps
            } else {
                mins.max().unwrap_or(0)
            }
        }
    }
}

/// Floor each share; the last child absorbs the rounding remainder
pub fn proportional_sizes(available: i32, ratios: &[f64]) -> Vec<i32> {
    if ratios.is_empty() {
        return Vec::new();
    }
    let sum: f64 = ratios.iter().filter(|r| r.is_finite() && **r > 0.0).sum();
    let share = |r: f64| {
        if sum > 0.0 && r.is_finite() && r > 0.0 {
            r / sum
        } else if sum > 0.0 {
            0.0
        } else {
            1.0 / ratios.len() as f64
        }
    };

    let mut sizes = Vec::with_capacity(ratios.len());
    let mut used = 0;
    for ratio in &ratios[..ratios.len() - 1] {
        let size = ((available as f64 * share(*ratio)).floor() as i32).clamp(0, available - used);
        used += size;
        sizes.push(size);
    }
    sizes.push(available - used);
    sizes
}

/// Raise undersized children to their minimum, taking the deficit from
/// siblings in proportion to their slack. Assumes the minimums fit.
fn enforce_minimums(sizes: &mut [i32], mins: &[i32]) {
    let deficit: i32 = sizes
        .iter()
        .zip(mins)
        .map(|(size, min)| (min - size).max(0))
        .sum();
    if deficit == 0 {
        return;
    }
    for (size, min) in sizes.iter_mut().zip(mins) {
        *size = (*size).max(*min);
    }

    let slack: Vec<i32> = sizes.iter().zip(mins).map(|(s, m)| s - m).collect();
    let total_slack: i32 = slack.iter().sum();
    if total_slack <= 0 {
        return;
    }

    let mut remaining = deficit;
    for (size, s) in sizes.iter_mut().zip(&slack) {
        let take = ((deficit as i64 * *s as i64) / total_slack as i64) as i32;
        let take = take.min(*s).min(remaining);
        *size -= take;
        remaining -= take;
    }
    // Hand out what integer division left over, one pixel at a time
    while remaining > 0 {
        let mut progressed = false;
        for (size, min) in sizes.iter_mut().zip(mins) {
            if remaining == 0 {
                break;
            }
            if *size > *min {
                *size -= 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
}
