// ABOUTME: Divider regions and the drag state machine for resizing splits with the pointer.
// ABOUTME: Dragging only produces preview ratios; the tree changes once, on release.

use std::collections::BTreeMap;

use msplit_core::{NodeId, Point};
use msplit_layout::{DividerGeometry, LayoutGeometry, Orientation, TreeModel};

use crate::host::{DividerKey, SurfaceHost};

/// What a pointer event meant to the divider layer
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    /// Not ours; the host should deliver it to pane content
    PassThrough,
    Started(DividerKey),
    /// Ratios to show while dragging; the tree is untouched
    Preview { node_id: NodeId, ratios: Vec<f64> },
    /// Ratios to write into the tree
    Commit { node_id: NodeId, ratios: Vec<f64> },
    /// Released where it started
    Released,
}

#[derive(Debug)]
struct Drag {
    key: DividerKey,
    orientation: Orientation,
    origin: Point,
    start: Vec<f64>,
    span: i32,
}

impl Drag {
    fn ratios_at(&self, point: Point, min_ratio: f64) -> Vec<f64> {
        let mut ratios = self.start.clone();
        let i = self.key.index;
        if self.span <= 0 || i + 1 >= ratios.len() {
            return ratios;
        }
        let delta = match self.orientation {
            Orientation::Horizontal => point.x - self.origin.x,
            Orientation::Vertical => point.y - self.origin.y,
        };
        let pair = self.start[i] + self.start[i + 1];
        let lo = min_ratio.min(pair / 2.0);
        let first = (self.start[i] + delta as f64 / self.span as f64).clamp(lo, pair - lo);
        ratios[i] = first;
        ratios[i + 1] = (pair - first).max(lo);
        ratios
    }
}

#[derive(Debug)]
pub struct DividerLayer {
    regions: BTreeMap<DividerKey, DividerGeometry>,
    drag: Option<Drag>,
    min_ratio: f64,
}

impl DividerLayer {
    /// `min_ratio` is the smallest share a drag may leave either neighbour
    pub fn new(min_ratio: f64) -> Self {
        Self {
            regions: BTreeMap::new(),
            drag: None,
            min_ratio,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn dragged(&self) -> Option<&DividerKey> {
        self.drag.as_ref().map(|d| &d.key)
    }

    pub fn regions(&self) -> impl Iterator<Item = &DividerKey> {
        self.regions.keys()
    }

    /// Create, update, or destroy host divider regions to match the geometry
    pub fn sync<H: SurfaceHost>(&mut self, host: &mut H, geometry: &LayoutGeometry) {
        let mut next = BTreeMap::new();
        for divider in geometry.all_dividers() {
            let key = DividerKey::of(divider);
            match self.regions.get(&key) {
                None => host.create_divider(&key, divider),
                Some(previous) if previous != divider => host.update_divider(&key, divider),
                Some(_) => {}
            }
            next.insert(key, divider.clone());
        }
        for key in self.regions.keys() {
            if !next.contains_key(key) {
                host.destroy_divider(key);
            }
        }
        if self.drag.as_ref().is_some_and(|d| !next.contains_key(&d.key)) {
            tracing::debug!("Dragged divider disappeared, dropping drag");
            self.drag = None;
        }
        self.regions = next;
    }

    pub fn pointer_down(&mut self, point: Point, geometry: &LayoutGeometry, model: &TreeModel) -> DragEvent {
        let Some(divider) = geometry.hit_test_divider(point) else {
            return DragEvent::PassThrough;
        };
        let Some(split) = model.find_split(&divider.node_id) else {
            return DragEvent::PassThrough;
        };
        let key = DividerKey::of(divider);
        tracing::debug!("Drag start on {}:{}", key.node_id, key.index);
        self.drag = Some(Drag {
            key: key.clone(),
            orientation: divider.orientation,
            origin: point,
            start: split.ratios().to_vec(),
            span: divider.span,
        });
        DragEvent::Started(key)
    }

    pub fn pointer_move(&mut self, point: Point) -> DragEvent {
        match &self.drag {
            Some(drag) => DragEvent::Preview {
                node_id: drag.key.node_id.clone(),
                ratios: drag.ratios_at(point, self.min_ratio),
            },
            None => DragEvent::PassThrough,
        }
    }

    pub fn pointer_up(&mut self, point: Point) -> DragEvent {
        let Some(drag) = self.drag.take() else {
            return DragEvent::PassThrough;
        };
        let ratios = drag.ratios_at(point, self.min_ratio);
        if ratios == drag.start {
            return DragEvent::Released;
        }
        DragEvent::Commit {
            node_id: drag.key.node_id,
            ratios,
        }
    }

    /// Abandon a drag without committing; returns whether one was active
    pub fn cancel(&mut self) -> bool {
        self.drag.take().is_some()
    }
}
