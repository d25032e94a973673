// ABOUTME: Keyboard focus navigation: tab order (next/previous) and spatial moves.
// ABOUTME: Spatial moves pick the nearest pane on the requested side using computed geometry.

use std::str::FromStr;

use msplit_core::{PaneId, Rect};

use crate::geometry::LayoutGeometry;
use crate::model::TreeModel;

/// Gaps within this many pixels of the best candidate are ties
const GAP_TOLERANCE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavDirection {
    Left,
    Right,
    Up,
    Down,
    Next,
    Previous,
}

impl NavDirection {
    pub fn is_spatial(self) -> bool {
        !matches!(self, NavDirection::Next | NavDirection::Previous)
    }
}

impl FromStr for NavDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(NavDirection::Left),
            "right" => Ok(NavDirection::Right),
            "up" => Ok(NavDirection::Up),
            "down" => Ok(NavDirection::Down),
            "next" => Ok(NavDirection::Next),
            "previous" | "prev" => Ok(NavDirection::Previous),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct FocusNavigator {
    tab_order: Option<Vec<PaneId>>,
}

impl FocusNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached tab order; call after any structural change
    pub fn invalidate(&mut self) {
        self.tab_order = None;
    }

    pub fn tab_order(&mut self, model: &TreeModel) -> &[PaneId] {
        self.tab_order
            .get_or_insert_with(|| model.get_all_pane_ids())
    }

    /// Following pane in tab order, wrapping at the end
    pub fn next(&mut self, model: &TreeModel, current: Option<&PaneId>) -> Option<PaneId> {
        let order = self.tab_order(model);
        match current.and_then(|id| order.iter().position(|p| p == id)) {
            Some(index) => order.get((index + 1) % order.len()).cloned(),
            None => order.first().cloned(),
        }
    }

    /// Preceding pane in tab order, wrapping at the start
    pub fn previous(&mut self, model: &TreeModel, current: Option<&PaneId>) -> Option<PaneId> {
        let order = self.tab_order(model);
        match current.and_then(|id| order.iter().position(|p| p == id)) {
            Some(index) => order.get((index + order.len() - 1) % order.len()).cloned(),
            None => order.last().cloned(),
        }
    }

    /// Nearest pane on the given side of `current`. Never wraps.
    pub fn spatial(
        &self,
        current: &PaneId,
        direction: NavDirection,
        geometry: &LayoutGeometry,
    ) -> Option<PaneId> {
        let from = geometry.pane_rect(current)?;
        let candidates: Vec<(&PaneId, i32, f64)> = geometry
            .panes
            .iter()
            .filter(|(id, _)| id != current)
            .filter_map(|(id, rect)| {
                let gap = edge_gap(&from, rect, direction)?;
                Some((id, gap, center_distance(&from, rect)))
            })
            .collect();

        let best_gap = candidates.iter().map(|(_, gap, _)| *gap).min()?;
        candidates
            .into_iter()
            .filter(|(_, gap, _)| *gap - best_gap <= GAP_TOLERANCE)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(id, _, _)| id.clone())
    }

    /// Resolve any direction: tab order for Next/Previous, geometry otherwise
    pub fn resolve(
        &mut self,
        model: &TreeModel,
        geometry: &LayoutGeometry,
        direction: NavDirection,
    ) -> Option<PaneId> {
        let current = model.focused_pane();
        match direction {
            NavDirection::Next => self.next(model, current),
            NavDirection::Previous => self.previous(model, current),
            _ => match current {
                Some(current) => self.spatial(current, direction, geometry),
                None => self.tab_order(model).first().cloned(),
            },
        }
    }
}

/// Distance from `from` to `to` on the requested side, or None if `to`
/// is not strictly on that side or does not overlap on the other axis
fn edge_gap(from: &Rect, to: &Rect, direction: NavDirection) -> Option<i32> {
    let overlaps_vertically = to.y < from.bottom() && to.bottom() > from.y;
    let overlaps_horizontally = to.x < from.right() && to.right() > from.x;
    match direction {
        NavDirection::Right if to.x >= from.right() && overlaps_vertically => {
            Some(to.x - from.right())
        }
        NavDirection::Left if to.right() <= from.x && overlaps_vertically => {
            Some(from.x - to.right())
        }
        NavDirection::Down if to.y >= from.bottom() && overlaps_horizontally => {
            Some(to.y - from.bottom())
        }
        NavDirection::Up if to.bottom() <= from.y && overlaps_horizontally => {
            Some(from.y - to.bottom())
        }
        _ => None,
    }
}

fn center_distance(a: &Rect, b: &Rect) -> f64 {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    (ax - bx).hypot(ay - by)
}
