// ABOUTME: Pushes computed pane rectangles to the host's attached surfaces.
// ABOUTME: Absent panes are hidden, present ones placed and raised in order, focus indicator last.

use std::collections::HashSet;

use msplit_core::PaneId;
use msplit_layout::LayoutGeometry;

use crate::host::SurfaceHost;
use crate::pool::WidgetPool;

#[derive(Debug)]
pub struct GeometryApplier {
    show_focus_indicator: bool,
    visible: HashSet<PaneId>,
}

impl GeometryApplier {
    pub fn new(show_focus_indicator: bool) -> Self {
        Self {
            show_focus_indicator,
            visible: HashSet::new(),
        }
    }

    pub fn is_visible(&self, pane_id: &PaneId) -> bool {
        self.visible.contains(pane_id)
    }

    pub fn apply<H>(
        &mut self,
        host: &mut H,
        pool: &WidgetPool<H::Surface>,
        geometry: &LayoutGeometry,
        focused: Option<&PaneId>,
    ) where
        H: SurfaceHost,
    {
        self.visible.retain(|id| pool.contains(id));

        let mut absent: Vec<&PaneId> = pool
            .pane_ids()
            .filter(|id| geometry.pane_rect(id).is_none())
            .collect();
        absent.sort();
        for pane_id in absent {
            if self.visible.remove(pane_id) {
                if let Some(surface) = pool.get(pane_id) {
                    host.hide(surface);
                }
            }
        }

        for (pane_id, rect) in &geometry.panes {
            let Some(surface) = pool.get(pane_id) else {
                continue;
            };
            host.set_geometry(surface, *rect);
            host.show(surface);
            host.raise(surface);
            self.visible.insert(pane_id.clone());
        }

        let indicator = focused
            .filter(|_| self.show_focus_indicator && geometry.panes.len() > 1)
            .and_then(|id| geometry.pane_rect(id));
        host.set_focus_indicator(indicator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HostCall, RecordingHost, RecordingProvider};
    use msplit_core::{Rect, WidgetId};

    fn geometry(panes: &[(&str, Rect)]) -> LayoutGeometry {
        LayoutGeometry {
            panes: panes
                .iter()
                .map(|(id, rect)| (PaneId::from(*id), *rect))
                .collect(),
            ..LayoutGeometry::default()
        }
    }

    fn pool_with(names: &[&str], host: &mut RecordingHost) -> WidgetPool<u32> {
        let mut provider = RecordingProvider::default();
        let mut pool = WidgetPool::new();
        for name in names {
            pool.ensure(&PaneId::from(*name), &WidgetId::from(*name), host, &mut provider);
        }
        host.take();
        pool
    }

    #[test]
    fn places_then_raises_in_geometry_order_with_focus_last() {
        let mut host = RecordingHost::default();
        let pool = pool_with(&["a", "b"], &mut host);
        let left = Rect::new(0, 0, 497, 800);
        let right = Rect::new(503, 0, 497, 800);
        let mut applier = GeometryApplier::new(true);
        applier.apply(
            &mut host,
            &pool,
            &geometry(&[("a", left), ("b", right)]),
            Some(&PaneId::from("b")),
        );
        assert_eq!(
            host.take(),
            vec![
                HostCall::SetGeometry(1, left),
                HostCall::Show(1),
                HostCall::Raise(1),
                HostCall::SetGeometry(2, right),
                HostCall::Show(2),
                HostCall::Raise(2),
                HostCall::FocusIndicator(Some(right)),
            ]
        );
    }

    #[test]
    fn absent_surfaces_are_hidden_once() {
        let mut host = RecordingHost::default();
        let pool = pool_with(&["a", "b"], &mut host);
        let full = Rect::new(0, 0, 100, 100);
        let mut applier = GeometryApplier::new(false);
        applier.apply(
            &mut host,
            &pool,
            &geometry(&[("a", full), ("b", full)]),
            None,
        );
        host.take();

        applier.apply(&mut host, &pool, &geometry(&[("a", full)]), None);
        assert_eq!(host.count(|c| *c == HostCall::Hide(2)), 1);
        assert!(!applier.is_visible(&PaneId::from("b")));
        host.take();

        applier.apply(&mut host, &pool, &geometry(&[("a", full)]), None);
        assert_eq!(host.count(|c| matches!(c, HostCall::Hide(_))), 0);
    }

    #[test]
    fn single_pane_has_no_focus_indicator() {
        let mut host = RecordingHost::default();
        let pool = pool_with(&["a"], &mut host);
        let mut applier = GeometryApplier::new(true);
        applier.apply(
            &mut host,
            &pool,
            &geometry(&[("a", Rect::new(0, 0, 10, 10))]),
            Some(&PaneId::from("a")),
        );
        assert_eq!(host.calls.last(), Some(&HostCall::FocusIndicator(None)));
    }
}
