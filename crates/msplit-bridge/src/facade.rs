// ABOUTME: MultiSplit, the programmatic entry point tying the layout controller to a surface host.
// ABOUTME: Every operation runs through the controller, then one render pass updates the host.

use std::path::Path;

use msplit_core::{Config, NodeId, PaneId, Point, Rect, WidgetId};
use msplit_layout::{
    LayoutController, LayoutError, LayoutEvent, LayoutGeometry, NavDirection, RatioOverrides,
    Reconciler, SizeConstraints, SubscriptionId, WherePosition,
};

use crate::apply::GeometryApplier;
use crate::divider::{DividerLayer, DragEvent};
use crate::error::BridgeError;
use crate::host::{ContentProvider, SurfaceHost};
use crate::pool::WidgetPool;

pub struct MultiSplit<H, P>
where
    H: SurfaceHost,
    P: ContentProvider<Surface = H::Surface>,
{
    controller: LayoutController,
    host: H,
    provider: P,
    pool: WidgetPool<H::Surface>,
    applier: GeometryApplier,
    dividers: DividerLayer,
    reconciler: Reconciler,
    overrides: RatioOverrides,
}

impl<H, P> MultiSplit<H, P>
where
    H: SurfaceHost,
    P: ContentProvider<Surface = H::Surface>,
{
    pub fn new(config: &Config, host: H, provider: P) -> Self {
        Self {
            controller: LayoutController::new(config),
            host,
            provider,
            pool: WidgetPool::new(),
            applier: GeometryApplier::new(config.focus.show_indicator),
            dividers: DividerLayer::new(config.validation.min_resize_ratio),
            reconciler: Reconciler::new(),
            overrides: RatioOverrides::new(),
        }
    }

    pub fn controller(&self) -> &LayoutController {
        &self.controller
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Start over with a single pane showing `widget_id`
    pub fn initialize(&mut self, widget_id: WidgetId) -> Result<PaneId, BridgeError> {
        let pane_id = self.controller.initialize(widget_id)?;
        self.render();
        Ok(pane_id)
    }

    pub fn split(
        &mut self,
        target: &PaneId,
        widget_id: WidgetId,
        position: WherePosition,
        ratio: f64,
    ) -> Result<PaneId, BridgeError> {
        let result = self.controller.split(target, widget_id, position, ratio);
        self.finish(result)
    }

    pub fn split_focused(
        &mut self,
        widget_id: WidgetId,
        position: WherePosition,
        ratio: f64,
    ) -> Result<PaneId, BridgeError> {
        let target = self
            .controller
            .focused_pane()
            .cloned()
            .ok_or(BridgeError::NoFocusedPane)?;
        self.split(&target, widget_id, position, ratio)
    }

    pub fn remove(&mut self, pane_id: &PaneId) -> Result<(), BridgeError> {
        let result = self.controller.remove(pane_id);
        self.finish(result)
    }

    pub fn focus(&mut self, pane_id: &PaneId) -> Result<(), BridgeError> {
        let result = self.controller.focus(Some(pane_id));
        self.finish(result)
    }

    pub fn navigate(&mut self, direction: NavDirection) -> Result<Option<PaneId>, BridgeError> {
        let result = self.controller.navigate(direction);
        self.finish(result)
    }

    pub fn set_constraints(
        &mut self,
        pane_id: &PaneId,
        constraints: SizeConstraints,
    ) -> Result<(), BridgeError> {
        let result = self.controller.set_constraints(pane_id, constraints);
        self.finish(result)
    }

    pub fn set_ratios(&mut self, node_id: &NodeId, ratios: Vec<f64>) -> Result<(), BridgeError> {
        let result = self.controller.set_ratios(node_id, ratios);
        self.finish(result)
    }

    pub fn undo(&mut self) -> Result<(), BridgeError> {
        self.cancel_drag();
        let result = self.controller.undo();
        self.finish(result)
    }

    pub fn redo(&mut self) -> Result<(), BridgeError> {
        self.cancel_drag();
        let result = self.controller.redo();
        self.finish(result)
    }

    pub fn can_undo(&self) -> bool {
        self.controller.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.controller.can_redo()
    }

    /// Run several operations as one undo step; the host sees only the end result
    pub fn transaction<T, F>(&mut self, description: &str, f: F) -> Result<T, BridgeError>
    where
        F: FnOnce(&mut LayoutController) -> Result<T, LayoutError>,
    {
        let result = self.controller.transaction(description, f);
        self.finish(result)
    }

    pub fn save_to_string(&self) -> Result<String, BridgeError> {
        Ok(self.controller.save_to_string()?)
    }

    pub fn load_from_str(&mut self, json: &str) -> Result<(), BridgeError> {
        let result = self.controller.load_from_str(json);
        self.finish(result)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), BridgeError> {
        Ok(self.controller.save_to_path(path)?)
    }

    pub fn load_from_path(&mut self, path: &Path) -> Result<(), BridgeError> {
        let result = self.controller.load_from_path(path);
        self.finish(result)
    }

    pub fn pane_ids(&self) -> Vec<PaneId> {
        self.controller.pane_ids()
    }

    pub fn focused_pane(&self) -> Option<&PaneId> {
        self.controller.focused_pane()
    }

    /// The surface currently shown in a pane
    pub fn widget(&self, pane_id: &PaneId) -> Option<&H::Surface> {
        self.pool.get(pane_id)
    }

    /// Surfaces in pane order; panes still waiting for content are skipped
    pub fn all_widgets(&self) -> Vec<(PaneId, &H::Surface)> {
        self.controller
            .pane_ids()
            .into_iter()
            .filter_map(|id| {
                let surface = self.pool.get(&id)?;
                Some((id, surface))
            })
            .collect()
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.controller.set_viewport(viewport);
        self.render();
    }

    /// Geometry as currently shown, including any drag preview
    pub fn geometry(&self) -> LayoutGeometry {
        self.controller.geometry_with_overrides(&self.overrides)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&LayoutEvent) + 'static) -> SubscriptionId {
        self.controller.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.controller.unsubscribe(id)
    }

    /// Returns true when the press landed on a divider and was consumed.
    /// Presses on a pane focus it and are passed through to its content.
    pub fn pointer_down(&mut self, point: Point) -> Result<bool, BridgeError> {
        let geometry = self.geometry();
        match self
            .dividers
            .pointer_down(point, &geometry, self.controller.model())
        {
            DragEvent::Started(_) => Ok(true),
            _ => {
                let clicked = geometry.pane_at(point).cloned();
                if let Some(pane_id) = clicked {
                    if self.controller.focused_pane() != Some(&pane_id) {
                        self.focus(&pane_id)?;
                    }
                }
                Ok(false)
            }
        }
    }

    pub fn pointer_move(&mut self, point: Point) -> Result<bool, BridgeError> {
        match self.dividers.pointer_move(point) {
            DragEvent::Preview { node_id, ratios } => {
                self.overrides.insert(node_id, ratios);
                self.render();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn pointer_up(&mut self, point: Point) -> Result<bool, BridgeError> {
        match self.dividers.pointer_up(point) {
            DragEvent::Commit { node_id, ratios } => {
                self.overrides.clear();
                self.set_ratios(&node_id, ratios)?;
                Ok(true)
            }
            DragEvent::Released => {
                self.overrides.clear();
                self.render();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Abandon a drag in progress and drop any preview still shown
    pub fn cancel_drag(&mut self) -> bool {
        let was_dragging = self.dividers.cancel();
        if was_dragging || !self.overrides.is_empty() {
            self.overrides.clear();
            self.render();
        }
        was_dragging
    }

    pub fn is_dragging(&self) -> bool {
        self.dividers.is_dragging()
    }

    /// One full pass: reconcile surfaces, place them, sync dividers, then dispose
    pub fn render(&mut self) {
        let diff = self.reconciler.reconcile(self.controller.model().root());
        if !diff.is_empty() {
            tracing::debug!(
                "Reconciled: {} added, {} removed, {} moved, {} modified",
                diff.added.len(),
                diff.removed.len(),
                diff.moved.len(),
                diff.modified.len()
            );
        }
        self.pool.sync(
            &diff,
            self.controller.model(),
            &mut self.host,
            &mut self.provider,
        );

        let mut geometry = self.geometry();
        self.dividers.sync(&mut self.host, &geometry);
        if !self.dividers.is_dragging() && !self.overrides.is_empty() {
            // the dragged divider went away with its split; the preview goes too
            tracing::debug!("Dropping preview ratios of an abandoned drag");
            self.overrides.clear();
            geometry = self.geometry();
            self.dividers.sync(&mut self.host, &geometry);
        }
        for violation in &geometry.violations {
            tracing::warn!("Layout constraint violated: {:?}", violation);
        }
        self.applier.apply(
            &mut self.host,
            &self.pool,
            &geometry,
            self.controller.focused_pane(),
        );
        self.pool.flush_disposals(&mut self.host);
    }

    /// Render whether or not the operation succeeded, then report its outcome
    fn finish<T>(&mut self, result: Result<T, LayoutError>) -> Result<T, BridgeError> {
        self.render();
        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HostCall, RecordingHost, RecordingProvider};
    use std::cell::RefCell;
    use std::rc::Rc;

    type TestSplit = MultiSplit<RecordingHost, RecordingProvider>;

    fn multisplit() -> TestSplit {
        let mut ms = MultiSplit::new(
            &Config::default(),
            RecordingHost::default(),
            RecordingProvider::default(),
        );
        ms.set_viewport(Rect::new(0, 0, 1000, 800));
        ms
    }

    #[test]
    fn initialize_shows_one_surface_full_size() {
        let mut ms = multisplit();
        let a = ms.initialize(WidgetId::from("editor")).unwrap();
        assert_eq!(ms.widget(&a), Some(&1));
        assert!(ms
            .host()
            .calls
            .contains(&HostCall::SetGeometry(1, Rect::new(0, 0, 1000, 800))));
        assert_eq!(ms.host().calls.last(), Some(&HostCall::FocusIndicator(None)));
    }

    #[test]
    fn split_places_both_surfaces_and_a_divider() {
        let mut ms = multisplit();
        let a = ms.initialize(WidgetId::from("w1")).unwrap();
        ms.host_mut().take();
        let b = ms
            .split(&a, WidgetId::from("w2"), WherePosition::Right, 0.5)
            .unwrap();

        let calls = ms.host_mut().take();
        assert_eq!(calls.iter().filter(|c| matches!(c, HostCall::Attach(_))).count(), 1);
        assert!(calls.contains(&HostCall::SetGeometry(1, Rect::new(0, 0, 497, 800))));
        assert!(calls.contains(&HostCall::SetGeometry(2, Rect::new(503, 0, 497, 800))));
        assert!(calls.iter().any(|c| matches!(c, HostCall::CreateDivider(_))));
        assert_eq!(
            calls.last(),
            Some(&HostCall::FocusIndicator(Some(Rect::new(503, 0, 497, 800))))
        );
        assert_eq!(ms.focused_pane(), Some(&b));
        assert_eq!(ms.all_widgets(), vec![(a, &1), (b, &2)]);
    }

    #[test]
    fn remove_and_undo_recreate_surface() {
        let mut ms = multisplit();
        let a = ms.initialize(WidgetId::from("w1")).unwrap();
        let b = ms
            .split(&a, WidgetId::from("w2"), WherePosition::Bottom, 0.5)
            .unwrap();
        ms.remove(&b).unwrap();
        assert_eq!(ms.widget(&b), None);
        assert_eq!(ms.provider().closed.len(), 1);

        ms.undo().unwrap();
        assert_eq!(ms.widget(&b), Some(&3));
        assert_eq!(ms.pane_ids(), vec![a, b]);
    }

    #[test]
    fn drag_preview_leaves_tree_alone_until_release() {
        let mut ms = multisplit();
        let a = ms.initialize(WidgetId::from("w1")).unwrap();
        let b = ms
            .split(&a, WidgetId::from("w2"), WherePosition::Right, 0.5)
            .unwrap();
        let before = ms.controller().model().snapshot();

        assert!(ms.pointer_down(Point::new(500, 400)).unwrap());
        assert!(ms.pointer_move(Point::new(600, 400)).unwrap());
        assert_eq!(ms.controller().model().snapshot(), before);
        let preview = ms.geometry();
        assert!(preview.pane_rect(&a).unwrap().width > 590);

        assert!(ms.pointer_up(Point::new(600, 400)).unwrap());
        assert_ne!(ms.controller().model().snapshot(), before);
        assert_eq!(ms.geometry().pane_rect(&a), preview.pane_rect(&a));
        assert_eq!(ms.focused_pane(), Some(&b));

        ms.undo().unwrap();
        assert_eq!(ms.controller().model().snapshot(), before);
    }

    #[test]
    fn cancelled_drag_restores_committed_geometry() {
        let mut ms = multisplit();
        let a = ms.initialize(WidgetId::from("w1")).unwrap();
        ms.split(&a, WidgetId::from("w2"), WherePosition::Right, 0.5)
            .unwrap();
        let committed = ms.geometry();

        ms.pointer_down(Point::new(500, 400)).unwrap();
        ms.pointer_move(Point::new(300, 400)).unwrap();
        assert_ne!(ms.geometry(), committed);
        assert!(ms.cancel_drag());
        assert_eq!(ms.geometry(), committed);
        assert!(!ms.pointer_up(Point::new(300, 400)).unwrap());
        assert!(!ms.can_redo());
    }

    #[test]
    fn drag_abandoned_by_remove_leaves_no_preview_behind() {
        let mut ms = multisplit();
        let a = ms.initialize(WidgetId::from("w1")).unwrap();
        let b = ms
            .split(&a, WidgetId::from("w2"), WherePosition::Right, 0.5)
            .unwrap();
        let committed = ms.geometry();

        ms.pointer_down(Point::new(500, 400)).unwrap();
        ms.pointer_move(Point::new(700, 400)).unwrap();
        ms.remove(&b).unwrap();
        assert!(!ms.is_dragging());
        assert_eq!(ms.geometry(), ms.controller().geometry());

        ms.host_mut().take();
        ms.undo().unwrap();
        assert_eq!(ms.geometry(), committed);
        assert_eq!(ms.geometry(), ms.controller().geometry());
        assert!(ms
            .host_mut()
            .take()
            .contains(&HostCall::SetGeometry(1, Rect::new(0, 0, 497, 800))));
    }

    #[test]
    fn clicking_a_pane_focuses_it_and_passes_through() {
        let mut ms = multisplit();
        let a = ms.initialize(WidgetId::from("w1")).unwrap();
        ms.split(&a, WidgetId::from("w2"), WherePosition::Right, 0.5)
            .unwrap();
        assert!(!ms.pointer_down(Point::new(100, 100)).unwrap());
        assert_eq!(ms.focused_pane(), Some(&a));
    }

    #[test]
    fn failed_command_still_reports_error() {
        let mut ms = multisplit();
        ms.initialize(WidgetId::from("w1")).unwrap();
        let result = ms.remove(&PaneId::from("ghost"));
        assert!(matches!(
            result,
            Err(BridgeError::Layout(LayoutError::Validation(_)))
        ));
    }

    #[test]
    fn split_focused_needs_focus() {
        let mut ms = multisplit();
        assert!(matches!(
            ms.split_focused(WidgetId::from("w"), WherePosition::Right, 0.5),
            Err(BridgeError::NoFocusedPane)
        ));
        ms.initialize(WidgetId::from("w1")).unwrap();
        ms.split_focused(WidgetId::from("w2"), WherePosition::Bottom, 0.5)
            .unwrap();
        assert_eq!(ms.pane_ids().len(), 2);
    }

    #[test]
    fn transaction_renders_once_with_result() {
        let mut ms = multisplit();
        let a = ms.initialize(WidgetId::from("w1")).unwrap();
        ms.transaction("pair", |c| {
            c.split(&a, WidgetId::from("w2"), WherePosition::Right, 0.5)?;
            c.split(&a, WidgetId::from("w3"), WherePosition::Bottom, 0.5)
        })
        .unwrap();
        assert_eq!(ms.all_widgets().len(), 3);
        ms.undo().unwrap();
        assert_eq!(ms.all_widgets().len(), 1);
    }

    #[test]
    fn events_reach_subscribers() {
        let mut ms = multisplit();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        ms.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        let a = ms.initialize(WidgetId::from("w1")).unwrap();
        assert!(seen.borrow().contains(&LayoutEvent::PaneAdded(a)));
    }

    #[test]
    fn layout_survives_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        let mut ms = multisplit();
        let a = ms.initialize(WidgetId::from("w1")).unwrap();
        ms.split(&a, WidgetId::from("w2"), WherePosition::Top, 0.3)
            .unwrap();
        ms.save_to_path(&path).unwrap();

        let mut other = multisplit();
        other.load_from_path(&path).unwrap();
        assert_eq!(other.pane_ids(), ms.pane_ids());
        assert_eq!(other.all_widgets().len(), 2);
        assert_eq!(other.geometry().panes, ms.geometry().panes);
    }
}
