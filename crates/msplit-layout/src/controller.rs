// ABOUTME: Layout controller: validates and runs commands, owns undo history and transactions.
// ABOUTME: Dispatches the model's queued events to subscribers after every operation.

use std::path::Path;

use msplit_core::{Config, NodeId, PaneId, Rect, WidgetId};
use serde_json::Value;

use crate::command::{
    Command, CompositeCommand, FocusCommand, NavigateFocusCommand, RemoveCommand,
    ReplaceTreeCommand, SetConstraintsCommand, SetRatiosCommand, SplitCommand, WherePosition,
};
use crate::document::LayoutDocument;
use crate::error::{LayoutError, SerializationError};
use crate::events::{EventBus, LayoutEvent, SubscriptionId};
use crate::focus::{FocusNavigator, NavDirection};
use crate::geometry::{GeometryEngine, LayoutGeometry, RatioOverrides};
use crate::history::History;
use crate::model::{Snapshot, TreeModel};
use crate::node::{LeafNode, Node, SizeConstraints};
use crate::validation::Validator;

#[derive(Debug)]
struct Transaction {
    description: String,
    savepoint: Snapshot,
    commands: Vec<Box<dyn Command>>,
    /// Number of open begins; nested begins join this transaction
    depth: usize,
}

#[derive(Debug)]
pub struct LayoutController {
    model: TreeModel,
    validator: Validator,
    geometry: GeometryEngine,
    navigator: FocusNavigator,
    history: History,
    transaction: Option<Transaction>,
    events: EventBus,
    viewport: Rect,
}

impl Default for LayoutController {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl LayoutController {
    pub fn new(config: &Config) -> Self {
        Self {
            model: TreeModel::new(),
            validator: Validator::new(config.validation),
            geometry: GeometryEngine::new(config.geometry),
            navigator: FocusNavigator::new(),
            history: History::new(config.history.max_undo_levels),
            transaction: None,
            events: EventBus::new(),
            viewport: Rect::new(
                0,
                0,
                config.viewport_width as i32,
                config.viewport_height as i32,
            ),
        }
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn geometry_engine(&self) -> &GeometryEngine {
        &self.geometry
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Current layout at the current viewport
    pub fn geometry(&self) -> LayoutGeometry {
        self.geometry.compute(self.model.root(), self.viewport)
    }

    pub fn geometry_with_overrides(&self, overrides: &RatioOverrides) -> LayoutGeometry {
        self.geometry
            .compute_with_overrides(self.model.root(), self.viewport, overrides)
    }

    pub fn pane_ids(&self) -> Vec<PaneId> {
        self.model.get_all_pane_ids()
    }

    pub fn focused_pane(&self) -> Option<&PaneId> {
        self.model.focused_pane()
    }

    /// Validate, execute, and record a command. Rejected commands emit
    /// `ValidationFailed` and leave the tree untouched.
    pub fn execute(&mut self, mut command: Box<dyn Command>) -> Result<(), LayoutError> {
        let report = command.validate(&self.model, &self.validator);
        for warning in &report.warnings {
            tracing::warn!("{}: {}", command.description(), warning);
        }
        if !report.is_ok() {
            tracing::warn!(
                "Rejected {}: {}",
                command.description(),
                report.errors.join("; ")
            );
            self.model
                .emit(LayoutEvent::ValidationFailed(report.errors.clone()));
            self.flush_events();
            return Err(LayoutError::Validation(report.errors));
        }

        if let Err(e) = command.execute(&mut self.model) {
            tracing::warn!("{} failed: {}", command.description(), e);
            self.flush_events();
            return Err(e);
        }
        tracing::debug!("Executed {}", command.description());

        if let Some(transaction) = self.transaction.as_mut() {
            transaction.commands.push(command);
        } else if !command.is_transient() {
            self.history.record(command);
            self.queue_history();
        }
        self.flush_events();
        Ok(())
    }

    /// Replace the tree with a single pane showing `widget_id`; clears history
    pub fn initialize(&mut self, widget_id: WidgetId) -> Result<PaneId, LayoutError> {
        if self.transaction.is_some() {
            return Err(LayoutError::TransactionInProgress("initialize"));
        }
        let pane_id = PaneId::generate();
        let leaf = Node::Leaf(LeafNode::new(pane_id.clone(), widget_id));
        let mut command = ReplaceTreeCommand::new(
            "Initialize",
            Snapshot::new(Some(leaf), Some(pane_id.clone())),
        );
        command.execute(&mut self.model)?;
        self.history.clear();
        self.queue_history();
        self.flush_events();
        tracing::info!("Initialized layout with pane {}", pane_id);
        Ok(pane_id)
    }

    /// Split `target`; returns the pane now showing `widget_id`
    pub fn split(
        &mut self,
        target: &PaneId,
        widget_id: WidgetId,
        position: WherePosition,
        ratio: f64,
    ) -> Result<PaneId, LayoutError> {
        let command = SplitCommand::new(target.clone(), widget_id, position, ratio);
        let pane_id = command.new_pane_id().clone();
        self.execute(Box::new(command))?;
        Ok(pane_id)
    }

    pub fn remove(&mut self, pane_id: &PaneId) -> Result<(), LayoutError> {
        self.execute(Box::new(RemoveCommand::new(pane_id.clone())))
    }

    pub fn set_ratios(&mut self, node_id: &NodeId, ratios: Vec<f64>) -> Result<(), LayoutError> {
        self.execute(Box::new(SetRatiosCommand::new(node_id.clone(), ratios)))
    }

    pub fn set_constraints(
        &mut self,
        pane_id: &PaneId,
        constraints: SizeConstraints,
    ) -> Result<(), LayoutError> {
        self.execute(Box::new(SetConstraintsCommand::new(
            pane_id.clone(),
            constraints,
        )))
    }

    pub fn focus(&mut self, pane_id: Option<&PaneId>) -> Result<(), LayoutError> {
        self.execute(Box::new(FocusCommand::new(pane_id.cloned())))
    }

    /// Move focus; `Ok(None)` when there is nothing in that direction
    pub fn navigate(&mut self, direction: NavDirection) -> Result<Option<PaneId>, LayoutError> {
        let geometry = self.geometry();
        let Some(target) = self
            .navigator
            .resolve(&self.model, &geometry, direction)
        else {
            return Ok(None);
        };
        self.execute(Box::new(NavigateFocusCommand::new(direction, target.clone())))?;
        Ok(Some(target))
    }

    pub fn undo(&mut self) -> Result<(), LayoutError> {
        if self.transaction.is_some() {
            return Err(LayoutError::TransactionInProgress("undo"));
        }
        let mut command = self.history.pop_undo().ok_or(LayoutError::NothingToUndo)?;
        if let Err(e) = command.undo(&mut self.model) {
            tracing::error!("Undo of {} failed: {}", command.description(), e);
            self.queue_history();
            self.flush_events();
            return Err(e);
        }
        tracing::debug!("Undid {}", command.description());
        self.history.push_redo(command);
        self.queue_history();
        self.flush_events();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), LayoutError> {
        if self.transaction.is_some() {
            return Err(LayoutError::TransactionInProgress("redo"));
        }
        let mut command = self.history.pop_redo().ok_or(LayoutError::NothingToRedo)?;
        if let Err(e) = command.execute(&mut self.model) {
            tracing::error!("Redo of {} failed: {}", command.description(), e);
            self.queue_history();
            self.flush_events();
            return Err(e);
        }
        tracing::debug!("Redid {}", command.description());
        self.history.push_redone(command);
        self.queue_history();
        self.flush_events();
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<String> {
        self.history.redo_description()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.queue_history();
        self.flush_events();
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    pub fn begin_transaction(&mut self, description: impl Into<String>) {
        match self.transaction.as_mut() {
            Some(transaction) => transaction.depth += 1,
            None => {
                let description = description.into();
                tracing::debug!("Begin transaction '{}'", description);
                self.transaction = Some(Transaction {
                    description,
                    savepoint: self.model.snapshot(),
                    commands: Vec::new(),
                    depth: 1,
                });
            }
        }
    }

    /// Close one begin; the outermost commit records a single undo unit
    pub fn commit_transaction(&mut self) -> Result<(), LayoutError> {
        let transaction = self.transaction.as_mut().ok_or(LayoutError::NoTransaction)?;
        if transaction.depth > 1 {
            transaction.depth -= 1;
            return Ok(());
        }
        let Some(transaction) = self.transaction.take() else {
            return Err(LayoutError::NoTransaction);
        };
        tracing::debug!(
            "Commit transaction '{}' ({} commands)",
            transaction.description,
            transaction.commands.len()
        );
        if transaction.commands.is_empty() {
            return Ok(());
        }
        let composite = CompositeCommand::new(transaction.description, transaction.commands);
        if !composite.is_transient() {
            self.history.record(Box::new(composite));
            self.queue_history();
        }
        self.flush_events();
        Ok(())
    }

    /// Abandon the whole transaction, including any joined nested begins
    pub fn rollback_transaction(&mut self) -> Result<(), LayoutError> {
        let mut transaction = self.transaction.take().ok_or(LayoutError::NoTransaction)?;
        tracing::info!("Rolling back transaction '{}'", transaction.description);
        for command in transaction.commands.iter_mut().rev() {
            if let Err(e) = command.undo(&mut self.model) {
                tracing::error!("Failed to undo {}: {}", command.description(), e);
            }
        }
        if self.model.snapshot() != transaction.savepoint {
            self.model.restore(transaction.savepoint);
        }
        self.flush_events();
        Ok(())
    }

    /// Run `f` inside a transaction: committed on success, rolled back on error.
    /// The closure's own error is returned unchanged.
    pub fn transaction<T, F>(&mut self, description: &str, f: F) -> Result<T, LayoutError>
    where
        F: FnOnce(&mut Self) -> Result<T, LayoutError>,
    {
        self.begin_transaction(description);
        match f(self) {
            Ok(value) => {
                if self.transaction.is_none() {
                    return Err(LayoutError::TransactionRolledBack(description.to_string()));
                }
                self.commit_transaction()?;
                Ok(value)
            }
            Err(e) => {
                if self.transaction.is_some() {
                    self.rollback_transaction()?;
                }
                Err(e)
            }
        }
    }

    pub fn to_document(&self) -> LayoutDocument {
        LayoutDocument::from_model(&self.model)
    }

    pub fn save_to_value(&self) -> Result<Value, LayoutError> {
        Ok(self.model.to_dict()?)
    }

    pub fn save_to_string(&self) -> Result<String, LayoutError> {
        Ok(self.to_document().to_json()?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), LayoutError> {
        self.to_document().save(path)?;
        tracing::info!("Saved layout to {:?}", path);
        Ok(())
    }

    /// Replace the tree with a loaded document. Undoable.
    pub fn load_document(&mut self, document: LayoutDocument) -> Result<(), LayoutError> {
        let command = ReplaceTreeCommand::new("Load layout", document.into_snapshot());
        match self.execute(Box::new(command)) {
            Err(LayoutError::Validation(errors)) => {
                Err(SerializationError::InvalidTree(errors).into())
            }
            other => other,
        }
    }

    pub fn load_from_value(&mut self, value: &Value) -> Result<(), LayoutError> {
        self.load_document(LayoutDocument::from_value(value.clone())?)
    }

    pub fn load_from_str(&mut self, json: &str) -> Result<(), LayoutError> {
        self.load_document(LayoutDocument::from_json(json)?)
    }

    pub fn load_from_path(&mut self, path: &Path) -> Result<(), LayoutError> {
        let document = LayoutDocument::load(path)?;
        self.load_document(document)?;
        tracing::info!("Loaded layout from {:?}", path);
        Ok(())
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&LayoutEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn queue_history(&mut self) {
        self.model.emit(LayoutEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn flush_events(&mut self) {
        for event in self.model.take_events() {
            if event == LayoutEvent::StructureChanged {
                self.navigator.invalidate();
            }
            self.events.emit(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Orientation, SplitNode};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(controller: &mut LayoutController) -> Rc<RefCell<Vec<LayoutEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        controller.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        seen
    }

    fn fixed_split(
        controller: &mut LayoutController,
        target: &PaneId,
        position: WherePosition,
        name: &str,
    ) -> PaneId {
        let command = SplitCommand::new(target.clone(), WidgetId::from(name), position, 0.5)
            .with_pane_id(PaneId::from(name));
        controller.execute(Box::new(command)).unwrap();
        PaneId::from(name)
    }

    fn with_panes(names: &[&str]) -> LayoutController {
        let mut controller = LayoutController::default();
        let leaves = names.iter().map(|n| Node::leaf(*n, *n)).collect();
        let root = Node::Split(SplitNode::with_id(
            NodeId::from("s"),
            Orientation::Horizontal,
            leaves,
            vec![1.0 / names.len() as f64; names.len()],
        ));
        let json = serde_json::json!({
            "version": "1.0.0",
            "focused_pane_id": names[0],
            "root": root,
        });
        controller.load_from_value(&json).unwrap();
        controller.clear_history();
        controller
    }

    #[test]
    fn split_right_at_thousand_pixels() {
        let mut controller = LayoutController::default();
        controller.set_viewport(Rect::new(0, 0, 1000, 800));
        let a = controller.initialize(WidgetId::from("w1")).unwrap();
        let b = controller
            .split(&a, WidgetId::from("w2"), WherePosition::Right, 0.5)
            .unwrap();

        let geometry = controller.geometry();
        assert_eq!(geometry.pane_rect(&a), Some(Rect::new(0, 0, 497, 800)));
        assert_eq!(geometry.pane_rect(&b), Some(Rect::new(503, 0, 497, 800)));
        let divider = geometry.all_dividers().next().unwrap();
        assert_eq!(divider.rect, Rect::new(497, 0, 6, 800));
        assert_eq!(controller.focused_pane(), Some(&b));
    }

    #[test]
    fn remove_middle_of_three() {
        let mut controller = with_panes(&["a", "b", "c"]);
        controller.remove(&PaneId::from("b")).unwrap();
        let split = controller.model().find_split(&NodeId::from("s")).unwrap();
        assert_eq!(split.children().len(), 2);
        assert!((split.ratios().iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!((split.ratios()[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn navigate_right_twice() {
        let mut controller = with_panes(&["a", "b"]);
        assert_eq!(
            controller.navigate(NavDirection::Right).unwrap(),
            Some(PaneId::from("b"))
        );
        assert_eq!(controller.navigate(NavDirection::Right).unwrap(), None);
        assert_eq!(controller.focused_pane(), Some(&PaneId::from("b")));
        // focus moves are not undo entries
        assert!(!controller.can_undo());
    }

    #[test]
    fn invalid_ratios_are_rejected_and_reported() {
        let mut controller = with_panes(&["a", "b"]);
        let events = record(&mut controller);
        let before = controller.model().snapshot();

        let result = controller.set_ratios(&NodeId::from("s"), vec![0.6, 0.6]);
        assert!(matches!(result, Err(LayoutError::Validation(_))));
        assert_eq!(controller.model().snapshot(), before);
        assert!(matches!(
            events.borrow().as_slice(),
            [LayoutEvent::ValidationFailed(_)]
        ));
        assert!(!controller.can_undo());
    }

    #[test]
    fn undo_redo_split() {
        let mut controller = LayoutController::default();
        let a = controller.initialize(WidgetId::from("w1")).unwrap();
        let initial = controller.model().snapshot();
        let b = controller
            .split(&a, WidgetId::from("w2"), WherePosition::Bottom, 0.3)
            .unwrap();
        let after = controller.model().snapshot();

        controller.undo().unwrap();
        assert_eq!(controller.model().snapshot(), initial);
        assert!(controller.can_redo());
        controller.redo().unwrap();
        assert_eq!(controller.model().snapshot(), after);
        assert!(controller.model().contains_pane(&b));
        assert!(matches!(controller.redo(), Err(LayoutError::NothingToRedo)));
    }

    #[test]
    fn split_cannot_reuse_an_existing_pane_id() {
        let mut controller = with_panes(&["a", "b"]);
        let before = controller.model().snapshot();
        let a = PaneId::from("a");
        let split = SplitCommand::new(a.clone(), WidgetId::from("x"), WherePosition::Right, 0.5)
            .with_pane_id(a.clone());

        assert!(matches!(
            controller.execute(Box::new(split)),
            Err(LayoutError::Validation(_))
        ));
        assert_eq!(controller.model().snapshot(), before);
        assert!(controller.model().validate().0);
        assert_eq!(controller.pane_ids(), vec![a, PaneId::from("b")]);
    }

    #[test]
    fn focus_moves_keep_the_redo_stack() {
        let mut controller = with_panes(&["a", "b"]);
        controller.remove(&PaneId::from("b")).unwrap();
        controller.undo().unwrap();
        controller.focus(Some(&PaneId::from("b"))).unwrap();
        controller.navigate(NavDirection::Left).unwrap();
        assert!(controller.can_redo());
        controller.redo().unwrap();
        assert_eq!(controller.pane_ids(), vec![PaneId::from("a")]);
    }

    #[test]
    fn events_are_dispatched_in_order() {
        let mut controller = LayoutController::default();
        let a = controller.initialize(WidgetId::from("w1")).unwrap();
        let events = record(&mut controller);
        let b = fixed_split(&mut controller, &a, WherePosition::Right, "b");

        assert_eq!(
            *events.borrow(),
            vec![
                LayoutEvent::PaneAdded(b.clone()),
                LayoutEvent::StructureChanged,
                LayoutEvent::FocusChanged {
                    old: Some(a.clone()),
                    new: Some(b.clone()),
                },
                LayoutEvent::HistoryChanged {
                    can_undo: true,
                    can_redo: false,
                },
            ]
        );
    }

    #[test]
    fn unsubscribed_listeners_stop_receiving() {
        let mut controller = LayoutController::default();
        let seen = Rc::new(RefCell::new(0));
        let sink = seen.clone();
        let id = controller.subscribe(move |_| *sink.borrow_mut() += 1);
        controller.initialize(WidgetId::from("w")).unwrap();
        let count = *seen.borrow();
        assert!(count > 0);

        assert!(controller.unsubscribe(id));
        assert!(!controller.unsubscribe(id));
        controller.initialize(WidgetId::from("w")).unwrap();
        assert_eq!(*seen.borrow(), count);
    }

    #[test]
    fn history_is_capped() {
        let mut config = Config::default();
        config.history.max_undo_levels = 2;
        let mut controller = LayoutController::new(&config);
        let a = controller.initialize(WidgetId::from("w")).unwrap();
        for name in ["b", "c", "d"] {
            fixed_split(&mut controller, &a, WherePosition::Right, name);
        }
        controller.undo().unwrap();
        controller.undo().unwrap();
        assert!(matches!(controller.undo(), Err(LayoutError::NothingToUndo)));
        assert_eq!(controller.pane_ids().len(), 2);
    }

    #[test]
    fn committed_transaction_is_one_undo_step() {
        let mut controller = LayoutController::default();
        let a = controller.initialize(WidgetId::from("w")).unwrap();
        let initial = controller.model().snapshot();

        controller
            .transaction("grid", |c| {
                let b = c.split(&a, WidgetId::from("w"), WherePosition::Right, 0.5)?;
                c.split(&a, WidgetId::from("w"), WherePosition::Bottom, 0.5)?;
                c.split(&b, WidgetId::from("w"), WherePosition::Bottom, 0.5)?;
                Ok(())
            })
            .unwrap();
        assert_eq!(controller.pane_ids().len(), 4);
        assert_eq!(controller.undo_description().as_deref(), Some("grid"));

        controller.undo().unwrap();
        assert_eq!(controller.model().snapshot(), initial);
        assert!(!controller.can_undo());
    }

    #[test]
    fn failed_transaction_rolls_back_and_returns_original_error() {
        let mut controller = LayoutController::default();
        let a = controller.initialize(WidgetId::from("w")).unwrap();
        let initial = controller.model().snapshot();

        let result = controller.transaction("broken", |c| {
            c.split(&a, WidgetId::from("w"), WherePosition::Right, 0.5)?;
            c.remove(&PaneId::from("missing"))
        });
        assert!(matches!(result, Err(LayoutError::Validation(_))));
        assert!(!controller.in_transaction());
        assert_eq!(controller.model().snapshot(), initial);
        assert!(!controller.can_undo());
    }

    #[test]
    fn nested_transactions_join_the_outer_one() {
        let mut controller = LayoutController::default();
        let a = controller.initialize(WidgetId::from("w")).unwrap();

        controller.begin_transaction("outer");
        controller.begin_transaction("inner");
        controller
            .split(&a, WidgetId::from("w"), WherePosition::Right, 0.5)
            .unwrap();
        controller.commit_transaction().unwrap();
        assert!(controller.in_transaction());
        assert!(matches!(
            controller.undo(),
            Err(LayoutError::TransactionInProgress(_))
        ));
        controller
            .split(&a, WidgetId::from("w"), WherePosition::Top, 0.5)
            .unwrap();
        controller.commit_transaction().unwrap();

        assert_eq!(controller.undo_description().as_deref(), Some("outer"));
        controller.undo().unwrap();
        assert_eq!(controller.pane_ids(), vec![a]);
        assert!(matches!(
            controller.commit_transaction(),
            Err(LayoutError::NoTransaction)
        ));
    }

    #[test]
    fn explicit_rollback_restores_savepoint() {
        let mut controller = with_panes(&["a", "b"]);
        let before = controller.model().snapshot();
        controller.begin_transaction("resize");
        controller
            .set_ratios(&NodeId::from("s"), vec![0.3, 0.7])
            .unwrap();
        controller.remove(&PaneId::from("a")).unwrap();
        controller.rollback_transaction().unwrap();
        assert_eq!(controller.model().snapshot(), before);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let mut controller = with_panes(&["a", "b", "c"]);
        controller.focus(Some(&PaneId::from("c"))).unwrap();
        let json = controller.save_to_string().unwrap();

        let mut other = LayoutController::default();
        other.load_from_str(&json).unwrap();
        assert_eq!(other.model().snapshot(), controller.model().snapshot());
        // loading is undoable
        other.undo().unwrap();
        assert!(other.model().is_empty());
    }

    #[test]
    fn load_rejects_bad_documents_without_change() {
        let mut controller = with_panes(&["a", "b"]);
        let before = controller.model().snapshot();
        let bad = serde_json::json!({
            "version": "1.0.0",
            "focused_pane_id": "zz",
            "root": {"type": "leaf", "pane_id": "a", "widget_id": "w"}
        });
        assert!(matches!(
            controller.load_from_value(&bad),
            Err(LayoutError::Serialization(SerializationError::InvalidTree(_)))
        ));
        let newer = serde_json::json!({"version": "2.0.0", "focused_pane_id": null, "root": null});
        assert!(matches!(
            controller.load_from_value(&newer),
            Err(LayoutError::Serialization(
                SerializationError::IncompatibleVersion { .. }
            ))
        ));
        assert_eq!(controller.model().snapshot(), before);
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        let controller = with_panes(&["a", "b"]);
        controller.save_to_path(&path).unwrap();

        let mut other = LayoutController::default();
        other.load_from_path(&path).unwrap();
        assert_eq!(other.pane_ids(), controller.pane_ids());
    }

    fn ratios_hold(node: &Node) -> bool {
        match node {
            Node::Leaf(_) => true,
            Node::Split(split) => {
                split.ratios().len() == split.children().len()
                    && (split.ratios().iter().sum::<f64>() - 1.0).abs() < 0.001
                    && split.ratios().iter().all(|r| *r > 0.0 && *r < 1.0)
                    && split.children().iter().all(ratios_hold)
            }
        }
    }

    const POSITIONS: [WherePosition; 7] = [
        WherePosition::Replace,
        WherePosition::Left,
        WherePosition::Right,
        WherePosition::Top,
        WherePosition::Bottom,
        WherePosition::Before,
        WherePosition::After,
    ];

    proptest! {
        #[test]
        fn random_edits_keep_invariants_and_fully_undo(
            ops in prop::collection::vec((0u8..4, any::<prop::sample::Index>(), 0.1f64..0.9), 1..30)
        ) {
            let mut controller = LayoutController::default();
            let first = controller.initialize(WidgetId::from("w")).unwrap();
            let initial = controller.model().snapshot();

            for (kind, pick, ratio) in ops {
                let panes = controller.pane_ids();
                let pane = pick.get(&panes).clone();
                let _ = match kind {
                    0 | 1 => {
                        let position = POSITIONS[pick.index(POSITIONS.len())];
                        controller.split(&pane, WidgetId::from("w"), position, ratio).map(|_| ())
                    }
                    2 if panes.len() > 1 => controller.remove(&pane),
                    _ => match controller.model().parent_of(&pane).cloned() {
                        Some(node_id) => {
                            let n = controller.model().find_split(&node_id).map_or(0, |s| s.children().len());
                            controller.set_ratios(&node_id, vec![1.0 / n as f64; n])
                        }
                        None => controller.focus(Some(&first)),
                    },
                };

                let (ok, errors) = controller.model().validate();
                prop_assert!(ok, "{:?}", errors);
                if let Some(root) = controller.model().root() {
                    prop_assert!(ratios_hold(root));
                }
            }

            let last = controller.model().snapshot();
            while controller.can_undo() {
                controller.undo().unwrap();
            }
            prop_assert_eq!(controller.model().snapshot(), initial);
            while controller.can_redo() {
                controller.redo().unwrap();
            }
            prop_assert_eq!(controller.model().root(), last.root());
        }
    }
}
