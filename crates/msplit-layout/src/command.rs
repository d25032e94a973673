// ABOUTME: Undoable commands: every mutation of the pane tree is one of these.
// ABOUTME: Structural commands undo from a snapshot; ratio/constraint/focus commands store their inverse.

use std::fmt;
use std::str::FromStr;

use msplit_core::{NodeId, PaneId, WidgetId};

use crate::algorithms::{self, normalize_ratios};
use crate::error::LayoutError;
use crate::events::LayoutEvent;
use crate::focus::NavDirection;
use crate::model::{FocusPolicy, Snapshot, TreeModel};
use crate::node::{LeafNode, Node, Orientation, SizeConstraints, SplitNode};
use crate::validation::{ValidationReport, Validator};

/// Where a split places the new pane relative to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WherePosition {
    /// Swap the target's widget in place
    Replace,
    Left,
    Right,
    Top,
    Bottom,
    /// New sibling just before the target in its parent split
    Before,
    /// New sibling just after the target in its parent split
    After,
}

impl WherePosition {
    pub fn is_sibling_insert(self) -> bool {
        matches!(self, WherePosition::Before | WherePosition::After)
    }

    /// Orientation of the split created around the target, if any
    pub fn orientation(self) -> Option<Orientation> {
        match self {
            WherePosition::Left | WherePosition::Right => Some(Orientation::Horizontal),
            WherePosition::Top | WherePosition::Bottom => Some(Orientation::Vertical),
            _ => None,
        }
    }

    fn new_pane_first(self) -> bool {
        matches!(
            self,
            WherePosition::Left | WherePosition::Top | WherePosition::Before
        )
    }
}

impl fmt::Display for WherePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WherePosition::Replace => "replace",
            WherePosition::Left => "left",
            WherePosition::Right => "right",
            WherePosition::Top => "top",
            WherePosition::Bottom => "bottom",
            WherePosition::Before => "before",
            WherePosition::After => "after",
        };
        f.write_str(name)
    }
}

impl FromStr for WherePosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "replace" => Ok(WherePosition::Replace),
            "left" => Ok(WherePosition::Left),
            "right" => Ok(WherePosition::Right),
            "top" => Ok(WherePosition::Top),
            "bottom" => Ok(WherePosition::Bottom),
            "before" => Ok(WherePosition::Before),
            "after" => Ok(WherePosition::After),
            other => Err(format!("unknown split position '{}'", other)),
        }
    }
}

/// A reversible mutation of the tree model
pub trait Command: fmt::Debug {
    /// Checked by the controller before `execute`; errors block execution
    fn validate(&self, _model: &TreeModel, _validator: &Validator) -> ValidationReport {
        ValidationReport::default()
    }

    fn execute(&mut self, model: &mut TreeModel) -> Result<(), LayoutError>;

    fn undo(&mut self, model: &mut TreeModel) -> Result<(), LayoutError>;

    fn description(&self) -> String;

    /// Transient commands run normally but are not kept on the undo stack
    fn is_transient(&self) -> bool {
        false
    }
}

fn pane_missing(pane_id: &PaneId) -> LayoutError {
    LayoutError::PaneNotFound(pane_id.clone())
}

fn restore_from(before: &Option<Snapshot>, model: &mut TreeModel) -> Result<(), LayoutError> {
    let snapshot = before
        .clone()
        .ok_or_else(|| LayoutError::Structural("command was never executed".to_string()))?;
    model.restore(snapshot);
    Ok(())
}

#[derive(Debug)]
pub struct SplitCommand {
    target: PaneId,
    widget_id: WidgetId,
    position: WherePosition,
    ratio: f64,
    new_pane_id: PaneId,
    new_node_id: NodeId,
    before: Option<Snapshot>,
}

impl SplitCommand {
    pub fn new(target: PaneId, widget_id: WidgetId, position: WherePosition, ratio: f64) -> Self {
        let new_pane_id = if position == WherePosition::Replace {
            target.clone()
        } else {
            PaneId::generate()
        };
        Self {
            target,
            widget_id,
            position,
            ratio,
            new_pane_id,
            new_node_id: NodeId::generate(),
            before: None,
        }
    }

    /// Use a caller-chosen id for the new pane
    pub fn with_pane_id(mut self, pane_id: PaneId) -> Self {
        if self.position != WherePosition::Replace {
            self.new_pane_id = pane_id;
        }
        self
    }

    /// The pane showing the new widget; the target itself for `Replace`
    pub fn new_pane_id(&self) -> &PaneId {
        &self.new_pane_id
    }

    fn new_leaf(&self) -> Node {
        Node::Leaf(LeafNode::new(self.new_pane_id.clone(), self.widget_id.clone()))
    }

    fn insert_sibling(&self, model: &mut TreeModel, path: &[usize]) -> Result<(), LayoutError> {
        let Some((&index, parent_path)) = path.split_last() else {
            return Err(LayoutError::Structural(format!(
                "cannot insert {} pane {}: it is the root",
                self.position, self.target
            )));
        };
        let new_leaf = self.new_leaf();
        let Some(Node::Split(parent)) = model.node_at_path_mut(parent_path) else {
            return Err(LayoutError::Structural(format!(
                "parent of pane {} is not a split",
                self.target
            )));
        };
        let at = if self.position.new_pane_first() {
            index
        } else {
            index + 1
        };
        let share = parent.ratios()[index];
        parent.ratios_mut()[index] = share * (1.0 - self.ratio);
        parent.ratios_mut().insert(at, share * self.ratio);
        parent.children_mut().insert(at, new_leaf);
        Ok(())
    }

    fn wrap_target(
        &self,
        model: &mut TreeModel,
        path: &[usize],
        orientation: Orientation,
    ) -> Result<(), LayoutError> {
        let new_leaf = self.new_leaf();
        let slot = model
            .node_at_path_mut(path)
            .ok_or_else(|| pane_missing(&self.target))?;

        // The new split takes the target's slot first; only then is the target moved under it
        let split = SplitNode::with_id(
            self.new_node_id.clone(),
            orientation,
            Vec::with_capacity(2),
            Vec::with_capacity(2),
        );
        let target = std::mem::replace(slot, Node::Split(split));
        if let Node::Split(split) = slot {
            let r = self.ratio;
            let (children, ratios) = if self.position.new_pane_first() {
                (vec![new_leaf, target], vec![r, 1.0 - r])
            } else {
                (vec![target, new_leaf], vec![1.0 - r, r])
            };
            *split.children_mut() = children;
            *split.ratios_mut() = ratios;
        }
        Ok(())
    }
}

impl Command for SplitCommand {
    fn validate(&self, model: &TreeModel, validator: &Validator) -> ValidationReport {
        validator.validate_split(
            model,
            &self.target,
            &self.new_pane_id,
            self.position,
            self.ratio,
        )
    }

    fn execute(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        let path = model
            .registry_entry(&self.target)
            .ok_or_else(|| pane_missing(&self.target))?
            .path
            .clone();
        if self.position != WherePosition::Replace && model.contains_pane(&self.new_pane_id) {
            return Err(LayoutError::Structural(format!(
                "pane {} is already in the layout",
                self.new_pane_id
            )));
        }
        let before = model.snapshot();

        match (self.position, self.position.orientation()) {
            (WherePosition::Replace, _) => {
                let leaf = model
                    .leaf_mut(&self.target)
                    .ok_or_else(|| pane_missing(&self.target))?;
                leaf.replace_widget(self.widget_id.clone());
            }
            (WherePosition::Before | WherePosition::After, _) => {
                self.insert_sibling(model, &path)?;
            }
            (_, Some(orientation)) => self.wrap_target(model, &path, orientation)?,
            (position, None) => {
                return Err(LayoutError::Structural(format!(
                    "split position {} has no orientation",
                    position
                )))
            }
        }

        self.before = Some(before);
        model.commit_structure(FocusPolicy::Set(Some(self.new_pane_id.clone())));
        tracing::debug!(
            "Split {} {} -> {} ({})",
            self.target,
            self.position,
            self.new_pane_id,
            self.widget_id
        );
        Ok(())
    }

    fn undo(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        restore_from(&self.before, model)
    }

    fn description(&self) -> String {
        format!("Split {} ({})", self.target, self.position)
    }
}

#[derive(Debug)]
pub struct RemoveCommand {
    pane_id: PaneId,
    before: Option<Snapshot>,
}

impl RemoveCommand {
    pub fn new(pane_id: PaneId) -> Self {
        Self {
            pane_id,
            before: None,
        }
    }
}

impl Command for RemoveCommand {
    fn validate(&self, model: &TreeModel, validator: &Validator) -> ValidationReport {
        validator.validate_remove(model, &self.pane_id)
    }

    fn execute(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        let path = model
            .registry_entry(&self.pane_id)
            .ok_or_else(|| pane_missing(&self.pane_id))?
            .path
            .clone();
        let before = model.snapshot();

        let fallback = match path.split_last() {
            None => {
                model.set_root(None);
                None
            }
            Some((&index, parent_path)) => {
                let slot = model
                    .node_at_path_mut(parent_path)
                    .ok_or_else(|| pane_missing(&self.pane_id))?;
                let survivor = {
                    let Node::Split(parent) = &mut *slot else {
                        return Err(LayoutError::Structural(format!(
                            "parent of pane {} is not a split",
                            self.pane_id
                        )));
                    };
                    parent.children_mut().remove(index);
                    parent.ratios_mut().remove(index);
                    normalize_ratios(parent.ratios_mut());
                    if parent.children().len() == 1 {
                        parent.children_mut().pop()
                    } else {
                        None
                    }
                };
                match survivor {
                    // One level only: the survivor takes its parent's slot, the grandparent is untouched
                    Some(only) => {
                        *slot = only;
                        slot.first_leaf().map(|leaf| leaf.pane_id().clone())
                    }
                    None => match &*slot {
                        Node::Split(parent) => {
                            let next = index.min(parent.children().len().saturating_sub(1));
                            parent.children()[next]
                                .first_leaf()
                                .map(|leaf| leaf.pane_id().clone())
                        }
                        Node::Leaf(leaf) => Some(leaf.pane_id().clone()),
                    },
                }
            }
        };

        self.before = Some(before);
        model.commit_structure(FocusPolicy::Keep { fallback });
        tracing::debug!("Removed pane {}", self.pane_id);
        Ok(())
    }

    fn undo(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        restore_from(&self.before, model)
    }

    fn description(&self) -> String {
        format!("Remove {}", self.pane_id)
    }
}

#[derive(Debug)]
pub struct SetRatiosCommand {
    node_id: NodeId,
    ratios: Vec<f64>,
    previous: Option<Vec<f64>>,
}

impl SetRatiosCommand {
    pub fn new(node_id: NodeId, ratios: Vec<f64>) -> Self {
        Self {
            node_id,
            ratios,
            previous: None,
        }
    }

    fn apply(&self, model: &mut TreeModel, ratios: Vec<f64>) -> Result<Vec<f64>, LayoutError> {
        let split = model
            .split_mut(&self.node_id)
            .ok_or_else(|| LayoutError::NodeNotFound(self.node_id.clone()))?;
        if ratios.len() != split.children().len() {
            return Err(LayoutError::Structural(format!(
                "split {} has {} children but {} ratios",
                self.node_id,
                split.children().len(),
                ratios.len()
            )));
        }
        algorithms::validate_ratios(&ratios).map_err(|e| LayoutError::Validation(vec![e]))?;
        let previous = split.set_ratios(ratios);
        model.emit(LayoutEvent::RatiosChanged(self.node_id.clone()));
        Ok(previous)
    }
}

impl Command for SetRatiosCommand {
    fn validate(&self, model: &TreeModel, validator: &Validator) -> ValidationReport {
        validator.validate_ratios(model, &self.node_id, &self.ratios)
    }

    fn execute(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        self.previous = Some(self.apply(model, self.ratios.clone())?);
        Ok(())
    }

    fn undo(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        let previous = self
            .previous
            .take()
            .ok_or_else(|| LayoutError::Structural("command was never executed".to_string()))?;
        self.apply(model, previous)?;
        Ok(())
    }

    fn description(&self) -> String {
        format!("Resize {}", self.node_id)
    }
}

#[derive(Debug)]
pub struct SetConstraintsCommand {
    pane_id: PaneId,
    constraints: SizeConstraints,
    previous: Option<SizeConstraints>,
}

impl SetConstraintsCommand {
    pub fn new(pane_id: PaneId, constraints: SizeConstraints) -> Self {
        Self {
            pane_id,
            constraints,
            previous: None,
        }
    }

    fn apply(
        &self,
        model: &mut TreeModel,
        constraints: SizeConstraints,
    ) -> Result<SizeConstraints, LayoutError> {
        let leaf = model
            .leaf_mut(&self.pane_id)
            .ok_or_else(|| pane_missing(&self.pane_id))?;
        let previous = leaf.set_constraints(constraints);
        model.emit(LayoutEvent::ConstraintsChanged(self.pane_id.clone()));
        Ok(previous)
    }
}

impl Command for SetConstraintsCommand {
    fn validate(&self, model: &TreeModel, validator: &Validator) -> ValidationReport {
        validator.validate_constraints(model, &self.pane_id, &self.constraints)
    }

    fn execute(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        self.constraints
            .validate()
            .map_err(|e| LayoutError::Validation(vec![e]))?;
        self.previous = Some(self.apply(model, self.constraints)?);
        Ok(())
    }

    fn undo(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        let previous = self
            .previous
            .take()
            .ok_or_else(|| LayoutError::Structural("command was never executed".to_string()))?;
        self.apply(model, previous)?;
        Ok(())
    }

    fn description(&self) -> String {
        format!("Constrain {}", self.pane_id)
    }
}

fn refocus(model: &mut TreeModel, target: Option<PaneId>) -> Result<Option<PaneId>, LayoutError> {
    let previous = model.focused_pane().cloned();
    if let Some(id) = &target {
        if !model.contains_pane(id) {
            return Err(pane_missing(id));
        }
    }
    model.set_focused_pane(target);
    Ok(previous)
}

#[derive(Debug)]
pub struct FocusCommand {
    target: Option<PaneId>,
    previous: Option<PaneId>,
}

impl FocusCommand {
    pub fn new(target: Option<PaneId>) -> Self {
        Self {
            target,
            previous: None,
        }
    }
}

impl Command for FocusCommand {
    fn validate(&self, model: &TreeModel, validator: &Validator) -> ValidationReport {
        validator.validate_focus(model, self.target.as_ref())
    }

    fn execute(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        self.previous = refocus(model, self.target.clone())?;
        Ok(())
    }

    fn undo(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        let previous = self.previous.take().filter(|id| model.contains_pane(id));
        refocus(model, previous)?;
        Ok(())
    }

    fn description(&self) -> String {
        match &self.target {
            Some(id) => format!("Focus {}", id),
            None => "Clear focus".to_string(),
        }
    }

    fn is_transient(&self) -> bool {
        true
    }
}

/// Focus change whose target was resolved by the focus navigator
#[derive(Debug)]
pub struct NavigateFocusCommand {
    direction: NavDirection,
    target: PaneId,
    previous: Option<PaneId>,
}

impl NavigateFocusCommand {
    pub fn new(direction: NavDirection, target: PaneId) -> Self {
        Self {
            direction,
            target,
            previous: None,
        }
    }

    pub fn target(&self) -> &PaneId {
        &self.target
    }
}

impl Command for NavigateFocusCommand {
    fn validate(&self, model: &TreeModel, validator: &Validator) -> ValidationReport {
        validator.validate_focus(model, Some(&self.target))
    }

    fn execute(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        self.previous = refocus(model, Some(self.target.clone()))?;
        Ok(())
    }

    fn undo(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        let previous = self.previous.take().filter(|id| model.contains_pane(id));
        refocus(model, previous)?;
        Ok(())
    }

    fn description(&self) -> String {
        format!("Navigate {:?} to {}", self.direction, self.target)
    }

    fn is_transient(&self) -> bool {
        true
    }
}

/// Several commands undone and redone as one unit
#[derive(Debug)]
pub struct CompositeCommand {
    description: String,
    commands: Vec<Box<dyn Command>>,
}

impl CompositeCommand {
    pub fn new(description: impl Into<String>, commands: Vec<Box<dyn Command>>) -> Self {
        Self {
            description: description.into(),
            commands,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for CompositeCommand {
    fn execute(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        for done in 0..self.commands.len() {
            if let Err(e) = self.commands[done].execute(model) {
                for command in self.commands[..done].iter_mut().rev() {
                    if let Err(undo_err) = command.undo(model) {
                        tracing::error!("Failed to unwind {}: {}", command.description(), undo_err);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn undo(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        for command in self.commands.iter_mut().rev() {
            command.undo(model)?;
        }
        Ok(())
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn is_transient(&self) -> bool {
        self.commands.iter().all(|c| c.is_transient())
    }
}

/// Swap in a whole tree (initialize, load)
#[derive(Debug)]
pub struct ReplaceTreeCommand {
    description: String,
    next: Snapshot,
    previous: Option<Snapshot>,
}

impl ReplaceTreeCommand {
    pub fn new(description: impl Into<String>, next: Snapshot) -> Self {
        Self {
            description: description.into(),
            next,
            previous: None,
        }
    }
}

impl Command for ReplaceTreeCommand {
    fn validate(&self, _model: &TreeModel, _validator: &Validator) -> ValidationReport {
        let mut report = ValidationReport::default();
        if let Some(root) = self.next.root() {
            for error in algorithms::validate_structure(root) {
                report.error(error);
            }
            if let Some(focused) = self.next.focused() {
                if algorithms::find_leaf(root, focused).is_none() {
                    report.error(format!("Focused pane {} is not in the layout", focused));
                }
            }
        } else if let Some(focused) = self.next.focused() {
            report.error(format!("Focused pane {} is not in the layout", focused));
        }
        report
    }

    fn execute(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        self.previous = Some(model.snapshot());
        model.restore(self.next.clone());
        Ok(())
    }

    fn undo(&mut self, model: &mut TreeModel) -> Result<(), LayoutError> {
        restore_from(&self.previous, model)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}
