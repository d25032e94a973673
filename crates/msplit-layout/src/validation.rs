// ABOUTME: Pre-execution checks for commands: hard errors block a command, warnings only get logged.
// ABOUTME: Covers target existence, ratio bounds, sibling-of-root inserts, depth and pane-count limits.

use msplit_core::{NodeId, PaneId, ValidationSettings};

use crate::algorithms;
use crate::command::WherePosition;
use crate::model::TreeModel;
use crate::node::SizeConstraints;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    settings: ValidationSettings,
}

impl Validator {
    pub fn new(settings: ValidationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    pub fn validate_split(
        &self,
        model: &TreeModel,
        target: &PaneId,
        new_pane_id: &PaneId,
        position: WherePosition,
        ratio: f64,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();
        let Some(entry) = model.registry_entry(target) else {
            report.error(format!("Pane {} does not exist", target));
            return report;
        };

        if position == WherePosition::Replace {
            return report;
        }

        if model.contains_pane(new_pane_id) {
            report.error(format!("Pane {} is already in the layout", new_pane_id));
        }

        let s = &self.settings;
        if !ratio.is_finite() || ratio < s.min_split_ratio || ratio > s.max_split_ratio {
            report.error(format!(
                "Split ratio {} is outside the allowed range {}..={}",
                ratio, s.min_split_ratio, s.max_split_ratio
            ));
        } else if ratio < s.small_ratio_warning || 1.0 - ratio < s.small_ratio_warning {
            report.warn(format!("Split ratio {} leaves a very small pane", ratio));
        }

        if position.is_sibling_insert() && entry.parent.is_none() {
            report.error(format!(
                "Cannot insert {} pane {}: it is the root and has no parent split",
                position, target
            ));
        }

        let depth = if position.is_sibling_insert() {
            entry.depth
        } else {
            entry.depth + 1
        };
        if depth > s.max_depth {
            report.warn(format!(
                "Tree depth {} exceeds the recommended maximum of {}",
                depth, s.max_depth
            ));
        }
        let panes = model.pane_count() + 1;
        if panes > s.max_panes {
            report.warn(format!(
                "Pane count {} exceeds the recommended maximum of {}",
                panes, s.max_panes
            ));
        }
        report
    }

    pub fn validate_remove(&self, model: &TreeModel, pane_id: &PaneId) -> ValidationReport {
        let mut report = ValidationReport::default();
        if !model.contains_pane(pane_id) {
            report.error(format!("Pane {} does not exist", pane_id));
        }
        report
    }

    pub fn validate_ratios(
        &self,
        model: &TreeModel,
        node_id: &NodeId,
        ratios: &[f64],
    ) -> ValidationReport {
        let mut report = ValidationReport::default();
        let Some(split) = model.find_split(node_id) else {
            report.error(format!("Split {} does not exist", node_id));
            return report;
        };
        if ratios.len() != split.children().len() {
            report.error(format!(
                "Split {} has {} children but {} ratios were given",
                node_id,
                split.children().len(),
                ratios.len()
            ));
            return report;
        }
        if let Err(e) = algorithms::validate_ratios(ratios) {
            report.error(format!("Invalid ratios for split {}: {}", node_id, e));
            return report;
        }
        for (index, ratio) in ratios.iter().enumerate() {
            if *ratio < self.settings.min_resize_ratio {
                report.error(format!(
                    "Ratio {} at index {} is below the minimum of {}",
                    ratio, index, self.settings.min_resize_ratio
                ));
            } else if *ratio < self.settings.small_ratio_warning {
                report.warn(format!("Ratio {} at index {} is very small", ratio, index));
            }
        }
        report
    }

    pub fn validate_constraints(
        &self,
        model: &TreeModel,
        pane_id: &PaneId,
        constraints: &SizeConstraints,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();
        if !model.contains_pane(pane_id) {
            report.error(format!("Pane {} does not exist", pane_id));
        }
        if let Err(e) = constraints.validate() {
            report.error(format!("Invalid constraints for pane {}: {}", pane_id, e));
        }
        report
    }

    pub fn validate_focus(&self, model: &TreeModel, pane_id: Option<&PaneId>) -> ValidationReport {
        let mut report = ValidationReport::default();
        if let Some(id) = pane_id {
            if !model.contains_pane(id) {
                report.error(format!("Pane {} does not exist", id));
            }
        }
        report
    }
}
