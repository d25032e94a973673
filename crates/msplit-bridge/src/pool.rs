// ABOUTME: Widget pool: one attached surface per pane, created once and never reparented.
// ABOUTME: Released surfaces are detached immediately and disposed at the end of the pass.

use std::collections::HashMap;

use msplit_core::{PaneId, WidgetId};
use msplit_layout::{TreeDiff, TreeModel};

use crate::host::{ContentProvider, SurfaceHost};

#[derive(Debug)]
struct Entry<S> {
    widget_id: WidgetId,
    surface: S,
    placeholder: bool,
}

#[derive(Debug)]
pub struct WidgetPool<S> {
    entries: HashMap<PaneId, Entry<S>>,
    pending_dispose: Vec<S>,
}

impl<S> Default for WidgetPool<S> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            pending_dispose: Vec::new(),
        }
    }
}

impl<S> WidgetPool<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pane_id: &PaneId) -> Option<&S> {
        self.entries.get(pane_id).map(|e| &e.surface)
    }

    pub fn contains(&self, pane_id: &PaneId) -> bool {
        self.entries.contains_key(pane_id)
    }

    pub fn is_placeholder(&self, pane_id: &PaneId) -> bool {
        self.entries.get(pane_id).is_some_and(|e| e.placeholder)
    }

    pub fn pane_ids(&self) -> impl Iterator<Item = &PaneId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bring the pool in line with the model: release removed panes, create
    /// surfaces for new ones, swap changed widgets, and retry earlier failures
    pub fn sync<H, P>(&mut self, diff: &TreeDiff, model: &TreeModel, host: &mut H, provider: &mut P)
    where
        H: SurfaceHost<Surface = S>,
        P: ContentProvider<Surface = S>,
    {
        for pane_id in &diff.removed {
            self.release(pane_id, host, provider);
        }
        let stale: Vec<PaneId> = self
            .entries
            .keys()
            .filter(|id| !model.contains_pane(id))
            .cloned()
            .collect();
        for pane_id in &stale {
            self.release(pane_id, host, provider);
        }

        for pane_id in model.get_all_pane_ids() {
            if let Some(leaf) = model.get_pane(&pane_id) {
                self.ensure(&pane_id, leaf.widget_id(), host, provider);
            }
        }
    }

    /// Make sure `pane_id` has a surface for `widget_id`
    pub fn ensure<H, P>(&mut self, pane_id: &PaneId, widget_id: &WidgetId, host: &mut H, provider: &mut P)
    where
        H: SurfaceHost<Surface = S>,
        P: ContentProvider<Surface = S>,
    {
        let current = self
            .entries
            .get(pane_id)
            .map(|e| (e.widget_id == *widget_id, e.placeholder));
        match current {
            Some((true, false)) => return,
            Some((false, _)) => self.release(pane_id, host, provider),
            _ => {}
        }

        match provider.provide_widget(pane_id, widget_id) {
            Ok(surface) => {
                if let Some(old) = self.entries.remove(pane_id) {
                    host.detach(&old.surface);
                    self.pending_dispose.push(old.surface);
                }
                host.attach(&surface);
                tracing::debug!("Attached widget {} for pane {}", widget_id, pane_id);
                self.entries.insert(
                    pane_id.clone(),
                    Entry {
                        widget_id: widget_id.clone(),
                        surface,
                        placeholder: false,
                    },
                );
            }
            Err(e) => {
                tracing::error!(
                    "Content provider failed for widget {} in pane {}: {}",
                    widget_id,
                    pane_id,
                    e
                );
                if self.entries.contains_key(pane_id) {
                    return;
                }
                if let Some(placeholder) = provider.placeholder(pane_id, widget_id) {
                    host.attach(&placeholder);
                    self.entries.insert(
                        pane_id.clone(),
                        Entry {
                            widget_id: widget_id.clone(),
                            surface: placeholder,
                            placeholder: true,
                        },
                    );
                }
            }
        }
    }

    /// Detach a pane's surface and queue it for disposal
    pub fn release<H, P>(&mut self, pane_id: &PaneId, host: &mut H, provider: &mut P)
    where
        H: SurfaceHost<Surface = S>,
        P: ContentProvider<Surface = S>,
    {
        let Some(entry) = self.entries.remove(pane_id) else {
            return;
        };
        if !entry.placeholder {
            if let Err(e) = provider.widget_closing(pane_id, &entry.widget_id, &entry.surface) {
                tracing::error!(
                    "Widget {} in pane {} failed to close: {}",
                    entry.widget_id,
                    pane_id,
                    e
                );
            }
        }
        host.detach(&entry.surface);
        self.pending_dispose.push(entry.surface);
    }

    pub fn flush_disposals<H>(&mut self, host: &mut H)
    where
        H: SurfaceHost<Surface = S>,
    {
        for surface in self.pending_dispose.drain(..) {
            host.dispose(surface);
        }
    }
}
