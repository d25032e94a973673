// ABOUTME: Headless surface host and content provider for the command-line driver.
// ABOUTME: Surfaces are labels; every host call is logged and placements are kept for printing.

use std::collections::BTreeMap;

use msplit_bridge::{ContentProvider, DividerKey, ProviderError, SurfaceHost};
use msplit_core::{PaneId, Rect, WidgetId};
use msplit_layout::DividerGeometry;

#[derive(Debug, Default)]
pub struct TraceHost {
    placed: BTreeMap<String, Rect>,
    focus: Option<Rect>,
}

impl TraceHost {
    pub fn placed(&self) -> &BTreeMap<String, Rect> {
        &self.placed
    }

    pub fn focus_indicator(&self) -> Option<Rect> {
        self.focus
    }
}

impl SurfaceHost for TraceHost {
    type Surface = String;

    fn attach(&mut self, surface: &String) {
        tracing::debug!("attach {}", surface);
    }

    fn detach(&mut self, surface: &String) {
        tracing::debug!("detach {}", surface);
        self.placed.remove(surface);
    }

    fn dispose(&mut self, surface: String) {
        tracing::debug!("dispose {}", surface);
    }

    fn set_geometry(&mut self, surface: &String, rect: Rect) {
        self.placed.insert(surface.clone(), rect);
    }

    fn show(&mut self, _surface: &String) {}

    fn hide(&mut self, surface: &String) {
        self.placed.remove(surface);
    }

    fn raise(&mut self, _surface: &String) {}

    fn create_divider(&mut self, key: &DividerKey, divider: &DividerGeometry) {
        tracing::debug!("divider {}:{} at {:?}", key.node_id, key.index, divider.rect);
    }

    fn update_divider(&mut self, key: &DividerKey, divider: &DividerGeometry) {
        tracing::debug!("divider {}:{} moved to {:?}", key.node_id, key.index, divider.rect);
    }

    fn destroy_divider(&mut self, key: &DividerKey) {
        tracing::debug!("divider {}:{} removed", key.node_id, key.index);
    }

    fn set_focus_indicator(&mut self, rect: Option<Rect>) {
        self.focus = rect;
    }
}

/// Labels each pane with the widget it shows
#[derive(Debug, Default)]
pub struct LabelProvider;

impl ContentProvider for LabelProvider {
    type Surface = String;

    fn provide_widget(&mut self, pane_id: &PaneId, widget_id: &WidgetId) -> Result<String, ProviderError> {
        let short: String = pane_id.as_str().chars().take(8).collect();
        Ok(format!("{}@{}", widget_id, short))
    }

    fn widget_closing(
        &mut self,
        _pane_id: &PaneId,
        widget_id: &WidgetId,
        surface: &String,
    ) -> Result<(), ProviderError> {
        tracing::debug!("closing {} ({})", widget_id, surface);
        Ok(())
    }
}
