// ABOUTME: The boundary to the host toolkit: a fixed container of absolutely positioned surfaces.
// ABOUTME: Hosts implement SurfaceHost; applications implement ContentProvider to supply pane widgets.

use msplit_core::{NodeId, PaneId, Rect, WidgetId};
use msplit_layout::DividerGeometry;

/// Identifies one divider region: the gap after child `index` of split `node_id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DividerKey {
    pub node_id: NodeId,
    pub index: usize,
}

impl DividerKey {
    pub fn new(node_id: NodeId, index: usize) -> Self {
        Self { node_id, index }
    }

    pub fn of(divider: &DividerGeometry) -> Self {
        Self::new(divider.node_id.clone(), divider.index)
    }
}

/// A fixed-position container. Surfaces are attached once and only moved
/// afterwards; the bridge never reparents them.
pub trait SurfaceHost {
    type Surface;

    fn attach(&mut self, surface: &Self::Surface);
    fn detach(&mut self, surface: &Self::Surface);
    /// Final release of a detached surface
    fn dispose(&mut self, surface: Self::Surface);

    fn set_geometry(&mut self, surface: &Self::Surface, rect: Rect);
    fn show(&mut self, surface: &Self::Surface);
    fn hide(&mut self, surface: &Self::Surface);
    fn raise(&mut self, surface: &Self::Surface);

    fn create_divider(&mut self, key: &DividerKey, divider: &DividerGeometry);
    fn update_divider(&mut self, key: &DividerKey, divider: &DividerGeometry);
    fn destroy_divider(&mut self, key: &DividerKey);

    /// `None` hides the indicator
    fn set_focus_indicator(&mut self, rect: Option<Rect>);
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Supplies the content shown in each pane
pub trait ContentProvider {
    type Surface;

    fn provide_widget(
        &mut self,
        pane_id: &PaneId,
        widget_id: &WidgetId,
    ) -> Result<Self::Surface, ProviderError>;

    /// Called with the surface still attached, before it is detached and disposed
    fn widget_closing(
        &mut self,
        pane_id: &PaneId,
        widget_id: &WidgetId,
        surface: &Self::Surface,
    ) -> Result<(), ProviderError>;

    /// Shown when `provide_widget` fails
    fn placeholder(&mut self, _pane_id: &PaneId, _widget_id: &WidgetId) -> Option<Self::Surface> {
        None
    }
}
