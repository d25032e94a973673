// ABOUTME: Recording host and provider doubles for bridge tests.
// ABOUTME: The host logs every call; the provider hands out numbered surfaces and can be told to fail.

use std::collections::HashSet;

use msplit_core::{PaneId, Rect, WidgetId};
use msplit_layout::DividerGeometry;

use crate::host::{ContentProvider, DividerKey, ProviderError, SurfaceHost};

/// Surfaces are plain numbers; placeholders count down from `u32::MAX`
pub type TestSurface = u32;

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Attach(TestSurface),
    Detach(TestSurface),
    Dispose(TestSurface),
    SetGeometry(TestSurface, Rect),
    Show(TestSurface),
    Hide(TestSurface),
    Raise(TestSurface),
    CreateDivider(DividerKey),
    UpdateDivider(DividerKey),
    DestroyDivider(DividerKey),
    FocusIndicator(Option<Rect>),
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
}

impl RecordingHost {
    pub fn take(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn count(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl SurfaceHost for RecordingHost {
    type Surface = TestSurface;

    fn attach(&mut self, surface: &TestSurface) {
        self.calls.push(HostCall::Attach(*surface));
    }

    fn detach(&mut self, surface: &TestSurface) {
        self.calls.push(HostCall::Detach(*surface));
    }

    fn dispose(&mut self, surface: TestSurface) {
        self.calls.push(HostCall::Dispose(surface));
    }

    fn set_geometry(&mut self, surface: &TestSurface, rect: Rect) {
        self.calls.push(HostCall::SetGeometry(*surface, rect));
    }

    fn show(&mut self, surface: &TestSurface) {
        self.calls.push(HostCall::Show(*surface));
    }

    fn hide(&mut self, surface: &TestSurface) {
        self.calls.push(HostCall::Hide(*surface));
    }

    fn raise(&mut self, surface: &TestSurface) {
        self.calls.push(HostCall::Raise(*surface));
    }

    fn create_divider(&mut self, key: &DividerKey, _divider: &DividerGeometry) {
        self.calls.push(HostCall::CreateDivider(key.clone()));
    }

    fn update_divider(&mut self, key: &DividerKey, _divider: &DividerGeometry) {
        self.calls.push(HostCall::UpdateDivider(key.clone()));
    }

    fn destroy_divider(&mut self, key: &DividerKey) {
        self.calls.push(HostCall::DestroyDivider(key.clone()));
    }

    fn set_focus_indicator(&mut self, rect: Option<Rect>) {
        self.calls.push(HostCall::FocusIndicator(rect));
    }
}

#[derive(Debug, Default)]
pub struct RecordingProvider {
    next: TestSurface,
    next_placeholder: TestSurface,
    pub failing: HashSet<WidgetId>,
    pub with_placeholder: bool,
    pub fail_closing: bool,
    pub provided: Vec<(PaneId, WidgetId)>,
    pub closed: Vec<(PaneId, WidgetId, TestSurface)>,
}

impl ContentProvider for RecordingProvider {
    type Surface = TestSurface;

    fn provide_widget(
        &mut self,
        pane_id: &PaneId,
        widget_id: &WidgetId,
    ) -> Result<TestSurface, ProviderError> {
        if self.failing.contains(widget_id) {
            return Err(ProviderError::new(format!("no widget {}", widget_id)));
        }
        self.next += 1;
        self.provided.push((pane_id.clone(), widget_id.clone()));
        Ok(self.next)
    }

    fn widget_closing(
        &mut self,
        pane_id: &PaneId,
        widget_id: &WidgetId,
        surface: &TestSurface,
    ) -> Result<(), ProviderError> {
        self.closed.push((pane_id.clone(), widget_id.clone(), *surface));
        if self.fail_closing {
            return Err(ProviderError::new("refused to close"));
        }
        Ok(())
    }

    fn placeholder(&mut self, _pane_id: &PaneId, _widget_id: &WidgetId) -> Option<TestSurface> {
        if !self.with_placeholder {
            return None;
        }
        self.next_placeholder += 1;
        Some(TestSurface::MAX - self.next_placeholder)
    }
}
