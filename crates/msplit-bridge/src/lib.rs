// ABOUTME: Rendering bridge between the pane layout engine and a fixed-container host toolkit.
// ABOUTME: Keeps one surface per pane, applies geometry, and turns divider drags into ratio changes.

pub mod apply;
pub mod divider;
pub mod error;
pub mod facade;
pub mod host;
pub mod pool;

#[cfg(test)]
mod testing;

pub use apply::GeometryApplier;
pub use divider::{DividerLayer, DragEvent};
pub use error::BridgeError;
pub use facade::MultiSplit;
pub use host::{ContentProvider, DividerKey, ProviderError, SurfaceHost};
pub use pool::WidgetPool;
