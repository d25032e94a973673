// ABOUTME: Error type for the rendering bridge.
// ABOUTME: Provider failures are logged and recovered from, so only layout errors surface here.

use msplit_layout::LayoutError;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("No pane has focus")]
    NoFocusedPane,
}
