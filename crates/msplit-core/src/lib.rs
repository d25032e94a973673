// ABOUTME: Shared types and configuration for multisplit.
// ABOUTME: Defines pane/node/widget identifiers, pixel rectangles, and config file handling.

pub mod config;
pub mod ids;
pub mod rect;

pub use config::{
    Config, ConfigError, FocusSettings, GeometrySettings, HistorySettings, ValidationSettings,
};
pub use ids::{NodeId, PaneId, WidgetId};
pub use rect::{Point, Rect};
