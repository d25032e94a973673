// ABOUTME: Pane layout engine: split tree model, geometry, undoable commands and focus navigation.
// ABOUTME: Everything here is toolkit independent; msplit-bridge drives a real surface host with it.

pub mod algorithms;
pub mod command;
pub mod controller;
pub mod document;
pub mod error;
pub mod events;
pub mod focus;
pub mod geometry;
pub mod history;
pub mod model;
pub mod node;
pub mod reconcile;
pub mod validation;

pub use command::{
    Command, CompositeCommand, FocusCommand, NavigateFocusCommand, RemoveCommand,
    ReplaceTreeCommand, SetConstraintsCommand, SetRatiosCommand, SplitCommand, WherePosition,
};
pub use controller::LayoutController;
pub use document::{LayoutDocument, LAYOUT_FORMAT_VERSION};
pub use error::{LayoutError, SerializationError};
pub use events::{EventBus, LayoutEvent, SubscriptionId};
pub use focus::{FocusNavigator, NavDirection};
pub use geometry::{
    ConstraintViolation, DividerGeometry, GeometryEngine, LayoutGeometry, RatioOverrides,
};
pub use history::History;
pub use model::{RegistryEntry, Snapshot, TreeModel};
pub use node::{LeafNode, Node, Orientation, SizeConstraints, SplitNode};
pub use reconcile::{Reconciler, TreeDiff};
pub use validation::{ValidationReport, Validator};
