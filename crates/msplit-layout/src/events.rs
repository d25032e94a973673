// ABOUTME: Change notifications emitted by the tree model and controller.
// ABOUTME: Listeners register callbacks on an explicit observer list and unsubscribe by handle.

use msplit_core::{NodeId, PaneId};

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    /// The set or arrangement of nodes changed
    StructureChanged,
    PaneAdded(PaneId),
    PaneRemoved(PaneId),
    FocusChanged {
        old: Option<PaneId>,
        new: Option<PaneId>,
    },
    RatiosChanged(NodeId),
    ConstraintsChanged(PaneId),
    /// A command was rejected before execution; carries the error messages
    ValidationFailed(Vec<String>),
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&LayoutEvent)>;

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&LayoutEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the handle was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Deliver to every listener in subscription order
    pub fn emit(&mut self, event: &LayoutEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
