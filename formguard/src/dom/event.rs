use std::cell::Cell;
use std::sync::Arc;

use super::NodeId;

/// Kinds of events a document dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A form is being submitted.
    Submit,
    /// A control lost focus.
    Blur,
    /// A control's value was edited.
    Input,
    /// An element was activated.
    Click,
}

/// An event targeted at a single element.
///
/// Events do not bubble: only listeners registered on `target` run.
#[derive(Debug)]
pub struct Event {
    kind: EventKind,
    target: NodeId,
    default_prevented: Cell<bool>,
}

impl Event {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            default_prevented: Cell::new(false),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Suppress the host's default action (e.g. native form submission).
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// Identifies a registered listener so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Listener callback.
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

pub(crate) struct Registration {
    pub id: ListenerId,
    pub target: NodeId,
    pub kind: EventKind,
    pub listener: Listener,
}

/// What happened while dispatching an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// A listener called [`Event::prevent_default`].
    pub default_prevented: bool,
    /// Number of listeners invoked.
    pub listeners_run: usize,
}
