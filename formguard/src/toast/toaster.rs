use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::{Toast, ToastHost, ToastKind};
use crate::config::DEFAULT_TOAST_DURATION;
use crate::dom::{Document, Element, EventKind, NodeId};

/// Default `id` of the toast container.
pub const DEFAULT_CONTAINER_ID: &str = "toastContainer";

/// Renders toasts into a lazily created, page-global container.
#[derive(Clone)]
pub struct Toaster {
    document: Document,
    host: Arc<dyn ToastHost>,
    runtime: Handle,
    container_id: String,
    duration: Duration,
    /// Serializes container creation.
    container_lock: Arc<Mutex<()>>,
}

impl Toaster {
    pub fn new(document: Document, host: Arc<dyn ToastHost>, runtime: Handle) -> Self {
        Self {
            document,
            host,
            runtime,
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            duration: DEFAULT_TOAST_DURATION,
            container_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }

    /// Display duration used by [`show`](Self::show).
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// The container, if one has been created.
    pub fn container(&self) -> Option<NodeId> {
        self.document.element_by_id(&self.container_id)
    }

    fn ensure_container(&self) -> NodeId {
        let _guard = self
            .container_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(container) = self.container() {
            return container;
        }

        log::debug!("Toaster: creating container #{}", self.container_id);
        self.document.mount(
            self.document.body(),
            Element::div()
                .id(&self.container_id)
                .class("toast-container")
                .attr("aria-live", "polite"),
        )
    }

    /// Show a toast with the configured duration.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind) -> ToastHandle {
        self.show_toast(Toast::new(message, kind).with_duration(self.duration))
    }

    /// Append `toast` to the container and start its lifecycle.
    ///
    /// Must be called from within the tokio runtime or with a runtime
    /// handle still alive; the element is removed once the host reports it
    /// hidden.
    pub fn show_toast(&self, toast: Toast) -> ToastHandle {
        let container = self.ensure_container();

        let element = self.document.mount(
            container,
            Element::div()
                .class("toast")
                .class(toast.kind.class())
                .attr("role", "alert"),
        );
        self.document.mount(
            element,
            Element::div().class("toast-body").text(&toast.message),
        );
        let close = self.document.mount(
            element,
            Element::button("")
                .class("btn-close")
                .attr("aria-label", "Close"),
        );

        let dismissed = CancellationToken::new();
        let on_close = dismissed.clone();
        self.document
            .add_listener(close, EventKind::Click, move |_| on_close.cancel());

        let (hidden_tx, hidden_rx) = watch::channel(false);
        let document = self.document.clone();
        let host = Arc::clone(&self.host);
        let presented = toast.clone();
        let token = dismissed.clone();

        log::debug!("Toaster: showing {:?} toast {element}", toast.kind);
        self.runtime.spawn(async move {
            host.present(&document, element, &presented, token).await;
            document.remove(element);
            let _ = hidden_tx.send(true);
        });

        ToastHandle {
            element,
            toast,
            dismissed,
            hidden: hidden_rx,
        }
    }
}

/// Handle to a displayed toast.
#[derive(Debug, Clone)]
pub struct ToastHandle {
    element: NodeId,
    toast: Toast,
    dismissed: CancellationToken,
    hidden: watch::Receiver<bool>,
}

impl ToastHandle {
    /// The toast's root element. Gone from the document once hidden.
    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn toast(&self) -> &Toast {
        &self.toast
    }

    /// Start hiding the toast now, same as clicking its close button.
    pub fn dismiss(&self) {
        self.dismissed.cancel();
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed.is_cancelled()
    }

    pub fn is_hidden(&self) -> bool {
        *self.hidden.borrow()
    }

    /// Wait until the toast has been hidden and removed.
    pub async fn hidden(&self) {
        let mut hidden = self.hidden.clone();
        let _ = hidden.wait_for(|hidden| *hidden).await;
    }
}
