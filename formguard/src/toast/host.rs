use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::Toast;
use crate::dom::{Document, NodeId};

/// Duration of the show transition.
pub const SHOW_DURATION: Duration = Duration::from_millis(150);

/// Duration of the hide transition.
pub const HIDE_DURATION: Duration = Duration::from_millis(150);

/// Displays toast elements.
///
/// `present` is called once per toast, after its element has been attached.
/// It should show the toast, keep it up until its duration has passed or
/// `dismissed` is cancelled, hide it, and only then return. The caller
/// removes the element afterwards.
#[async_trait]
pub trait ToastHost: Send + Sync {
    async fn present(
        &self,
        document: &Document,
        element: NodeId,
        toast: &Toast,
        dismissed: CancellationToken,
    );
}

/// Default host: drives CSS-style transitions through classes.
///
/// `showing` during the show transition, `show` while visible and `hiding`
/// during the hide transition.
#[derive(Debug, Clone)]
pub struct AnimatedToastHost {
    show: Duration,
    hide: Duration,
}

impl AnimatedToastHost {
    pub fn new() -> Self {
        Self {
            show: SHOW_DURATION,
            hide: HIDE_DURATION,
        }
    }

    pub fn with_transitions(show: Duration, hide: Duration) -> Self {
        Self { show, hide }
    }
}

impl Default for AnimatedToastHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToastHost for AnimatedToastHost {
    async fn present(
        &self,
        document: &Document,
        element: NodeId,
        toast: &Toast,
        dismissed: CancellationToken,
    ) {
        document.add_class(element, "showing");
        tokio::select! {
            _ = dismissed.cancelled() => {}
            _ = tokio::time::sleep(self.show) => {}
        }
        document.remove_class(element, "showing");

        if !dismissed.is_cancelled() {
            document.add_class(element, "show");
            tokio::select! {
                _ = dismissed.cancelled() => {}
                _ = tokio::time::sleep(toast.duration) => {}
            }
            document.remove_class(element, "show");
        }

        document.add_class(element, "hiding");
        tokio::time::sleep(self.hide).await;
        log::debug!("AnimatedToastHost: toast {element} hidden");
    }
}
