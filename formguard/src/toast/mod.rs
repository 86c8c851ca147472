//! Toast notifications.
//!
//! A [`Toaster`] renders toasts into a single page-global container and hands
//! each one to a [`ToastHost`], which animates it and reports when it has
//! finished hiding. The element is removed from the document at that point.

mod host;
mod toaster;

pub use host::{AnimatedToastHost, HIDE_DURATION, SHOW_DURATION, ToastHost};
pub use toaster::{DEFAULT_CONTAINER_ID, ToastHandle, Toaster};

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TOAST_DURATION;

/// Outcome a toast reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    /// Modifier class added next to `toast`.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Success => "toast-success",
            Self::Error => "toast-error",
        }
    }
}

/// A toast notification.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use formguard::toast::{Toast, ToastKind};
///
/// let toast = Toast::error("Please fix the errors in the form")
///     .with_duration(Duration::from_secs(10));
/// assert_eq!(toast.kind, ToastKind::Error);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    /// How long to show the toast before hiding it.
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            duration: DEFAULT_TOAST_DURATION,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Error)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}
