//! Validator configuration.
//!
//! Everything has a default, so a config file only needs the keys it changes:
//!
//! ```json
//! { "submit_delay_ms": 500, "messages": { "form_submitted": "Thanks!" } }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::toast::DEFAULT_CONTAINER_ID;

/// Delay between an accepted submit and the form reset.
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(2000);

/// How long a toast stays visible unless dismissed.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(5000);

/// User-facing strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Required field left empty.
    pub required: String,
    /// Email field with a malformed address.
    pub invalid_email: String,
    /// Phone field with disallowed characters.
    pub invalid_phone: String,
    /// Error toast after a rejected submit.
    pub form_invalid: String,
    /// Success toast after an accepted submit.
    pub form_submitted: String,
    /// Submit button label while a submission is pending.
    pub submitted_label: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            required: "This field is required".into(),
            invalid_email: "Enter a valid email address".into(),
            invalid_phone: "Enter a valid phone number".into(),
            form_invalid: "Please fix the errors in the form".into(),
            form_submitted: "Message sent successfully!".into(),
            submitted_label: "Sent!".into(),
        }
    }
}

/// Configuration for a [`FieldValidator`](crate::FieldValidator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub messages: Messages,
    pub submit_delay_ms: u64,
    pub toast_duration_ms: u64,
    /// Class marking an invalid field.
    pub invalid_class: String,
    /// Class of the inline error node.
    pub error_class: String,
    /// `id` of the page-global toast container.
    pub toast_container_id: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            messages: Messages::default(),
            submit_delay_ms: DEFAULT_SUBMIT_DELAY.as_millis() as u64,
            toast_duration_ms: DEFAULT_TOAST_DURATION.as_millis() as u64,
            invalid_class: "is-invalid".into(),
            error_class: "invalid-feedback".into(),
            toast_container_id: DEFAULT_CONTAINER_ID.into(),
        }
    }
}

impl ValidatorConfig {
    /// Parse a JSON config, filling missing keys with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_toast_duration(mut self, duration: Duration) -> Self {
        self.toast_duration_ms = duration.as_millis() as u64;
        self
    }
}
