//! Submission outcomes.

use serde::Serialize;

use crate::dom::{Document, NodeId};
use crate::field::Field;
use crate::schedule::ScheduledTask;
use crate::toast::ToastHandle;
use crate::validation::ValidationResult;

/// Name/value pairs a submission would send, in field order.
///
/// Like browser form data, unnamed and disabled fields are left out and
/// repeated names are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormPayload {
    entries: Vec<(String, String)>,
}

impl FormPayload {
    /// Collect the payload of `form` as it stands.
    pub fn collect(document: &Document, form: NodeId) -> Self {
        let entries = document
            .form_fields(form)
            .into_iter()
            .filter_map(|node| Field::read(document, node))
            .filter(|field| !field.disabled)
            .filter_map(|field| field.name.map(|name| (name, field.value)))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a JSON array of `[name, value]` pairs.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// What happened to a submit.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Every field passed. The form resets and a success toast appears when
    /// `task` completes; cancel it to abandon both.
    Accepted {
        payload: FormPayload,
        task: ScheduledTask,
    },
    /// At least one field failed; an error toast is showing.
    Rejected {
        result: ValidationResult,
        toast: ToastHandle,
    },
    /// An earlier accepted submit of this form has not finished yet.
    Pending(ScheduledTask),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// The deferred reset task, for accepted and pending submits.
    pub fn task(&self) -> Option<&ScheduledTask> {
        match self {
            Self::Accepted { task, .. } | Self::Pending(task) => Some(task),
            Self::Rejected { .. } => None,
        }
    }
}
