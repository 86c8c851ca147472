//! Form validation with inline errors and toast feedback.
//!
//! `formguard` validates the fields of a form on blur and on submit, shows an
//! inline error next to each offending field, and reports the outcome of a
//! submit through transient toast notifications. Everything runs against the
//! in-process [`dom::Document`], which stands in for the host UI runtime.

pub mod config;
pub mod dom;
pub mod error;
pub mod field;
pub mod schedule;
pub mod submit;
pub mod toast;
pub mod validation;
mod validator;

pub use config::{Messages, ValidatorConfig};
pub use error::{Error, Result};
pub use validator::{FieldValidator, FieldValidatorBuilder};

pub mod prelude {
    pub use crate::config::{Messages, ValidatorConfig};
    pub use crate::dom::{Document, Element, Event, EventKind, NodeId};
    pub use crate::field::{Field, FieldType};
    pub use crate::schedule::{ScheduledTask, TaskState};
    pub use crate::submit::{FormPayload, SubmitOutcome};
    pub use crate::toast::{Toast, ToastHandle, ToastHost, ToastKind};
    pub use crate::validation::{Rule, RuleSet, ValidationError, ValidationResult};
    pub use crate::validator::{FieldValidator, FieldValidatorBuilder};
}
