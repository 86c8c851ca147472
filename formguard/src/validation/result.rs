use crate::dom::NodeId;

use super::ValidationError;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    /// The failing field.
    pub field: NodeId,
    /// Its `name` attribute, if any.
    pub name: Option<String>,
    /// The first rule it broke.
    pub error: ValidationError,
}

/// Result of validating every field of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValidationResult {
    /// All fields passed validation.
    #[default]
    Valid,
    /// One or more fields failed validation.
    Invalid(Vec<FieldFailure>),
}

impl ValidationResult {
    /// Build a result from the collected failures.
    pub fn from_failures(failures: Vec<FieldFailure>) -> Self {
        if failures.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(failures)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// All failures, in field order.
    pub fn failures(&self) -> &[FieldFailure] {
        match self {
            Self::Valid => &[],
            Self::Invalid(failures) => failures,
        }
    }

    pub fn first_failure(&self) -> Option<&FieldFailure> {
        self.failures().first()
    }

    /// The first invalid field, e.g. for focusing.
    pub fn first_invalid_field(&self) -> Option<NodeId> {
        self.first_failure().map(|failure| failure.field)
    }
}
