//! Field validation rules.
//!
//! Every field is checked against an ordered [`RuleSet`]. By default the set
//! is derived from the field's attributes, but any field can be given an
//! explicit set instead, which keeps rules data-driven and testable without a
//! document.
//!
//! # Example
//!
//! ```
//! use formguard::validation::{Rule, RuleSet, ValidationError};
//!
//! let rules = RuleSet::new()
//!     .with(Rule::required("Email is required"))
//!     .with(Rule::email("Enter a valid email address"));
//!
//! assert!(rules.evaluate(" a@b.com ").is_ok());
//! assert!(matches!(
//!     rules.evaluate("a@b"),
//!     Err(ValidationError::MalformedEmail { .. })
//! ));
//! ```

mod error;
mod result;
mod rule;
mod rule_set;

pub use error::ValidationError;
pub use result::{FieldFailure, ValidationResult};
pub use rule::{Pattern, PatternKind, Rule, RuleKind};
pub use rule_set::RuleSet;
