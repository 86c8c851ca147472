use crate::config::Messages;
use crate::field::{Field, FieldType};

use super::{Rule, ValidationError};

/// Ordered list of rules. Evaluation stops at the first failure.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules implied by a field's attributes: `required` first, then the
    /// pattern for its type.
    pub fn for_field(field: &Field, messages: &Messages) -> Self {
        let mut rules = Self::new();
        if field.required {
            rules.push(Rule::required(&messages.required));
        }
        match field.field_type {
            FieldType::Email => rules.push(Rule::email(&messages.invalid_email)),
            FieldType::Tel => rules.push(Rule::phone(&messages.invalid_phone)),
            FieldType::Text | FieldType::Other => {}
        }
        rules
    }

    /// Append a rule.
    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Trim `value` and check it against each rule in order.
    pub fn evaluate(&self, value: &str) -> Result<(), ValidationError> {
        let value = value.trim();
        self.rules.iter().try_for_each(|rule| rule.check(value))
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeId;
    use crate::validation::RuleKind;

    fn field(field_type: FieldType, required: bool) -> Field {
        Field {
            node: NodeId::new(0, 0),
            name: None,
            field_type,
            required,
            value: String::new(),
            disabled: false,
        }
    }

    #[test]
    fn test_derived_rule_order() {
        let messages = Messages::default();
        let rules = RuleSet::for_field(&field(FieldType::Email, true), &messages);
        let kinds: Vec<_> = rules
            .iter()
            .map(|rule| matches!(rule.kind, RuleKind::Required))
            .collect();
        assert_eq!(kinds, vec![true, false]);

        assert!(RuleSet::for_field(&field(FieldType::Text, false), &messages).is_empty());
        assert_eq!(
            RuleSet::for_field(&field(FieldType::Tel, false), &messages).len(),
            1
        );
    }

    #[test]
    fn test_required_wins_over_pattern() {
        let messages = Messages::default();
        let rules = RuleSet::for_field(&field(FieldType::Email, true), &messages);
        assert_eq!(
            rules.evaluate("   "),
            Err(ValidationError::MissingRequiredValue {
                message: messages.required.clone()
            })
        );
    }

    #[test]
    fn test_value_is_trimmed_before_matching() {
        let messages = Messages::default();
        let rules = RuleSet::for_field(&field(FieldType::Email, false), &messages);
        assert!(rules.evaluate("  a@b.com\n").is_ok());
        assert!(rules.evaluate("  ").is_ok());
    }

    #[test]
    fn test_first_failure_is_reported() {
        let rules: RuleSet = [
            Rule::pattern("[a-z]+", "lowercase").expect("valid"),
            Rule::pattern(".{3,}", "too short").expect("valid"),
        ]
        .into_iter()
        .collect();

        let err = rules.evaluate("AB").expect_err("both rules fail");
        assert_eq!(err.message(), "lowercase");
        assert_eq!(rules.evaluate("ab").expect_err("length").message(), "too short");
        assert!(rules.evaluate("abc").is_ok());
    }
}
