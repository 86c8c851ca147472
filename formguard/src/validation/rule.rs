use std::sync::LazyLock;

use regex::Regex;

use super::ValidationError;

/// `local@domain.tld`, no whitespace and a single `@`.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Digits, whitespace, `+`, `(`, `)` and `-`.
const PHONE_PATTERN: &str = r"^[0-9\s+()-]+$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern is valid"));

/// Which shape a [`Pattern`] checks for. Decides the error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Email,
    Phone,
    Custom,
}

/// A compiled, fully anchored pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    kind: PatternKind,
    regex: Regex,
}

impl Pattern {
    pub fn email() -> Self {
        Self {
            kind: PatternKind::Email,
            regex: EMAIL_RE.clone(),
        }
    }

    pub fn phone() -> Self {
        Self {
            kind: PatternKind::Phone,
            regex: PHONE_RE.clone(),
        }
    }

    /// Compile a custom pattern. Like the HTML `pattern` attribute it must
    /// match the whole value.
    pub fn custom(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            kind: PatternKind::Custom,
            regex: Regex::new(&format!("^(?:{pattern})$"))?,
        })
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// What a rule checks.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// The value must be non-empty.
    Required,
    /// A non-empty value must match the pattern. Empty values pass.
    Pattern(Pattern),
}

/// A single validation rule with the message shown when it fails.
#[derive(Debug, Clone)]
pub struct Rule {
    pub kind: RuleKind,
    pub message: String,
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Required,
            message: message.into(),
        }
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Pattern(Pattern::email()),
            message: message.into(),
        }
    }

    pub fn phone(message: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Pattern(Pattern::phone()),
            message: message.into(),
        }
    }

    /// A rule for a custom regular expression.
    pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            kind: RuleKind::Pattern(Pattern::custom(pattern)?),
            message: message.into(),
        })
    }

    /// Check an already trimmed value.
    pub fn check(&self, value: &str) -> Result<(), ValidationError> {
        let message = || self.message.clone();
        match &self.kind {
            RuleKind::Required if value.is_empty() => {
                Err(ValidationError::MissingRequiredValue { message: message() })
            }
            RuleKind::Pattern(pattern) if !value.is_empty() && !pattern.is_match(value) => {
                Err(match pattern.kind() {
                    PatternKind::Email => ValidationError::MalformedEmail { message: message() },
                    PatternKind::Phone => ValidationError::MalformedPhone { message: message() },
                    PatternKind::Custom => ValidationError::PatternMismatch { message: message() },
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_empty_only() {
        let rule = Rule::required("required");
        assert_eq!(
            rule.check(""),
            Err(ValidationError::MissingRequiredValue {
                message: "required".into()
            })
        );
        assert!(rule.check("x").is_ok());
    }

    #[test]
    fn test_email_shapes() {
        let rule = Rule::email("bad email");
        for ok in ["a@b.com", "first.last@sub.example.org", "x+tag@y.z"] {
            assert!(rule.check(ok).is_ok(), "{ok} should pass");
        }
        for bad in ["a@b", "a b@c.d", "@b.com", "a@.", "a@@b.com", "plain"] {
            assert!(
                matches!(rule.check(bad), Err(ValidationError::MalformedEmail { .. })),
                "{bad} should fail"
            );
        }
    }

    #[test]
    fn test_phone_shapes() {
        let rule = Rule::phone("bad phone");
        for ok in ["+1 (555) 123-4567", "5551234", "8 800 555 35 35"] {
            assert!(rule.check(ok).is_ok(), "{ok} should pass");
        }
        for bad in ["555-CALL", "12.34", "+1#2", "phone"] {
            assert!(
                matches!(rule.check(bad), Err(ValidationError::MalformedPhone { .. })),
                "{bad} should fail"
            );
        }
    }

    #[test]
    fn test_patterns_accept_empty_values() {
        assert!(Rule::email("m").check("").is_ok());
        assert!(Rule::phone("m").check("").is_ok());
    }

    #[test]
    fn test_custom_pattern_is_anchored() {
        let rule = Rule::pattern("[0-9]{5}", "zip").expect("valid pattern");
        assert!(rule.check("12345").is_ok());
        assert!(matches!(
            rule.check("123456"),
            Err(ValidationError::PatternMismatch { .. })
        ));
        assert!(Rule::pattern("(", "broken").is_err());
    }
}
