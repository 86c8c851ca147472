/// Why a value was rejected. Each variant carries the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field is empty after trimming.
    #[error("{message}")]
    MissingRequiredValue { message: String },

    /// A non-empty email field does not look like `local@domain.tld`.
    #[error("{message}")]
    MalformedEmail { message: String },

    /// A non-empty phone field contains characters other than digits,
    /// whitespace, `-`, `+`, `(` and `)`.
    #[error("{message}")]
    MalformedPhone { message: String },

    /// A non-empty value does not match a custom pattern.
    #[error("{message}")]
    PatternMismatch { message: String },
}

impl ValidationError {
    /// The user-facing message.
    pub fn message(&self) -> &str {
        match self {
            Self::MissingRequiredValue { message }
            | Self::MalformedEmail { message }
            | Self::MalformedPhone { message }
            | Self::PatternMismatch { message } => message,
        }
    }
}
