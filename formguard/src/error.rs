//! Error types

use crate::dom::NodeId;

/// Errors raised while wiring a validator. Validation failures are not
/// errors; see [`ValidationError`](crate::validation::ValidationError).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Deferred work needs a tokio runtime to spawn onto.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// A handle passed as a form is something else.
    #[error("node {0} is not a form")]
    NotAForm(NodeId),

    /// The node was removed from the document.
    #[error("node {0} is not in the document")]
    MissingNode(NodeId),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
