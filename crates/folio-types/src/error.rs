//! Error types for the folio style engine.

/// Errors produced by style resolution and its collaborators.
///
/// None of these are fatal to resolving a document: the resolver always
/// degrades (skips the rule, sheet, or declaration block) and records a
/// diagnostic instead of aborting.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("selector error: {0}")]
    Selector(String),

    #[error("CSS parse error: {0}")]
    CssParse(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("profile error: {0}")]
    Profile(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, StyleError>;
