//! Structured diagnostics surfaced to the embedder.

use std::fmt;

/// A non-fatal problem encountered during style resolution.
///
/// The resolver never formats or prints these itself; the embedder
/// decides how (and whether) to report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Identity of the offending source: a sheet href, a document href,
    /// or a supplementary-sheet label.
    pub source: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            source: source.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}
