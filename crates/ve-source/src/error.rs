//! Source resolution errors.

/// Resolution failure.
///
/// Fetch failures and malformed locators are folded into [`NotFound`]:
/// callers cannot tell a wrong path from a missing document, and both end up
/// as "not found".
///
/// [`NotFound`]: SourceError::NotFound
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// No document matched the locator.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl SourceError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}
