use std::error::Error;
use std::fmt;

type Source = Box<dyn Error + Send + Sync>;

/// What went wrong, independent of the backend.
///
/// Failed reads are never retried, so the kind only decides whether a caller
/// reports "not found" or a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    NotFound,
    /// Credentials rejected or missing.
    Denied,
    InvalidKey,
    /// Transport failure, timeout, throttling, or a 5xx response.
    Unavailable,
    Other,
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "Not found",
            Self::Denied => "Access denied",
            Self::InvalidKey => "Invalid key",
            Self::Unavailable => "Unavailable",
            Self::Other => "Error",
        })
    }
}

/// Object storage failure.
///
/// Displays as `[Backend] Kind: source (key: ...)`, omitting the parts that
/// are unset.
#[derive(Debug)]
pub struct StorageError {
    pub kind: StorageErrorKind,
    /// Key or prefix the operation was about.
    pub key: Option<String>,
    /// Backend name, e.g. `S3`.
    pub backend: Option<&'static str>,
    source: Option<Source>,
}

impl StorageError {
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            key: None,
            backend: None,
            source: None,
        }
    }

    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_key(key)
    }

    /// Classify an HTTP status returned by a storage API.
    #[must_use]
    pub fn from_status(code: u16) -> Self {
        let kind = match code {
            404 => StorageErrorKind::NotFound,
            401 | 403 => StorageErrorKind::Denied,
            400 => StorageErrorKind::InvalidKey,
            408 | 429 | 500..=599 => StorageErrorKind::Unavailable,
            _ => StorageErrorKind::Other,
        };
        Self::new(kind)
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }
        write!(f, "{}", self.kind)?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {key})")?;
        }
        Ok(())
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|s| s as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_http_statuses() {
        let kinds: Vec<_> = [404, 403, 400, 429, 503, 302]
            .into_iter()
            .map(|code| StorageError::from_status(code).kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                StorageErrorKind::NotFound,
                StorageErrorKind::Denied,
                StorageErrorKind::InvalidKey,
                StorageErrorKind::Unavailable,
                StorageErrorKind::Unavailable,
                StorageErrorKind::Other,
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(StorageError::not_found("demo/a.md").to_string(), "Not found (key: demo/a.md)");

        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = StorageError::new(StorageErrorKind::Unavailable)
            .with_backend("Gcs")
            .with_key("demo/")
            .with_source(reset);
        assert_eq!(err.to_string(), "[Gcs] Unavailable: reset (key: demo/)");
        assert!(err.source().is_some());
    }
}
