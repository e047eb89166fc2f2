//! `${NAME}` and `${NAME:-fallback}` substitution in config strings.
//!
//! A bare `${NAME}` must resolve; a missing variable is a [`ConfigError::EnvVar`]
//! naming the offending field. The `:-` form never fails.

use crate::ConfigError;

/// Substitute environment references in `value`, reporting failures against `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    if let Some(var) = first_unset_required(value) {
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{var}}} not set"),
        });
    }

    Ok(shellexpand::env_with_context_no_errors(value, |var| std::env::var(var).ok()).into_owned())
}

fn first_unset_required(value: &str) -> Option<String> {
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let end = after.find('}')?;
        let inner = &after[..end];
        if !inner.contains(":-") && std::env::var(inner).is_err() {
            return Some(inner.to_owned());
        }
        rest = &after[end + 1..];
    }
    None
}
