//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Bare `$VAR` is left alone; only the braced form is expanded.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_expand_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("METRO_EXPAND_SIMPLE", "wiki.example.com");
        }
        let result = expand_env("https://${METRO_EXPAND_SIMPLE}/", "confluence.base_url").unwrap();
        assert_eq!(result, "https://wiki.example.com/");
        unsafe {
            std::env::remove_var("METRO_EXPAND_SIMPLE");
        }
    }

    #[test]
    fn test_expand_default() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("METRO_EXPAND_UNSET");
        }
        let result = expand_env("${METRO_EXPAND_UNSET:-bot}", "confluence.username").unwrap();
        assert_eq!(result, "bot");
    }

    #[test]
    fn test_expand_missing_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("METRO_EXPAND_MISSING");
        }
        let err = expand_env("${METRO_EXPAND_MISSING}", "confluence.password").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("METRO_EXPAND_MISSING"));
        assert!(err.to_string().contains("confluence.password"));
    }

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(expand_env("pa$$word", "confluence.password").unwrap(), "pa$$word");
        assert_eq!(expand_env("plain", "confluence.username").unwrap(), "plain");
    }
}
