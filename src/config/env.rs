//! Environment variable lookup.
//!
//! Settings missing from the explicit configuration are read from variables
//! named `CT_<KEY>`, falling back to `CTP_<KEY>`. Lookups go through the
//! [`EnvSource`] trait so tests can supply a fixed map instead of touching the
//! process environment.

use std::collections::HashMap;
use std::fmt;

use crate::error::ConfigError;

/// Primary environment variable prefix.
pub const ENV_PREFIX: &str = "CT_";

/// Alternative prefix used by the official commercetools tooling.
pub const ALT_ENV_PREFIX: &str = "CTP_";

/// A source of environment variables.
pub trait EnvSource: fmt::Debug + Send + Sync {
    /// Returns the value of the variable `name`, if set and non-empty.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads variables from the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.is_empty()).cloned()
    }
}

/// Looks up `CT_<key>`, then `CTP_<key>`.
pub fn env_property(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.var(&format!("{ENV_PREFIX}{key}"))
        .or_else(|| env.var(&format!("{ALT_ENV_PREFIX}{key}")))
}

/// Like [`env_property`], but a missing variable is an error.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] when neither variable is set.
pub fn require_env_property(env: &dyn EnvSource, key: &'static str) -> Result<String, ConfigError> {
    env_property(env, key).ok_or(ConfigError::MissingEnvVar { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_ct_prefix_takes_precedence() {
        let env = env(&[("CT_PROJECT_KEY", "primary"), ("CTP_PROJECT_KEY", "alt")]);
        assert_eq!(env_property(&env, "PROJECT_KEY"), Some("primary".to_string()));
    }

    #[test]
    fn test_falls_back_to_ctp_prefix() {
        let env = env(&[("CTP_PROJECT_KEY", "alt")]);
        assert_eq!(env_property(&env, "PROJECT_KEY"), Some("alt".to_string()));
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let env = env(&[("CT_CLIENT_ID", "")]);
        assert_eq!(env_property(&env, "CLIENT_ID"), None);
    }

    #[test]
    fn test_require_reports_key() {
        let env = HashMap::new();
        let result = require_env_property(&env, "API_URL");
        assert_eq!(result, Err(ConfigError::MissingEnvVar { key: "API_URL" }));
    }
}
