//! OAuth scope handling.
//!
//! This module provides the [`Scopes`] type for the ordered list of scopes
//! requested in the client-credentials flow.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// An ordered, de-duplicated list of OAuth scopes.
///
/// commercetools scopes carry the project key, for example
/// `view_orders:my-project`. They are sent space-separated in token requests,
/// which is what the [`Display`](fmt::Display) implementation produces.
///
/// # Example
///
/// ```rust
/// use commercetools_client::Scopes;
///
/// let scopes: Scopes = "view_orders:my-project, view_products:my-project".parse().unwrap();
/// assert_eq!(scopes.len(), 2);
/// assert_eq!(scopes.to_string(), "view_orders:my-project view_products:my-project");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Scopes {
    scopes: Vec<String>,
}

impl Scopes {
    /// Creates an empty scope list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no scopes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns the number of scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns an iterator over the scopes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    fn push(&mut self, scope: &str) {
        let scope = scope.trim();
        if !scope.is_empty() && !self.scopes.iter().any(|s| s == scope) {
            self.scopes.push(scope.to_string());
        }
    }
}

impl FromStr for Scopes {
    type Err = ConfigError;

    /// Parses a comma-separated scope list, trimming each entry.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = Self::new();

        for scope in s.split(',') {
            let scope = scope.trim();
            if scope.contains(char::is_whitespace) {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Whitespace inside scope: '{scope}'"),
                });
            }
            scopes.push(scope);
        }

        Ok(scopes)
    }
}

impl<S: Into<String>> FromIterator<S> for Scopes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut scopes = Self::new();
        for scope in iter {
            scopes.push(&scope.into());
        }
        scopes
    }
}

impl From<Vec<String>> for Scopes {
    fn from(scopes: Vec<String>) -> Self {
        scopes.into_iter().collect()
    }
}

impl fmt::Display for Scopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_parse_comma_separated_and_trim() {
        let scopes: Scopes = "view_orders:my-project, view_products:my-project"
            .parse()
            .unwrap();
        let collected: Vec<&str> = scopes.iter().collect();
        assert_eq!(
            collected,
            vec!["view_orders:my-project", "view_products:my-project"]
        );
    }

    #[test]
    fn test_scopes_skip_empty_entries_and_duplicates() {
        let scopes: Scopes = "a,,b, a ,".parse().unwrap();
        assert_eq!(scopes.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_scopes_reject_inner_whitespace() {
        let result: Result<Scopes, _> = "view orders".parse();
        assert!(matches!(result, Err(ConfigError::InvalidScopes { .. })));
    }

    #[test]
    fn test_scopes_display_is_space_separated() {
        let scopes = Scopes::from(vec!["a:p".to_string(), "b:p".to_string()]);
        assert_eq!(scopes.to_string(), "a:p b:p");
    }

    #[test]
    fn test_empty_scopes() {
        let scopes: Scopes = "".parse().unwrap();
        assert!(scopes.is_empty());
        assert_eq!(scopes.to_string(), "");
    }
}
