//! Helpers for composing commercetools query predicates.
//!
//! Absent fragments are skipped, so optional filters can be passed straight
//! through:
//!
//! ```rust
//! use commercetools_client::query_predicate::{and, or};
//!
//! let name = Some("a");
//! let description: Option<&str> = None;
//! let slug = Some("b");
//!
//! let predicate = and([
//!     name.map(|n| format!(r#"name = "{n}""#)),
//!     description.map(|d| format!(r#"description = "{d}""#)),
//!     slug.map(|s| format!(r#"slug = "{s}""#)),
//!     or([Some("x"), Some("y")]),
//! ]);
//!
//! assert_eq!(
//!     predicate.as_deref(),
//!     Some(r#"(name = "a") and (slug = "b") and ((x) or (y))"#)
//! );
//! ```

/// Joins the present fragments with `" and "`.
///
/// Fragments are parenthesized only when more than one is present. Returns
/// `None` when no fragment is present.
#[must_use]
pub fn and<I, S>(items: I) -> Option<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    join(items, " and ")
}

/// Joins the present fragments with `" or "`.
///
/// Fragments are parenthesized only when more than one is present. Returns
/// `None` when no fragment is present.
#[must_use]
pub fn or<I, S>(items: I) -> Option<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    join(items, " or ")
}

fn join<I, S>(items: I, separator: &str) -> Option<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let present: Vec<S> = items.into_iter().flatten().collect();
    match present.as_slice() {
        [] => None,
        [single] => Some(single.as_ref().to_string()),
        many => Some(
            many.iter()
                .map(|item| format!("({})", item.as_ref()))
                .collect::<Vec<_>>()
                .join(separator),
        ),
    }
}
