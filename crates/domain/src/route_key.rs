//! Route key value object

use std::fmt;

/// Identifies one chaos-configurable endpoint.
///
/// The key is the HTTP method token concatenated with the URL path
/// exactly as received (e.g. `"POST/api/a"`). There is no wildcard or
/// prefix matching, and no normalization of the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey(String);

impl RouteKey {
    /// Build a key from an HTTP method and a URL path.
    pub fn new(method: impl AsRef<str>, path: impl AsRef<str>) -> Self {
        Self(format!("{}{}", method.as_ref(), path.as_ref()))
    }

    /// The raw key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
