//! URL-safe slugs derived from display names.

use serde::{Deserialize, Serialize};

/// A lowercase, hyphenated identifier used in URLs (`/products/<slug>`).
///
/// Uniqueness is not enforced here; the backend may reject duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a name.
    ///
    /// Lowercases the input and replaces every run of characters outside
    /// `[a-z0-9]` with a single hyphen. Leading and trailing hyphens are kept,
    /// so `"  Galaxy S24!"` becomes `"-galaxy-s24-"`.
    ///
    /// ```
    /// use techspec_core::Slug;
    ///
    /// assert_eq!(Slug::from_name("Pixel 9 Pro").as_str(), "pixel-9-pro");
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        let mut in_separator = false;

        for c in name.chars().flat_map(char::to_lowercase) {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                slug.push(c);
                in_separator = false;
            } else if !in_separator {
                slug.push('-');
                in_separator = true;
            }
        }

        Self(slug)
    }

    /// Wrap an existing slug (e.g. from a URL path) without re-deriving it.
    #[must_use]
    pub fn from_existing(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_runs_of_separators() {
        assert_eq!(Slug::from_name("iPhone 15 -- Pro Max").as_str(), "iphone-15-pro-max");
    }

    #[test]
    fn test_keeps_edge_hyphens() {
        assert_eq!(Slug::from_name("  Galaxy S24!").as_str(), "-galaxy-s24-");
    }

    #[test]
    fn test_non_ascii_becomes_separator() {
        assert_eq!(Slug::from_name("Café Ñandú").as_str(), "caf-and-");
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(Slug::from_name("").as_str(), "");
    }
}
