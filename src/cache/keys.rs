use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cache key must not be empty")]
pub struct EmptyKeyError;

/// Non-empty key identifying one logical query in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyKeyError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EmptyKeyError);
        }
        Ok(Self(value))
    }

    /// `<prefix>:<name>`, or just `name` when the prefix is blank.
    pub fn namespaced(prefix: &str, name: &str) -> Result<Self, EmptyKeyError> {
        if name.trim().is_empty() {
            return Err(EmptyKeyError);
        }
        let prefix = prefix.trim();
        if prefix.is_empty() {
            Self::new(name)
        } else {
            Self::new(format!("{prefix}:{name}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_keys() {
        assert_eq!(CacheKey::new(""), Err(EmptyKeyError));
        assert_eq!(CacheKey::new("   "), Err(EmptyKeyError));
        assert_eq!(CacheKey::namespaced("folio", ""), Err(EmptyKeyError));
    }

    #[test]
    fn namespaces_with_prefix() {
        let key = CacheKey::namespaced("folio", "bio").expect("valid key");
        assert_eq!(key.as_str(), "folio:bio");
        assert_eq!(key.to_string(), "folio:bio");
    }

    #[test]
    fn blank_prefix_leaves_name_alone() {
        let key = CacheKey::namespaced(" ", "projects").expect("valid key");
        assert_eq!(key.as_str(), "projects");
    }
}
