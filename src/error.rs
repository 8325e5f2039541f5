//! Error types for resolution and sealed storage.

use std::fmt;

use crate::key::Key;
use crate::tag::TagSet;

/// Resolution errors.
///
/// Resolution fails in exactly two ways: the key was never registered, or
/// candidates exist but filtering could not isolate one. Both variants carry
/// the full query (key, qualifiers, group) so the rendered message is
/// diagnostic on its own.
///
/// # Examples
///
/// ```rust
/// use sealed_di::{InjectError, Injector};
///
/// struct Config;
///
/// let injector = Injector::new();
/// match injector.resolve::<Config>() {
///     Err(InjectError::NotFound { key, .. }) => {
///         assert!(key.display_name().contains("Config"));
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum InjectError {
    /// No candidate list exists for the key, neither in the requested group
    /// nor at the top level.
    NotFound {
        /// The key the query asked for.
        key: Key,
        /// Qualifiers the query carried.
        qualifiers: TagSet,
        /// Group the query named, if any.
        group: Option<String>,
    },
    /// Candidates exist but no filtering stage isolated exactly one.
    ///
    /// This also covers the case where a stage filtered the working set down
    /// to nothing usable (for example, an instance-scoped query against a
    /// key that only has ready instances): the list was non-empty, so the
    /// outcome is ambiguity rather than absence.
    MoreThanOne {
        /// The key the query asked for.
        key: Key,
        /// Qualifiers the query carried.
        qualifiers: TagSet,
        /// Group the query named, if any.
        group: Option<String>,
    },
}

impl InjectError {
    /// The key of the failed query.
    pub fn key(&self) -> Key {
        match self {
            InjectError::NotFound { key, .. } => *key,
            InjectError::MoreThanOne { key, .. } => *key,
        }
    }

    /// The qualifiers of the failed query.
    pub fn qualifiers(&self) -> &TagSet {
        match self {
            InjectError::NotFound { qualifiers, .. } => qualifiers,
            InjectError::MoreThanOne { qualifiers, .. } => qualifiers,
        }
    }

    /// The group of the failed query, if one was named.
    pub fn group(&self) -> Option<&str> {
        match self {
            InjectError::NotFound { group, .. } => group.as_deref(),
            InjectError::MoreThanOne { group, .. } => group.as_deref(),
        }
    }
}

impl fmt::Display for InjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectError::NotFound {
                key,
                qualifiers,
                group,
            } => write!(
                f,
                "No candidate registered for {} with qualifiers {} and group {}; \
                 register one through Injector::bind or Injector::register",
                key.display_name(),
                qualifiers,
                group.as_deref().unwrap_or("undefined"),
            ),
            InjectError::MoreThanOne {
                key,
                qualifiers,
                group,
            } => write!(
                f,
                "More than one candidate registered for {} with qualifiers {} and group {}; \
                 add a qualifier or a mock marker to tell them apart",
                key.display_name(),
                qualifiers,
                group.as_deref().unwrap_or("undefined"),
            ),
        }
    }
}

impl std::error::Error for InjectError {}

/// Result type for resolution operations
///
/// A convenience alias for `Result<T, InjectError>` used throughout the
/// resolution surface.
pub type InjectResult<T> = Result<T, InjectError>;

/// Storage failures.
///
/// The sealed storage layer never panics and never returns errors through
/// its accessors; failures are wrapped in this type and handed to the
/// injectable error hook while the accessor reports "no value". One
/// message-carrying kind covers backend, sealing, and encoding failures.
#[derive(Debug, Clone)]
pub struct StorageError(String);

impl StorageError {
    pub fn new(message: impl Into<String>) -> StorageError {
        StorageError(message.into())
    }

    /// The failure description.
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage error: {}", self.0)
    }
}

impl std::error::Error for StorageError {}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> StorageError {
        StorageError(format!("value encoding failed: {}", err))
    }
}
