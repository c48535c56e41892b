//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ElementId`] - Validated element identifier (doubles as a regex capture
//!   group name)
//! - [`PatternId`] - Validated naming-pattern identifier
//! - [`ScopeKey`] - Opaque namespace scope key
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values cannot
//! be represented, preventing entire classes of bugs: in particular, an
//! [`ElementId`] is always a legal regex capture group name, so matcher
//! construction downstream cannot fail on identifier syntax.
//!
//! # Examples
//!
//! ```
//! use namecast::core::types::{ElementId, PatternId};
//!
//! // Valid constructions
//! let id = ElementId::new("prefix_1").unwrap();
//! assert_eq!(id.as_str(), "prefix_1");
//!
//! // Invalid constructions fail at creation time
//! assert!(ElementId::new("1prefix").is_err());
//! assert!(ElementId::new("has space").is_err());
//! assert!(PatternId::new("").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid element id: {0}")]
    InvalidElementId(String),

    #[error("invalid pattern id: {0}")]
    InvalidPatternId(String),
}

/// A validated element identifier.
///
/// Element ids become named capture groups in the compiled matching
/// expression, so they must be valid identifier-style names:
/// - Non-empty
/// - First character is an ASCII letter or `_`
/// - Remaining characters are ASCII alphanumeric or `_`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementId(String);

impl ElementId {
    /// Create a new validated element id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidElementId` if the id is empty or contains
    /// characters that are not legal in a capture group name.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    fn validate(id: &str) -> Result<(), TypeError> {
        let mut chars = id.chars();
        match chars.next() {
            None => {
                return Err(TypeError::InvalidElementId(
                    "element id cannot be empty".into(),
                ));
            }
            Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
                return Err(TypeError::InvalidElementId(format!(
                    "element id must start with a letter or '_', got '{c}'"
                )));
            }
            Some(_) => {}
        }
        for c in chars {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                return Err(TypeError::InvalidElementId(format!(
                    "element id cannot contain '{c}'"
                )));
            }
        }
        Ok(())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ElementId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

impl AsRef<str> for ElementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated naming-pattern identifier.
///
/// Pattern ids are free-form but must be non-empty and free of ASCII control
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatternId(String);

impl PatternId {
    /// Create a new validated pattern id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPatternId` if the id is empty or contains
    /// control characters.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::InvalidPatternId(
                "pattern id cannot be empty".into(),
            ));
        }
        if id.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidPatternId(
                "pattern id cannot contain control characters".into(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PatternId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PatternId> for String {
    fn from(id: PatternId) -> Self {
        id.0
    }
}

impl AsRef<str> for PatternId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PatternId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque namespace scope key.
///
/// Selects which [`crate::namespace::Namespace`] applies to a rename target:
/// the same key for all entities of one kind within one container, distinct
/// keys across containers or kinds. The core assumes nothing about the key's
/// structure beyond equality and hashability; hosts choose the encoding.
///
/// # Example
///
/// ```
/// use namecast::core::types::ScopeKey;
///
/// let a = ScopeKey::new("objects/scene-1");
/// let b = ScopeKey::new("objects/scene-1");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeKey(String);

impl ScopeKey {
    /// Create a scope key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
