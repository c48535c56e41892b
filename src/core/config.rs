//! core::config
//!
//! Declarative configuration schema for naming patterns.
//!
//! # Persistence Record
//!
//! A pattern round-trips to and from a declarative record:
//!
//! ```toml
//! id = "bones"
//!
//! [[elements]]
//! type = "text"
//! id = "base"
//! order = 0
//! separator = "."
//! items = ["Arm", "Leg"]
//!
//! [[elements]]
//! type = "numeric_counter"
//! id = "count"
//! order = 1
//! padding = 3
//! ```
//!
//! Both TOML and JSON encodings are supported; no other wire format is in
//! scope.
//!
//! # Validation
//!
//! Config values are validated after parsing. Variant-specific fields are
//! carried by the closed [`ElementKind`] enum, so the accepted field set per
//! variant is compiler-checked; semantic constraints (counter padding range,
//! axis token tables) are checked by [`ElementConfig::validate`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{ElementId, PatternId, TypeError};

/// X-axis position token sets, most compact first.
pub const XAXIS_CHOICES: [&str; 5] = ["L|R", "l|r", "LEFT|RIGHT", "Left|Right", "left|right"];

/// Y-axis position token set.
pub const YAXIS_TOKENS: &str = "Top|Bot";

/// Z-axis position token set.
pub const ZAXIS_TOKENS: &str = "Fr|Bk";

/// Errors from configuration parsing and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An identifier failed validation.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Two elements in one pattern share an id.
    #[error("duplicate element id: {0}")]
    DuplicateElementId(ElementId),

    /// A pattern has no elements.
    #[error("pattern '{0}' has no elements")]
    EmptyPattern(PatternId),

    /// A variant-specific field holds an unsupported value.
    #[error("invalid config for element '{id}': {reason}")]
    InvalidValue {
        /// Element the problem belongs to.
        id: ElementId,
        /// What is wrong with it.
        reason: String,
    },

    /// TOML decoding failed.
    #[error("failed to parse TOML pattern record: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML encoding failed.
    #[error("failed to encode TOML pattern record: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    /// JSON decoding or encoding failed.
    #[error("failed to parse JSON pattern record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Variant-specific element configuration.
///
/// One case per supported element kind; the set is closed and dispatched by
/// exhaustive matching. The serde tag is the `type` field of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// Text drawn from a finite vocabulary, or free-form when `items` is
    /// empty.
    Text {
        /// Accepted values. Empty means unconstrained.
        #[serde(default)]
        items: Vec<String>,
    },

    /// Positional indicator (left/right, top/bottom, front/back).
    Position {
        /// X-axis token set, one of [`XAXIS_CHOICES`] (e.g. `"L|R"`).
        #[serde(default)]
        xaxis: Option<String>,
        /// Include the Y-axis tokens (`Top|Bot`).
        #[serde(default)]
        yaxis: bool,
        /// Include the Z-axis tokens (`Fr|Bk`).
        #[serde(default)]
        zaxis: bool,
    },

    /// Fixed-width, zero-padded decimal counter.
    NumericCounter {
        /// Digit count, 1..=10.
        #[serde(default = "default_padding")]
        padding: u32,
    },

    /// Alphabetic counter (A, B, ... Z, AA, AB, ...).
    AlphabeticCounter {
        /// Render and match upper case letters.
        #[serde(default = "default_true")]
        uppercase: bool,
        /// Maximum letter count, 1..=6.
        #[serde(default = "default_max_length")]
        max_length: u32,
    },

    /// The host application's automatic duplicate suffix (`.001` appended at
    /// the end of a name). Parse-oriented; forced to sort last.
    HostCounter {},
}

fn default_true() -> bool {
    true
}

fn default_padding() -> u32 {
    2
}

fn default_max_length() -> u32 {
    3
}

impl ElementKind {
    /// Stable tag for this variant, matching the serde `type` field.
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Text { .. } => "text",
            ElementKind::Position { .. } => "position",
            ElementKind::NumericCounter { .. } => "numeric_counter",
            ElementKind::AlphabeticCounter { .. } => "alphabetic_counter",
            ElementKind::HostCounter {} => "host_counter",
        }
    }

    /// Whether this variant can be incremented during conflict resolution.
    pub fn is_counter(&self) -> bool {
        matches!(
            self,
            ElementKind::NumericCounter { .. }
                | ElementKind::AlphabeticCounter { .. }
                | ElementKind::HostCounter {}
        )
    }
}

/// Configuration for one name element.
///
/// Common fields are shared by every variant; `kind` carries the
/// variant-specific ones, flattened into the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    /// Unique id within the pattern; becomes the capture group name.
    pub id: ElementId,

    /// Render/parse position. Ties are broken by declaration order.
    #[serde(default)]
    pub order: i32,

    /// Disabled elements contribute neither text nor separator.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Separator emitted after this element when rendering. Empty allowed.
    #[serde(default)]
    pub separator: String,

    /// Variant-specific fields.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl ElementConfig {
    /// Validate variant-specific constraints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` describing the first violated
    /// constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            id: self.id.clone(),
            reason,
        };

        match &self.kind {
            ElementKind::Text { items } => {
                if items.iter().any(|item| item.is_empty()) {
                    return Err(invalid("items cannot contain empty strings".into()));
                }
            }
            ElementKind::Position {
                xaxis,
                yaxis,
                zaxis,
            } => {
                if let Some(xaxis) = xaxis {
                    if !XAXIS_CHOICES.contains(&xaxis.as_str()) {
                        return Err(invalid(format!(
                            "xaxis must be one of {}, got '{xaxis}'",
                            XAXIS_CHOICES.join(", ")
                        )));
                    }
                }
                if xaxis.is_none() && !yaxis && !zaxis {
                    return Err(invalid("at least one axis must be enabled".into()));
                }
            }
            ElementKind::NumericCounter { padding } => {
                if !(1..=10).contains(padding) {
                    return Err(invalid(format!(
                        "padding must be between 1 and 10, got {padding}"
                    )));
                }
            }
            ElementKind::AlphabeticCounter { max_length, .. } => {
                if !(1..=6).contains(max_length) {
                    return Err(invalid(format!(
                        "max_length must be between 1 and 6, got {max_length}"
                    )));
                }
            }
            ElementKind::HostCounter {} => {}
        }

        Ok(())
    }

    /// The position token vocabulary for a position element.
    ///
    /// Empty for non-position variants.
    pub fn position_tokens(&self) -> Vec<&str> {
        match &self.kind {
            ElementKind::Position {
                xaxis,
                yaxis,
                zaxis,
            } => {
                let mut tokens = Vec::new();
                if let Some(xaxis) = xaxis {
                    tokens.extend(xaxis.split('|'));
                }
                if *yaxis {
                    tokens.extend(YAXIS_TOKENS.split('|'));
                }
                if *zaxis {
                    tokens.extend(ZAXIS_TOKENS.split('|'));
                }
                tokens
            }
            _ => Vec::new(),
        }
    }
}

/// The declarative pattern record: `{ pattern_id, elements }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Pattern identifier.
    pub id: PatternId,

    /// Element configurations in declaration order.
    #[serde(default)]
    pub elements: Vec<ElementConfig>,
}

impl PatternConfig {
    /// Validate the whole record: element ids unique, every element's
    /// variant constraints satisfied, at least one element present.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.elements.is_empty() {
            return Err(ConfigError::EmptyPattern(self.id.clone()));
        }

        let mut seen = std::collections::HashSet::new();
        for element in &self.elements {
            if !seen.insert(&element.id) {
                return Err(ConfigError::DuplicateElementId(element.id.clone()));
            }
            element.validate()?;
        }

        Ok(())
    }

    /// Decode a pattern record from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode the pattern record as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Decode a pattern record from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode the pattern record as JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
