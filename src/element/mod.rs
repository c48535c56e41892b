//! element
//!
//! The closed set of name-element variants.
//!
//! # Architecture
//!
//! A [`NameElement`] is one configurable segment of a name: free/vocabulary
//! text, a positional token, or a counter. The variant set is closed
//! ([`ElementKind`]) and dispatched by exhaustive matching; there is no open
//! registry of element types.
//!
//! Each element derives a matching sub-expression from its configuration and
//! caches the compiled form behind a generation counter: any configuration
//! change bumps the generation, and the matcher is rebuilt lazily on the
//! next parse.
//!
//! # Contract
//!
//! - [`NameElement::parse`] never panics on malformed input; failure is
//!   signaled by the returned bool and leaves the prior value untouched
//! - [`NameElement::render`] is cache-consistent: identical output until the
//!   next `set_value`/`parse`/`increment`
//! - [`NameElement::set_value`] rejects invalid values without partial
//!   mutation

pub mod factory;

pub use factory::ElementFactory;

use rand::Rng;
use regex::Regex;
use thiserror::Error;

use crate::core::config::{ConfigError, ElementConfig, ElementKind};
use crate::core::types::ElementId;

/// Digit width of the host application's duplicate suffix (`.001`).
pub const HOST_COUNTER_PADDING: u32 = 3;

/// Errors from element value operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ElementError {
    /// The value violates the variant's constraints.
    #[error("invalid value for element '{id}': {reason}")]
    InvalidValue {
        /// Element the value was offered to.
        id: ElementId,
        /// What is wrong with it.
        reason: String,
    },

    /// Increment was requested on a non-counter variant.
    #[error("element '{id}' is not a counter")]
    NotACounter {
        /// The offending element.
        id: ElementId,
    },

    /// The counter cannot represent any larger value.
    #[error("counter '{id}' exhausted at {ceiling}")]
    CounterExhausted {
        /// The exhausted counter.
        id: ElementId,
        /// Largest representable value.
        ceiling: u64,
    },
}

/// Compiled search expression, stamped with the configuration generation
/// that produced it.
#[derive(Debug)]
struct Matcher {
    generation: u64,
    regex: Regex,
}

/// One configurable segment of a name.
///
/// Holds the current value (plus the integer form for counter variants) and
/// a lazily compiled matcher derived from the configuration.
#[derive(Debug)]
pub struct NameElement {
    config: ElementConfig,
    value: Option<String>,
    counter: Option<u64>,
    generation: u64,
    matcher: Option<Matcher>,
}

impl NameElement {
    /// Build an element from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration violates the variant's
    /// constraints.
    pub fn new(config: ElementConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            value: None,
            counter: None,
            generation: 0,
            matcher: None,
        })
    }

    /// The element's id.
    pub fn id(&self) -> &ElementId {
        &self.config.id
    }

    /// Render/parse position.
    pub fn order(&self) -> i32 {
        self.config.order
    }

    /// Whether the element contributes to rendering.
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Separator emitted after this element.
    pub fn separator(&self) -> &str {
        &self.config.separator
    }

    /// The variant-specific configuration.
    pub fn kind(&self) -> &ElementKind {
        &self.config.kind
    }

    /// Current rendered value, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Current integer value for counter variants.
    pub fn counter_value(&self) -> Option<u64> {
        self.counter
    }

    /// Whether this element can be incremented during conflict resolution.
    pub fn is_counter(&self) -> bool {
        self.config.kind.is_counter()
    }

    /// Whether this is the host duplicate-suffix variant.
    pub fn is_host_counter(&self) -> bool {
        matches!(self.config.kind, ElementKind::HostCounter {})
    }

    /// Replace the configuration, invalidating cached state.
    ///
    /// The current value is cleared: it was validated against the old
    /// configuration and may no longer be representable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the new configuration is invalid; the old
    /// configuration stays in place.
    pub fn update_config(&mut self, config: ElementConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.value = None;
        self.counter = None;
        self.generation += 1;
        Ok(())
    }

    /// Clear the current value.
    pub fn clear_value(&mut self) {
        self.value = None;
        self.counter = None;
    }

    /// The largest value this counter can represent, if it is one.
    pub fn counter_ceiling(&self) -> Option<u64> {
        match &self.config.kind {
            ElementKind::NumericCounter { padding } => Some(10u64.pow(*padding) - 1),
            ElementKind::AlphabeticCounter { max_length, .. } => {
                // Bijective base-26: sum of 26^i for i in 1..=max_length.
                Some((1..=*max_length).map(|i| 26u64.pow(i)).sum())
            }
            ElementKind::HostCounter {} => Some(10u64.pow(HOST_COUNTER_PADDING) - 1),
            _ => None,
        }
    }

    /// The matching sub-expression for this element, without a capture
    /// group. Pattern-level composition wraps it in a named group.
    pub fn sub_expression(&self) -> String {
        match &self.config.kind {
            ElementKind::Text { items } => {
                if items.is_empty() {
                    // Free-form text.
                    "[A-Za-z0-9]+".to_string()
                } else {
                    items
                        .iter()
                        .map(|item| regex::escape(item))
                        .collect::<Vec<_>>()
                        .join("|")
                }
            }
            ElementKind::Position { .. } => self
                .config
                .position_tokens()
                .iter()
                .map(|token| regex::escape(token))
                .collect::<Vec<_>>()
                .join("|"),
            ElementKind::NumericCounter { padding } => format!(r"\d{{{padding}}}"),
            ElementKind::AlphabeticCounter {
                uppercase,
                max_length,
            } => {
                let class = if *uppercase { "[A-Z]" } else { "[a-z]" };
                format!("{class}{{1,{max_length}}}")
            }
            ElementKind::HostCounter {} => format!(r"\d{{{HOST_COUNTER_PADDING}}}"),
        }
    }

    /// The sub-expression wrapped in this element's named capture group,
    /// including any variant-fixed literals (the host counter carries its
    /// leading dot).
    pub fn group_expression(&self) -> String {
        let id = self.config.id.as_str();
        let body = self.sub_expression();
        match &self.config.kind {
            ElementKind::HostCounter {} => format!(r"\.(?P<{id}>{body})"),
            _ => format!("(?P<{id}>{body})"),
        }
    }

    /// Attempt to extract this element's value from a candidate substring.
    ///
    /// On success the captured value is stored and `true` is returned. On
    /// failure the prior value is left untouched and `false` is returned;
    /// malformed input never raises.
    pub fn parse(&mut self, candidate: &str) -> bool {
        // Owned copy: the matcher borrow below is exclusive.
        let id = self.config.id.to_string();
        let regex = match self.search_matcher() {
            Some(regex) => regex,
            None => return false,
        };
        let captured = regex
            .captures(candidate)
            .and_then(|caps| caps.name(&id).map(|m| m.as_str().to_string()));

        match captured {
            Some(text) => {
                self.counter = self.counter_from_text(&text);
                self.value = Some(text);
                true
            }
            None => false,
        }
    }

    /// Render the current value.
    ///
    /// Returns `(text, separator)` when the element is enabled and holds a
    /// value, `None` otherwise.
    pub fn render(&self) -> Option<(&str, &str)> {
        if !self.config.enabled {
            return None;
        }
        self.value
            .as_deref()
            .map(|value| (value, self.config.separator.as_str()))
    }

    /// Set the element's value, validating against variant constraints.
    ///
    /// `None` clears the value. Invalid values are rejected with no partial
    /// mutation.
    ///
    /// # Errors
    ///
    /// Returns `ElementError::InvalidValue` describing the violation.
    pub fn set_value(&mut self, value: Option<&str>) -> Result<(), ElementError> {
        let value = match value {
            None => {
                self.clear_value();
                return Ok(());
            }
            Some(value) => value,
        };

        let invalid = |reason: String| ElementError::InvalidValue {
            id: self.config.id.clone(),
            reason,
        };

        match &self.config.kind {
            ElementKind::Text { items } => {
                if items.is_empty() {
                    if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
                        return Err(invalid(format!(
                            "free-form text must be non-empty alphanumeric, got '{value}'"
                        )));
                    }
                } else if !items.iter().any(|item| item == value) {
                    return Err(invalid(format!("'{value}' is not in the vocabulary")));
                }
                self.value = Some(value.to_string());
            }
            ElementKind::Position { .. } => {
                if !self.config.position_tokens().contains(&value) {
                    return Err(invalid(format!("'{value}' is not a position token")));
                }
                self.value = Some(value.to_string());
            }
            ElementKind::NumericCounter { padding } => {
                if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid(format!("'{value}' is not a decimal value")));
                }
                if value.len() > *padding as usize {
                    return Err(invalid(format!(
                        "'{value}' exceeds the counter width of {padding}"
                    )));
                }
                let parsed: u64 = value
                    .parse()
                    .map_err(|_| invalid(format!("'{value}' overflows the counter")))?;
                self.counter = Some(parsed);
                self.value = Some(self.format_value(parsed));
            }
            ElementKind::AlphabeticCounter {
                uppercase,
                max_length,
            } => {
                let ok = !value.is_empty()
                    && value.len() <= *max_length as usize
                    && value.chars().all(|c| {
                        if *uppercase {
                            c.is_ascii_uppercase()
                        } else {
                            c.is_ascii_lowercase()
                        }
                    });
                if !ok {
                    return Err(invalid(format!(
                        "'{value}' is not a valid alphabetic counter value"
                    )));
                }
                self.counter = Some(alphabetic_to_int(value));
                self.value = Some(value.to_string());
            }
            ElementKind::HostCounter {} => {
                if value.len() != HOST_COUNTER_PADDING as usize
                    || !value.chars().all(|c| c.is_ascii_digit())
                {
                    return Err(invalid(format!(
                        "'{value}' is not a {HOST_COUNTER_PADDING}-digit host suffix"
                    )));
                }
                let parsed: u64 = value.parse().map_err(|_| {
                    invalid(format!("'{value}' overflows the host counter"))
                })?;
                self.counter = Some(parsed);
                self.value = Some(value.to_string());
            }
        }

        Ok(())
    }

    /// Set a counter variant directly from an integer value.
    ///
    /// # Errors
    ///
    /// Returns `NotACounter` for non-counter variants and
    /// `CounterExhausted` when the value exceeds the ceiling.
    pub fn set_counter(&mut self, value: u64) -> Result<(), ElementError> {
        let ceiling = self.counter_ceiling().ok_or(ElementError::NotACounter {
            id: self.config.id.clone(),
        })?;
        if value == 0 || value > ceiling {
            return Err(ElementError::CounterExhausted {
                id: self.config.id.clone(),
                ceiling,
            });
        }
        self.counter = Some(value);
        self.value = Some(self.format_value(value));
        Ok(())
    }

    /// Increment a counter variant by one.
    ///
    /// A counter with no value starts at 1.
    ///
    /// # Errors
    ///
    /// Returns `NotACounter` for non-counter variants and
    /// `CounterExhausted` at the variant ceiling.
    pub fn increment(&mut self) -> Result<(), ElementError> {
        let next = self.counter.map_or(1, |current| current + 1);
        self.set_counter(next)
    }

    /// Format an integer value according to this counter's rules.
    ///
    /// Zero-padded decimal for numeric and host counters, bijective base-26
    /// letters for alphabetic counters. Non-counter variants format as plain
    /// decimal; callers are expected to check [`NameElement::is_counter`].
    pub fn format_value(&self, value: u64) -> String {
        match &self.config.kind {
            ElementKind::NumericCounter { padding } => {
                format!("{value:0width$}", width = *padding as usize)
            }
            ElementKind::AlphabeticCounter { uppercase, .. } => {
                int_to_alphabetic(value, *uppercase)
            }
            ElementKind::HostCounter {} => {
                format!("{value:0width$}", width = HOST_COUNTER_PADDING as usize)
            }
            _ => value.to_string(),
        }
    }

    /// A representative value for deterministic test-name generation.
    ///
    /// `None` for the host counter, which never appears in generated names.
    pub fn representative_value(&self) -> Option<String> {
        match &self.config.kind {
            ElementKind::Text { items } => Some(
                items
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "Text".to_string()),
            ),
            ElementKind::Position { .. } => self
                .config
                .position_tokens()
                .first()
                .map(|token| token.to_string()),
            ElementKind::NumericCounter { .. } | ElementKind::AlphabeticCounter { .. } => {
                Some(self.format_value(1))
            }
            ElementKind::HostCounter {} => None,
        }
    }

    /// A random value for sampled test-name generation.
    pub fn random_value(&self, rng: &mut impl Rng) -> Option<String> {
        match &self.config.kind {
            ElementKind::Text { items } => {
                if items.is_empty() {
                    Some("Text".to_string())
                } else {
                    let index = rng.random_range(0..items.len());
                    Some(items[index].clone())
                }
            }
            ElementKind::Position { .. } => {
                let tokens = self.config.position_tokens();
                if tokens.is_empty() {
                    None
                } else {
                    let index = rng.random_range(0..tokens.len());
                    Some(tokens[index].to_string())
                }
            }
            ElementKind::NumericCounter { .. } | ElementKind::AlphabeticCounter { .. } => {
                let ceiling = self.counter_ceiling().unwrap_or(1);
                let bound = ceiling.min(26);
                Some(self.format_value(rng.random_range(1..=bound)))
            }
            ElementKind::HostCounter {} => None,
        }
    }

    /// Adopt a value captured by this element's own sub-expression.
    ///
    /// The capture is trusted: it matched the expression derived from this
    /// configuration, so no re-validation is needed.
    pub(crate) fn adopt_capture(&mut self, text: &str) {
        self.counter = self.counter_from_text(text);
        self.value = Some(text.to_string());
    }

    /// Configuration generation, for pattern-level cache staleness checks.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Derive the integer form of a captured value for counter variants.
    fn counter_from_text(&self, text: &str) -> Option<u64> {
        match &self.config.kind {
            ElementKind::NumericCounter { .. } | ElementKind::HostCounter {} => text.parse().ok(),
            ElementKind::AlphabeticCounter { .. } => Some(alphabetic_to_int(text)),
            _ => None,
        }
    }

    /// The compiled standalone search expression, rebuilt when stale.
    fn search_matcher(&mut self) -> Option<&Regex> {
        let stale = match &self.matcher {
            Some(matcher) => matcher.generation != self.generation,
            None => true,
        };
        if stale {
            let source = self.search_expression();
            let regex = Regex::new(&source).ok()?;
            self.matcher = Some(Matcher {
                generation: self.generation,
                regex,
            });
        }
        self.matcher.as_ref().map(|matcher| &matcher.regex)
    }

    /// Standalone search expression: the group expression with the
    /// element's separator attached as an optional literal on the side
    /// matching its position.
    fn search_expression(&self) -> String {
        let group = self.group_expression();
        if self.is_host_counter() {
            // Anchored: the host suffix is only ever at the end of a name.
            return format!("{group}$");
        }
        let sep = regex::escape(&self.config.separator);
        if self.config.order == 0 {
            format!("{group}(?:{sep})?")
        } else {
            format!("(?:{sep})?{group}")
        }
    }
}

/// Convert a bijective base-26 letter sequence to its integer value
/// (A -> 1, Z -> 26, AA -> 27).
pub(crate) fn alphabetic_to_int(text: &str) -> u64 {
    text.chars().fold(0, |acc, c| {
        acc * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1)
    })
}

/// Convert an integer to its bijective base-26 letter sequence
/// (1 -> A, 26 -> Z, 27 -> AA).
pub(crate) fn int_to_alphabetic(mut value: u64, uppercase: bool) -> String {
    if value == 0 {
        return String::new();
    }
    let base = if uppercase { b'A' } else { b'a' };
    let mut letters = Vec::new();
    while value > 0 {
        value -= 1;
        letters.push(base + (value % 26) as u8);
        value /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
