//! pattern
//!
//! Naming patterns: ordered element sequences that parse and render full
//! names.
//!
//! # Architecture
//!
//! A [`NamingPattern`] exclusively owns its elements, sorted into their
//! total order. The full-match expression is the anchored concatenation of
//! every element's capture group with the declared separators as optional
//! literals between them; it is compiled once and cached behind the
//! elements' configuration generations.
//!
//! # Invariants
//!
//! - `parse_name` is atomic: element values change only when the entire
//!   input is consumed by the full-match expression
//! - `render_name` emits enabled, valued elements in ascending order with
//!   the separator of the preceding contributing element between parts and
//!   no trailing separator
//! - Counter increment targets the first enabled counter-capable element in
//!   order; patterns without one cannot resolve conflicts by counting
//!
//! # Example
//!
//! ```
//! use namecast::core::config::PatternConfig;
//! use namecast::element::ElementFactory;
//!
//! let config: PatternConfig = toml::from_str(
//!     r#"
//!     id = "limbs"
//!
//!     [[elements]]
//!     type = "text"
//!     id = "base"
//!     order = 0
//!     separator = "."
//!     items = ["Arm", "Leg"]
//!
//!     [[elements]]
//!     type = "numeric_counter"
//!     id = "count"
//!     order = 1
//!     separator = "."
//!     padding = 3
//!     "#,
//! )
//! .unwrap();
//!
//! let mut pattern = ElementFactory::new().create_pattern(&config).unwrap();
//! assert!(pattern.parse_name("Arm.002"));
//! assert_eq!(pattern.render_name(), "Arm.002");
//! ```

pub mod registry;

pub use registry::PatternRegistry;

use std::collections::BTreeMap;

use rand::Rng;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::core::config::ElementKind;
use crate::core::types::{ElementId, PatternId};
use crate::element::{ElementError, NameElement};

/// Errors from pattern operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    /// No element with the given id exists in the pattern.
    #[error("no element with id '{0}'")]
    ElementNotFound(ElementId),

    /// The pattern has no enabled counter-capable element.
    #[error("pattern '{0}' has no enabled counter element")]
    NoCounterElement(PatternId),

    /// No pattern with the given id is registered.
    #[error("no pattern with id '{0}'")]
    UnknownPattern(PatternId),

    /// An element rejected a value or reached its ceiling.
    #[error(transparent)]
    Element(#[from] ElementError),
}

/// Test-name generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestNameMode {
    /// Enumerate every include/exclude combination of the elements using a
    /// representative value per element.
    Deterministic,
    /// Sample random element subsets and values.
    Random {
        /// Number of names to generate.
        cases: usize,
    },
}

/// Compiled full-match expression with the generation sum it was built from.
#[derive(Debug)]
struct PatternMatcher {
    generation: u64,
    regex: Regex,
}

/// An ordered sequence of name elements with separators.
#[derive(Debug)]
pub struct NamingPattern {
    id: PatternId,
    elements: Vec<NameElement>,
    matcher: Option<PatternMatcher>,
}

impl NamingPattern {
    /// Create a pattern from pre-sorted elements.
    ///
    /// Use [`crate::element::ElementFactory::create_pattern`] to build one
    /// from a declarative record.
    pub fn new(id: PatternId, elements: Vec<NameElement>) -> Self {
        Self {
            id,
            elements,
            matcher: None,
        }
    }

    /// The pattern's id.
    pub fn id(&self) -> &PatternId {
        &self.id
    }

    /// The pattern's elements in total order.
    pub fn elements(&self) -> &[NameElement] {
        &self.elements
    }

    /// Look up an element by id.
    ///
    /// # Errors
    ///
    /// Returns `PatternError::ElementNotFound` if absent.
    pub fn get_element_by_id(&self, id: &ElementId) -> Result<&NameElement, PatternError> {
        self.elements
            .iter()
            .find(|element| element.id() == id)
            .ok_or_else(|| PatternError::ElementNotFound(id.clone()))
    }

    /// Look up an element by id, mutably.
    ///
    /// # Errors
    ///
    /// Returns `PatternError::ElementNotFound` if absent.
    pub fn get_element_by_id_mut(
        &mut self,
        id: &ElementId,
    ) -> Result<&mut NameElement, PatternError> {
        self.elements
            .iter_mut()
            .find(|element| element.id() == id)
            .ok_or_else(|| PatternError::ElementNotFound(id.clone()))
    }

    /// Clear every element's value.
    ///
    /// Callers iterating over many names invoke this between items so a
    /// failed parse cannot leak the previous item's values into the next
    /// render.
    pub fn clear_values(&mut self) {
        for element in &mut self.elements {
            element.clear_value();
        }
    }

    /// Parse a full name, atomically.
    ///
    /// The anchored full-match expression must consume the entire input;
    /// otherwise no element value changes and `false` is returned. On
    /// success, captured values are stored, elements without a capture are
    /// cleared, and a parsed host duplicate suffix is transferred to the
    /// first enabled numeric counter that captured nothing itself.
    pub fn parse_name(&mut self, name: &str) -> bool {
        let regex = match self.full_matcher() {
            Some(regex) => regex,
            None => return false,
        };

        let captures = match regex.captures(name) {
            Some(captures) => captures,
            None => {
                debug!(pattern = %self.id, name, "full-name parse failed");
                return false;
            }
        };

        let captured: Vec<Option<String>> = self
            .elements
            .iter()
            .map(|element| {
                captures
                    .name(element.id().as_str())
                    .map(|m| m.as_str().to_string())
            })
            .collect();

        for (element, capture) in self.elements.iter_mut().zip(&captured) {
            match capture {
                Some(text) => element.adopt_capture(text),
                None => element.clear_value(),
            }
        }

        self.take_over_host_counter();
        debug!(pattern = %self.id, name, "full-name parse succeeded");
        true
    }

    /// Render the pattern into a name.
    ///
    /// Enabled elements holding values contribute `separator + text`, with
    /// the separator of the preceding contributing element between parts and
    /// no trailing separator.
    pub fn render_name(&self) -> String {
        let mut name = String::new();
        let mut pending_separator: Option<&str> = None;

        for element in &self.elements {
            if let Some((text, separator)) = element.render() {
                if let Some(sep) = pending_separator {
                    name.push_str(sep);
                }
                name.push_str(text);
                pending_separator = Some(separator);
            }
        }

        name
    }

    /// Apply `set_value` to each element named in the mapping.
    ///
    /// Elements not present in the mapping are untouched; a `None` value
    /// clears the element. Cached full-pattern state is invalidated.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` for unknown ids and the element's own error
    /// for rejected values. Earlier updates in the mapping stay applied;
    /// each individual element mutation is atomic.
    pub fn update_elements(
        &mut self,
        updates: &BTreeMap<ElementId, Option<String>>,
    ) -> Result<(), PatternError> {
        for (id, value) in updates {
            let element = self
                .elements
                .iter_mut()
                .find(|element| element.id() == id)
                .ok_or_else(|| PatternError::ElementNotFound(id.clone()))?;
            element.set_value(value.as_deref())?;
        }
        Ok(())
    }

    /// Check the pattern configuration.
    ///
    /// Returns a list of human-readable problems; empty means valid.
    /// Duplicate `order` values are not a problem: ties are broken by
    /// declaration order.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.elements.is_empty() {
            problems.push("pattern has no elements".to_string());
            return problems;
        }

        let mut seen = std::collections::HashSet::new();
        for element in &self.elements {
            if !seen.insert(element.id()) {
                problems.push(format!("duplicate element id: {}", element.id()));
            }
        }

        problems
    }

    /// Increment the first enabled counter-capable element in order.
    ///
    /// # Errors
    ///
    /// Returns `NoCounterElement` when the pattern has none (conflict
    /// resolution with the counter strategy is impossible), or the counter's
    /// own error at its ceiling.
    pub fn increment_counter(&mut self) -> Result<(), PatternError> {
        let id = self.id.clone();
        let counter = self
            .elements
            .iter_mut()
            .find(|element| element.enabled() && element.is_counter())
            .ok_or(PatternError::NoCounterElement(id))?;
        counter.increment()?;
        Ok(())
    }

    /// Whether the pattern has an enabled counter-capable element.
    pub fn has_counter(&self) -> bool {
        self.elements
            .iter()
            .any(|element| element.enabled() && element.is_counter())
    }

    /// Generate example names for pattern validation and preview.
    ///
    /// Deterministic mode enumerates every include/exclude combination of
    /// the elements (2^n names for n elements); random mode samples `cases`
    /// subsets. The host counter never contributes. Not part of the rename
    /// path.
    pub fn gen_test_names(&self, mode: TestNameMode) -> Vec<String> {
        let candidates: Vec<&NameElement> = self
            .elements
            .iter()
            .filter(|element| !element.is_host_counter())
            .collect();

        match mode {
            TestNameMode::Deterministic => {
                let n = candidates.len();
                let mut names = Vec::with_capacity(1 << n);
                for mask in 0..(1u32 << n) {
                    let parts: Vec<(String, &str)> = candidates
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| mask & (1 << i) != 0)
                        .filter_map(|(_, element)| {
                            element
                                .representative_value()
                                .map(|value| (value, element.separator()))
                        })
                        .collect();
                    names.push(join_parts(&parts));
                }
                names
            }
            TestNameMode::Random { cases } => {
                let mut rng = rand::rng();
                let mut names = Vec::with_capacity(cases);
                for _ in 0..cases {
                    // Sequential draws: inclusion first, then the value.
                    let mut parts: Vec<(String, &str)> = Vec::new();
                    for element in &candidates {
                        if !rng.random_bool(0.5) {
                            continue;
                        }
                        if let Some(value) = element.random_value(&mut rng) {
                            parts.push((value, element.separator()));
                        }
                    }
                    names.push(join_parts(&parts));
                }
                names
            }
        }
    }

    /// Transfer a parsed host duplicate suffix into the first enabled
    /// numeric counter that captured nothing itself.
    fn take_over_host_counter(&mut self) {
        let host_value = self
            .elements
            .iter()
            .find(|element| element.is_host_counter())
            .and_then(|element| element.counter_value());
        let host_value = match host_value {
            Some(value) => value,
            None => return,
        };

        let numeric = self.elements.iter_mut().find(|element| {
            element.enabled()
                && matches!(element.kind(), ElementKind::NumericCounter { .. })
                && element.counter_value().is_none()
        });
        if let Some(numeric) = numeric {
            if let Err(err) = numeric.set_counter(host_value) {
                debug!(pattern = %self.id, %err, "host counter takeover skipped");
            }
        }
    }

    /// The compiled full-match expression, rebuilt when any element's
    /// configuration generation has moved.
    fn full_matcher(&mut self) -> Option<&Regex> {
        let generation = self.generation_sum();
        let stale = match &self.matcher {
            Some(matcher) => matcher.generation != generation,
            None => true,
        };
        if stale {
            let source = self.full_expression();
            let regex = Regex::new(&source).ok()?;
            self.matcher = Some(PatternMatcher { generation, regex });
        }
        self.matcher.as_ref().map(|matcher| &matcher.regex)
    }

    /// Anchored concatenation of every element's capture group with the
    /// preceding element's separator as an optional literal. Every chunk is
    /// optional; full-input consumption is what makes the parse atomic.
    fn full_expression(&self) -> String {
        let mut source = String::from("^");
        let mut previous_separator: Option<String> = None;

        for element in &self.elements {
            let group = element.group_expression();
            if element.is_host_counter() {
                // The host suffix carries its own leading dot.
                source.push_str(&format!("(?:{group})?"));
            } else {
                match previous_separator.take() {
                    Some(sep) if !sep.is_empty() => {
                        source.push_str(&format!("(?:(?:{sep})?{group})?"));
                    }
                    _ => source.push_str(&format!("(?:{group})?")),
                }
            }
            previous_separator = Some(regex::escape(element.separator()));
        }

        source.push('$');
        source
    }

    fn generation_sum(&self) -> u64 {
        self.elements
            .iter()
            .map(NameElement::generation)
            .sum::<u64>()
            .wrapping_add(self.elements.len() as u64)
    }
}

/// Join `(text, separator)` parts, emitting the separator of the preceding
/// part between entries.
fn join_parts(parts: &[(String, &str)]) -> String {
    let mut name = String::new();
    let mut pending: Option<&str> = None;
    for (text, separator) in parts {
        if let Some(sep) = pending {
            name.push_str(sep);
        }
        name.push_str(text);
        pending = Some(separator);
    }
    name
}
