//! element::factory
//!
//! Builds validated elements and patterns from declarative configuration.
//!
//! # Architecture
//!
//! The factory is an explicit, caller-owned value; there is no process-wide
//! element registry. It validates each [`ElementConfig`] against its
//! variant's constraints, appends the host duplicate-suffix counter when a
//! pattern does not declare one (the host application appends `.001`-style
//! suffixes on its own, so every pattern must be able to parse them), and
//! sorts elements into their total order.

use crate::core::config::{ConfigError, ElementConfig, ElementKind, PatternConfig};
use crate::core::types::ElementId;
use crate::pattern::NamingPattern;

use super::NameElement;

/// Order assigned to the auto-appended host counter so it sorts after every
/// user-declared element.
const HOST_COUNTER_ORDER: i32 = i32::MAX;

/// Element id used for the auto-appended host counter.
const HOST_COUNTER_ID: &str = "host_counter";

/// Constructs [`NameElement`]s and [`NamingPattern`]s from configuration.
#[derive(Debug, Clone)]
pub struct ElementFactory {
    append_host_counter: bool,
}

impl Default for ElementFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementFactory {
    /// Create a factory with the default policy: a host counter is appended
    /// to patterns that do not declare one.
    pub fn new() -> Self {
        Self {
            append_host_counter: true,
        }
    }

    /// Disable the automatic host counter, for hosts without a duplicate
    /// suffix convention.
    pub fn without_host_counter(mut self) -> Self {
        self.append_host_counter = false;
        self
    }

    /// Build a single element from its configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration violates the variant's
    /// constraints.
    pub fn create_element(&self, config: &ElementConfig) -> Result<NameElement, ConfigError> {
        NameElement::new(config.clone())
    }

    /// Build the ordered element list for a pattern record.
    ///
    /// Elements are sorted by `(order, declaration index)`; the host counter
    /// is appended per factory policy and always sorts last.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` from the record: duplicate ids, an
    /// empty record, or per-variant violations.
    pub fn create_elements(
        &self,
        config: &PatternConfig,
    ) -> Result<Vec<NameElement>, ConfigError> {
        config.validate()?;

        let mut elements = config
            .elements
            .iter()
            .map(|element| self.create_element(element))
            .collect::<Result<Vec<_>, _>>()?;

        let has_host_counter = elements.iter().any(NameElement::is_host_counter);
        if self.append_host_counter && !has_host_counter {
            elements.push(self.host_counter_element(config)?);
        }

        // Stable sort preserves declaration order for equal `order` values.
        elements.sort_by_key(NameElement::order);

        Ok(elements)
    }

    /// Build a full pattern from its record.
    pub fn create_pattern(&self, config: &PatternConfig) -> Result<NamingPattern, ConfigError> {
        let elements = self.create_elements(config)?;
        Ok(NamingPattern::new(config.id.clone(), elements))
    }

    fn host_counter_element(&self, config: &PatternConfig) -> Result<NameElement, ConfigError> {
        // The default id can collide with a user-declared element; suffix
        // until free.
        let mut id = HOST_COUNTER_ID.to_string();
        while config.elements.iter().any(|e| e.id.as_str() == id) {
            id.push('_');
        }
        let id = ElementId::new(id).map_err(ConfigError::Type)?;

        NameElement::new(ElementConfig {
            id,
            order: HOST_COUNTER_ORDER,
            enabled: false,
            separator: ".".into(),
            kind: ElementKind::HostCounter {},
        })
    }
}
