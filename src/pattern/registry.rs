//! pattern::registry
//!
//! Explicit, context-owned pattern store.
//!
//! # Architecture
//!
//! The registry replaces the original architecture's process-wide pattern
//! cache: callers construct one per context and pass it by reference into
//! the components that need it, so independent test instances cannot
//! interfere.

use std::collections::HashMap;

use crate::core::config::{ConfigError, PatternConfig};
use crate::core::types::PatternId;
use crate::element::ElementFactory;

use super::{NamingPattern, PatternError};

/// Owns the patterns available in one context and tracks the active one.
#[derive(Debug, Default)]
pub struct PatternRegistry {
    patterns: HashMap<PatternId, NamingPattern>,
    active: Option<PatternId>,
}

impl PatternRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from declarative records.
    ///
    /// The first record becomes the active pattern.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` from an invalid record.
    pub fn from_configs(
        factory: &ElementFactory,
        configs: &[PatternConfig],
    ) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for config in configs {
            let pattern = factory.create_pattern(config)?;
            if registry.active.is_none() {
                registry.active = Some(pattern.id().clone());
            }
            registry.patterns.insert(pattern.id().clone(), pattern);
        }
        Ok(registry)
    }

    /// Register a pattern, replacing any previous one with the same id.
    ///
    /// The first registered pattern becomes active.
    pub fn insert(&mut self, pattern: NamingPattern) {
        if self.active.is_none() {
            self.active = Some(pattern.id().clone());
        }
        self.patterns.insert(pattern.id().clone(), pattern);
    }

    /// Remove a pattern, clearing the active id when it matches.
    pub fn remove(&mut self, id: &PatternId) -> Option<NamingPattern> {
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        self.patterns.remove(id)
    }

    /// Look up a pattern by id.
    ///
    /// # Errors
    ///
    /// Returns `PatternError::UnknownPattern` if absent.
    pub fn get(&self, id: &PatternId) -> Result<&NamingPattern, PatternError> {
        self.patterns
            .get(id)
            .ok_or_else(|| PatternError::UnknownPattern(id.clone()))
    }

    /// Look up a pattern by id, mutably.
    ///
    /// # Errors
    ///
    /// Returns `PatternError::UnknownPattern` if absent.
    pub fn get_mut(&mut self, id: &PatternId) -> Result<&mut NamingPattern, PatternError> {
        self.patterns
            .get_mut(id)
            .ok_or_else(|| PatternError::UnknownPattern(id.clone()))
    }

    /// Select the active pattern.
    ///
    /// # Errors
    ///
    /// Returns `PatternError::UnknownPattern` when no pattern with that id
    /// is registered.
    pub fn set_active(&mut self, id: &PatternId) -> Result<(), PatternError> {
        if !self.patterns.contains_key(id) {
            return Err(PatternError::UnknownPattern(id.clone()));
        }
        self.active = Some(id.clone());
        Ok(())
    }

    /// The active pattern, if one is selected.
    pub fn active(&self) -> Option<&NamingPattern> {
        self.active.as_ref().and_then(|id| self.patterns.get(id))
    }

    /// The active pattern, mutably.
    pub fn active_mut(&mut self) -> Option<&mut NamingPattern> {
        let id = self.active.clone()?;
        self.patterns.get_mut(&id)
    }

    /// Ids of all registered patterns, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &PatternId> {
        self.patterns.keys()
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
