//! core::target
//!
//! The host boundary: entities that can be renamed.
//!
//! # Contract
//!
//! The core consumes [`RenameTarget`] implementations supplied by the host
//! application. A target exposes its current name, an assignment operation
//! that may be refused by the host (locking, permissions), the scope key
//! selecting which namespace applies, and the initializer enumerating every
//! name currently taken in that scope.
//!
//! The core never assumes anything about the scope key beyond equality and
//! hashability, and never reads host state except through these methods.

use std::collections::HashSet;

use anyhow::Result;

use super::types::ScopeKey;

/// An entity that can be renamed by the batch engine.
///
/// Implemented by the host application for each renamable kind (objects,
/// materials, bones, ...). Targets are collected in a host-defined order
/// that the engine preserves through both phases.
pub trait RenameTarget {
    /// The target's current name.
    fn name(&self) -> String;

    /// Assign a new name on the live host object.
    ///
    /// # Errors
    ///
    /// Returns an error when the host refuses the assignment; the engine
    /// records the failure on that target and continues the batch.
    fn set_name(&mut self, name: &str) -> Result<()>;

    /// The scope key selecting this target's namespace.
    ///
    /// Same key for all entities of one kind within one container, distinct
    /// keys across containers or kinds.
    fn namespace_key(&self) -> ScopeKey;

    /// Enumerate every name currently taken in this target's scope.
    ///
    /// Used as the namespace initializer; called at most once per namespace
    /// lifetime unless the cache is explicitly invalidated.
    fn scope_names(&self) -> HashSet<String>;
}
