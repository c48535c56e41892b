//! engine::resolve
//!
//! Turns a proposed name into a final unique name.
//!
//! # State Machine
//!
//! Per-target resolution:
//!
//! 1. Fetch the target's namespace through the cache (sole creation path)
//! 2. A proposed name is in conflict iff the namespace contains it and it
//!    differs from the target's own current name
//! 3. No conflict: reserve the name in the overlay and finish
//! 4. `Counter`: increment the pattern's first enabled counter and re-render
//!    until the candidate is free; every step re-checks effective
//!    membership, so earlier targets in the same batch influence the outcome
//!    deterministically
//! 5. `Force`: accept the proposed name unconditionally; the previous holder
//!    is not renamed, and the name is still reserved in the overlay so later
//!    targets in the batch treat it as taken
//!
//! # Invariants
//!
//! - Ground truth is never mutated during resolution; only the overlay moves
//! - Exhaustion is a per-target recoverable failure, not a batch abort

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::target::RenameTarget;
use crate::namespace::NamespaceCache;
use crate::pattern::{NamingPattern, PatternError};

/// How a name conflict is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// Increment the pattern's first enabled counter until the name is
    /// free.
    #[default]
    Counter,
    /// Accept the proposed name, ignoring the conflict.
    Force,
}

/// Errors from conflict resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The pattern cannot count (no counter element) or its counter reached
    /// the ceiling.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The iteration bound was reached without finding a free name.
    #[error("no free name found for '{proposed}' after {attempts} attempts")]
    Exhausted {
        /// The name that could not be made unique.
        proposed: String,
        /// Candidates tried.
        attempts: u64,
    },
}

/// Resolves proposed names against per-scope namespaces.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    max_attempts: u64,
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConflictResolver {
    /// Safety bound on counter iterations, beyond any counter ceiling the
    /// configuration schema allows in practice.
    const DEFAULT_MAX_ATTEMPTS: u64 = 100_000;

    /// Create a resolver with the default iteration bound.
    pub fn new() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the iteration bound.
    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Resolve a proposed name for one target.
    ///
    /// On success the returned final name has been reserved in the target's
    /// namespace overlay (even under `Force`, so later targets in the batch
    /// see it as taken).
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` when the counter strategy cannot find a free
    /// name: no counter element, counter ceiling reached, or the iteration
    /// bound hit.
    pub fn resolve(
        &self,
        target: &dyn RenameTarget,
        pattern: &mut NamingPattern,
        proposed: &str,
        strategy: ConflictStrategy,
        cache: &mut NamespaceCache,
    ) -> Result<String, ResolveError> {
        let current = target.name();
        let namespace = cache.namespace_for(target);

        // Renaming a target to its own current name is never a conflict.
        if proposed == current || !namespace.contains(proposed) {
            namespace.simulate_update(&current, proposed);
            return Ok(proposed.to_string());
        }

        match strategy {
            ConflictStrategy::Force => {
                debug!(%current, proposed, "conflict forced");
                namespace.simulate_update(&current, proposed);
                Ok(proposed.to_string())
            }
            ConflictStrategy::Counter => {
                for attempt in 1..=self.max_attempts {
                    pattern.increment_counter()?;
                    let candidate = pattern.render_name();
                    if candidate == current || !namespace.contains(&candidate) {
                        debug!(%current, proposed, %candidate, attempt, "conflict resolved");
                        namespace.simulate_update(&current, candidate.as_str());
                        return Ok(candidate);
                    }
                }
                Err(ResolveError::Exhausted {
                    proposed: proposed.to_string(),
                    attempts: self.max_attempts,
                })
            }
        }
    }

    /// Convert a target's simulated change into a ground-truth commit.
    ///
    /// Called only after the real rename has been applied to the host.
    pub fn apply_namespace_update(
        &self,
        target: &dyn RenameTarget,
        old_name: &str,
        new_name: &str,
        cache: &mut NamespaceCache,
    ) {
        cache.namespace_for(target).commit_update(old_name, new_name);
    }

    /// Release a target's simulated reservation after the host refused the
    /// rename; the name becomes available again.
    pub fn discard_namespace_update(
        &self,
        target: &dyn RenameTarget,
        old_name: &str,
        new_name: &str,
        cache: &mut NamespaceCache,
    ) {
        cache.namespace_for(target).discard_update(old_name, new_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use crate::core::config::PatternConfig;
    use crate::core::types::ScopeKey;
    use crate::element::ElementFactory;

    struct StubTarget {
        name: String,
        scope: Vec<String>,
    }

    impl RenameTarget for StubTarget {
        fn name(&self) -> String {
            self.name.clone()
        }

        fn set_name(&mut self, name: &str) -> anyhow::Result<()> {
            self.name = name.to_string();
            Ok(())
        }

        fn namespace_key(&self) -> ScopeKey {
            ScopeKey::new("objects")
        }

        fn scope_names(&self) -> HashSet<String> {
            self.scope.iter().cloned().collect()
        }
    }

    fn limb_pattern() -> NamingPattern {
        let config: PatternConfig = toml::from_str(
            r#"
            id = "limbs"

            [[elements]]
            type = "text"
            id = "base"
            order = 0
            separator = "."
            items = ["Arm", "Leg"]

            [[elements]]
            type = "numeric_counter"
            id = "count"
            order = 1
            separator = "."
            padding = 3
            "#,
        )
        .unwrap();
        ElementFactory::new().create_pattern(&config).unwrap()
    }

    #[test]
    fn no_conflict_passes_through_and_reserves() {
        let target = StubTarget {
            name: "Cube".into(),
            scope: vec!["Cube".into()],
        };
        let mut pattern = limb_pattern();
        assert!(pattern.parse_name("Arm"));

        let mut cache = NamespaceCache::new();
        let resolver = ConflictResolver::new();
        let resolved = resolver
            .resolve(&target, &mut pattern, "Arm", ConflictStrategy::Counter, &mut cache)
            .unwrap();

        assert_eq!(resolved, "Arm");
        let ns = cache.namespace_for(&target);
        assert!(ns.contains("Arm"));
        assert!(!ns.contains("Cube"));
    }

    #[test]
    fn own_name_is_never_a_conflict() {
        let target = StubTarget {
            name: "Arm".into(),
            scope: vec!["Arm".into()],
        };
        let mut pattern = limb_pattern();
        assert!(pattern.parse_name("Arm"));

        let mut cache = NamespaceCache::new();
        let resolved = ConflictResolver::new()
            .resolve(&target, &mut pattern, "Arm", ConflictStrategy::Counter, &mut cache)
            .unwrap();
        assert_eq!(resolved, "Arm");
    }

    #[test]
    fn counter_increments_past_taken_names() {
        let target = StubTarget {
            name: "Arm".into(),
            scope: vec!["Arm".into(), "Arm.001".into(), "Arm.002".into()],
        };
        let mut pattern = limb_pattern();
        assert!(pattern.parse_name("Arm.001"));

        let mut cache = NamespaceCache::new();
        let resolved = ConflictResolver::new()
            .resolve(
                &target,
                &mut pattern,
                "Arm.001",
                ConflictStrategy::Counter,
                &mut cache,
            )
            .unwrap();
        assert_eq!(resolved, "Arm.003");
    }

    #[test]
    fn force_accepts_taken_name_and_reserves_it() {
        let target = StubTarget {
            name: "Limb".into(),
            scope: vec!["Limb".into(), "Arm".into()],
        };
        let mut pattern = limb_pattern();
        assert!(pattern.parse_name("Arm"));

        let mut cache = NamespaceCache::new();
        let resolved = ConflictResolver::new()
            .resolve(&target, &mut pattern, "Arm", ConflictStrategy::Force, &mut cache)
            .unwrap();
        assert_eq!(resolved, "Arm");

        // Still treated as taken for later targets.
        assert!(cache.namespace_for(&target).contains("Arm"));
        assert!(!cache.namespace_for(&target).contains("Limb"));
    }

    #[test]
    fn missing_counter_is_recoverable() {
        let config: PatternConfig = toml::from_str(
            r#"
            id = "flat"

            [[elements]]
            type = "text"
            id = "base"
            items = ["Arm"]
            "#,
        )
        .unwrap();
        let mut pattern = ElementFactory::new().create_pattern(&config).unwrap();
        assert!(pattern.parse_name("Arm"));

        let target = StubTarget {
            name: "Cube".into(),
            scope: vec!["Arm".into()],
        };
        let mut cache = NamespaceCache::new();
        let err = ConflictResolver::new()
            .resolve(&target, &mut pattern, "Arm", ConflictStrategy::Counter, &mut cache)
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Pattern(PatternError::NoCounterElement(_))
        ));
    }

    #[test]
    fn exhaustion_surfaces_as_error() {
        // Width-1 counter: values 1..=9, then the ceiling.
        let config: PatternConfig = toml::from_str(
            r#"
            id = "narrow"

            [[elements]]
            type = "text"
            id = "base"
            order = 0
            separator = "."
            items = ["A"]

            [[elements]]
            type = "numeric_counter"
            id = "count"
            order = 1
            separator = "."
            padding = 1
            "#,
        )
        .unwrap();
        let mut pattern = ElementFactory::new().create_pattern(&config).unwrap();
        assert!(pattern.parse_name("A"));

        let mut scope: Vec<String> = vec!["A".into()];
        scope.extend((1..=9).map(|i| format!("A.{i}")));
        let target = StubTarget {
            name: "Cube".into(),
            scope,
        };

        let mut cache = NamespaceCache::new();
        let err = ConflictResolver::new()
            .resolve(&target, &mut pattern, "A", ConflictStrategy::Counter, &mut cache)
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Pattern(PatternError::Element(_))
        ));
    }
}
