//! namespace::cache
//!
//! Lazily creates and memoizes one namespace per scope key.
//!
//! # Discipline
//!
//! The cache is the sole owner of [`Namespace`] instances and must be the
//! only path by which the conflict resolver obtains one. Constructing ad hoc
//! namespaces mid-batch would let simulated overlays diverge across callers.
//!
//! The cache is invalidated when the enclosing host context changes (scene
//! switch, file load): every namespace is dropped and re-initialized from
//! live host state on next access.

use std::collections::HashMap;

use tracing::debug;

use crate::core::target::RenameTarget;
use crate::core::types::ScopeKey;

use super::Namespace;

/// Maps scope key to its namespace, creating on miss.
#[derive(Debug, Default)]
pub struct NamespaceCache {
    namespaces: HashMap<ScopeKey, Namespace>,
}

impl NamespaceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The namespace for a target's scope.
    ///
    /// Created on first access from the target's scope enumeration; the
    /// initializer does not run again until the cache is invalidated.
    pub fn namespace_for(&mut self, target: &dyn RenameTarget) -> &mut Namespace {
        let key = target.namespace_key();
        self.namespaces.entry(key.clone()).or_insert_with(|| {
            debug!(scope = %key, "initializing namespace");
            Namespace::new(|| target.scope_names())
        })
    }

    /// The namespace for a key, if one has been created.
    pub fn get(&self, key: &ScopeKey) -> Option<&Namespace> {
        self.namespaces.get(key)
    }

    /// Drop all cached namespaces, forcing re-initialization on next
    /// access.
    pub fn clear(&mut self) {
        self.namespaces.clear();
    }

    /// Invalidate the cache because the host context changed.
    pub fn update_context(&mut self) {
        debug!(
            scopes = self.namespaces.len(),
            "host context changed, dropping namespaces"
        );
        self.clear();
    }

    /// Back out every pending simulated change (preview and cancellation
    /// path).
    pub fn discard_all_simulated(&mut self) {
        for namespace in self.namespaces.values_mut() {
            namespace.discard_simulated_changes();
        }
    }

    /// Number of cached namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Whether any namespace is cached.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use anyhow::Result;

    struct CountingTarget {
        name: String,
        key: ScopeKey,
        init_calls: Rc<Cell<usize>>,
    }

    impl RenameTarget for CountingTarget {
        fn name(&self) -> String {
            self.name.clone()
        }

        fn set_name(&mut self, name: &str) -> Result<()> {
            self.name = name.to_string();
            Ok(())
        }

        fn namespace_key(&self) -> ScopeKey {
            self.key.clone()
        }

        fn scope_names(&self) -> HashSet<String> {
            self.init_calls.set(self.init_calls.get() + 1);
            HashSet::from([self.name.clone()])
        }
    }

    fn target(name: &str, key: &str, calls: &Rc<Cell<usize>>) -> CountingTarget {
        CountingTarget {
            name: name.to_string(),
            key: ScopeKey::new(key),
            init_calls: Rc::clone(calls),
        }
    }

    #[test]
    fn initializer_runs_once_per_scope() {
        let calls = Rc::new(Cell::new(0));
        let a = target("Arm", "objects", &calls);
        let b = target("Leg", "objects", &calls);

        let mut cache = NamespaceCache::new();
        cache.namespace_for(&a);
        cache.namespace_for(&b);

        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_scopes_get_distinct_namespaces() {
        let calls = Rc::new(Cell::new(0));
        let a = target("Arm", "objects", &calls);
        let b = target("Arm", "materials", &calls);

        let mut cache = NamespaceCache::new();
        cache.namespace_for(&a).simulate_update("Arm", "Arm.001");
        assert!(!cache.namespace_for(&b).contains("Arm.001"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clear_forces_reinitialization() {
        let calls = Rc::new(Cell::new(0));
        let a = target("Arm", "objects", &calls);

        let mut cache = NamespaceCache::new();
        cache.namespace_for(&a);
        cache.update_context();
        assert!(cache.is_empty());
        cache.namespace_for(&a);

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn discard_all_backs_out_every_overlay() {
        let calls = Rc::new(Cell::new(0));
        let a = target("Arm", "objects", &calls);
        let b = target("Mat", "materials", &calls);

        let mut cache = NamespaceCache::new();
        cache.namespace_for(&a).simulate_update("Arm", "Arm.001");
        cache.namespace_for(&b).simulate_update("Mat", "Mat.001");
        cache.discard_all_simulated();

        assert!(cache.namespace_for(&a).contains("Arm"));
        assert!(cache.namespace_for(&b).contains("Mat"));
        assert!(!cache.namespace_for(&a).contains("Arm.001"));
    }
}
