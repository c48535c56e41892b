//! namespace
//!
//! Per-scope taken-name sets with a simulate/commit overlay.
//!
//! # Architecture
//!
//! A [`Namespace`] holds the ground-truth set of names taken within one
//! scope plus a copy-on-write delta (added names, removed names) recording
//! speculative renames that have not been applied to the host yet:
//!
//! ```text
//! effective = (ground ∪ added) − removed
//! ```
//!
//! Commit merges the delta into ground truth and clears it; discard clears
//! the delta only. This is what makes rollback-free previewing possible:
//! Phase 1 of a batch explores renames entirely inside the overlay.
//!
//! # Invariants
//!
//! - Ground truth changes only through `add`/`remove`/`update`,
//!   `commit_simulated_changes`, or the per-target `commit_update`
//! - Discarding the overlay restores pre-simulation membership exactly
//!
//! # Example
//!
//! ```
//! use namecast::namespace::Namespace;
//!
//! let mut ns = Namespace::from_names(["Arm".to_string()]);
//! ns.simulate_update("Arm", "Arm.001");
//! assert!(ns.contains("Arm.001"));
//! assert!(!ns.contains("Arm"));
//!
//! ns.discard_simulated_changes();
//! assert!(ns.contains("Arm"));
//! assert!(!ns.contains("Arm.001"));
//! ```

pub mod cache;

pub use cache::NamespaceCache;

use std::collections::HashSet;

/// The set of names considered taken within one scope.
#[derive(Debug, Default)]
pub struct Namespace {
    ground: HashSet<String>,
    added: HashSet<String>,
    removed: HashSet<String>,
}

impl Namespace {
    /// Create a namespace from an initializer callback.
    ///
    /// The callback enumerates every name currently taken in the scope; it
    /// runs exactly once, here.
    pub fn new(initializer: impl FnOnce() -> HashSet<String>) -> Self {
        Self {
            ground: initializer(),
            added: HashSet::new(),
            removed: HashSet::new(),
        }
    }

    /// Create a namespace from a known name set.
    pub fn from_names(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            ground: names.into_iter().collect(),
            added: HashSet::new(),
            removed: HashSet::new(),
        }
    }

    /// Effective membership: taken in ground truth or the pending
    /// simulated-add overlay, and not simulated-removed.
    pub fn contains(&self, name: &str) -> bool {
        if self.removed.contains(name) {
            return false;
        }
        self.ground.contains(name) || self.added.contains(name)
    }

    /// Add a name to ground truth.
    pub fn add(&mut self, name: impl Into<String>) {
        self.ground.insert(name.into());
    }

    /// Remove a name from ground truth.
    pub fn remove(&mut self, name: &str) {
        self.ground.remove(name);
    }

    /// Atomic ground-truth rename: remove `old`, add `new`.
    pub fn update(&mut self, old: &str, new: impl Into<String>) {
        self.ground.remove(old);
        self.ground.insert(new.into());
    }

    /// Record a rename in the overlay only; ground truth is unchanged.
    pub fn simulate_update(&mut self, old: &str, new: impl Into<String>) {
        let new = new.into();
        // A name re-added after a simulated removal is live again.
        self.added.remove(old);
        self.removed.insert(old.to_string());
        self.removed.remove(&new);
        self.added.insert(new);
    }

    /// Merge the overlay into ground truth and clear it.
    pub fn commit_simulated_changes(&mut self) {
        for name in self.removed.drain() {
            self.ground.remove(&name);
        }
        for name in self.added.drain() {
            self.ground.insert(name);
        }
    }

    /// Drop the overlay without touching ground truth.
    pub fn discard_simulated_changes(&mut self) {
        self.added.clear();
        self.removed.clear();
    }

    /// Convert one target's simulated rename into a ground-truth commit.
    ///
    /// Called after the real rename has been applied to the host. The pair
    /// is cleared from the overlay so a later batch-wide discard cannot back
    /// it out.
    pub fn commit_update(&mut self, old: &str, new: impl Into<String>) {
        let new = new.into();
        self.added.remove(&new);
        self.removed.remove(old);
        self.ground.remove(old);
        self.ground.insert(new);
    }

    /// Drop one target's simulated rename, making `new` available again.
    ///
    /// Called when the host refused the rename in Phase 2.
    pub fn discard_update(&mut self, old: &str, new: &str) {
        self.added.remove(new);
        self.removed.remove(old);
    }

    /// Whether any simulated changes are pending.
    pub fn has_pending_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    /// Number of names in the effective view.
    pub fn len(&self) -> usize {
        let mut count = self.ground.len();
        for name in &self.added {
            if !self.ground.contains(name) {
                count += 1;
            }
        }
        for name in &self.removed {
            if self.ground.contains(name) || self.added.contains(name) {
                count -= 1;
            }
        }
        count
    }

    /// Whether the effective view is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
