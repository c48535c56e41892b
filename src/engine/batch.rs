//! engine::batch
//!
//! The two-phase batch rename orchestrator.
//!
//! # Protocol
//!
//! Renames must be previewable, and a late failure on one target must not
//! leave the namespace inconsistent with the renames actually applied. The
//! orchestrator therefore splits every batch into two phases:
//!
//! - **Phase 1 (propose + resolve, no host mutation)**: per target, parse
//!   the current name, apply pending per-element overrides, render the
//!   proposed name, resolve conflicts against the simulated namespace, and
//!   record a pending result
//! - **Phase 2 (apply + commit)**: per pending result, assign the final name
//!   on the host; success commits that target's namespace change, failure
//!   records the message and releases the simulated reservation
//!
//! Preview is Phase 1 alone with the simulated state discarded afterwards;
//! there is no special casing.
//!
//! # Invariants
//!
//! - Targets are processed in collection order; each resolution sees the
//!   cumulative simulated effect of all prior targets in the batch
//! - Exactly one [`RenameResult`] per collected target, success or failure
//! - A Phase 2 failure neither rolls back earlier commits nor aborts the
//!   remaining targets

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::target::RenameTarget;
use crate::core::types::ElementId;
use crate::namespace::NamespaceCache;
use crate::pattern::NamingPattern;

use super::resolve::{ConflictResolver, ConflictStrategy};

/// Outcome of one target's rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameStatus {
    /// Resolved in Phase 1, not yet applied to the host.
    Pending,
    /// Applied to the host and committed to the namespace.
    Applied,
    /// Failed in either phase; `message` says why.
    Failed,
}

/// Per-target record of a batch rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameResult {
    /// Index of the target in the collected batch.
    pub index: usize,
    /// Name before the batch.
    pub original: String,
    /// Name the pattern rendered before conflict resolution.
    pub proposed: String,
    /// Name after conflict resolution (applied in Phase 2).
    pub final_name: String,
    /// Where this target's rename stands.
    pub status: RenameStatus,
    /// Failure explanation, when `status` is `Failed`.
    pub message: Option<String>,
}

impl RenameResult {
    /// Whether the rename was applied to the host.
    pub fn succeeded(&self) -> bool {
        self.status == RenameStatus::Applied
    }

    /// Whether conflict resolution had to move off the proposed name.
    pub fn had_conflict(&self) -> bool {
        self.final_name != self.proposed
    }
}

/// A single batch rename: targets, pattern, overrides, strategy, results.
///
/// Created per user-invoked rename action and discarded after results are
/// reported.
pub struct BatchRenameOperation {
    targets: Vec<Box<dyn RenameTarget>>,
    pattern: NamingPattern,
    overrides: BTreeMap<ElementId, Option<String>>,
    strategy: ConflictStrategy,
    resolver: ConflictResolver,
    results: Vec<RenameResult>,
}

impl BatchRenameOperation {
    /// Create a batch over collected targets.
    ///
    /// Target order is preserved into both phases; it is observable in
    /// counter tie-breaking and must come from a deterministic collector.
    pub fn new(
        pattern: NamingPattern,
        targets: Vec<Box<dyn RenameTarget>>,
        strategy: ConflictStrategy,
    ) -> Self {
        Self {
            targets,
            pattern,
            overrides: BTreeMap::new(),
            strategy,
            resolver: ConflictResolver::new(),
            results: Vec::new(),
        }
    }

    /// Set a pending per-element value override applied to every target.
    ///
    /// `None` clears the element on render.
    pub fn set_override(&mut self, id: ElementId, value: Option<String>) {
        self.overrides.insert(id, value);
    }

    /// Replace all pending overrides.
    pub fn with_overrides(mut self, overrides: BTreeMap<ElementId, Option<String>>) -> Self {
        self.overrides = overrides;
        self
    }

    /// The collected targets.
    pub fn targets(&self) -> &[Box<dyn RenameTarget>] {
        &self.targets
    }

    /// Results accumulated so far: empty before Phase 1, one per target
    /// after.
    pub fn results(&self) -> &[RenameResult] {
        &self.results
    }

    /// Consume the batch, yielding its results.
    pub fn into_results(self) -> Vec<RenameResult> {
        self.results
    }

    /// Whether any target needed conflict resolution in Phase 1.
    pub fn has_conflicts(&self) -> bool {
        self.results.iter().any(RenameResult::had_conflict)
    }

    /// Phase 1: render and resolve every target, mutating only the
    /// namespace overlay. Returns one pending (or failed) result per
    /// target.
    pub fn prepare(&mut self, cache: &mut NamespaceCache) -> &[RenameResult] {
        self.results.clear();

        for index in 0..self.targets.len() {
            let target = self.targets[index].as_ref();
            let original = target.name();

            // A stale value from the previous target must not leak into
            // this render, so clear before parsing.
            self.pattern.clear_values();
            if !self.pattern.parse_name(&original) {
                debug!(name = %original, "current name does not match the pattern");
            }

            if let Err(err) = self.pattern.update_elements(&self.overrides) {
                warn!(name = %original, %err, "override rejected");
                self.results.push(RenameResult {
                    index,
                    original: original.clone(),
                    proposed: original.clone(),
                    final_name: original,
                    status: RenameStatus::Failed,
                    message: Some(err.to_string()),
                });
                continue;
            }

            let proposed = self.pattern.render_name();
            match self.resolver.resolve(
                target,
                &mut self.pattern,
                &proposed,
                self.strategy,
                cache,
            ) {
                Ok(final_name) => {
                    self.results.push(RenameResult {
                        index,
                        original,
                        proposed,
                        final_name,
                        status: RenameStatus::Pending,
                        message: None,
                    });
                }
                Err(err) => {
                    warn!(name = %original, %err, "conflict resolution failed");
                    self.results.push(RenameResult {
                        index,
                        original: original.clone(),
                        proposed,
                        final_name: original,
                        status: RenameStatus::Failed,
                        message: Some(err.to_string()),
                    });
                }
            }
        }

        debug_assert_eq!(self.results.len(), self.targets.len());
        &self.results
    }

    /// Phase 2: apply every pending result on the host and commit (or
    /// release) its namespace change.
    ///
    /// A refused assignment fails that target only; earlier commits stand
    /// and later targets still run.
    pub fn execute(&mut self, cache: &mut NamespaceCache) -> &[RenameResult] {
        for result in &mut self.results {
            if result.status != RenameStatus::Pending {
                continue;
            }
            let target = &mut self.targets[result.index];

            // No-op renames still count as applied; the host is not asked,
            // but the reservation is drained from the overlay.
            if result.final_name == result.original {
                self.resolver.apply_namespace_update(
                    target.as_ref(),
                    &result.original,
                    &result.final_name,
                    cache,
                );
                result.status = RenameStatus::Applied;
                continue;
            }

            match target.set_name(&result.final_name) {
                Ok(()) => {
                    self.resolver.apply_namespace_update(
                        target.as_ref(),
                        &result.original,
                        &result.final_name,
                        cache,
                    );
                    result.status = RenameStatus::Applied;
                }
                Err(err) => {
                    warn!(
                        original = %result.original,
                        final_name = %result.final_name,
                        %err,
                        "host refused rename"
                    );
                    self.resolver.discard_namespace_update(
                        target.as_ref(),
                        &result.original,
                        &result.final_name,
                        cache,
                    );
                    result.status = RenameStatus::Failed;
                    result.message = Some(err.to_string());
                }
            }
        }

        let applied = self
            .results
            .iter()
            .filter(|result| result.succeeded())
            .count();
        info!(applied, total = self.results.len(), "batch rename executed");
        &self.results
    }

    /// Phase 1 alone: resolve everything, then back the overlay out so
    /// nothing stays reserved. The returned results carry the final names
    /// for display.
    pub fn preview(&mut self, cache: &mut NamespaceCache) -> &[RenameResult] {
        self.prepare(cache);
        cache.discard_all_simulated();
        &self.results
    }

    /// Targets in this batch whose current or proposed name equals `name`,
    /// excluding the asking target.
    ///
    /// Exposed so a caller can warn about collateral duplicates produced by
    /// [`ConflictStrategy::Force`]; nothing is auto-resolved.
    pub fn find_conflicting_targets(&self, index: usize, name: &str) -> Vec<usize> {
        (0..self.targets.len())
            .filter(|&i| i != index)
            .filter(|&i| {
                self.targets[i].name() == name
                    || self
                        .results
                        .get(i)
                        .is_some_and(|result| result.proposed == name)
            })
            .collect()
    }
}

/// Run a full batch lifecycle: Phase 1 then Phase 2.
///
/// Convenience entry point for callers that do not need a preview step
/// between the phases.
pub fn run_batch(
    pattern: NamingPattern,
    targets: Vec<Box<dyn RenameTarget>>,
    strategy: ConflictStrategy,
    overrides: BTreeMap<ElementId, Option<String>>,
    cache: &mut NamespaceCache,
) -> Vec<RenameResult> {
    let mut batch = BatchRenameOperation::new(pattern, targets, strategy).with_overrides(overrides);
    batch.prepare(cache);
    batch.execute(cache);
    batch.into_results()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use anyhow::bail;

    use crate::core::config::PatternConfig;
    use crate::core::types::ScopeKey;
    use crate::element::ElementFactory;

    /// Shared scope contents, so every target in a scene sees the same
    /// name set.
    type Scene = Rc<RefCell<HashSet<String>>>;

    struct SceneTarget {
        name: String,
        scene: Scene,
        refuse: bool,
    }

    impl SceneTarget {
        fn new(name: &str, scene: &Scene) -> Box<dyn RenameTarget> {
            scene.borrow_mut().insert(name.to_string());
            Box::new(Self {
                name: name.to_string(),
                scene: Rc::clone(scene),
                refuse: false,
            })
        }

        fn refusing(name: &str, scene: &Scene) -> Box<dyn RenameTarget> {
            scene.borrow_mut().insert(name.to_string());
            Box::new(Self {
                name: name.to_string(),
                scene: Rc::clone(scene),
                refuse: true,
            })
        }
    }

    impl RenameTarget for SceneTarget {
        fn name(&self) -> String {
            self.name.clone()
        }

        fn set_name(&mut self, name: &str) -> anyhow::Result<()> {
            if self.refuse {
                bail!("object is locked");
            }
            let mut scene = self.scene.borrow_mut();
            scene.remove(&self.name);
            scene.insert(name.to_string());
            self.name = name.to_string();
            Ok(())
        }

        fn namespace_key(&self) -> ScopeKey {
            ScopeKey::new("objects")
        }

        fn scope_names(&self) -> HashSet<String> {
            self.scene.borrow().clone()
        }
    }

    fn scene(names: &[&str]) -> Scene {
        Rc::new(RefCell::new(names.iter().map(|s| s.to_string()).collect()))
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
            items = ["Arm", "Leg", "Hand"]

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

    fn base_override(value: &str) -> BTreeMap<ElementId, Option<String>> {
        BTreeMap::from([(ElementId::new("base").unwrap(), Some(value.to_string()))])
    }

    #[test]
    fn prepare_reports_one_result_per_target() {
        let scene = scene(&[]);
        let targets = vec![
            SceneTarget::new("Cube", &scene),
            SceneTarget::new("Sphere", &scene),
        ];
        let mut batch = BatchRenameOperation::new(limb_pattern(), targets, ConflictStrategy::Counter)
            .with_overrides(base_override("Arm"));

        let mut cache = NamespaceCache::new();
        let results = batch.prepare(&mut cache);
        assert_eq!(results.len(), 2);
        assert!(results
            .iter()
            .all(|result| result.status == RenameStatus::Pending));
    }

    #[test]
    fn intra_batch_duplicates_are_deduplicated() {
        let scene = scene(&[]);
        let targets = vec![
            SceneTarget::new("Cube", &scene),
            SceneTarget::new("Sphere", &scene),
        ];
        let mut batch = BatchRenameOperation::new(limb_pattern(), targets, ConflictStrategy::Counter)
            .with_overrides(base_override("Leg"));

        let mut cache = NamespaceCache::new();
        batch.prepare(&mut cache);
        batch.execute(&mut cache);

        let finals: Vec<_> = batch
            .results()
            .iter()
            .map(|result| result.final_name.clone())
            .collect();
        assert_eq!(finals[0], "Leg");
        assert_eq!(finals[1], "Leg.001");
        assert!(batch.has_conflicts());
    }

    #[test]
    fn preview_reserves_nothing() {
        let scene = scene(&["Arm"]);
        let targets = vec![SceneTarget::new("Cube", &scene)];
        let mut batch = BatchRenameOperation::new(limb_pattern(), targets, ConflictStrategy::Counter)
            .with_overrides(base_override("Arm"));

        let mut cache = NamespaceCache::new();
        let results = batch.preview(&mut cache);
        assert_eq!(results[0].final_name, "Arm.001");

        // The preview left no reservation behind.
        let key = ScopeKey::new("objects");
        let ns = cache.get(&key).unwrap();
        assert!(!ns.contains("Arm.001"));
        assert!(!ns.has_pending_changes());
    }

    #[test]
    fn refused_rename_fails_that_target_only() {
        let scene = scene(&[]);
        let targets = vec![
            SceneTarget::new("Cube", &scene),
            SceneTarget::refusing("Sphere", &scene),
            SceneTarget::new("Cone", &scene),
        ];
        let mut batch = BatchRenameOperation::new(limb_pattern(), targets, ConflictStrategy::Counter)
            .with_overrides(base_override("Arm"));

        let mut cache = NamespaceCache::new();
        batch.prepare(&mut cache);
        batch.execute(&mut cache);

        let statuses: Vec<_> = batch
            .results()
            .iter()
            .map(|result| result.status)
            .collect();
        assert_eq!(
            statuses,
            vec![RenameStatus::Applied, RenameStatus::Failed, RenameStatus::Applied]
        );
        assert!(batch.results()[1].message.is_some());

        // The refused reservation was released; the applied ones committed.
        let key = ScopeKey::new("objects");
        let ns = cache.get(&key).unwrap();
        assert!(ns.contains("Arm"));
        assert!(!ns.contains("Arm.001"));
        assert!(ns.contains("Arm.002"));
        assert!(!ns.has_pending_changes());
    }

    #[test]
    fn force_conflicts_are_discoverable() {
        let scene = scene(&[]);
        let targets = vec![
            SceneTarget::new("Hand", &scene),
            SceneTarget::new("Cube", &scene),
        ];
        let mut batch = BatchRenameOperation::new(limb_pattern(), targets, ConflictStrategy::Force)
            .with_overrides(base_override("Hand"));

        let mut cache = NamespaceCache::new();
        batch.prepare(&mut cache);

        // Target 1 forced onto "Hand", which target 0 currently holds.
        assert_eq!(batch.results()[1].final_name, "Hand");
        assert_eq!(batch.find_conflicting_targets(1, "Hand"), vec![0]);
    }

    #[test]
    fn run_batch_convenience_applies_everything() {
        let scene = scene(&[]);
        let targets = vec![
            SceneTarget::new("Cube", &scene),
            SceneTarget::new("Sphere", &scene),
        ];
        let mut cache = NamespaceCache::new();
        let results = run_batch(
            limb_pattern(),
            targets,
            ConflictStrategy::Counter,
            base_override("Arm"),
            &mut cache,
        );

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(RenameResult::succeeded));
        let names: HashSet<_> = scene.borrow().clone();
        assert!(names.contains("Arm"));
        assert!(names.contains("Arm.001"));
    }
}
