//! Property checks over parsing, rendering, and namespace simulation.

use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;

use namecast::core::config::PatternConfig;
use namecast::core::target::RenameTarget;
use namecast::core::types::{ElementId, ScopeKey};
use namecast::element::ElementFactory;
use namecast::engine::{ConflictResolver, ConflictStrategy};
use namecast::namespace::{Namespace, NamespaceCache};
use namecast::pattern::NamingPattern;

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
        type = "position"
        id = "side"
        order = 1
        separator = "."
        xaxis = "L|R"

        [[elements]]
        type = "numeric_counter"
        id = "count"
        order = 2
        separator = "."
        padding = 3
        "#,
    )
    .unwrap();
    ElementFactory::new().create_pattern(&config).unwrap()
}

/// A name assembled from valid element values, possibly with parts omitted.
fn component_name() -> impl Strategy<Value = String> {
    let base = proptest::option::of(prop_oneof![
        Just("Arm".to_string()),
        Just("Leg".to_string()),
        Just("Hand".to_string()),
    ]);
    let side = proptest::option::of(prop_oneof![Just("L".to_string()), Just("R".to_string())]);
    let count = proptest::option::of((1u64..=999).prop_map(|n| format!("{n:03}")));

    (base, side, count).prop_map(|(base, side, count)| {
        [base, side, count]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(".")
    })
}

proptest! {
    /// Any name assembled from valid components parses and renders back to
    /// itself.
    #[test]
    fn parse_render_round_trip(name in component_name()) {
        prop_assume!(!name.is_empty());
        let mut pattern = limb_pattern();
        prop_assert!(pattern.parse_name(&name), "should parse: {name}");
        prop_assert_eq!(pattern.render_name(), name);
    }

    /// A failed parse never disturbs previously parsed values.
    #[test]
    fn failed_parse_mutates_nothing(junk in "[a-z]{1,8}-[0-9]{1,4}") {
        let mut pattern = limb_pattern();
        prop_assert!(pattern.parse_name("Arm.L.001"));
        prop_assert!(!pattern.parse_name(&junk), "should reject: {junk}");
        prop_assert_eq!(pattern.render_name(), "Arm.L.001");
    }

    /// Updating one element never changes the others.
    #[test]
    fn element_updates_are_isolated(name in component_name(), to_side in prop_oneof![Just("L"), Just("R")]) {
        prop_assume!(!name.is_empty());
        let mut pattern = limb_pattern();
        prop_assume!(pattern.parse_name(&name));

        let base_before = pattern
            .get_element_by_id(&ElementId::new("base").unwrap())
            .unwrap()
            .value()
            .map(str::to_string);

        let updates = BTreeMap::from([(
            ElementId::new("side").unwrap(),
            Some(to_side.to_string()),
        )]);
        pattern.update_elements(&updates).unwrap();

        let base_after = pattern
            .get_element_by_id(&ElementId::new("base").unwrap())
            .unwrap()
            .value()
            .map(str::to_string);
        prop_assert_eq!(base_before, base_after);
    }

    /// Repeated counter increments render strictly new names until the
    /// ceiling.
    #[test]
    fn counter_names_never_repeat(steps in 1usize..200) {
        let mut pattern = limb_pattern();
        prop_assert!(pattern.parse_name("Arm"));

        let mut seen = HashSet::new();
        for _ in 0..steps {
            pattern.increment_counter().unwrap();
            prop_assert!(seen.insert(pattern.render_name()));
        }
    }

    /// Simulate-then-discard restores membership exactly.
    #[test]
    fn discard_restores_namespace(renames in proptest::collection::vec(("[A-E]", "[V-Z][0-9]"), 0..8)) {
        let ground: Vec<String> = ["A", "B", "C", "D", "E"].iter().map(|s| s.to_string()).collect();
        let mut ns = Namespace::from_names(ground.clone());

        for (old, new) in &renames {
            ns.simulate_update(old, new.clone());
        }
        ns.discard_simulated_changes();

        for name in &ground {
            prop_assert!(ns.contains(name));
        }
        for (_, new) in &renames {
            prop_assert!(ground.contains(new) || !ns.contains(new));
        }
    }

    /// Simulate-then-commit reaches the same membership as direct updates.
    #[test]
    fn commit_matches_direct_updates(renames in proptest::collection::vec(("[A-E]", "[V-Z][0-9]"), 0..8)) {
        let ground: Vec<String> = ["A", "B", "C", "D", "E"].iter().map(|s| s.to_string()).collect();

        let mut simulated = Namespace::from_names(ground.clone());
        let mut direct = Namespace::from_names(ground.clone());

        for (old, new) in &renames {
            simulated.simulate_update(old, new.clone());
            direct.update(old, new.clone());
        }
        simulated.commit_simulated_changes();

        let probe: Vec<String> = ground
            .iter()
            .cloned()
            .chain(renames.iter().map(|(_, new)| new.clone()))
            .collect();
        for name in &probe {
            prop_assert_eq!(simulated.contains(name), direct.contains(name), "{}", name);
        }
    }
}

struct FixedTarget {
    name: String,
    scope: HashSet<String>,
}

impl RenameTarget for FixedTarget {
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
        self.scope.clone()
    }
}

proptest! {
    /// Counter resolution always yields a name outside the taken set (or the
    /// target's own name).
    #[test]
    fn resolved_names_are_conflict_free(taken in 0u64..50) {
        let mut scope: HashSet<String> = HashSet::from(["Arm".to_string()]);
        scope.extend((1..=taken).map(|n| format!("Arm.{n:03}")));

        let target = FixedTarget {
            name: "Cube".to_string(),
            scope: scope.clone(),
        };
        let mut pattern = limb_pattern();
        prop_assert!(pattern.parse_name("Arm"));

        let mut cache = NamespaceCache::new();
        let resolved = ConflictResolver::new()
            .resolve(&target, &mut pattern, "Arm", ConflictStrategy::Counter, &mut cache)
            .unwrap();
        prop_assert!(!scope.contains(&resolved));
        prop_assert_eq!(resolved, format!("Arm.{:03}", taken + 1));
    }
}
