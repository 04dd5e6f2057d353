use std::collections::BTreeSet;

use graft_symbols::ClassDecl;
use proptest::prelude::*;

use crate::common::*;

fn contributions(interfaces: usize, plugins: usize) -> Vec<ClassDecl> {
	let mut classes = vec![
		scope("app.S"),
		ClassDecl::interface("app.Plugin"),
		interface("app.M", merge_component("app.S")),
	];
	classes.extend((0..interfaces).map(|i| interface(&format!("app.Feature{i}"), contributes_to("app.S"))));
	classes.extend((0..plugins).map(|i| binding(&format!("app.Plugin{i}"), "app.Plugin", contributes_multibinding("app.S"))));
	classes
}

fn sorted(names: Vec<String>) -> BTreeSet<String> {
	names.into_iter().collect()
}

proptest! {
	/// Input order never changes what a merge point resolves to, and the same input always
	/// resolves identically.
	#[test]
	fn prop_resolution_is_deterministic(interfaces in 0usize..6, plugins in 0usize..4) {
		let forward = compile(contributions(interfaces, plugins));
		let again = compile(contributions(interfaces, plugins));
		let mut reversed_input = contributions(interfaces, plugins);
		reversed_input.reverse();
		let reversed = compile(reversed_input);

		prop_assert_eq!(supertypes(&forward, "app.M"), supertypes(&again, "app.M"));
		prop_assert_eq!(modules(&forward, "app.M"), modules(&again, "app.M"));
		prop_assert_eq!(sorted(supertypes(&forward, "app.M")), sorted(supertypes(&reversed, "app.M")));
		prop_assert_eq!(sorted(modules(&forward, "app.M")), sorted(modules(&reversed, "app.M")));

		let expected: BTreeSet<String> = (0..interfaces).map(|i| format!("app.Feature{i}")).collect();
		prop_assert_eq!(sorted(supertypes(&forward, "app.M")), expected);
	}

	/// Every multibinding survives, whatever else is contributed next to it.
	#[test]
	fn prop_multibindings_are_additive(interfaces in 0usize..3, plugins in 1usize..6) {
		let output = compile(contributions(interfaces, plugins));
		let expected: BTreeSet<String> = (0..plugins).map(|i| format!("app.Plugin{i}")).collect();
		prop_assert_eq!(sorted(binding_origins(&output, "app.M")), expected);
		prop_assert_eq!(modules(&output, "app.M").len(), plugins);
	}

	/// Excluding any subset of contributed modules removes exactly that subset.
	#[test]
	fn prop_exclusion_removes_exactly_the_excluded(mask in prop::collection::vec(any::<bool>(), 1..6)) {
		let excluded: Vec<String> = mask
			.iter()
			.enumerate()
			.filter(|(_, excluded)| **excluded)
			.map(|(i, _)| format!("app.Module{i}"))
			.collect();
		let excluded_refs: Vec<&str> = excluded.iter().map(String::as_str).collect();

		let mut classes_in = vec![
			scope("app.S"),
			interface("app.M", classes(merge_component("app.S"), "exclude", &excluded_refs)),
		];
		classes_in.extend((0..mask.len()).map(|i| module(&format!("app.Module{i}"), "app.S")));
		let output = compile(classes_in);

		let expected: BTreeSet<String> = mask
			.iter()
			.enumerate()
			.filter(|(_, excluded)| !**excluded)
			.map(|(i, _)| format!("app.Module{i}"))
			.collect();
		prop_assert_eq!(sorted(modules(&output, "app.M")), expected);
	}

	/// With distinct ranks, the highest-ranked plain binding is the only survivor.
	#[test]
	fn prop_highest_rank_is_the_only_survivor(ranks in prop::collection::btree_set(-20i64..20, 1..5)) {
		let mut classes_in = vec![
			scope("app.S"),
			ClassDecl::interface("app.Clock"),
			interface("app.M", merge_component("app.S")),
		];
		classes_in.extend(
			ranks
				.iter()
				.map(|rank| binding(&format!("app.Clock{}", rank + 20), "app.Clock", ranked(contributes_binding("app.S"), *rank))),
		);
		let output = compile(classes_in);

		let top = ranks.iter().max().copied().unwrap_or_default();
		prop_assert_eq!(binding_origins(&output, "app.M"), vec![format!("app.Clock{}", top + 20)]);
	}
}
