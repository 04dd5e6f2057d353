use graft_merge::BindingKey;
use graft_symbols::{ClassDecl, SymbolTable};
use pretty_assertions::assert_eq;

use crate::common::*;

#[test]
fn test_contributed_interface_is_merged() {
	let output = compile([
		scope("app.S"),
		interface("app.I", contributes_to("app.S")),
		interface("app.M", merge_component("app.S")),
	]);
	assert_eq!(supertypes(&output, "app.M"), vec!["app.I"]);

	let amended = output.table.class("app.M").expect("merge point");
	assert_eq!(amended.supertypes.len(), 1);
	assert_eq!(amended.supertypes[0].as_str(), "app.I");
}

#[test]
fn test_replacing_interface_wins() {
	let output = compile([
		scope("app.S"),
		interface("app.I", contributes_to("app.S")),
		interface("app.J", classes(contributes_to("app.S"), "replaces", &["app.I"])),
		interface("app.M", merge_component("app.S")),
	]);
	assert_eq!(supertypes(&output, "app.M"), vec!["app.J"]);
}

#[test]
fn test_exclusion_is_per_merge_point() {
	let output = compile([
		scope("app.S"),
		scope("app.T"),
		ClassDecl::interface("app.I")
			.with_annotation(contributes_to("app.S"))
			.with_annotation(contributes_to("app.T")),
		interface("app.M", classes(merge_component("app.S"), "exclude", &["app.I"])),
		interface("app.N", merge_component("app.T")),
	]);
	assert!(supertypes(&output, "app.M").is_empty());
	assert_eq!(supertypes(&output, "app.N"), vec!["app.I"]);
}

#[test]
fn test_highest_rank_binding_survives() {
	let output = compile([
		scope("app.S"),
		ClassDecl::interface("app.X"),
		binding("app.A", "app.X", ranked(contributes_binding("app.S"), 0)),
		binding("app.B", "app.X", ranked(contributes_binding("app.S"), 1)),
		interface("app.M", merge_component("app.S")),
	]);
	let result = output.result("app.M").expect("resolved");
	let survivors = result.bindings.get(&BindingKey::new("app.S", "app.X", "")).expect("key present");
	assert_eq!(survivors.len(), 1);
	assert_eq!(survivors[0].origin.name.as_str(), "app.B");
	assert_eq!(modules(&output, "app.M").len(), 1);
}

#[test]
fn test_tied_bindings_are_ambiguous() {
	let error = try_compile([
		scope("app.S"),
		ClassDecl::interface("app.X"),
		binding("app.A", "app.X", ranked(contributes_binding("app.S"), 0)),
		binding("app.B", "app.X", ranked(contributes_binding("app.S"), 0)),
		interface("app.M", merge_component("app.S")),
	])
	.expect_err("ambiguous");
	let message = error.message();
	assert!(message.contains("app.A"), "{message}");
	assert!(message.contains("app.B"), "{message}");
	assert!(message.contains("The rank is HIGH"), "{message}");
}

#[test]
fn test_scope_isolation() {
	let output = compile([
		scope("app.Unit"),
		scope("app.Any"),
		interface("app.UnitOnly", contributes_to("app.Unit")),
		module("app.UnitModule", "app.Unit"),
		interface("app.AnyOnly", contributes_to("app.Any")),
		interface("app.AnyComponent", merge_component("app.Any")),
		interface("app.UnitComponent", merge_component("app.Unit")),
	]);
	assert_eq!(supertypes(&output, "app.AnyComponent"), vec!["app.AnyOnly"]);
	assert!(modules(&output, "app.AnyComponent").is_empty());
	assert_eq!(supertypes(&output, "app.UnitComponent"), vec!["app.UnitOnly"]);
	assert_eq!(modules(&output, "app.UnitComponent"), vec!["app.UnitModule"]);
}

#[test]
fn test_multiple_scopes_on_one_merge_point() {
	let output = compile([
		scope("app.S"),
		scope("app.T"),
		interface("app.I", contributes_to("app.S")),
		interface("app.J", contributes_to("app.T")),
		ClassDecl::interface("app.M")
			.with_annotation(merge_component("app.S"))
			.with_annotation(merge_component("app.T")),
	]);
	assert_eq!(supertypes(&output, "app.M"), vec!["app.I", "app.J"]);
}

#[test]
fn test_merge_interfaces_only_adds_supertypes() {
	let output = compile([
		scope("app.S"),
		interface("app.I", contributes_to("app.S")),
		module("app.SModule", "app.S"),
		interface("app.M", merge_interfaces("app.S")),
	]);
	assert_eq!(supertypes(&output, "app.M"), vec!["app.I"]);
	assert!(modules(&output, "app.M").is_empty());
	assert!(output.amendments[0].annotation.is_none());
}

#[test]
fn test_compiled_contributions_are_indexed_through_their_hints() {
	use graft_symbols::{Declaration, TopLevelProperty};

	let input = table([
		scope("app.S"),
		interface("lib.Shared", contributes_to("app.S")).compiled("lib.jar"),
		interface("app.M", merge_component("app.S")),
	])
	.with_generated([
		Declaration::Property(TopLevelProperty {
			package: "graft.hint".to_string(),
			name: "lib_Shared_reference".to_string(),
			type_name: "lib.Shared".into(),
		}),
		Declaration::Property(TopLevelProperty {
			package: "graft.hint".to_string(),
			name: "lib_Shared_scope0".to_string(),
			type_name: "app.S".into(),
		}),
	])
	.expect("unique");
	let output = graft_merge::Compilation::new(input, graft_merge::MergeConfig::default())
		.expect("valid config")
		.run()
		.expect("compiles");
	assert_eq!(output.passes, 1);
	assert_eq!(supertypes(&output, "app.M"), vec!["lib.Shared"]);
}
