use graft_index::names;
use graft_merge::{ErrorCategory, MergeConfig, MergeErrorKind};
use graft_symbols::{Annotation, AnnotationValue, ClassDecl, Provenance, Visibility};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::*;

#[test]
fn test_mixed_merge_annotations() {
	let error = try_compile([
		scope("app.S"),
		ClassDecl::interface("app.M")
			.with_annotation(merge_component("app.S"))
			.with_annotation(merge_interfaces("app.S")),
	])
	.expect_err("mixed annotations");
	assert_eq!(error.category(), ErrorCategory::Structural);
	assert_eq!(
		error.message(),
		"It's only allowed to have one single type of @Merge* annotation, however multiple instances of the same annotation are allowed. You mix [MergeComponent, MergeInterfaces] and this is forbidden."
	);
}

#[test]
fn test_merge_point_must_be_an_interface() {
	let error = try_compile([scope("app.S"), ClassDecl::class("app.M").with_annotation(merge_component("app.S"))])
		.expect_err("class merge point");
	assert!(matches!(error.kind, MergeErrorKind::MergePointNotInterface { .. }));
	assert_eq!(error.site.declaration.as_str(), "app.M");
}

#[test]
fn test_duplicate_merge_scope() {
	let error = try_compile([
		scope("app.S"),
		ClassDecl::interface("app.M")
			.with_annotation(merge_component("app.S"))
			.with_annotation(merge_component("app.S")),
	])
	.expect_err("same scope twice");
	assert_eq!(
		error.message(),
		"app.M merges multiple times to the same scope: [app.S]. Merging multiple times to the same scope is forbidden and all scopes must be distinct."
	);
}

#[test]
fn test_hand_written_component_annotation() {
	let error = try_compile([
		scope("app.S"),
		interface("app.M", merge_component("app.S")).with_annotation(Annotation::new(names::DAGGER_COMPONENT)),
	])
	.expect_err("already annotated");
	assert_eq!(
		error.message(),
		"When using @MergeComponent it's not allowed to annotate the same class with @Component. The Dagger annotation will be generated."
	);
}

#[rstest]
#[case::internal(Visibility::Internal)]
#[case::private(Visibility::Private)]
fn test_hidden_contribution(#[case] visibility: Visibility) {
	let error = try_compile([
		scope("app.S"),
		interface("app.Hidden", contributes_to("app.S")).with_visibility(visibility),
		interface("app.M", merge_component("app.S")),
	])
	.expect_err("not public");
	assert_eq!(error.category(), ErrorCategory::Visibility);
	assert!(error.message().starts_with("app.Hidden is contributed to the Dagger graph"));
}

#[test]
fn test_binding_without_bound_type() {
	let error = try_compile([
		scope("app.S"),
		ClassDecl::interface("app.A"),
		ClassDecl::interface("app.B"),
		ClassDecl::class("app.Impl")
			.with_supertype("app.A")
			.with_supertype("app.B")
			.with_annotation(contributes_binding("app.S")),
		interface("app.M", merge_component("app.S")),
	])
	.expect_err("bound type required");
	assert_eq!(error.category(), ErrorCategory::Configuration);
	assert!(matches!(error.kind, MergeErrorKind::MissingBoundType { ref candidates, .. } if candidates.len() == 2));
}

#[test]
fn test_contribution_that_is_neither_interface_nor_module() {
	let error = try_compile([
		scope("app.S"),
		ClassDecl::class("app.Plain").with_annotation(contributes_to("app.S")),
		interface("app.M", merge_component("app.S")),
	])
	.expect_err("not a module");
	assert_eq!(error.category(), ErrorCategory::KindMismatch);
	assert_eq!(
		error.message(),
		"app.Plain is annotated with @ContributesTo, but this class is neither an interface nor a Dagger module. Did you forget to add @Module?"
	);
}

#[test]
fn test_error_display_carries_source_location() {
	let error = try_compile([
		scope("app.S"),
		ClassDecl::class("app.M")
			.with_annotation(merge_component("app.S"))
			.with_provenance(Provenance::Source {
				path: "src/main/kotlin/app/M.kt".into(),
			})
			.at(12, 1),
	])
	.expect_err("class merge point");
	assert_eq!(
		error.to_string(),
		"src/main/kotlin/app/M.kt:12:1 (app.M): Dagger components (or classes annotated with @MergeInterfaces) must be interfaces."
	);
}

#[test]
fn test_include_that_never_appears_is_a_cycle() {
	let config = MergeConfig {
		max_passes: 3,
		..MergeConfig::default()
	};
	let error = try_compile_with(
		[
			scope("app.S"),
			interface("app.M", merge_component("app.S").with("modules", AnnotationValue::classes(["app.Never"]))),
		],
		config,
	)
	.expect_err("include never appears");
	assert_eq!(error.category(), ErrorCategory::Cycle);
	assert!(error.message().contains("app.M"), "{}", error.message());
}
