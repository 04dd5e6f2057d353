use graft_index::names;
use graft_merge::{ErrorCategory, MergeErrorKind};
use graft_symbols::{Annotation, AnnotationValue, ClassDecl, FqName};
use pretty_assertions::assert_eq;

use crate::common::*;

fn excluding(scope: &str, excluded: &[&str]) -> Annotation {
	classes(merge_component(scope), "exclude", excluded)
}

#[test]
fn test_excluded_module_and_interface_are_dropped() {
	let output = compile([
		scope("app.S"),
		module("app.Noisy", "app.S"),
		module("app.Quiet", "app.S"),
		interface("app.Debug", contributes_to("app.S")),
		interface("app.M", excluding("app.S", &["app.Noisy", "app.Debug"])),
	]);
	assert_eq!(modules(&output, "app.M"), vec!["app.Quiet"]);
	assert!(supertypes(&output, "app.M").is_empty());
}

#[test]
fn test_excluded_binding_origin_drops_its_module() {
	let output = compile([
		scope("app.S"),
		ClassDecl::interface("app.Clock"),
		binding("app.SystemClock", "app.Clock", contributes_binding("app.S")),
		interface("app.M", excluding("app.S", &["app.SystemClock"])),
	]);
	assert!(modules(&output, "app.M").is_empty());
	assert!(binding_origins(&output, "app.M").is_empty());
}

#[test]
fn test_excluded_class_cannot_replace() {
	let output = compile([
		scope("app.S"),
		module("app.Legacy", "app.S"),
		ClassDecl::class("app.Modern")
			.with_annotation(Annotation::new(names::DAGGER_MODULE))
			.with_annotation(classes(contributes_to("app.S"), "replaces", &["app.Legacy"])),
		interface("app.M", excluding("app.S", &["app.Modern"])),
	]);
	assert_eq!(modules(&output, "app.M"), vec!["app.Legacy"]);
}

#[test]
fn test_exclusion_repeated_across_scopes_is_idempotent() {
	let classes_once = [
		scope("app.S"),
		scope("app.T"),
		module("app.Noisy", "app.S"),
		module("app.Kept", "app.T"),
		ClassDecl::interface("app.M").with_annotation(excluding("app.S", &["app.Noisy"])).with_annotation(merge_component("app.T")),
	];
	let classes_twice = [
		scope("app.S"),
		scope("app.T"),
		module("app.Noisy", "app.S"),
		module("app.Kept", "app.T"),
		ClassDecl::interface("app.M")
			.with_annotation(excluding("app.S", &["app.Noisy"]))
			.with_annotation(excluding("app.T", &["app.Noisy"])),
	];
	let once = compile(classes_once);
	let twice = compile(classes_twice);
	assert_eq!(modules(&once, "app.M"), vec!["app.Kept"]);
	assert_eq!(modules(&once, "app.M"), modules(&twice, "app.M"));
}

#[test]
fn test_excluded_class_outside_scope_is_rejected() {
	let error = try_compile([
		scope("app.S"),
		scope("app.T"),
		module("app.Elsewhere", "app.T"),
		interface("app.M", excluding("app.S", &["app.Elsewhere"])),
	])
	.expect_err("excluded class is not in scope");
	assert_eq!(error.category(), ErrorCategory::ScopeConsistency);
	assert_eq!(error.site.related, vec![FqName::new("app.Elsewhere")]);
	assert!(matches!(error.kind, MergeErrorKind::ExcludedNotInScope { .. }));
}

#[test]
fn test_included_and_excluded_module_conflicts() {
	let error = try_compile([
		scope("app.S"),
		module("app.Both", "app.S"),
		interface(
			"app.M",
			excluding("app.S", &["app.Both"]).with("modules", AnnotationValue::classes(["app.Both"])),
		),
	])
	.expect_err("conflict");
	assert_eq!(error.message(), "app.M includes and excludes modules at the same time: app.Both");
}

#[test]
fn test_excluding_own_supertype_is_rejected() {
	let error = try_compile([
		scope("app.S"),
		interface("app.Base", contributes_to("app.S")),
		interface("app.M", excluding("app.S", &["app.Base"])).with_supertype("app.Base"),
	])
	.expect_err("supertype excluded");
	assert!(matches!(error.kind, MergeErrorKind::ExcludesSupertypes { ref excluded, .. } if excluded.len() == 1));
}

#[test]
fn test_module_merge_rejects_excluded_interface_outside_scope() {
	let error = try_compile([
		scope("app.S"),
		module("app.Kept", "app.S"),
		ClassDecl::interface("app.Stranger"),
		interface("app.M", classes(scoped(names::MERGE_MODULES, "app.S"), "exclude", &["app.Stranger"])),
	])
	.expect_err("excluded interface is contributed nowhere");
	assert_eq!(error.category(), ErrorCategory::ScopeConsistency);
	assert!(matches!(error.kind, MergeErrorKind::ExcludedNotInScope { ref excluded, .. } if excluded.as_str() == "app.Stranger"));
}

#[test]
fn test_interface_merge_rejects_excluded_module() {
	let error = try_compile([
		scope("app.S"),
		interface("app.I", contributes_to("app.S")),
		module("app.Mod", "app.S"),
		interface("app.M", classes(merge_interfaces("app.S"), "exclude", &["app.Mod"])),
	])
	.expect_err("modules cannot be excluded from interfaces");
	assert_eq!(error.category(), ErrorCategory::KindMismatch);
	assert_eq!(error.message(), "app.M wants to exclude app.Mod, but the excluded class is not an interface.");
	assert_eq!(error.site.related, vec![FqName::new("app.Mod")]);
}

#[test]
fn test_interface_merge_rejects_excluded_plain_class() {
	let error = try_compile([
		scope("app.S"),
		interface("app.I", contributes_to("app.S")),
		ClassDecl::class("app.Plain"),
		interface("app.M", classes(merge_interfaces("app.S"), "exclude", &["app.Plain"])),
	])
	.expect_err("plain classes cannot be excluded from interfaces");
	assert!(matches!(error.kind, MergeErrorKind::ExcludedNotInterface { .. }));
}

#[test]
fn test_interface_merge_rejects_excluded_interface_outside_scope() {
	let error = try_compile([
		scope("app.S"),
		scope("app.T"),
		interface("app.I", contributes_to("app.S")),
		interface("app.Other", contributes_to("app.T")),
		interface("app.M", classes(merge_interfaces("app.S"), "exclude", &["app.Other"])),
	])
	.expect_err("excluded interface is in another scope");
	assert!(matches!(error.kind, MergeErrorKind::ExcludedNotInScope { .. }));
}
