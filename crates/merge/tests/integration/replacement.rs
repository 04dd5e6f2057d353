use graft_index::names;
use graft_merge::{ErrorCategory, MergeErrorKind};
use graft_symbols::{Annotation, AnnotationValue, ClassDecl};
use pretty_assertions::assert_eq;

use crate::common::*;

fn replacing_module(name: &str, replaces: &[&str]) -> ClassDecl {
	ClassDecl::class(name)
		.with_annotation(Annotation::new(names::DAGGER_MODULE))
		.with_annotation(classes(contributes_to("app.S"), "replaces", replaces))
}

#[test]
fn test_module_replaces_module() {
	let output = compile([
		scope("app.S"),
		module("app.Legacy", "app.S"),
		replacing_module("app.Modern", &["app.Legacy"]),
		interface("app.M", merge_component("app.S")),
	]);
	assert_eq!(modules(&output, "app.M"), vec!["app.Modern"]);
}

#[test]
fn test_replaced_predefined_module_is_removed() {
	let output = compile([
		scope("app.S"),
		module("app.Legacy", "app.S"),
		replacing_module("app.Modern", &["app.Legacy"]),
		interface(
			"app.M",
			merge_component("app.S").with("modules", AnnotationValue::classes(["app.Legacy", "app.Manual"])),
		),
		ClassDecl::class("app.Manual").with_annotation(Annotation::new(names::DAGGER_MODULE)),
	]);
	assert_eq!(modules(&output, "app.M"), vec!["app.Modern", "app.Manual"]);
}

#[test]
fn test_module_replaces_binding() {
	let output = compile([
		scope("app.S"),
		ClassDecl::interface("app.Clock"),
		binding("app.SystemClock", "app.Clock", contributes_binding("app.S")),
		replacing_module("app.FakeClockModule", &["app.SystemClock"]),
		interface("app.M", merge_component("app.S")),
	]);
	assert_eq!(modules(&output, "app.M"), vec!["app.FakeClockModule"]);
	assert!(binding_origins(&output, "app.M").is_empty());
}

#[test]
fn test_binding_replaces_binding() {
	let output = compile([
		scope("app.S"),
		ClassDecl::interface("app.Clock"),
		binding("app.SystemClock", "app.Clock", contributes_binding("app.S")),
		binding(
			"app.FakeClock",
			"app.Clock",
			classes(contributes_binding("app.S"), "replaces", &["app.SystemClock"]),
		),
		interface("app.M", merge_component("app.S")),
	]);
	assert_eq!(binding_origins(&output, "app.M"), vec!["app.FakeClock"]);
}

#[test]
fn test_replacement_overrides_rank() {
	let output = compile([
		scope("app.S"),
		ClassDecl::interface("app.Clock"),
		binding("app.SystemClock", "app.Clock", ranked(contributes_binding("app.S"), i64::from(i32::MAX))),
		binding(
			"app.FakeClock",
			"app.Clock",
			classes(contributes_binding("app.S"), "replaces", &["app.SystemClock"]),
		),
		interface("app.M", merge_component("app.S")),
	]);
	assert_eq!(binding_origins(&output, "app.M"), vec!["app.FakeClock"]);
}

#[test]
fn test_interface_cannot_replace_module() {
	let error = try_compile([
		scope("app.S"),
		module("app.Legacy", "app.S"),
		interface("app.Feature", classes(contributes_to("app.S"), "replaces", &["app.Legacy"])),
		interface("app.M", merge_component("app.S")),
	])
	.expect_err("kind mismatch");
	assert_eq!(error.category(), ErrorCategory::KindMismatch);
	assert!(matches!(error.kind, MergeErrorKind::ReplacedNotInterface { .. }));
}

#[test]
fn test_replaced_class_must_share_a_scope() {
	let error = try_compile([
		scope("app.S"),
		scope("app.T"),
		module("app.Elsewhere", "app.T"),
		replacing_module("app.Modern", &["app.Elsewhere"]),
		interface("app.M", merge_component("app.S")),
	])
	.expect_err("different scope");
	assert_eq!(error.category(), ErrorCategory::ScopeConsistency);
	assert_eq!(error.site.declaration.as_str(), "app.Modern");
	assert_eq!(
		error.message(),
		"app.Modern with scopes [app.S] wants to replace app.Elsewhere, but the replaced class isn't contributed to the same scope."
	);
}
