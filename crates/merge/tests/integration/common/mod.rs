//! Declaration builders and compilation helpers shared by the integration tests.

#![allow(dead_code)]

use graft_index::names;
use graft_merge::{Compilation, CompilationOutput, MergeConfig, MergeError};
use graft_symbols::{Annotation, AnnotationValue, ClassDecl, MemorySymbolTable};

pub fn scoped(annotation: &str, scope: &str) -> Annotation {
	Annotation::new(annotation).with("scope", AnnotationValue::class(scope))
}

pub fn contributes_to(scope: &str) -> Annotation {
	scoped(names::CONTRIBUTES_TO, scope)
}

pub fn contributes_binding(scope: &str) -> Annotation {
	scoped(names::CONTRIBUTES_BINDING, scope)
}

pub fn contributes_multibinding(scope: &str) -> Annotation {
	scoped(names::CONTRIBUTES_MULTIBINDING, scope)
}

pub fn contributes_subcomponent(scope: &str, parent_scope: &str) -> Annotation {
	scoped(names::CONTRIBUTES_SUBCOMPONENT, scope).with("parentScope", AnnotationValue::class(parent_scope))
}

pub fn merge_component(scope: &str) -> Annotation {
	scoped(names::MERGE_COMPONENT, scope)
}

pub fn merge_interfaces(scope: &str) -> Annotation {
	scoped(names::MERGE_INTERFACES, scope)
}

pub fn classes(annotation: Annotation, argument: &str, names: &[&str]) -> Annotation {
	annotation.with(argument, AnnotationValue::classes(names.iter().copied()))
}

pub fn ranked(annotation: Annotation, rank: i64) -> Annotation {
	annotation.with("rank", AnnotationValue::Int(rank))
}

pub fn scope(name: &str) -> ClassDecl {
	ClassDecl::class(name)
}

pub fn interface(name: &str, annotation: Annotation) -> ClassDecl {
	ClassDecl::interface(name).with_annotation(annotation)
}

pub fn module(name: &str, scope: &str) -> ClassDecl {
	ClassDecl::class(name)
		.with_annotation(Annotation::new(names::DAGGER_MODULE))
		.with_annotation(contributes_to(scope))
}

pub fn binding(name: &str, bound_type: &str, annotation: Annotation) -> ClassDecl {
	ClassDecl::class(name).with_supertype(bound_type).with_annotation(annotation)
}

pub fn table(classes: impl IntoIterator<Item = ClassDecl>) -> MemorySymbolTable {
	MemorySymbolTable::from_classes(classes).expect("test declarations are unique")
}

pub fn try_compile(classes: impl IntoIterator<Item = ClassDecl>) -> Result<CompilationOutput, MergeError> {
	try_compile_with(classes, MergeConfig::default())
}

pub fn try_compile_with(classes: impl IntoIterator<Item = ClassDecl>, config: MergeConfig) -> Result<CompilationOutput, MergeError> {
	Compilation::new(table(classes), config).expect("valid test config").run()
}

pub fn compile(classes: impl IntoIterator<Item = ClassDecl>) -> CompilationOutput {
	try_compile(classes).unwrap_or_else(|error| panic!("compilation failed: {error}"))
}

pub fn supertypes(output: &CompilationOutput, merge_point: &str) -> Vec<String> {
	let result = output.result(merge_point).unwrap_or_else(|| panic!("{merge_point} was not resolved"));
	result.supertype_names().into_iter().map(str::to_string).collect()
}

pub fn modules(output: &CompilationOutput, merge_point: &str) -> Vec<String> {
	let result = output.result(merge_point).unwrap_or_else(|| panic!("{merge_point} was not resolved"));
	result.module_names().into_iter().map(str::to_string).collect()
}

/// Origins of the surviving bindings of `merge_point`, in order.
pub fn binding_origins(output: &CompilationOutput, merge_point: &str) -> Vec<String> {
	let result = output.result(merge_point).unwrap_or_else(|| panic!("{merge_point} was not resolved"));
	result.bindings.bindings().map(|b| b.origin.name.to_string()).collect()
}
