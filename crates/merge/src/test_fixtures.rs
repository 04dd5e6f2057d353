use graft_index::names;
use graft_symbols::{Annotation, AnnotationValue, ClassDecl, MemorySymbolTable};

use crate::config::PathFilter;
use crate::generate::generate_hints;

pub(crate) fn scoped(annotation: &str, scope: &str) -> Annotation {
	Annotation::new(annotation).with("scope", AnnotationValue::class(scope))
}

pub(crate) fn contributes_to(scope: &str) -> Annotation {
	scoped(names::CONTRIBUTES_TO, scope)
}

pub(crate) fn replacing(annotation: Annotation, replaces: &[&str]) -> Annotation {
	annotation.with("replaces", AnnotationValue::classes(replaces.iter().copied()))
}

pub(crate) fn excluding(annotation: Annotation, exclude: &[&str]) -> Annotation {
	annotation.with("exclude", AnnotationValue::classes(exclude.iter().copied()))
}

pub(crate) fn contributes_binding(scope: &str) -> Annotation {
	scoped(names::CONTRIBUTES_BINDING, scope)
}

pub(crate) fn ranked(annotation: Annotation, rank: i32) -> Annotation {
	annotation.with("rank", AnnotationValue::Int(i64::from(rank)))
}

pub(crate) fn contributes_multibinding(scope: &str) -> Annotation {
	scoped(names::CONTRIBUTES_MULTIBINDING, scope)
}

pub(crate) fn contributes_subcomponent(scope: &str, parent_scope: &str) -> Annotation {
	scoped(names::CONTRIBUTES_SUBCOMPONENT, scope).with("parentScope", AnnotationValue::class(parent_scope))
}

pub(crate) fn dagger_module() -> Annotation {
	Annotation::new(names::DAGGER_MODULE)
}

pub(crate) fn qualifier_class(name: &str) -> ClassDecl {
	ClassDecl::annotation_class(name).with_annotation(Annotation::new(names::QUALIFIER))
}

pub(crate) fn map_key_class(name: &str) -> ClassDecl {
	ClassDecl::annotation_class(name).with_annotation(Annotation::new(names::DAGGER_MAP_KEY))
}

pub(crate) fn table(classes: impl IntoIterator<Item = ClassDecl>) -> MemorySymbolTable {
	MemorySymbolTable::from_classes(classes).expect("fixture declarations are unique")
}

pub(crate) fn merge_component(scope: &str) -> Annotation {
	scoped(names::MERGE_COMPONENT, scope)
}

pub(crate) fn merge_subcomponent(scope: &str) -> Annotation {
	scoped(names::MERGE_SUBCOMPONENT, scope)
}

/// Table with the hint stage already applied until it requests nothing more.
pub(crate) fn prepared(classes: impl IntoIterator<Item = ClassDecl>) -> MemorySymbolTable {
	let mut table = table(classes);
	loop {
		let outcome = generate_hints(&table, &PathFilter::allow_all()).expect("valid contributions");
		if outcome.requested.is_empty() {
			return table;
		}
		table = table.with_generated(outcome.requested).expect("generated declarations are unique");
	}
}
