use graft_index::names;
use graft_symbols::{Annotation, ClassDecl, FunctionDecl, SymbolTable};
use pretty_assertions::assert_eq;

use crate::common::*;

const ORIGIN: &str = "app.user.UserComponent";
const DERIVED: &str = "graft.component.app.appcomponent.UserComponent";

fn base_with(component: Annotation) -> Vec<ClassDecl> {
	vec![
		scope("app.AppScope"),
		scope("app.UserScope"),
		interface("app.AppComponent", component),
		interface("app.user.Session", contributes_to("app.UserScope")),
	]
}

fn base() -> Vec<ClassDecl> {
	base_with(merge_component("app.AppScope"))
}

#[test]
fn test_parent_receives_generated_parent_component() {
	let mut classes = base();
	classes.push(interface(ORIGIN, contributes_subcomponent("app.UserScope", "app.AppScope")));
	let output = compile(classes);

	assert_eq!(supertypes(&output, "app.AppComponent"), vec![format!("{DERIVED}.ParentComponent")]);
	assert!(modules(&output, "app.AppComponent").is_empty());

	assert_eq!(supertypes(&output, DERIVED), vec!["app.user.Session"]);
	let derived = output.table.class(DERIVED).expect("derived subcomponent");
	assert!(derived.has_annotation(names::DAGGER_SUBCOMPONENT));
	assert_eq!(derived.supertypes[0].as_str(), ORIGIN);
}

#[test]
fn test_factory_is_bound_through_subcomponent_module() {
	let mut classes = base();
	classes.push(interface(ORIGIN, contributes_subcomponent("app.UserScope", "app.AppScope")).with_nested("app.user.UserComponent.Factory"));
	classes.push(
		ClassDecl::interface("app.user.UserComponent.Factory")
			.with_annotation(Annotation::new(names::CONTRIBUTES_SUBCOMPONENT_FACTORY))
			.with_function(FunctionDecl::abstract_fn("create", ORIGIN)),
	);
	let output = compile(classes);

	assert_eq!(modules(&output, "app.AppComponent"), vec![format!("{DERIVED}.SubcomponentModule")]);
	let parent = output.table.class(&format!("{DERIVED}.ParentComponent")).expect("generated parent");
	assert_eq!(parent.functions[0].name, "createFactory");
}

#[test]
fn test_user_parent_interface_is_replaced() {
	let mut classes = base();
	classes.push(interface(ORIGIN, contributes_subcomponent("app.UserScope", "app.AppScope")).with_nested("app.user.UserComponent.Parent"));
	classes.push(
		interface("app.user.UserComponent.Parent", contributes_to("app.AppScope"))
			.with_function(FunctionDecl::abstract_fn("userComponent", ORIGIN)),
	);
	let output = compile(classes);

	let merged = supertypes(&output, "app.AppComponent");
	assert_eq!(merged, vec![format!("{DERIVED}.ParentComponent")]);
}

#[test]
fn test_excluded_subcomponent_is_not_derived() {
	let mut classes = base_with(exclude_origin());
	classes.push(interface(ORIGIN, contributes_subcomponent("app.UserScope", "app.AppScope")));
	let output = compile(classes);

	assert!(supertypes(&output, "app.AppComponent").is_empty());
	assert!(output.table.find_class(DERIVED).is_none());
}

fn exclude_origin() -> Annotation {
	classes(merge_component("app.AppScope"), "exclude", &[ORIGIN])
}

#[test]
fn test_chained_subcomponents_are_derived_in_turn() {
	let output = compile([
		scope("app.S"),
		scope("app.S1"),
		scope("app.S2"),
		interface("app.C", merge_component("app.S")),
		interface("app.Sub1", contributes_subcomponent("app.S1", "app.S")),
		interface("app.Sub2", contributes_subcomponent("app.S2", "app.S1")),
	]);

	assert_eq!(supertypes(&output, "app.C"), vec!["graft.component.app.c.Sub1.ParentComponent"]);
	assert_eq!(
		supertypes(&output, "graft.component.app.c.Sub1"),
		vec!["graft.component.app.c.sub1.Sub2.ParentComponent"]
	);
	let nested = output.table.class("graft.component.app.c.sub1.Sub2").expect("second level derived");
	assert!(nested.has_annotation(names::DAGGER_SUBCOMPONENT));
	assert_eq!(nested.supertypes[0].as_str(), "app.Sub2");
}
