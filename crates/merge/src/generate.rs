//! Hint and binding-module generation.
//!
//! The first stage of every pass. Source classes carrying a contribution annotation but no hint
//! markers are validated and get their markers requested. Binding contributions additionally get
//! a generated binding module, itself contributed to the binding's scope and carrying the
//! [`names::INTERNAL_BINDING_MARKER`] that the resolver reads back.

use graft_index::{hints, names};
use graft_symbols::{Annotation, AnnotationValue, ClassDecl, ClassKind, ClassRef, Declaration, FqName, FunctionDecl, SymbolTable};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use tracing::{debug, trace};

use crate::annotations::{Contribution, ContributionKind, resolve_contributions};
use crate::config::PathFilter;
use crate::error::{MergeError, ResolveError, Result};
use crate::naming::{generated_provenance, join_simple_names, stable_hash};

pub const BINDING_MODULE_SUFFIX: &str = "_BindingModule";
pub const MULTIBINDING_MODULE_SUFFIX: &str = "_MultiBindingModule";

/// Declarations requested by the hint stage.
#[derive(Debug, Default)]
pub struct HintOutcome {
	pub requested: Vec<Declaration>,
	/// Origins whose contributions reference declarations not visible yet.
	pub blocked: Vec<FqName>,
}

impl HintOutcome {
	pub fn is_empty(&self) -> bool {
		self.requested.is_empty() && self.blocked.is_empty()
	}
}

fn carries_contribution(class: &ClassDecl) -> bool {
	[
		names::CONTRIBUTES_TO,
		names::CONTRIBUTES_BINDING,
		names::CONTRIBUTES_MULTIBINDING,
		names::CONTRIBUTES_SUBCOMPONENT,
	]
	.iter()
	.any(|name| class.has_annotation(name))
}

fn in_component_package(class: &ClassDecl) -> bool {
	let package = class.package.as_str();
	package == names::COMPONENT_PACKAGE || package.strip_prefix(names::COMPONENT_PACKAGE).is_some_and(|rest| rest.starts_with('.'))
}

/// Runs the hint stage over every source class `filter` allows.
pub fn generate_hints(table: &dyn SymbolTable, filter: &PathFilter) -> Result<HintOutcome, MergeError> {
	let mut outcome = HintOutcome::default();
	for class in table.source_classes() {
		if !carries_contribution(&class) || in_component_package(&class) {
			continue;
		}
		if !filter.allows(&class) {
			trace!(class = %class.name, "outside allowed paths");
			continue;
		}
		if hints::has_markers(table, &class.name) {
			continue;
		}
		match hints_for(table, &class) {
			Ok(requested) => outcome.requested.extend(requested),
			Err(ResolveError::NotReady { missing }) => {
				debug!(origin = %class.name, %missing, "contribution blocked");
				outcome.blocked.push(class.name.clone());
			}
			Err(ResolveError::Merge(error)) => return Err(error),
		}
	}
	Ok(outcome)
}

fn hints_for(table: &dyn SymbolTable, origin: &ClassRef) -> Result<Vec<Declaration>> {
	let contributions = resolve_contributions(table, origin)?;

	let scopes: IndexSet<FqName, FxBuildHasher> = contributions.iter().map(|c| c.hint_scope().name.clone()).collect();
	let scopes: Vec<FqName> = scopes.into_iter().collect();
	let mut requested: Vec<Declaration> = hints::markers_for(&origin.name, &scopes).into_iter().map(Declaration::Property).collect();

	for contribution in contributions.iter().filter(|c| c.kind.is_binding()) {
		let module = binding_module(contribution);
		if table.find_class(module.name.as_str()).is_some() {
			continue;
		}
		debug!(origin = %origin.name, module = %module.name, scope = %contribution.scope.name, "requesting binding module");
		requested.extend(
			hints::markers_for(&module.name, std::slice::from_ref(&contribution.scope.name))
				.into_iter()
				.map(Declaration::Property),
		);
		requested.push(Declaration::Class(module));
	}
	Ok(requested)
}

/// Name of the module generated for one binding contribution.
///
/// Qualified bindings carry a hash of their qualifier key, so one origin may bind the same type
/// under several qualifiers.
pub fn binding_module_name(contribution: &Contribution) -> FqName {
	let origin = &contribution.origin;
	let bound = contribution.bound_type.as_ref().map_or(names::short(names::ANY), |b| b.name.short_name());
	let scope = contribution.scope.name.short_name();
	let suffix = if contribution.kind == ContributionKind::Multibinding {
		MULTIBINDING_MODULE_SUFFIX
	} else {
		BINDING_MODULE_SUFFIX
	};
	let salt = format!(
		"{}|{}|{}|{}",
		origin.name,
		bound,
		contribution.scope.name,
		contribution.qualifier_key.as_deref().unwrap_or_default()
	);
	let qualifier = contribution.qualifier_key.as_deref().map(stable_hash);
	let simple = join_simple_names(origin.simple_names().chain([bound, scope]).chain(qualifier.as_deref()), suffix, &salt);
	if origin.package.is_empty() {
		FqName::new(&simple)
	} else {
		FqName::new(&format!("{}.{simple}", origin.package))
	}
}

/// Module declaration wrapping one binding contribution.
///
/// Object origins are provided directly; every other origin is bound to its bound type.
pub fn binding_module(contribution: &Contribution) -> ClassDecl {
	let name = binding_module_name(contribution);
	let origin = &contribution.origin;
	let bound = contribution
		.bound_type
		.as_ref()
		.map_or_else(|| FqName::new(names::ANY), |b| b.name.clone());
	let is_multibinding = contribution.kind == ContributionKind::Multibinding;

	let mut contributes = Annotation::new(names::CONTRIBUTES_TO).with("scope", AnnotationValue::class(contribution.scope.name.clone()));
	if !contribution.replaces.is_empty() {
		contributes = contributes.with("replaces", AnnotationValue::classes(contribution.replaces.iter().map(|r| r.name.clone())));
	}

	let mut marker = Annotation::new(names::INTERNAL_BINDING_MARKER)
		.with("originClass", AnnotationValue::class(origin.name.clone()))
		.with("isMultibinding", AnnotationValue::Bool(is_multibinding));
	if let Some(key) = &contribution.qualifier_key {
		marker = marker.with("qualifierKey", AnnotationValue::String(key.clone()));
	}
	if let Some(rank) = contribution.rank {
		marker = marker.with("rank", AnnotationValue::Int(i64::from(rank)));
	}

	let (kind, mut function) = if origin.kind == ClassKind::Object {
		let function = FunctionDecl::new(&format!("provide{}", origin.simple_names().collect::<String>()))
			.returning(bound)
			.with_annotation(Annotation::new(names::DAGGER_PROVIDES));
		(ClassKind::Object, function)
	} else {
		let function = FunctionDecl::abstract_fn("bind", bound)
			.with_annotation(Annotation::new(names::DAGGER_BINDS))
			.with_parameter("real", origin.name.clone());
		(ClassKind::Interface, function)
	};
	if is_multibinding {
		match &contribution.map_key {
			Some(map_key) => {
				function = function
					.with_annotation(Annotation::new(names::DAGGER_INTO_MAP))
					.with_annotation(map_key.clone());
			}
			None => function = function.with_annotation(Annotation::new(names::DAGGER_INTO_SET)),
		}
	}
	if let Some(qualifier) = &contribution.qualifier {
		function = function.with_annotation(qualifier.clone());
	}

	ClassDecl::new(name.clone(), kind)
		.with_package(&origin.package)
		.with_abstract(kind == ClassKind::Interface)
		.with_annotation(Annotation::new(names::DAGGER_MODULE))
		.with_annotation(contributes)
		.with_annotation(marker)
		.with_function(function)
		.with_provenance(generated_provenance(&name))
}
