//! Scope and annotation resolution.
//!
//! Turns the contribution annotations on an origin class into [`Contribution`] values, applying
//! the defaulting rules (single-supertype bound type, `NORMAL` rank, optional qualifier) and the
//! per-origin checks that must hold before the origin is made discoverable.

use graft_index::names;
use graft_symbols::{Annotation, ClassDecl, ClassRef, FqName, SymbolTable, all_supertypes};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use crate::bindings::RANK_NORMAL;
use crate::error::{MergeErrorKind, Result, Site};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContributionKind {
	Interface,
	Module,
	Binding,
	Multibinding,
	Subcomponent,
}

impl ContributionKind {
	pub fn annotation(self) -> &'static str {
		match self {
			Self::Interface | Self::Module => names::CONTRIBUTES_TO,
			Self::Binding => names::CONTRIBUTES_BINDING,
			Self::Multibinding => names::CONTRIBUTES_MULTIBINDING,
			Self::Subcomponent => names::CONTRIBUTES_SUBCOMPONENT,
		}
	}

	pub fn is_binding(self) -> bool {
		matches!(self, Self::Binding | Self::Multibinding)
	}
}

/// One contribution annotation instance, resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contribution {
	pub origin: ClassRef,
	pub scope: ClassRef,
	pub kind: ContributionKind,
	pub bound_type: Option<ClassRef>,
	pub qualifier_key: Option<String>,
	/// Qualifier annotation copied onto generated binding functions.
	pub qualifier: Option<Annotation>,
	pub map_key: Option<Annotation>,
	pub replaces: Vec<ClassRef>,
	pub rank: Option<i32>,
	pub parent_scope: Option<ClassRef>,
}

impl Contribution {
	/// Scope the contribution is indexed under.
	pub fn hint_scope(&self) -> &ClassRef {
		self.parent_scope.as_ref().unwrap_or(&self.scope)
	}
}

/// Resolves `name`, deferring when it is not visible yet.
pub fn lookup(table: &dyn SymbolTable, name: &FqName) -> Result<ClassRef> {
	Ok(table.class(name.as_str())?)
}

pub fn lookup_all<'n>(table: &dyn SymbolTable, names: impl IntoIterator<Item = &'n FqName>) -> Result<Vec<ClassRef>> {
	names.into_iter().map(|name| lookup(table, name)).collect()
}

/// A Dagger module, or a class whose module annotation will be generated.
pub fn is_module(class: &ClassDecl) -> bool {
	class.has_annotation(names::DAGGER_MODULE) || class.has_annotation(names::MERGE_MODULES)
}

pub fn scope(table: &dyn SymbolTable, origin: &ClassDecl, annotation: &Annotation, annotation_name: &'static str) -> Result<ClassRef> {
	let Some(scope) = annotation.class_argument("scope") else {
		return Err(MergeErrorKind::MissingScope {
			declaration: origin.name.clone(),
			annotation: annotation_name,
		}
		.at(Site::of(origin))
		.into());
	};
	lookup(table, scope)
}

/// Explicit `boundType`, otherwise the single direct supertype other than the top type.
pub fn bound_type(table: &dyn SymbolTable, origin: &ClassDecl, annotation: &Annotation, annotation_name: &'static str) -> Result<ClassRef> {
	if let Some(explicit) = annotation.class_argument("boundType") {
		return lookup(table, explicit);
	}
	let candidates: Vec<FqName> = origin.supertypes.iter().filter(|s| s.as_str() != names::ANY).cloned().collect();
	match candidates.as_slice() {
		[single] => lookup(table, single),
		_ => Err(MergeErrorKind::MissingBoundType {
			origin: origin.name.clone(),
			annotation: annotation_name,
			candidates: candidates.clone(),
		}
		.at(Site::of(origin).with_related(candidates))
		.into()),
	}
}

fn meta_annotated<'a>(table: &dyn SymbolTable, class: &'a ClassDecl, meta: &str) -> Vec<&'a Annotation> {
	class
		.annotations
		.iter()
		.filter(|a| table.find_class(a.name.as_str()).is_some_and(|decl| decl.has_annotation(meta)))
		.collect()
}

/// Annotations on `class` whose annotation class is itself a qualifier.
pub fn qualifiers<'a>(table: &dyn SymbolTable, class: &'a ClassDecl) -> Vec<&'a Annotation> {
	meta_annotated(table, class, names::QUALIFIER)
}

pub fn map_keys<'a>(table: &dyn SymbolTable, class: &'a ClassDecl) -> Vec<&'a Annotation> {
	meta_annotated(table, class, names::DAGGER_MAP_KEY)
}

/// Grouping key of a qualifier: its name followed by `name + value` for every argument.
pub fn qualifier_key_of(qualifier: &Annotation) -> String {
	let mut key = qualifier.name.to_string();
	for argument in &qualifier.arguments {
		key.push_str(&argument.name);
		key.push_str(&argument.value.to_string());
	}
	key
}

/// The single qualifier of `origin`, unless the annotation sets `ignoreQualifier`.
pub fn qualifier<'a>(
	table: &dyn SymbolTable,
	origin: &'a ClassDecl,
	annotation: &Annotation,
	annotation_name: &'static str,
) -> Result<Option<&'a Annotation>> {
	let found = qualifiers(table, origin);
	if found.len() > 1 {
		return Err(MergeErrorKind::MultipleQualifiers {
			origin: origin.name.clone(),
			annotation: annotation_name,
		}
		.at(Site::of(origin).with_related(found.iter().map(|a| a.name.clone())))
		.into());
	}
	if annotation.bool_argument("ignoreQualifier").unwrap_or(false) {
		return Ok(None);
	}
	Ok(found.into_iter().next())
}

pub fn rank(annotation: &Annotation) -> i32 {
	annotation
		.int_argument("rank")
		.map(|rank| i32::try_from(rank).unwrap_or(if rank < 0 { i32::MIN } else { i32::MAX }))
		.unwrap_or(RANK_NORMAL)
}

pub fn class_array(table: &dyn SymbolTable, annotation: &Annotation, argument: &str) -> Result<Vec<ClassRef>> {
	lookup_all(table, annotation.class_array(argument))
}

fn check_public(origin: &ClassDecl, what: &'static str) -> Result<()> {
	if origin.is_public() {
		return Ok(());
	}
	Err(MergeErrorKind::NotPublic {
		class: origin.name.clone(),
		what,
	}
	.at(Site::of(origin))
	.into())
}

fn check_distinct_scopes(origin: &ClassDecl, contributions: &[Contribution]) -> Result<()> {
	let mut seen: IndexSet<&FqName, FxBuildHasher> = IndexSet::default();
	let mut duplicates: IndexSet<&FqName, FxBuildHasher> = IndexSet::default();
	for contribution in contributions {
		if !seen.insert(&contribution.scope.name) {
			duplicates.insert(&contribution.scope.name);
		}
	}
	if duplicates.is_empty() {
		return Ok(());
	}
	Err(MergeErrorKind::DuplicateContributionScope {
		origin: origin.name.clone(),
		scopes: duplicates.into_iter().cloned().collect(),
	}
	.at(Site::of(origin))
	.into())
}

fn check_distinct_bindings(origin: &ClassDecl, contributions: &[Contribution]) -> Result<()> {
	let mut seen: IndexSet<(&FqName, &FqName, Option<&str>), FxBuildHasher> = IndexSet::default();
	for contribution in contributions {
		let Some(bound) = &contribution.bound_type else {
			continue;
		};
		if !seen.insert((&contribution.scope.name, &bound.name, contribution.qualifier_key.as_deref())) {
			return Err(MergeErrorKind::DuplicateBinding {
				origin: origin.name.clone(),
				scope: contribution.scope.name.clone(),
				bound_type: bound.name.clone(),
			}
			.at(Site::of(origin))
			.into());
		}
	}
	Ok(())
}

fn binding_contribution(table: &dyn SymbolTable, origin: &ClassRef, annotation: &Annotation, kind: ContributionKind) -> Result<Contribution> {
	let annotation_name = kind.annotation();
	check_public(origin, "class")?;
	let qualifier = qualifier(table, origin, annotation, annotation_name)?;

	let map_key = if kind == ContributionKind::Multibinding {
		let keys = map_keys(table, origin);
		if keys.len() > 1 {
			return Err(MergeErrorKind::MultipleMapKeys { origin: origin.name.clone() }
				.at(Site::of(origin))
				.into());
		}
		keys.into_iter().next().cloned()
	} else {
		None
	};

	let bound = bound_type(table, origin, annotation, annotation_name)?;
	if !bound.type_parameters.is_empty() {
		return Err(MergeErrorKind::GenericBoundType {
			origin: origin.name.clone(),
			bound_type: bound.name.clone(),
			parameters: bound.type_parameters.clone(),
		}
		.at(Site::of(origin).with_related([bound.name.clone()]))
		.into());
	}
	if bound.name != names::ANY && !all_supertypes(table, origin, false).contains(&bound.name) {
		return Err(MergeErrorKind::DoesNotExtendBoundType {
			origin: origin.name.clone(),
			bound_type: bound.name.clone(),
		}
		.at(Site::of(origin).with_related([bound.name.clone()]))
		.into());
	}

	Ok(Contribution {
		origin: origin.clone(),
		scope: scope(table, origin, annotation, annotation_name)?,
		kind,
		bound_type: Some(bound),
		qualifier_key: qualifier.map(qualifier_key_of),
		qualifier: qualifier.cloned(),
		map_key,
		replaces: class_array(table, annotation, "replaces")?,
		rank: (kind == ContributionKind::Binding).then(|| rank(annotation)),
		parent_scope: None,
	})
}

/// Every contribution declared on `origin`, validated.
///
/// Repeated annotations yield one contribution each, in declaration order.
pub fn resolve_contributions(table: &dyn SymbolTable, origin: &ClassRef) -> Result<Vec<Contribution>> {
	let mut contributed_to = Vec::new();
	for annotation in origin.annotations_named(names::CONTRIBUTES_TO) {
		let kind = if origin.is_interface() && !is_module(origin) {
			ContributionKind::Interface
		} else {
			ContributionKind::Module
		};
		contributed_to.push(Contribution {
			origin: origin.clone(),
			scope: scope(table, origin, annotation, names::CONTRIBUTES_TO)?,
			kind,
			bound_type: None,
			qualifier_key: None,
			qualifier: None,
			map_key: None,
			replaces: class_array(table, annotation, "replaces")?,
			rank: None,
			parent_scope: None,
		});
	}
	if let Some(first) = contributed_to.first() {
		check_public(origin, if first.kind == ContributionKind::Interface { "interface" } else { "module" })?;
		check_distinct_scopes(origin, &contributed_to)?;
	}

	let mut subcomponents = Vec::new();
	for annotation in origin.annotations_named(names::CONTRIBUTES_SUBCOMPONENT) {
		let Some(parent_scope) = annotation.class_argument("parentScope") else {
			return Err(MergeErrorKind::MissingScope {
				declaration: origin.name.clone(),
				annotation: names::CONTRIBUTES_SUBCOMPONENT,
			}
			.at(Site::of(origin))
			.into());
		};
		subcomponents.push(Contribution {
			origin: origin.clone(),
			scope: scope(table, origin, annotation, names::CONTRIBUTES_SUBCOMPONENT)?,
			kind: ContributionKind::Subcomponent,
			bound_type: None,
			qualifier_key: None,
			qualifier: None,
			map_key: None,
			replaces: class_array(table, annotation, "replaces")?,
			rank: None,
			parent_scope: Some(lookup(table, parent_scope)?),
		});
	}
	if !subcomponents.is_empty() {
		check_public(origin, "subcomponent")?;
		check_distinct_scopes(origin, &subcomponents)?;
	}

	let mut bindings = Vec::new();
	for annotation in origin.annotations_named(names::CONTRIBUTES_BINDING) {
		bindings.push(binding_contribution(table, origin, annotation, ContributionKind::Binding)?);
	}
	check_distinct_bindings(origin, &bindings)?;

	let mut multibindings = Vec::new();
	for annotation in origin.annotations_named(names::CONTRIBUTES_MULTIBINDING) {
		multibindings.push(binding_contribution(table, origin, annotation, ContributionKind::Multibinding)?);
	}
	check_distinct_bindings(origin, &multibindings)?;

	let mut all = contributed_to;
	all.extend(subcomponents);
	all.extend(bindings);
	all.extend(multibindings);
	Ok(all)
}

/// Whether `class` is contributed to any of `scopes` by any contribution annotation.
///
/// Subcomponents count for the scope of the parent they attach to.
pub fn contributed_to_any(class: &ClassDecl, scopes: &[FqName]) -> bool {
	let in_scopes = |annotation: &Annotation, argument: &str| annotation.class_argument(argument).is_some_and(|s| scopes.contains(s));
	class.annotations.iter().any(|annotation| match annotation.name.as_str() {
		names::CONTRIBUTES_TO | names::CONTRIBUTES_BINDING | names::CONTRIBUTES_MULTIBINDING => in_scopes(annotation, "scope"),
		names::CONTRIBUTES_SUBCOMPONENT => in_scopes(annotation, "parentScope"),
		_ => false,
	})
}

/// `replaces` of every `ContributesTo` on `class` pointing at one of `scopes`.
pub fn replaced_in_scopes<'a>(class: &'a ClassDecl, scopes: &'a [FqName]) -> impl Iterator<Item = &'a FqName> + 'a {
	class
		.annotations_named(names::CONTRIBUTES_TO)
		.filter(|annotation| annotation.class_argument("scope").is_some_and(|s| scopes.contains(s)))
		.flat_map(|annotation| annotation.class_array("replaces"))
}
