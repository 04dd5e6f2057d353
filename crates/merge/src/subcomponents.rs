//! Contributed subcomponents.
//!
//! # Role
//!
//! A class annotated `ContributesSubcomponent(scope, parentScope)` is attached to every merge
//! point merging `parentScope`. For each (origin, merge point) pair a subcomponent interface is
//! derived with a deterministic name, carrying three nested declarations:
//!
//! - `ParentComponent`: contributed to `parentScope`, merged as a supertype of the merge point.
//! - `SubcomponentModule`: merged as a module of the merge point, when a factory exists.
//! - `Factory`: the DI factory, when the origin declares one.
//!
//! # Invariants
//!
//! - Derived names are unique per (origin, parent) pair.
//!   - Enforced in: [`SubcomponentNames::register`]
//!   - Tested by: `tests::test_name_collision_is_fatal`
//!   - Failure symptom: two subcomponents overwrite each other's generated source.
//!
//! - The derived subcomponent is a function of the origin and the parent only.
//!   - Enforced in: [`generated_subcomponent_name`]
//!   - Tested by: `tests::test_generated_name_layout`
//!   - Failure symptom: build cache churn, unstable generated sources.

use graft_index::{ContributionAnnotation, names};
use graft_symbols::{Annotation, AnnotationValue, ClassDecl, ClassKind, ClassRef, Declaration, FqName, FunctionDecl, SymbolTable, Visibility};
use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashMap};
use tracing::debug;

use crate::annotations::lookup_all;
use crate::error::{MergeErrorKind, Result, Site};
use crate::merge_point::MergePoint;
use crate::naming::{generated_provenance, join_simple_names};
use crate::pass::PassContext;

pub const PARENT_COMPONENT: &str = "ParentComponent";
pub const SUBCOMPONENT_MODULE: &str = "SubcomponentModule";
pub const FACTORY: &str = "Factory";

/// Deterministic name of the subcomponent derived from `origin` for `parent`.
///
/// The package is `graft.component.<parent package>.<parent relative name, lowercased>`;
/// parents that are themselves generated keep their package as the base.
pub fn generated_subcomponent_name(origin: &ClassDecl, parent: &ClassDecl) -> FqName {
	let prefix = names::COMPONENT_PACKAGE;
	let base = if parent.package == prefix || parent.package.starts_with(&format!("{prefix}.")) {
		parent.package.clone()
	} else if parent.package.is_empty() {
		prefix.to_string()
	} else {
		format!("{prefix}.{}", parent.package)
	};
	let package = FqName::new(&format!("{base}.{}", parent.relative_name().to_lowercase()));
	let salt = format!("{}|{}", origin.name, parent.name);
	package.child(&join_simple_names(origin.simple_names(), "", &salt))
}

/// Derived names seen so far, keyed to the pair that produced them.
#[derive(Debug, Default)]
pub struct SubcomponentNames {
	seen: FxHashMap<FqName, (FqName, FqName)>,
}

impl SubcomponentNames {
	pub fn register(&mut self, name: &FqName, origin: &ClassDecl, parent: &ClassDecl) -> Result<()> {
		match self.seen.get(name) {
			None => {
				self.seen.insert(name.clone(), (origin.name.clone(), parent.name.clone()));
				Ok(())
			}
			Some((first_origin, first_parent)) if *first_origin == origin.name && *first_parent == parent.name => Ok(()),
			Some((first_origin, first_parent)) => Err(MergeErrorKind::SubcomponentNameCollision {
				name: name.clone(),
				first_origin: first_origin.clone(),
				first_parent: first_parent.clone(),
				second_origin: origin.name.clone(),
				second_parent: parent.name.clone(),
			}
			.at(Site::of(origin).with_related([first_origin.clone()]))
			.into()),
		}
	}
}

/// Subcomponents contributed to any scope of `point`, minus excluded and replaced ones.
pub fn contributed_subcomponents(ctx: &PassContext<'_>, point: &MergePoint, excluded: &[ClassRef]) -> Result<Vec<ClassRef>> {
	let scopes = point.scope_names();
	let mut found: IndexSet<ClassRef, FxBuildHasher> = IndexSet::default();
	for scope in &point.scopes {
		found.extend(ctx.contributed(&scope.scope, ContributionAnnotation::ContributesSubcomponent)?.iter().cloned());
	}

	let mut replaced: IndexSet<&FqName, FxBuildHasher> = IndexSet::default();
	for origin in &found {
		for annotation in origin.annotations_named(names::CONTRIBUTES_SUBCOMPONENT) {
			if annotation.class_argument("parentScope").is_some_and(|s| scopes.contains(s)) {
				replaced.extend(annotation.class_array("replaces"));
			}
		}
	}

	Ok(found
		.iter()
		.filter(|origin| !excluded.contains(*origin) && !replaced.contains(&origin.name))
		.cloned()
		.collect())
}

fn derived_member(ctx: &PassContext<'_>, origin: &ClassRef, parent: &ClassRef, member: &str) -> Result<Option<ClassRef>> {
	let derived = ctx.lookup(&generated_subcomponent_name(origin, parent))?;
	let name = derived.name.child(member);
	if !derived.nested_classes.contains(&name) {
		return Ok(None);
	}
	Ok(Some(ctx.lookup(&name)?))
}

/// Generated `ParentComponent` interfaces to merge into `point`.
pub fn parent_component_interfaces(ctx: &PassContext<'_>, point: &MergePoint, excluded: &[ClassRef]) -> Result<Vec<ClassRef>> {
	let mut out = Vec::new();
	for origin in contributed_subcomponents(ctx, point, excluded)? {
		out.extend(derived_member(ctx, &origin, &point.declaration, PARENT_COMPONENT)?);
	}
	Ok(out)
}

/// Generated `SubcomponentModule`s to merge into `point`.
pub fn subcomponent_modules(ctx: &PassContext<'_>, point: &MergePoint, excluded: &[ClassRef]) -> Result<Vec<ClassRef>> {
	let mut out = Vec::new();
	for origin in contributed_subcomponents(ctx, point, excluded)? {
		out.extend(derived_member(ctx, &origin, &point.declaration, SUBCOMPONENT_MODULE)?);
	}
	Ok(out)
}

/// Requests derived subcomponents that do not exist yet, for every merge point.
pub fn generate_subcomponents(ctx: &PassContext<'_>, points: &[MergePoint], registry: &mut SubcomponentNames) -> Result<Vec<Declaration>> {
	let mut requested = Vec::new();
	for point in points {
		let excluded = point.excluded();
		let scopes = point.scope_names();
		for origin in contributed_subcomponents(ctx, point, &excluded)? {
			let name = generated_subcomponent_name(&origin, &point.declaration);
			registry.register(&name, &origin, &point.declaration)?;
			if ctx.table().find_class(name.as_str()).is_some() {
				continue;
			}
			let Some(annotation) = origin
				.annotations_named(names::CONTRIBUTES_SUBCOMPONENT)
				.find(|a| a.class_argument("parentScope").is_some_and(|s| scopes.contains(s)))
			else {
				continue;
			};
			debug!(origin = %origin.name, parent = %point.name(), derived = %name, "requesting derived subcomponent");
			requested.extend(derive_subcomponent(ctx.table(), &origin, annotation, &name)?);
		}
	}
	Ok(requested)
}

struct FactoryShape {
	factory: ClassRef,
	creator: FunctionDecl,
}

fn validate_factory(origin: &ClassRef, nested: &[ClassRef]) -> Result<Option<FactoryShape>> {
	let factories: Vec<&ClassRef> = nested
		.iter()
		.filter(|class| class.has_annotation(names::CONTRIBUTES_SUBCOMPONENT_FACTORY))
		.collect();
	let factory = match factories.as_slice() {
		[] => return Ok(None),
		[factory] => *factory,
		_ => {
			return Err(MergeErrorKind::MultipleFactories {
				subcomponent: origin.name.clone(),
			}
			.at(Site::of(origin).with_related(factories.iter().map(|f| f.name.clone())))
			.into());
		}
	};

	if !factory.is_abstract || factory.kind == ClassKind::Object {
		return Err(MergeErrorKind::FactoryNotAbstract {
			factory: factory.name.clone(),
		}
		.at(Site::of(factory))
		.into());
	}

	let creators: Vec<&FunctionDecl> = factory.functions.iter().filter(|f| f.is_abstract && f.returns(&origin.name)).collect();
	let abstract_count = factory.functions.iter().filter(|f| f.is_abstract).count();
	if creators.len() != 1 || abstract_count != 1 {
		return Err(MergeErrorKind::FactoryFunctionCount {
			factory: factory.name.clone(),
			subcomponent: origin.name.clone(),
		}
		.at(Site::of(factory))
		.into());
	}
	Ok(Some(FactoryShape {
		factory: factory.clone(),
		creator: creators[0].clone(),
	}))
}

fn parent_interface(origin: &ClassRef, parent_scope: &FqName, nested: &[ClassRef]) -> Result<Option<ClassRef>> {
	let candidates: Vec<&ClassRef> = nested
		.iter()
		.filter(|class| {
			class.is_interface()
				&& class
					.annotations_named(names::CONTRIBUTES_TO)
					.any(|a| a.class_argument("scope") == Some(parent_scope))
		})
		.collect();
	match candidates.as_slice() {
		[] => Ok(None),
		[single] => Ok(Some((*single).clone())),
		_ => Err(MergeErrorKind::MultipleParentComponents {
			subcomponent: origin.name.clone(),
		}
		.at(Site::of(origin).with_related(candidates.iter().map(|c| c.name.clone())))
		.into()),
	}
}

/// Declarations of the subcomponent derived from `origin`, named `name`.
pub fn derive_subcomponent(table: &dyn SymbolTable, origin: &ClassRef, annotation: &Annotation, name: &FqName) -> Result<Vec<Declaration>> {
	let nested = lookup_all(table, &origin.nested_classes)?;
	let factory = validate_factory(origin, &nested)?;
	let Some(parent_scope) = annotation.class_argument("parentScope") else {
		return Err(MergeErrorKind::MissingScope {
			declaration: origin.name.clone(),
			annotation: names::CONTRIBUTES_SUBCOMPONENT,
		}
		.at(Site::of(origin))
		.into());
	};
	let user_parent = parent_interface(origin, parent_scope, &nested)?;

	let factory_name = name.child(FACTORY);
	let creator_return = if factory.is_some() { factory_name.clone() } else { name.clone() };

	let creator_name = match &user_parent {
		Some(parent) => {
			let accepted = |f: &&FunctionDecl| {
				f.is_abstract
					&& f.visibility == Visibility::Public
					&& (f.returns(&origin.name) || factory.as_ref().is_some_and(|shape| f.returns(&shape.factory.name)))
			};
			let creators: Vec<&FunctionDecl> = parent.functions.iter().filter(accepted).collect();
			if creators.len() > 1 {
				return Err(MergeErrorKind::MultipleCreatorFunctions {
					parent: parent.name.clone(),
					subcomponent: origin.name.clone(),
				}
				.at(Site::of(parent))
				.into());
			}
			creators.first().map(|f| f.name.clone())
		}
		None => None,
	};
	let creator_name = creator_name.unwrap_or_else(|| match &factory {
		Some(shape) => format!("create{}", shape.factory.name.short_name()),
		None => format!("create{}", name.short_name()),
	});

	let mut merge = Annotation::new(names::MERGE_SUBCOMPONENT)
		.with("scope", AnnotationValue::class(annotation.class_argument("scope").cloned().unwrap_or_else(|| parent_scope.clone())));
	let modules = annotation.class_array("modules");
	if !modules.is_empty() {
		merge = merge.with("modules", AnnotationValue::classes(modules.into_iter().cloned()));
	}
	let exclude = annotation.class_array("exclude");
	if !exclude.is_empty() {
		merge = merge.with("exclude", AnnotationValue::classes(exclude.into_iter().cloned()));
	}

	let parent_component_name = name.child(PARENT_COMPONENT);
	let module_name = name.child(SUBCOMPONENT_MODULE);

	let mut derived = ClassDecl::interface(name.clone())
		.with_supertype(origin.name.clone())
		.with_annotation(merge)
		.with_nested(parent_component_name.clone())
		.with_provenance(generated_provenance(name));

	let mut contributes = Annotation::new(names::CONTRIBUTES_TO).with("scope", AnnotationValue::class(parent_scope.clone()));
	let mut parent_component = ClassDecl::interface(parent_component_name.clone());
	if let Some(user_parent) = &user_parent {
		contributes = contributes.with("replaces", AnnotationValue::classes([user_parent.name.clone()]));
		parent_component = parent_component.with_supertype(user_parent.name.clone());
	}
	let parent_component = parent_component
		.with_annotation(contributes)
		.with_function(FunctionDecl::abstract_fn(&creator_name, creator_return.clone()))
		.with_provenance(generated_provenance(&parent_component_name));

	let mut declarations = Vec::new();
	if let Some(shape) = &factory {
		derived = derived.with_nested(module_name.clone()).with_nested(factory_name.clone());

		let mut creator = shape.creator.clone();
		creator.return_type = Some(name.clone());
		let factory_decl = ClassDecl::interface(factory_name.clone())
			.with_supertype(shape.factory.name.clone())
			.with_annotation(Annotation::new(names::DAGGER_SUBCOMPONENT_FACTORY))
			.with_function(creator)
			.with_provenance(generated_provenance(&factory_name));

		let module = ClassDecl::interface(module_name.clone())
			.with_annotation(Annotation::new(names::DAGGER_MODULE).with("subcomponents", AnnotationValue::classes([name.clone()])))
			.with_function(
				FunctionDecl::abstract_fn("bindSubcomponentFactory", shape.factory.name.clone())
					.with_annotation(Annotation::new(names::DAGGER_BINDS))
					.with_parameter("factory", factory_name.clone()),
			)
			.with_provenance(generated_provenance(&module_name));

		declarations.push(Declaration::Class(derived));
		declarations.push(Declaration::Class(parent_component));
		declarations.push(Declaration::Class(module));
		declarations.push(Declaration::Class(factory_decl));
	} else {
		declarations.push(Declaration::Class(derived));
		declarations.push(Declaration::Class(parent_component));
	}
	Ok(declarations)
}
