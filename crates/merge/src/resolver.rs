//! Merge resolution.
//!
//! # Role
//!
//! Computes, for one merge point, the final module list (including the surviving generated
//! binding modules) and the interfaces to add as supertypes.
//!
//! # Invariants
//!
//! - Only scanned contributions that are not excluded may replace. Predefined modules never
//!   replace, but they are still removed when replaced.
//!   - Enforced in: [`MergeResolver::merge_modules`]
//!   - Tested by: `tests/integration/replacement.rs`
//!   - Failure symptom: a module listed by hand silently drops a contributed one.
//!
//! - A class excluded by the merge point never appears in its output, whatever else references it.
//!   - Enforced in: [`MergeResolver::merge_modules`], [`MergeResolver::merge_interfaces`]
//!   - Tested by: `tests/integration/exclusion.rs`
//!   - Failure symptom: excluded bindings leak back into the component.
//!
//! - Every excluded class is contributed to a scope of the merge point, and merge points that
//!   only merge interfaces exclude only interfaces.
//!   - Enforced in: [`MergeResolver::check_excluded`]
//!   - Tested by: `tests/integration/exclusion.rs`
//!   - Failure symptom: a typo in `exclude` is dropped without a diagnostic.
//!
//! - Contributions to other scopes are invisible.
//!   - Enforced in: [`graft_index::ContributionIndex::find_contributed`]
//!   - Tested by: `tests/integration/scenarios.rs::test_scope_isolation`
//!   - Failure symptom: a component picks up another graph's modules.

use graft_index::{ContributionAnnotation, names};
use graft_symbols::{ClassRef, FqName, all_supertypes};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use tracing::{debug, trace};

use crate::annotations::{contributed_to_any, is_module, replaced_in_scopes};
use crate::bindings::{ContributedBinding, ContributedBindings, RANK_NORMAL};
use crate::error::{MergeErrorKind, Result, Site};
use crate::merge_point::{MergeKind, MergePoint};
use crate::pass::PassContext;
use crate::subcomponents::{parent_component_interfaces, subcomponent_modules};

type ClassSet = IndexSet<ClassRef, FxBuildHasher>;

/// What one merge point resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeResult {
	pub merge_point: FqName,
	pub kind: MergeKind,
	/// Interfaces to add as supertypes, in discovery order.
	pub supertypes: Vec<ClassRef>,
	/// Final module list: contributed, then binding, then predefined, then subcomponent modules.
	pub modules: Vec<ClassRef>,
	pub bindings: ContributedBindings,
	/// Classes copied verbatim into the synthesized annotation.
	pub pass_through: Vec<ClassRef>,
}

impl MergeResult {
	pub fn module_names(&self) -> Vec<&str> {
		self.modules.iter().map(|m| m.name.as_str()).collect()
	}

	pub fn supertype_names(&self) -> Vec<&str> {
		self.supertypes.iter().map(|s| s.name.as_str()).collect()
	}
}

pub struct MergeResolver<'c, 'a> {
	ctx: &'c PassContext<'a>,
}

impl<'c, 'a> MergeResolver<'c, 'a> {
	pub fn new(ctx: &'c PassContext<'a>) -> Self {
		Self { ctx }
	}

	pub fn resolve(&self, point: &MergePoint) -> Result<MergeResult> {
		let excluded = point.excluded();
		self.check_excluded(point, &excluded)?;
		let (modules, bindings) = if point.kind.merges_modules() {
			self.merge_modules(point, &excluded)?
		} else {
			(Vec::new(), ContributedBindings::default())
		};
		let supertypes = if point.kind.merges_interfaces() {
			self.merge_interfaces(point, &excluded)?
		} else {
			Vec::new()
		};
		debug!(
			merge_point = %point.name(),
			kind = %point.kind,
			modules = modules.len(),
			bindings = bindings.len(),
			supertypes = supertypes.len(),
			"resolved merge point"
		);
		Ok(MergeResult {
			merge_point: point.name().clone(),
			kind: point.kind,
			supertypes,
			modules,
			bindings,
			pass_through: point.pass_through.clone(),
		})
	}

	fn contributed(&self, point: &MergePoint) -> Result<ClassSet> {
		let mut found = ClassSet::default();
		for scope in &point.scopes {
			found.extend(self.ctx.contributed(&scope.scope, ContributionAnnotation::ContributesTo)?.iter().cloned());
		}
		Ok(found)
	}

	/// Checks the whole exclude list, whatever the kind merges.
	fn check_excluded(&self, point: &MergePoint, excluded: &[ClassRef]) -> Result<()> {
		let scopes = point.scope_names();
		for class in excluded {
			let site = || Site::of(&point.declaration).with_related([class.name.clone()]);
			if !point.kind.merges_modules() && (!class.is_interface() || is_module(class)) {
				return Err(MergeErrorKind::ExcludedNotInterface {
					declaration: point.name().clone(),
					excluded: class.name.clone(),
				}
				.at(site())
				.into());
			}
			if !contributed_to_any(class, &scopes) {
				return Err(MergeErrorKind::ExcludedNotInScope {
					declaration: point.name().clone(),
					excluded: class.name.clone(),
					scopes,
				}
				.at(site())
				.into());
			}
		}
		Ok(())
	}

	/// Resolves `replaces` of `replacing` into classes, checking each target with `accept`.
	fn replaced_by(
		&self,
		replacing: &[ClassRef],
		scopes: &[FqName],
		accept: impl Fn(&ClassRef) -> bool,
		not_accepted: impl Fn(FqName, FqName) -> MergeErrorKind,
	) -> Result<ClassSet> {
		let mut replaced = ClassSet::default();
		for class in replacing {
			for name in replaced_in_scopes(class, scopes) {
				let target = self.ctx.lookup(name)?;
				if !accept(&target) {
					return Err(not_accepted(class.name.clone(), target.name.clone())
						.at(Site::of(class).with_related([target.name.clone()]))
						.into());
				}
				if !contributed_to_any(&target, scopes) {
					return Err(MergeErrorKind::ReplacedNotInScope {
						declaration: class.name.clone(),
						replaced: target.name.clone(),
						scopes: scopes.to_vec(),
					}
					.at(Site::of(class).with_related([target.name.clone()]))
					.into());
				}
				trace!(by = %class.name, replaced = %target.name, "replaced");
				replaced.insert(target);
			}
		}
		Ok(replaced)
	}

	pub(crate) fn merge_modules(&self, point: &MergePoint, excluded: &[ClassRef]) -> Result<(Vec<ClassRef>, ContributedBindings)> {
		let scopes = point.scope_names();

		let mut modules = ClassSet::default();
		for class in self.contributed(point)? {
			if is_module(&class) {
				if !class.is_public() {
					return Err(MergeErrorKind::NotPublic {
						class: class.name.clone(),
						what: "module",
					}
					.at(Site::of(&class))
					.into());
				}
				modules.insert(class);
			} else if !class.is_interface() {
				return Err(MergeErrorKind::NotInterfaceOrModule {
					class: class.name.clone(),
					annotation: names::CONTRIBUTES_TO,
				}
				.at(Site::of(&class))
				.into());
			}
		}
		let (binding_modules, plain_modules): (Vec<ClassRef>, Vec<ClassRef>) =
			modules.into_iter().partition(|m| m.has_annotation(names::INTERNAL_BINDING_MARKER));

		let replacing: Vec<ClassRef> = plain_modules
			.iter()
			.chain(&binding_modules)
			.filter(|m| !excluded.contains(*m))
			.cloned()
			.collect();
		let replaced = self.replaced_by(
			&replacing,
			&scopes,
			|target| is_module(target) || target.has_annotation(names::CONTRIBUTES_BINDING) || target.has_annotation(names::CONTRIBUTES_MULTIBINDING),
			|declaration, replaced| MergeErrorKind::ReplacedNotModule { declaration, replaced },
		)?;

		let removed = |class: &ClassRef| excluded.contains(class) || replaced.contains(class);

		let mut contributed_bindings = Vec::new();
		for module in binding_modules.iter().filter(|m| !removed(*m)) {
			let binding = self.binding_of(module, &scopes)?;
			if removed(&binding.origin) {
				trace!(module = %module.name, origin = %binding.origin.name, "binding origin removed");
				continue;
			}
			contributed_bindings.push(binding);
		}
		let bindings = ContributedBindings::resolve(contributed_bindings)?;

		let includes = point.includes();
		let conflicting: Vec<FqName> = includes.iter().filter(|m| excluded.contains(*m)).map(|m| m.name.clone()).collect();
		if !conflicting.is_empty() {
			return Err(MergeErrorKind::IncludesAndExcludes {
				declaration: point.name().clone(),
				modules: conflicting,
			}
			.at(Site::of(&point.declaration))
			.into());
		}

		let mut all = ClassSet::default();
		all.extend(plain_modules);
		all.extend(bindings.modules());
		all.extend(includes);
		all.extend(subcomponent_modules(self.ctx, point, excluded)?);
		let modules = all.into_iter().filter(|m| !removed(m)).collect();
		Ok((modules, bindings))
	}

	/// Reads the binding recorded on a generated binding module.
	fn binding_of(&self, module: &ClassRef, scopes: &[FqName]) -> Result<ContributedBinding> {
		let malformed = |reason: &'static str| MergeErrorKind::MalformedBindingModule {
			module: module.name.clone(),
			reason,
		}
		.at(Site::of(module));

		let Some(marker) = module.annotation(names::INTERNAL_BINDING_MARKER) else {
			return Err(malformed("it carries no binding marker").into());
		};
		let Some(origin) = marker.class_argument("originClass") else {
			return Err(malformed("its binding marker names no origin class").into());
		};
		let Some(bound_type) = module.functions.iter().find_map(|f| f.return_type.as_ref()) else {
			return Err(malformed("it declares no binding function").into());
		};
		let Some(scope) = module
			.annotations_named(names::CONTRIBUTES_TO)
			.filter_map(|a| a.class_argument("scope"))
			.find(|s| scopes.contains(s))
		else {
			return Err(malformed("it is not contributed to a scope of this merge point").into());
		};

		Ok(ContributedBinding {
			scope: self.ctx.lookup(scope)?,
			bound_type: self.ctx.lookup(bound_type)?,
			origin: self.ctx.lookup(origin)?,
			module: module.clone(),
			is_multibinding: marker.bool_argument("isMultibinding").unwrap_or(false),
			qualifier_key: marker.string_argument("qualifierKey").unwrap_or_default().to_string(),
			rank: marker
				.int_argument("rank")
				.and_then(|rank| i32::try_from(rank).ok())
				.unwrap_or(RANK_NORMAL),
		})
	}

	pub(crate) fn merge_interfaces(&self, point: &MergePoint, excluded: &[ClassRef]) -> Result<Vec<ClassRef>> {
		let scopes = point.scope_names();

		let mut contributed = ClassSet::default();
		for class in self.contributed(point)? {
			if !class.is_interface() || is_module(&class) {
				continue;
			}
			if !class.is_public() {
				return Err(MergeErrorKind::NotPublic {
					class: class.name.clone(),
					what: "interface",
				}
				.at(Site::of(&class))
				.into());
			}
			contributed.insert(class);
		}
		let parents = parent_component_interfaces(self.ctx, point, excluded)?;

		let replacing: Vec<ClassRef> = contributed
			.iter()
			.chain(&parents)
			.filter(|c| !excluded.contains(*c))
			.cloned()
			.collect();
		let replaced = self.replaced_by(
			&replacing,
			&scopes,
			|target| target.is_interface(),
			|declaration, replaced| MergeErrorKind::ReplacedNotInterface { declaration, replaced },
		)?;

		let supertypes = all_supertypes(self.ctx.table(), &point.declaration, true);
		let forbidden: Vec<FqName> = excluded
			.iter()
			.filter(|c| c.is_interface() && !is_module(c) && supertypes.contains(&c.name))
			.map(|c| c.name.clone())
			.collect();
		if !forbidden.is_empty() {
			return Err(MergeErrorKind::ExcludesSupertypes {
				declaration: point.name().clone(),
				excluded: forbidden,
			}
			.at(Site::of(&point.declaration))
			.into());
		}

		Ok(contributed
			.into_iter()
			.chain(parents)
			.filter(|c| !excluded.contains(c) && !replaced.contains(c))
			.filter(|c| !point.declaration.supertypes.contains(&c.name))
			.collect::<ClassSet>()
			.into_iter()
			.collect())
	}
}
