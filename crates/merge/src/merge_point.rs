//! Merge points and their kinds.
//!
//! The four merge annotations differ only in a handful of attributes; [`MergeKind`] captures
//! those so a single resolver serves all of them.

use std::fmt;

use graft_index::names;
use graft_symbols::{ClassDecl, ClassRef, FqName, SymbolTable};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};

use crate::annotations::{class_array, scope};
use crate::error::{MergeErrorKind, Result, Site};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeKind {
	Component,
	Subcomponent,
	Modules,
	Interfaces,
}

impl MergeKind {
	pub const ALL: [MergeKind; 4] = [Self::Component, Self::Subcomponent, Self::Modules, Self::Interfaces];

	pub fn annotation(self) -> &'static str {
		match self {
			Self::Component => names::MERGE_COMPONENT,
			Self::Subcomponent => names::MERGE_SUBCOMPONENT,
			Self::Modules => names::MERGE_MODULES,
			Self::Interfaces => names::MERGE_INTERFACES,
		}
	}

	/// Argument listing predefined modules, `None` when the kind does not merge modules.
	pub fn modules_argument(self) -> Option<&'static str> {
		match self {
			Self::Component | Self::Subcomponent => Some("modules"),
			Self::Modules => Some("includes"),
			Self::Interfaces => None,
		}
	}

	pub fn merges_modules(self) -> bool {
		self.modules_argument().is_some()
	}

	/// Kinds that merge interfaces require the merge point itself to be an interface.
	pub fn merges_interfaces(self) -> bool {
		!matches!(self, Self::Modules)
	}

	/// DI annotation synthesized for the merge point.
	pub fn generated_annotation(self) -> Option<&'static str> {
		match self {
			Self::Component => Some(names::DAGGER_COMPONENT),
			Self::Subcomponent => Some(names::DAGGER_SUBCOMPONENT),
			Self::Modules => Some(names::DAGGER_MODULE),
			Self::Interfaces => None,
		}
	}

	/// Array argument copied verbatim onto the synthesized annotation.
	pub fn pass_through_argument(self) -> Option<&'static str> {
		match self {
			Self::Component => Some("dependencies"),
			Self::Modules => Some("subcomponents"),
			Self::Subcomponent | Self::Interfaces => None,
		}
	}

	pub fn from_annotation(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.annotation() == name)
	}
}

impl fmt::Display for MergeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "@{}", names::short(self.annotation()))
	}
}

/// One scope a merge point targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeScope {
	pub scope: ClassRef,
	pub includes: Vec<ClassRef>,
	pub exclude: Vec<ClassRef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergePoint {
	pub declaration: ClassRef,
	pub kind: MergeKind,
	pub scopes: Vec<MergeScope>,
	pub pass_through: Vec<ClassRef>,
}

/// Merge annotation kinds present on `class`, in declaration order.
pub fn merge_kinds_of(class: &ClassDecl) -> Vec<MergeKind> {
	let mut kinds: IndexSet<MergeKind, FxBuildHasher> = IndexSet::default();
	for annotation in &class.annotations {
		if let Some(kind) = MergeKind::from_annotation(annotation.name.as_str()) {
			kinds.insert(kind);
		}
	}
	kinds.into_iter().collect()
}

impl MergePoint {
	/// Reads the merge point declared by `class`, `None` if it carries no merge annotation.
	///
	/// Structural checks run here: one merge kind per class, distinct scopes, no hand-written
	/// copy of the annotation that will be generated, and interface shape when interfaces merge.
	pub fn detect(table: &dyn SymbolTable, class: &ClassRef) -> Result<Option<Self>> {
		let kinds = merge_kinds_of(class);
		let kind = match kinds.as_slice() {
			[] => return Ok(None),
			[kind] => *kind,
			_ => {
				return Err(MergeErrorKind::MixedMergeAnnotations {
					declaration: class.name.clone(),
					annotations: kinds.iter().map(|k| k.annotation()).collect(),
				}
				.at(Site::of(class))
				.into());
			}
		};

		if let Some(generated) = kind.generated_annotation()
			&& class.has_annotation(generated)
		{
			return Err(MergeErrorKind::AlreadyAnnotated {
				declaration: class.name.clone(),
				merge_annotation: kind.annotation(),
				generated,
			}
			.at(Site::of(class))
			.into());
		}

		if kind.merges_interfaces() && !class.is_interface() {
			return Err(MergeErrorKind::MergePointNotInterface {
				declaration: class.name.clone(),
			}
			.at(Site::of(class))
			.into());
		}

		let mut scopes: Vec<MergeScope> = Vec::new();
		let mut pass_through: IndexSet<ClassRef, FxBuildHasher> = IndexSet::default();
		for annotation in class.annotations_named(kind.annotation()) {
			let includes = match kind.modules_argument() {
				Some(argument) => class_array(table, annotation, argument)?,
				None => Vec::new(),
			};
			scopes.push(MergeScope {
				scope: scope(table, class, annotation, kind.annotation())?,
				includes,
				exclude: class_array(table, annotation, "exclude")?,
			});
			if let Some(argument) = kind.pass_through_argument() {
				pass_through.extend(class_array(table, annotation, argument)?);
			}
		}

		let mut seen: IndexSet<&FqName, FxBuildHasher> = IndexSet::default();
		let duplicates: Vec<FqName> = scopes
			.iter()
			.filter(|s| !seen.insert(&s.scope.name))
			.map(|s| s.scope.name.clone())
			.collect();
		if !duplicates.is_empty() {
			return Err(MergeErrorKind::DuplicateMergeScope {
				declaration: class.name.clone(),
				scopes: duplicates,
			}
			.at(Site::of(class))
			.into());
		}

		Ok(Some(Self {
			declaration: class.clone(),
			kind,
			scopes,
			pass_through: pass_through.into_iter().collect(),
		}))
	}

	pub fn name(&self) -> &FqName {
		&self.declaration.name
	}

	pub fn scope_names(&self) -> Vec<FqName> {
		self.scopes.iter().map(|s| s.scope.name.clone()).collect()
	}

	/// Union of every scope's `exclude`, deduplicated.
	pub fn excluded(&self) -> Vec<ClassRef> {
		let mut out: IndexSet<ClassRef, FxBuildHasher> = IndexSet::default();
		for scope in &self.scopes {
			out.extend(scope.exclude.iter().cloned());
		}
		out.into_iter().collect()
	}

	/// Union of every scope's predefined modules, deduplicated.
	pub fn includes(&self) -> Vec<ClassRef> {
		let mut out: IndexSet<ClassRef, FxBuildHasher> = IndexSet::default();
		for scope in &self.scopes {
			out.extend(scope.includes.iter().cloned());
		}
		out.into_iter().collect()
	}
}
