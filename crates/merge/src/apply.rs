//! Amendments to merge points.
//!
//! The engine never rewrites declarations while resolving. Each [`MergeResult`] becomes an
//! [`Amendment`] describing the supertypes to add and the DI annotation to synthesize; an emitter
//! (or [`apply`], for snapshots) performs the change.

use graft_symbols::{Annotation, AnnotationValue, ClassRef, FqName, MemorySymbolTable, SymbolTable};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::MergeConfig;
use crate::error::{MergeError, MergeErrorKind, Site};
use crate::resolver::MergeResult;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amendment {
	pub declaration: FqName,
	pub add_supertypes: Vec<FqName>,
	/// Synthesized DI annotation, absent for interface-only merges.
	pub annotation: Option<Annotation>,
	/// Whether the emitter should also generate factories for the declaration.
	pub emit_factories: bool,
}

fn class_names(classes: &[ClassRef]) -> impl Iterator<Item = FqName> + '_ {
	classes.iter().map(|class| class.name.clone())
}

impl Amendment {
	pub fn from_result(result: &MergeResult, config: &MergeConfig) -> Self {
		let annotation = result.kind.generated_annotation().map(|name| {
			let mut annotation = Annotation::new(name);
			if let Some(argument) = result.kind.modules_argument() {
				annotation = annotation.with(argument, AnnotationValue::classes(class_names(&result.modules)));
			}
			if let Some(argument) = result.kind.pass_through_argument()
				&& !result.pass_through.is_empty()
			{
				annotation = annotation.with(argument, AnnotationValue::classes(class_names(&result.pass_through)));
			}
			annotation
		});
		Self {
			declaration: result.merge_point.clone(),
			add_supertypes: class_names(&result.supertypes).collect(),
			annotation,
			emit_factories: config.generate_factories,
		}
	}

	pub fn is_noop(&self) -> bool {
		self.add_supertypes.is_empty() && self.annotation.is_none()
	}
}

/// Applies `amendments` to a copy of `table`.
///
/// Each declaration may be amended once; amending it again is an error.
pub fn apply(table: &MemorySymbolTable, amendments: &[Amendment]) -> Result<MemorySymbolTable, MergeError> {
	let mut seen: FxHashSet<&FqName> = FxHashSet::default();
	let mut next = table.clone();
	for amendment in amendments {
		let site = || Site::named(amendment.declaration.clone());
		if !seen.insert(&amendment.declaration) {
			return Err(MergeErrorKind::AlreadyApplied {
				declaration: amendment.declaration.clone(),
			}
			.at(site()));
		}
		let Some(class) = next.find_class(amendment.declaration.as_str()) else {
			return Err(MergeErrorKind::Symbol(graft_symbols::SymbolError::NotFound {
				name: amendment.declaration.clone(),
			})
			.at(site()));
		};

		let mut decl = class.decl().clone();
		for supertype in &amendment.add_supertypes {
			if !decl.supertypes.contains(supertype) {
				decl.supertypes.push(supertype.clone());
			}
		}
		if let Some(annotation) = &amendment.annotation {
			decl.annotations.push(annotation.clone());
		}
		next = next.with_replaced(decl).map_err(|error| MergeErrorKind::Symbol(error).at(site()))?;
	}
	Ok(next)
}
