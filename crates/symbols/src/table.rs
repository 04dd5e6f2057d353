//! Read-only symbol table contract.

use std::collections::VecDeque;

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use crate::{ClassRef, FqName, PropertyRef, SymbolError};

/// Whole-program view over declarations of the current compilation unit and all of its
/// dependencies.
///
/// Implementations are frozen snapshots: repeated queries return the same answers.
pub trait SymbolTable {
	fn find_class(&self, name: &str) -> Option<ClassRef>;

	/// Top-level properties of a package, across the current unit and every dependency.
	fn package_properties(&self, package: &str) -> Vec<PropertyRef>;

	/// Declarations under active compilation, in discovery order.
	fn source_classes(&self) -> Vec<ClassRef>;

	fn class(&self, name: &str) -> Result<ClassRef, SymbolError> {
		self.find_class(name).ok_or_else(|| SymbolError::NotFound { name: FqName::new(name) })
	}
}

/// Transitive supertypes of `class`, breadth first and deduplicated.
///
/// Supertypes missing from the table are reported but not expanded.
pub fn all_supertypes(table: &dyn SymbolTable, class: &ClassRef, include_self: bool) -> Vec<FqName> {
	let mut seen: IndexSet<FqName, FxBuildHasher> = IndexSet::default();
	seen.insert(class.name.clone());

	let mut queue: VecDeque<FqName> = class.supertypes.iter().cloned().collect();
	while let Some(name) = queue.pop_front() {
		if !seen.insert(name.clone()) {
			continue;
		}
		if let Some(resolved) = table.find_class(name.as_str()) {
			queue.extend(resolved.supertypes.iter().cloned());
		}
	}

	if include_self {
		seen.into_iter().collect()
	} else {
		seen.into_iter().skip(1).collect()
	}
}
