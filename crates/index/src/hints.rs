//! Hint markers: the indexing side channel.
//!
//! Every contributed class is recorded as a handful of top-level properties in
//! [`names::HINT_PACKAGE`]. For an origin `com.example.Foo` contributed to two scopes:
//!
//! ```text
//! val com_example_Foo_reference: com.example.Foo
//! val com_example_Foo_scope0: com.example.AppScope
//! val com_example_Foo_scope1: com.example.UserScope
//! ```
//!
//! Markers are correlated by their shared base name. The unnumbered `<base>_scope` form written
//! by older toolchains is still accepted.

use graft_symbols::{FqName, PropertyRef, SymbolTable, TopLevelProperty};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;

use crate::{IndexError, names};

/// One origin and the scopes its markers name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintGroup {
	pub base: String,
	pub reference: FqName,
	pub scopes: Vec<FqName>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerRole<'a> {
	Reference { base: &'a str },
	Scope { base: &'a str },
}

pub fn base_name(origin: &FqName) -> String {
	origin.as_str().replace('.', "_")
}

/// Markers recording `origin` as contributed to `scopes`.
pub fn markers_for(origin: &FqName, scopes: &[FqName]) -> Vec<TopLevelProperty> {
	let base = base_name(origin);
	let mut markers = Vec::with_capacity(scopes.len() + 1);
	markers.push(TopLevelProperty {
		package: names::HINT_PACKAGE.to_string(),
		name: format!("{base}{}", names::REFERENCE_SUFFIX),
		type_name: origin.clone(),
	});
	markers.extend(scopes.iter().enumerate().map(|(i, scope)| TopLevelProperty {
		package: names::HINT_PACKAGE.to_string(),
		name: format!("{base}{}{i}", names::SCOPE_SUFFIX),
		type_name: scope.clone(),
	}));
	markers
}

/// Whether the table already holds a reference marker for `origin`.
pub fn has_markers(table: &dyn SymbolTable, origin: &FqName) -> bool {
	let reference = format!("{}{}", base_name(origin), names::REFERENCE_SUFFIX);
	table
		.package_properties(names::HINT_PACKAGE)
		.iter()
		.any(|property| property.name == reference && property.type_name == *origin)
}

/// Classifies a property name, `None` for unrelated properties.
pub fn parse_marker(name: &str) -> Option<MarkerRole<'_>> {
	if let Some(base) = name.strip_suffix(names::REFERENCE_SUFFIX) {
		return (!base.is_empty()).then_some(MarkerRole::Reference { base });
	}
	let (base, index) = name.rsplit_once(names::SCOPE_SUFFIX)?;
	if base.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	Some(MarkerRole::Scope { base })
}

/// Groups markers by base name, in first-seen order.
///
/// Identical reference markers and identical scope markers collapse into one entry.
pub fn group_markers(properties: &[PropertyRef]) -> Result<Vec<HintGroup>, IndexError> {
	#[derive(Default)]
	struct Pending {
		references: IndexSet<FqName, FxBuildHasher>,
		scopes: IndexSet<FqName, FxBuildHasher>,
	}

	let mut groups: IndexMap<&str, Pending, FxBuildHasher> = IndexMap::default();
	for property in properties {
		match parse_marker(&property.name) {
			Some(MarkerRole::Reference { base }) => {
				groups.entry(base).or_default().references.insert(property.type_name.clone());
			}
			Some(MarkerRole::Scope { base }) => {
				groups.entry(base).or_default().scopes.insert(property.type_name.clone());
			}
			None => {}
		}
	}

	groups
		.into_iter()
		.map(|(base, pending)| {
			let mut references = pending.references.into_iter();
			let reference = references.next().ok_or_else(|| IndexError::MissingReference { base: base.to_string() })?;
			let rest: Vec<FqName> = references.collect();
			if !rest.is_empty() {
				let mut candidates = vec![reference];
				candidates.extend(rest);
				return Err(IndexError::AmbiguousReference {
					base: base.to_string(),
					candidates,
				});
			}
			if pending.scopes.is_empty() {
				return Err(IndexError::MissingScope {
					base: base.to_string(),
					origin: reference,
				});
			}
			Ok(HintGroup {
				base: base.to_string(),
				reference,
				scopes: pending.scopes.into_iter().collect(),
			})
		})
		.collect()
}
