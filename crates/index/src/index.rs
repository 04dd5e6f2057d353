//! Scope-and-kind lookup of contributed classes.
//!
//! # Role
//!
//! [`ContributionIndex`] answers "which classes contribute to scope S with annotation K" for the
//! whole program, including precompiled dependencies. It only ever reads the hint package, so a
//! query costs O(number of contributions) instead of O(program size).
//!
//! # Invariants
//!
//! - Results are a pure function of the frozen table the index was created over.
//!   - Enforced in: [`ContributionIndex::find_contributed`] (memoised per query key, never invalidated)
//!   - Tested by: `tests::test_repeated_query_is_cached`
//!   - Failure symptom: two merge points of one pass see different contribution sets.
//!
//! - A hint is only trusted if its origin really carries the queried annotation and scope.
//!   - Enforced in: [`carries`]
//!   - Tested by: `tests::test_stale_hint_is_ignored`
//!   - Failure symptom: classes merged into scopes they no longer contribute to.
//!
//! The cache is not thread-safe. One index belongs to exactly one pass.

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use graft_symbols::{ClassDecl, ClassRef, FqName, SymbolTable};
use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashMap};
use tracing::debug;

use crate::hints::{HintGroup, group_markers};
use crate::{ContributionAnnotation, IndexError, names};

type QueryKey = (ContributionAnnotation, Option<FqName>);

pub struct ContributionIndex<'a> {
	table: &'a dyn SymbolTable,
	groups: OnceCell<Rc<[HintGroup]>>,
	cache: RefCell<FxHashMap<QueryKey, Rc<[ClassRef]>>>,
}

impl<'a> ContributionIndex<'a> {
	pub fn new(table: &'a dyn SymbolTable) -> Self {
		Self {
			table,
			groups: OnceCell::new(),
			cache: RefCell::new(FxHashMap::default()),
		}
	}

	pub fn table(&self) -> &'a dyn SymbolTable {
		self.table
	}

	/// Hint groups of the snapshot, parsed once.
	pub fn hint_groups(&self) -> Result<Rc<[HintGroup]>, IndexError> {
		if let Some(groups) = self.groups.get() {
			return Ok(groups.clone());
		}
		let properties = self.table.package_properties(names::HINT_PACKAGE);
		let groups: Rc<[HintGroup]> = group_markers(&properties)?.into();
		debug!(markers = properties.len(), groups = groups.len(), "parsed hint markers");
		Ok(self.groups.get_or_init(|| groups).clone())
	}

	/// Classes carrying `annotation`, restricted to `scope` when given, in marker discovery order.
	///
	/// Fails with [`IndexError::Unresolved`] when a matching hint names a class the table cannot
	/// resolve yet.
	pub fn find_contributed(&self, scope: Option<&ClassRef>, annotation: ContributionAnnotation) -> Result<Rc<[ClassRef]>, IndexError> {
		let key = (annotation, scope.map(|s| s.name.clone()));
		if let Some(hit) = self.cache.borrow().get(&key) {
			return Ok(hit.clone());
		}

		let groups = self.hint_groups()?;
		let mut found: IndexSet<ClassRef, FxBuildHasher> = IndexSet::default();
		for group in groups.iter() {
			if let Some(scope) = scope
				&& !group.scopes.contains(&scope.name)
			{
				continue;
			}
			let origin = self
				.table
				.find_class(group.reference.as_str())
				.ok_or_else(|| IndexError::Unresolved { name: group.reference.clone() })?;
			if carries(&origin, annotation, scope.map(|s| &s.name)) {
				found.insert(origin);
			}
		}

		let found: Rc<[ClassRef]> = found.into_iter().collect();
		debug!(
			%annotation,
			scope = scope.map(|s| s.name.as_str()).unwrap_or("*"),
			count = found.len(),
			"filled contribution cache"
		);
		self.cache.borrow_mut().insert(key, found.clone());
		Ok(found)
	}
}

/// Whether `class` carries `annotation`, pointing at `scope` when one is given.
pub fn carries(class: &ClassDecl, annotation: ContributionAnnotation, scope: Option<&FqName>) -> bool {
	annotation
		.instances(class)
		.any(|instance| scope.is_none_or(|scope| instance.class_argument(annotation.scope_argument()) == Some(scope)))
}
