//! One resolution pass.
//!
//! # Role
//!
//! A pass sees one immutable view of the symbol table. It first asks for every declaration the
//! engine must generate (hint markers, binding modules, derived subcomponents); only when nothing
//! is requested does it resolve merge points. All caches live in the [`PassContext`] and die with
//! it.
//!
//! # Invariants
//!
//! - Merge points are never resolved against a table that is about to grow.
//!   - Enforced in: [`run_pass`]
//!   - Tested by: `tests/integration/scenarios.rs`, `tests::test_generation_comes_before_resolution`
//!   - Failure symptom: a merge point misses contributions generated later in the same pass.
//!
//! - A merge point whose inputs are not visible yet is deferred, never resolved partially.
//!   - Enforced in: [`run_pass`]
//!   - Tested by: `tests::test_missing_include_defers_point`
//!   - Failure symptom: incomplete module lists.

use std::rc::Rc;

use graft_index::{ContributionAnnotation, ContributionIndex};
use graft_symbols::{ClassRef, Declaration, FqName, SymbolTable};
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::annotations::lookup;
use crate::config::{MergeConfig, PathFilter};
use crate::error::{MergeError, ResolveError, Result};
use crate::generate::generate_hints;
use crate::merge_point::MergePoint;
use crate::resolver::{MergeResolver, MergeResult};
use crate::subcomponents::{SubcomponentNames, generate_subcomponents};

/// Everything one pass reads, plus its contribution cache.
pub struct PassContext<'a> {
	table: &'a dyn SymbolTable,
	config: &'a MergeConfig,
	filter: &'a PathFilter,
	index: ContributionIndex<'a>,
	pass: u32,
}

impl<'a> PassContext<'a> {
	pub fn new(table: &'a dyn SymbolTable, config: &'a MergeConfig, filter: &'a PathFilter, pass: u32) -> Self {
		Self {
			table,
			config,
			filter,
			index: ContributionIndex::new(table),
			pass,
		}
	}

	pub fn table(&self) -> &'a dyn SymbolTable {
		self.table
	}

	pub fn config(&self) -> &'a MergeConfig {
		self.config
	}

	pub fn filter(&self) -> &'a PathFilter {
		self.filter
	}

	pub fn index(&self) -> &ContributionIndex<'a> {
		&self.index
	}

	pub fn pass(&self) -> u32 {
		self.pass
	}

	pub fn lookup(&self, name: &FqName) -> Result<ClassRef> {
		lookup(self.table, name)
	}

	/// Classes contributed to `scope` with `annotation`, cached for the pass.
	pub fn contributed(&self, scope: &ClassRef, annotation: ContributionAnnotation) -> Result<Rc<[ClassRef]>> {
		Ok(self.index.find_contributed(Some(scope), annotation)?)
	}
}

#[derive(Debug)]
pub enum PassOutcome {
	/// Declarations must be generated before anything is resolved.
	Deferred {
		requested: Vec<Declaration>,
		/// Declarations whose generation waits on something not visible yet.
		blocked: Vec<FqName>,
	},
	Resolved {
		results: Vec<MergeResult>,
		/// Merge points waiting on declarations not visible yet.
		deferred: Vec<FqName>,
	},
}

/// Runs one pass, skipping merge points already resolved in `completed`.
pub fn run_pass(ctx: &PassContext<'_>, completed: &FxHashSet<FqName>, registry: &mut SubcomponentNames) -> Result<PassOutcome, MergeError> {
	let config = ctx.config();
	if config.generate_factories_only {
		debug!(pass = ctx.pass(), "factory generation only, nothing to merge");
		return Ok(PassOutcome::Resolved {
			results: Vec::new(),
			deferred: Vec::new(),
		});
	}

	let hints = generate_hints(ctx.table(), ctx.filter())?;
	let mut requested = hints.requested;
	let mut blocked = hints.blocked;

	let mut points = Vec::new();
	let mut deferred = Vec::new();
	for class in ctx.table().source_classes() {
		if completed.contains(&class.name) {
			continue;
		}
		match MergePoint::detect(ctx.table(), &class) {
			Ok(Some(point)) => points.push(point),
			Ok(None) => {}
			Err(ResolveError::NotReady { missing }) => {
				debug!(merge_point = %class.name, %missing, "merge point not ready");
				deferred.push(class.name.clone());
			}
			Err(ResolveError::Merge(error)) => return Err(error),
		}
	}

	for point in &points {
		match generate_subcomponents(ctx, std::slice::from_ref(point), registry) {
			Ok(declarations) => requested.extend(declarations),
			Err(ResolveError::NotReady { missing }) => {
				debug!(merge_point = %point.name(), %missing, "subcomponent generation blocked");
				blocked.push(point.name().clone());
			}
			Err(ResolveError::Merge(error)) => return Err(error),
		}
	}

	if !requested.is_empty() || !blocked.is_empty() {
		info!(pass = ctx.pass(), requested = requested.len(), blocked = blocked.len(), "generation requested");
		return Ok(PassOutcome::Deferred { requested, blocked });
	}

	if config.disable_merging {
		info!(pass = ctx.pass(), merge_points = points.len(), "merging disabled");
		return Ok(PassOutcome::Resolved {
			results: Vec::new(),
			deferred: Vec::new(),
		});
	}

	let resolver = MergeResolver::new(ctx);
	let mut results = Vec::with_capacity(points.len());
	for point in &points {
		match resolver.resolve(point) {
			Ok(result) => results.push(result),
			Err(ResolveError::NotReady { missing }) => {
				warn!(merge_point = %point.name(), %missing, "deferring merge point");
				deferred.push(point.name().clone());
			}
			Err(ResolveError::Merge(error)) => return Err(error),
		}
	}
	info!(pass = ctx.pass(), resolved = results.len(), deferred = deferred.len(), "pass complete");
	Ok(PassOutcome::Resolved { results, deferred })
}
