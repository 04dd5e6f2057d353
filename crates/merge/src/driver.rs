//! Multi-pass compilation driver.
//!
//! Runs passes until every merge point is resolved. Declarations requested by a pass are added
//! to a new snapshot before the next one starts, so each pass observes a frozen table.

use graft_symbols::{Declaration, FqName, MemorySymbolTable, SymbolError};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};
use tracing::{info, info_span};

use crate::apply::{Amendment, apply};
use crate::config::{ConfigError, MergeConfig, PathFilter};
use crate::error::{MergeError, MergeErrorKind, Site};
use crate::merge_log::MergeLog;
use crate::pass::{PassContext, PassOutcome, run_pass};
use crate::resolver::MergeResult;
use crate::subcomponents::SubcomponentNames;

/// Result of a complete run.
#[derive(Debug)]
pub struct CompilationOutput {
	/// Input plus generated declarations, with every amendment applied.
	pub table: MemorySymbolTable,
	pub results: IndexMap<FqName, MergeResult, FxBuildHasher>,
	pub amendments: Vec<Amendment>,
	pub generated: Vec<Declaration>,
	pub passes: u32,
}

impl CompilationOutput {
	pub fn result(&self, merge_point: &str) -> Option<&MergeResult> {
		self.results.get(merge_point)
	}

	pub fn merge_log(&self) -> MergeLog {
		MergeLog::from_results(self.results.values())
	}
}

pub struct Compilation {
	table: MemorySymbolTable,
	config: MergeConfig,
	filter: PathFilter,
	results: IndexMap<FqName, MergeResult, FxBuildHasher>,
	generated: Vec<Declaration>,
	registry: SubcomponentNames,
}

fn symbol_error(error: SymbolError) -> MergeError {
	let site = match &error {
		SymbolError::NotFound { name } | SymbolError::Duplicate { name } => Site::named(name.clone()),
		SymbolError::Snapshot(_) => Site::named(FqName::new("<snapshot>")),
	};
	MergeErrorKind::Symbol(error).at(site)
}

impl Compilation {
	pub fn new(table: MemorySymbolTable, config: MergeConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		let filter = config.path_filter()?;
		Ok(Self {
			table,
			config,
			filter,
			results: IndexMap::default(),
			generated: Vec::new(),
			registry: SubcomponentNames::default(),
		})
	}

	pub fn config(&self) -> &MergeConfig {
		&self.config
	}

	pub fn run(mut self) -> Result<CompilationOutput, MergeError> {
		let mut completed: FxHashSet<FqName> = FxHashSet::default();
		let mut pending: Vec<FqName> = Vec::new();

		for pass in 1..=self.config.max_passes {
			let _span = info_span!("pass", pass).entered();
			let outcome = {
				let ctx = PassContext::new(&self.table, &self.config, &self.filter, pass);
				run_pass(&ctx, &completed, &mut self.registry)?
			};

			match outcome {
				PassOutcome::Deferred { requested, blocked } => {
					if requested.is_empty() {
						return Err(MergeErrorKind::UnresolvableCycle { passes: pass, pending: blocked }.at(Site::named(FqName::new("<compilation>"))));
					}
					self.table = self.table.with_generated(requested.iter().cloned()).map_err(symbol_error)?;
					self.generated.extend(requested);
					pending = blocked;
				}
				PassOutcome::Resolved { results, deferred } => {
					let progressed = !results.is_empty();
					for result in results {
						completed.insert(result.merge_point.clone());
						self.results.insert(result.merge_point.clone(), result);
					}
					if deferred.is_empty() {
						return self.finish(pass);
					}
					if !progressed {
						return Err(MergeErrorKind::UnresolvableCycle { passes: pass, pending: deferred }.at(Site::named(FqName::new("<compilation>"))));
					}
					pending = deferred;
				}
			}
		}

		Err(MergeErrorKind::UnresolvableCycle {
			passes: self.config.max_passes,
			pending,
		}
		.at(Site::named(FqName::new("<compilation>"))))
	}

	fn finish(self, passes: u32) -> Result<CompilationOutput, MergeError> {
		let amendments: Vec<Amendment> = self
			.results
			.values()
			.map(|result| Amendment::from_result(result, &self.config))
			.filter(|amendment| !amendment.is_noop())
			.collect();
		let table = apply(&self.table, &amendments)?;
		info!(
			passes,
			merge_points = self.results.len(),
			generated = self.generated.len(),
			amendments = amendments.len(),
			"compilation complete"
		);
		Ok(CompilationOutput {
			table,
			results: self.results,
			amendments,
			generated: self.generated,
			passes,
		})
	}
}
