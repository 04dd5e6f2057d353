//! Merge engine for graft.
//!
//! Resolves every merge point of a compilation against the contributions visible through
//! [`graft_index::ContributionIndex`], across as many passes as declaration generation needs.
//!
//! # Pipeline
//!
//! 1. [`generate`]: hint markers and binding modules for new contributions.
//! 2. [`subcomponents`]: derived subcomponents for every contributed subcomponent.
//! 3. [`resolver`]: final modules and supertypes per merge point, once nothing is pending.
//! 4. [`apply`]: amendments for the emitter, optionally applied to the snapshot.
//!
//! [`Compilation`] drives the pipeline; [`pass::run_pass`] is one iteration of it.

pub mod annotations;
pub mod apply;
pub mod bindings;
pub mod config;
pub mod driver;
pub mod error;
pub mod generate;
pub mod merge_log;
pub mod merge_point;
pub mod naming;
pub mod pass;
pub mod resolver;
pub mod subcomponents;

#[cfg(test)]
mod test_fixtures;

pub use apply::{Amendment, apply};
pub use bindings::{BindingKey, ContributedBinding, ContributedBindings, RANK_HIGH, RANK_HIGHEST, RANK_NORMAL};
pub use config::{Capabilities, ConfigError, MergeConfig, PathFilter};
pub use driver::{Compilation, CompilationOutput};
pub use error::{ErrorCategory, MergeError, MergeErrorKind, ResolveError, Site};
pub use merge_log::{MergeLog, MergeLogEntry, MergeLogError};
pub use merge_point::{MergeKind, MergePoint};
pub use pass::{PassContext, PassOutcome};
pub use resolver::{MergeResolver, MergeResult};
