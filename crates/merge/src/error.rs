//! Diagnostics.
//!
//! Every invariant violation is fatal and raised where it is detected. [`ResolveError::NotReady`]
//! is the only non-error outcome: it asks the host for another pass.

use std::fmt;
use std::path::PathBuf;

use graft_index::IndexError;
use graft_index::names::short;
use graft_symbols::{ClassDecl, FqName, SourcePosition, SymbolError};

use crate::bindings::rank_name;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
	Configuration,
	ScopeConsistency,
	KindMismatch,
	Visibility,
	Ambiguity,
	Structural,
	Index,
	Cycle,
}

/// Declaration a diagnostic is attributed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Site {
	pub declaration: FqName,
	pub path: Option<PathBuf>,
	pub position: Option<SourcePosition>,
	/// Competing or conflicting declarations.
	pub related: Vec<FqName>,
}

impl Site {
	pub fn of(class: &ClassDecl) -> Self {
		Self {
			declaration: class.name.clone(),
			path: class.provenance.source_path().filter(|p| !p.as_os_str().is_empty()).cloned(),
			position: class.position,
			related: Vec::new(),
		}
	}

	pub fn named(declaration: FqName) -> Self {
		Self {
			declaration,
			path: None,
			position: None,
			related: Vec::new(),
		}
	}

	pub fn with_related(mut self, related: impl IntoIterator<Item = FqName>) -> Self {
		self.related.extend(related);
		self
	}
}

impl fmt::Display for Site {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match (&self.path, self.position) {
			(Some(path), Some(pos)) => write!(f, "{}:{}:{} ({})", path.display(), pos.line, pos.column, self.declaration),
			(Some(path), None) => write!(f, "{} ({})", path.display(), self.declaration),
			(None, _) => write!(f, "{}", self.declaration),
		}
	}
}

fn rank_label(rank: &i32) -> String {
	rank_name(*rank)
}

fn list(names: &[FqName]) -> String {
	names.iter().map(FqName::as_str).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum MergeErrorKind {
	#[error("{declaration} is annotated with @{}, but doesn't declare a scope.", short(.annotation))]
	MissingScope { declaration: FqName, annotation: &'static str },

	#[error(
		"{origin} contributes a binding, but does not specify the bound type. This is only allowed with exactly one direct super type. If there are multiple or none, then the bound type must be explicitly defined in the @{} annotation. Candidates: [{}].",
		short(.annotation),
		list(.candidates)
	)]
	MissingBoundType {
		origin: FqName,
		annotation: &'static str,
		candidates: Vec<FqName>,
	},

	#[error("Classes annotated with @{} may not use more than one @Qualifier.", short(.annotation))]
	MultipleQualifiers { origin: FqName, annotation: &'static str },

	#[error("Classes annotated with @ContributesMultibinding may not use more than one @MapKey.")]
	MultipleMapKeys { origin: FqName },

	#[error(
		"Class {origin} binds {bound_type}, but the bound type contains type parameter(s) <{}>. Type parameters in bindings are not supported. This binding needs to be contributed in a Dagger module manually.",
		.parameters.join(", ")
	)]
	GenericBoundType {
		origin: FqName,
		bound_type: FqName,
		parameters: Vec<String>,
	},

	#[error("{module} is a generated binding module, but {reason}.")]
	MalformedBindingModule { module: FqName, reason: &'static str },

	#[error(
		"{declaration} with scopes [{}] wants to replace {replaced}, but the replaced class isn't contributed to the same scope.",
		list(.scopes)
	)]
	ReplacedNotInScope {
		declaration: FqName,
		replaced: FqName,
		scopes: Vec<FqName>,
	},

	#[error(
		"{declaration} with scopes [{}] wants to exclude {excluded}, but the excluded class isn't contributed to the same scope.",
		list(.scopes)
	)]
	ExcludedNotInScope {
		declaration: FqName,
		excluded: FqName,
		scopes: Vec<FqName>,
	},

	#[error("{declaration} wants to exclude {excluded}, but the excluded class is not an interface.")]
	ExcludedNotInterface { declaration: FqName, excluded: FqName },

	#[error("{declaration} includes and excludes modules at the same time: {}", list(.modules))]
	IncludesAndExcludes { declaration: FqName, modules: Vec<FqName> },

	#[error(
		"{declaration} excludes types that it implements or extends. These types cannot be excluded. Look at all the super types to find these classes: {}.",
		list(.excluded)
	)]
	ExcludesSupertypes { declaration: FqName, excluded: Vec<FqName> },

	#[error(
		"{class} is annotated with @{}, but this class is neither an interface nor a Dagger module. Did you forget to add @Module?",
		short(.annotation)
	)]
	NotInterfaceOrModule { class: FqName, annotation: &'static str },

	#[error("{declaration} wants to replace {replaced}, but the class being replaced is not a Dagger module.")]
	ReplacedNotModule { declaration: FqName, replaced: FqName },

	#[error("{declaration} wants to replace {replaced}, but the class being replaced is not an interface.")]
	ReplacedNotInterface { declaration: FqName, replaced: FqName },

	#[error("{origin} contributes a binding for {bound_type}, but doesn't extend this type.")]
	DoesNotExtendBoundType { origin: FqName, bound_type: FqName },

	#[error("{class} is contributed to the Dagger graph, but the {what} is not public. Only public {what}s are supported.")]
	NotPublic { class: FqName, what: &'static str },

	#[error(
		"There are multiple contributed bindings with the same bound type and rank. The bound type is {bound_type}. The rank is {}. The contributed binding classes are: [{}]",
		rank_label(.rank),
		list(.origins)
	)]
	AmbiguousBinding {
		bound_type: FqName,
		rank: i32,
		origins: Vec<FqName>,
	},

	#[error(
		"Generated subcomponent name {name} is derived from both {first_origin} (parent {first_parent}) and {second_origin} (parent {second_parent})."
	)]
	SubcomponentNameCollision {
		name: FqName,
		first_origin: FqName,
		first_parent: FqName,
		second_origin: FqName,
		second_parent: FqName,
	},

	#[error("Dagger components (or classes annotated with @MergeInterfaces) must be interfaces.")]
	MergePointNotInterface { declaration: FqName },

	#[error(
		"It's only allowed to have one single type of @Merge* annotation, however multiple instances of the same annotation are allowed. You mix [{}] and this is forbidden.",
		.annotations.iter().map(|a| short(a)).collect::<Vec<_>>().join(", ")
	)]
	MixedMergeAnnotations {
		declaration: FqName,
		annotations: Vec<&'static str>,
	},

	#[error(
		"{declaration} merges multiple times to the same scope: [{}]. Merging multiple times to the same scope is forbidden and all scopes must be distinct.",
		list(.scopes)
	)]
	DuplicateMergeScope { declaration: FqName, scopes: Vec<FqName> },

	#[error(
		"When using @{} it's not allowed to annotate the same class with @{}. The Dagger annotation will be generated.",
		short(.merge_annotation),
		short(.generated)
	)]
	AlreadyAnnotated {
		declaration: FqName,
		merge_annotation: &'static str,
		generated: &'static str,
	},

	#[error(
		"{origin} contributes multiple times to the same scope: [{}]. Contributing multiple times to the same scope is forbidden and all scopes must be distinct.",
		list(.scopes)
	)]
	DuplicateContributionScope { origin: FqName, scopes: Vec<FqName> },

	#[error(
		"{origin} contributes multiple times to the same scope using the same bound type: [{bound_type} in {scope}]. Contributing multiple times to the same scope with the same bound type is forbidden and all scope - bound type combinations must be distinct."
	)]
	DuplicateBinding {
		origin: FqName,
		scope: FqName,
		bound_type: FqName,
	},

	#[error("A factory must be an interface or an abstract class.")]
	FactoryNotAbstract { factory: FqName },

	#[error("A factory must have exactly one abstract function returning the subcomponent {subcomponent}.")]
	FactoryFunctionCount { factory: FqName, subcomponent: FqName },

	#[error("Expected zero or one factory for {subcomponent}.")]
	MultipleFactories { subcomponent: FqName },

	#[error("Expected zero or one parent component interface nested inside {subcomponent}.")]
	MultipleParentComponents { subcomponent: FqName },

	#[error("Expected zero or one function returning the subcomponent {subcomponent}.")]
	MultipleCreatorFunctions { parent: FqName, subcomponent: FqName },

	#[error("{declaration} was already amended in this compilation.")]
	AlreadyApplied { declaration: FqName },

	#[error(
		"Merge points could not be resolved after {passes} passes, declarations are still missing: [{}]",
		list(.pending)
	)]
	UnresolvableCycle { passes: u32, pending: Vec<FqName> },

	#[error(transparent)]
	Index(IndexError),

	#[error(transparent)]
	Symbol(SymbolError),
}

impl MergeErrorKind {
	pub fn category(&self) -> ErrorCategory {
		use MergeErrorKind::*;
		match self {
			MissingScope { .. }
			| MissingBoundType { .. }
			| MultipleQualifiers { .. }
			| MultipleMapKeys { .. }
			| GenericBoundType { .. }
			| MalformedBindingModule { .. } => ErrorCategory::Configuration,
			ReplacedNotInScope { .. } | ExcludedNotInScope { .. } | IncludesAndExcludes { .. } | ExcludesSupertypes { .. } => {
				ErrorCategory::ScopeConsistency
			}
			NotInterfaceOrModule { .. }
			| ReplacedNotModule { .. }
			| ReplacedNotInterface { .. }
			| ExcludedNotInterface { .. }
			| DoesNotExtendBoundType { .. } => {
				ErrorCategory::KindMismatch
			}
			NotPublic { .. } => ErrorCategory::Visibility,
			AmbiguousBinding { .. } | SubcomponentNameCollision { .. } => ErrorCategory::Ambiguity,
			MergePointNotInterface { .. }
			| MixedMergeAnnotations { .. }
			| DuplicateMergeScope { .. }
			| AlreadyAnnotated { .. }
			| DuplicateContributionScope { .. }
			| DuplicateBinding { .. }
			| FactoryNotAbstract { .. }
			| FactoryFunctionCount { .. }
			| MultipleFactories { .. }
			| MultipleParentComponents { .. }
			| MultipleCreatorFunctions { .. }
			| AlreadyApplied { .. }
			| Symbol(_) => ErrorCategory::Structural,
			Index(_) => ErrorCategory::Index,
			UnresolvableCycle { .. } => ErrorCategory::Cycle,
		}
	}

	/// Attributes the error to `site`.
	pub fn at(self, site: Site) -> MergeError {
		MergeError { kind: self, site }
	}
}

/// A fatal diagnostic with the declaration it is attributed to.
#[derive(Debug, thiserror::Error)]
#[error("{site}: {kind}")]
pub struct MergeError {
	pub kind: MergeErrorKind,
	pub site: Site,
}

impl MergeError {
	pub fn category(&self) -> ErrorCategory {
		self.kind.category()
	}

	pub fn message(&self) -> String {
		self.kind.to_string()
	}
}

/// Outcome of resolving one declaration that did not produce a value.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
	/// A referenced declaration is not visible in this pass; retry in a later one.
	#[error("{missing} is not visible yet")]
	NotReady { missing: FqName },
	#[error(transparent)]
	Merge(#[from] MergeError),
}

impl ResolveError {
	pub fn not_ready(missing: FqName) -> Self {
		Self::NotReady { missing }
	}
}

impl From<IndexError> for ResolveError {
	fn from(error: IndexError) -> Self {
		match error {
			IndexError::Unresolved { name } => Self::NotReady { missing: name },
			other => {
				let site = Site::named(other.marker());
				Self::Merge(MergeErrorKind::Index(other).at(site))
			}
		}
	}
}

impl From<SymbolError> for ResolveError {
	fn from(error: SymbolError) -> Self {
		let site = match &error {
			SymbolError::NotFound { name } => return Self::NotReady { missing: name.clone() },
			SymbolError::Duplicate { name } => Site::named(name.clone()),
			SymbolError::Snapshot(_) => Site::named(FqName::new("<snapshot>")),
		};
		Self::Merge(MergeErrorKind::Symbol(error).at(site))
	}
}

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
