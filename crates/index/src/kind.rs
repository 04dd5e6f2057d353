use std::fmt;

use graft_symbols::{Annotation, ClassDecl};

use crate::names;

/// Contribution annotation an index query is keyed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContributionAnnotation {
	ContributesTo,
	ContributesBinding,
	ContributesMultibinding,
	ContributesSubcomponent,
}

impl ContributionAnnotation {
	pub const ALL: [ContributionAnnotation; 4] = [
		Self::ContributesTo,
		Self::ContributesBinding,
		Self::ContributesMultibinding,
		Self::ContributesSubcomponent,
	];

	pub fn fq_name(self) -> &'static str {
		match self {
			Self::ContributesTo => names::CONTRIBUTES_TO,
			Self::ContributesBinding => names::CONTRIBUTES_BINDING,
			Self::ContributesMultibinding => names::CONTRIBUTES_MULTIBINDING,
			Self::ContributesSubcomponent => names::CONTRIBUTES_SUBCOMPONENT,
		}
	}

	/// Argument holding the scope a contribution is indexed under.
	///
	/// Contributed subcomponents are indexed under the scope of the parent they attach to.
	pub fn scope_argument(self) -> &'static str {
		match self {
			Self::ContributesSubcomponent => "parentScope",
			_ => "scope",
		}
	}

	pub fn from_fq_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.fq_name() == name)
	}

	/// Instances of this annotation on `class`.
	pub fn instances<'a>(self, class: &'a ClassDecl) -> impl Iterator<Item = &'a Annotation> + 'a {
		class.annotations_named(self.fq_name())
	}
}

impl fmt::Display for ContributionAnnotation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "@{}", names::short(self.fq_name()))
	}
}
