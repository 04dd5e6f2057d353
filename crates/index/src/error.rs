use graft_symbols::FqName;

use crate::names;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
	#[error("Couldn't find the reference for a generated hint: {base}.")]
	MissingReference { base: String },
	#[error("Generated hint {base} references more than one class: {candidates:?}.")]
	AmbiguousReference { base: String, candidates: Vec<FqName> },
	#[error("Couldn't find any scope for a generated hint: {origin}.")]
	MissingScope { base: String, origin: FqName },
	/// A hint names a class that is not visible yet. Callers defer instead of failing.
	#[error("hint references {name}, which is not visible yet")]
	Unresolved { name: FqName },
}

impl IndexError {
	/// Qualified name of the marker declaration the error is attributed to.
	pub fn marker(&self) -> FqName {
		let base = match self {
			Self::MissingReference { base } | Self::AmbiguousReference { base, .. } | Self::MissingScope { base, .. } => base.as_str(),
			Self::Unresolved { name } => return name.clone(),
		};
		FqName::new(names::HINT_PACKAGE).child(&format!("{base}{}", names::REFERENCE_SUFFIX))
	}
}
