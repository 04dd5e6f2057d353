use crate::FqName;

#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
	/// The declaration is not (yet) part of the symbol table.
	#[error("declaration not found: {name}")]
	NotFound { name: FqName },
	#[error("duplicate declaration: {name}")]
	Duplicate { name: FqName },
	#[error("malformed symbol snapshot: {0}")]
	Snapshot(#[from] serde_json::Error),
}

impl SymbolError {
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}
}
