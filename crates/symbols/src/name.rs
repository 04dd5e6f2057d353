//! Fully-qualified declaration names.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Dot-separated qualified name of a declaration, e.g. `com.example.Outer.Inner`.
///
/// Cheap to clone. Equality, hashing and ordering follow the underlying string, so a
/// `FqName` can be looked up in maps keyed by `str`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FqName(Arc<str>);

impl FqName {
	pub fn new(name: &str) -> Self {
		Self(Arc::from(name))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Last segment of the name.
	pub fn short_name(&self) -> &str {
		self.0.rsplit_once('.').map_or(&self.0, |(_, short)| short)
	}

	/// Name with the last segment removed, `None` for single-segment names.
	pub fn parent(&self) -> Option<FqName> {
		self.0.rsplit_once('.').map(|(parent, _)| FqName::new(parent))
	}

	pub fn child(&self, segment: &str) -> FqName {
		if self.0.is_empty() {
			FqName::new(segment)
		} else {
			FqName(Arc::from(format!("{}.{segment}", self.0)))
		}
	}

	pub fn segments(&self) -> impl Iterator<Item = &str> {
		self.0.split('.')
	}

	/// Best-effort package split for names without explicit package information.
	///
	/// Leading segments are treated as package segments until the first one starting with an
	/// uppercase letter.
	pub fn guess_package(&self) -> String {
		self.segments()
			.take_while(|segment| !segment.starts_with(|c: char| c.is_uppercase()))
			.collect::<Vec<_>>()
			.join(".")
	}
}

impl fmt::Display for FqName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Debug for FqName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.0, f)
	}
}

impl Borrow<str> for FqName {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for FqName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<&str> for FqName {
	fn from(value: &str) -> Self {
		FqName::new(value)
	}
}

impl From<String> for FqName {
	fn from(value: String) -> Self {
		Self(Arc::from(value))
	}
}

impl From<FqName> for String {
	fn from(value: FqName) -> Self {
		value.0.to_string()
	}
}

impl PartialEq<str> for FqName {
	fn eq(&self, other: &str) -> bool {
		&*self.0 == other
	}
}

impl PartialEq<&str> for FqName {
	fn eq(&self, other: &&str) -> bool {
		&*self.0 == *other
	}
}
