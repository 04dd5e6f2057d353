//! Class-like declarations and the shared [`ClassRef`] handle.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Annotation, FqName};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
	#[default]
	Class,
	Interface,
	Annotation,
	Object,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
	#[default]
	Public,
	Internal,
	Protected,
	Private,
}

/// Where a declaration comes from.
///
/// Both modes expose identical read semantics; only hint generation and the path allow-list
/// care about the difference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum Provenance {
	/// Under active compilation. Generated declarations are sources as well.
	Source { path: PathBuf },
	/// Loaded from an already-compiled dependency.
	Compiled { artifact: String },
}

impl Default for Provenance {
	fn default() -> Self {
		Self::Source { path: PathBuf::new() }
	}
}

impl Provenance {
	pub fn is_source(&self) -> bool {
		matches!(self, Self::Source { .. })
	}

	pub fn source_path(&self) -> Option<&PathBuf> {
		match self {
			Self::Source { path } => Some(path),
			Self::Compiled { .. } => None,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
	pub line: u32,
	pub column: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDecl {
	pub name: String,
	#[serde(rename = "type")]
	pub type_name: FqName,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
	pub name: String,
	#[serde(default)]
	pub return_type: Option<FqName>,
	#[serde(default)]
	pub is_abstract: bool,
	#[serde(default)]
	pub visibility: Visibility,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub annotations: Vec<Annotation>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub parameters: Vec<ParameterDecl>,
}

impl FunctionDecl {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			return_type: None,
			is_abstract: false,
			visibility: Visibility::Public,
			annotations: Vec::new(),
			parameters: Vec::new(),
		}
	}

	pub fn abstract_fn(name: &str, return_type: impl Into<FqName>) -> Self {
		Self {
			is_abstract: true,
			..Self::new(name).returning(return_type)
		}
	}

	pub fn returning(mut self, return_type: impl Into<FqName>) -> Self {
		self.return_type = Some(return_type.into());
		self
	}

	pub fn with_annotation(mut self, annotation: Annotation) -> Self {
		self.annotations.push(annotation);
		self
	}

	pub fn with_parameter(mut self, name: &str, type_name: impl Into<FqName>) -> Self {
		self.parameters.push(ParameterDecl {
			name: name.to_string(),
			type_name: type_name.into(),
		});
		self
	}

	pub fn returns(&self, name: &FqName) -> bool {
		self.return_type.as_ref() == Some(name)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDecl {
	pub name: String,
	#[serde(rename = "type")]
	pub type_name: FqName,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDecl {
	#[serde(default)]
	pub visibility: Visibility,
	#[serde(default)]
	pub parameters: Vec<ParameterDecl>,
}

/// Top-level property, addressed by package.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopLevelProperty {
	pub package: String,
	pub name: String,
	#[serde(rename = "type")]
	pub type_name: FqName,
}

pub type PropertyRef = Arc<TopLevelProperty>;

/// Immutable description of a class, interface, annotation class or object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
	pub name: FqName,
	/// Package of the declaration. Empty in snapshots means "derive from the name".
	#[serde(default)]
	pub package: String,
	#[serde(default)]
	pub kind: ClassKind,
	#[serde(default)]
	pub visibility: Visibility,
	#[serde(default)]
	pub is_abstract: bool,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub type_parameters: Vec<String>,
	/// Direct supertypes only.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub supertypes: Vec<FqName>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub annotations: Vec<Annotation>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub functions: Vec<FunctionDecl>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub properties: Vec<PropertyDecl>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub constructors: Vec<ConstructorDecl>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub nested_classes: Vec<FqName>,
	#[serde(default)]
	pub provenance: Provenance,
	#[serde(default)]
	pub position: Option<SourcePosition>,
}

impl ClassDecl {
	pub fn new(name: impl Into<FqName>, kind: ClassKind) -> Self {
		let name = name.into();
		Self {
			package: name.guess_package(),
			name,
			kind,
			visibility: Visibility::Public,
			is_abstract: kind == ClassKind::Interface,
			type_parameters: Vec::new(),
			supertypes: Vec::new(),
			annotations: Vec::new(),
			functions: Vec::new(),
			properties: Vec::new(),
			constructors: Vec::new(),
			nested_classes: Vec::new(),
			provenance: Provenance::default(),
			position: None,
		}
	}

	pub fn class(name: impl Into<FqName>) -> Self {
		Self::new(name, ClassKind::Class)
	}

	pub fn interface(name: impl Into<FqName>) -> Self {
		Self::new(name, ClassKind::Interface)
	}

	pub fn object(name: impl Into<FqName>) -> Self {
		Self::new(name, ClassKind::Object)
	}

	pub fn annotation_class(name: impl Into<FqName>) -> Self {
		Self::new(name, ClassKind::Annotation)
	}

	pub fn with_package(mut self, package: &str) -> Self {
		self.package = package.to_string();
		self
	}

	pub fn with_visibility(mut self, visibility: Visibility) -> Self {
		self.visibility = visibility;
		self
	}

	pub fn with_abstract(mut self, is_abstract: bool) -> Self {
		self.is_abstract = is_abstract;
		self
	}

	pub fn with_type_parameter(mut self, name: &str) -> Self {
		self.type_parameters.push(name.to_string());
		self
	}

	pub fn with_supertype(mut self, name: impl Into<FqName>) -> Self {
		self.supertypes.push(name.into());
		self
	}

	pub fn with_annotation(mut self, annotation: Annotation) -> Self {
		self.annotations.push(annotation);
		self
	}

	pub fn with_function(mut self, function: FunctionDecl) -> Self {
		self.functions.push(function);
		self
	}

	pub fn with_nested(mut self, name: impl Into<FqName>) -> Self {
		self.nested_classes.push(name.into());
		self
	}

	pub fn with_provenance(mut self, provenance: Provenance) -> Self {
		self.provenance = provenance;
		self
	}

	pub fn compiled(self, artifact: &str) -> Self {
		self.with_provenance(Provenance::Compiled {
			artifact: artifact.to_string(),
		})
	}

	pub fn at(mut self, line: u32, column: u32) -> Self {
		self.position = Some(SourcePosition { line, column });
		self
	}

	pub fn is_interface(&self) -> bool {
		self.kind == ClassKind::Interface
	}

	pub fn is_public(&self) -> bool {
		self.visibility == Visibility::Public
	}

	pub fn has_annotation(&self, name: &str) -> bool {
		self.annotations.iter().any(|a| a.is(name))
	}

	/// First annotation with the given name.
	pub fn annotation(&self, name: &str) -> Option<&Annotation> {
		self.annotations.iter().find(|a| a.is(name))
	}

	/// All instances of a (possibly repeated) annotation.
	pub fn annotations_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Annotation> + 'a {
		self.annotations.iter().filter(move |a| a.is(name))
	}

	/// Name relative to the package, e.g. `Outer.Inner`.
	pub fn relative_name(&self) -> &str {
		let name = self.name.as_str();
		if self.package.is_empty() {
			return name;
		}
		name.strip_prefix(self.package.as_str())
			.and_then(|rest| rest.strip_prefix('.'))
			.unwrap_or(name)
	}

	pub fn simple_names(&self) -> impl Iterator<Item = &str> {
		self.relative_name().split('.')
	}
}

/// Shared handle to an immutable [`ClassDecl`].
///
/// Identity is the qualified name: two handles are equal when they name the same declaration,
/// regardless of which snapshot produced them.
#[derive(Clone)]
pub struct ClassRef(Arc<ClassDecl>);

impl ClassRef {
	pub fn new(decl: ClassDecl) -> Self {
		Self(Arc::new(decl))
	}

	pub fn fq_name(&self) -> &FqName {
		&self.0.name
	}

	pub fn decl(&self) -> &ClassDecl {
		&self.0
	}
}

impl Deref for ClassRef {
	type Target = ClassDecl;

	fn deref(&self) -> &ClassDecl {
		&self.0
	}
}

impl PartialEq for ClassRef {
	fn eq(&self, other: &Self) -> bool {
		self.0.name == other.0.name
	}
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.0.name.hash(state);
	}
}

impl PartialOrd for ClassRef {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for ClassRef {
	fn cmp(&self, other: &Self) -> Ordering {
		self.0.name.cmp(&other.0.name)
	}
}

impl fmt::Debug for ClassRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ClassRef({})", self.0.name)
	}
}

impl fmt::Display for ClassRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.name)
	}
}
