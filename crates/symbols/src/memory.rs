//! Frozen in-memory symbol table.
//!
//! # Role
//!
//! [`MemorySymbolTable`] is the snapshot a compilation pass reads from. It is never mutated:
//! declarations generated by a pass are added through [`MemorySymbolTable::with_generated`],
//! which returns a new snapshot and leaves the old one untouched.
//!
//! # Invariants
//!
//! - Class names are unique within a snapshot.
//!   - Enforced in: [`SymbolTableBuilder::push_class`]
//!   - Tested by: `tests::test_duplicate_class_rejected`
//!   - Failure symptom: lookups return an arbitrary one of two conflicting declarations.
//!
//! - Extending a snapshot never changes the answers of the snapshot it was derived from.
//!   - Enforced in: [`MemorySymbolTable::with_generated`]
//!   - Tested by: `tests::test_with_generated_leaves_original_untouched`
//!   - Failure symptom: a pass observes its own output while resolving.

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use serde::{Deserialize, Serialize};

use crate::{ClassDecl, ClassRef, FqName, PropertyRef, SymbolError, SymbolTable, TopLevelProperty};

/// A declaration that can be added to a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "declaration", rename_all = "snake_case")]
pub enum Declaration {
	Class(ClassDecl),
	Property(TopLevelProperty),
}

impl Declaration {
	/// Qualified name of the declared class or property.
	pub fn fq_name(&self) -> FqName {
		match self {
			Self::Class(class) => class.name.clone(),
			Self::Property(property) => FqName::new(&property.package).child(&property.name),
		}
	}
}

/// Serialized form of a symbol table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSnapshot {
	#[serde(default)]
	pub classes: Vec<ClassDecl>,
	#[serde(default)]
	pub properties: Vec<TopLevelProperty>,
}

#[derive(Clone, Debug, Default)]
pub struct MemorySymbolTable {
	classes: IndexMap<FqName, ClassRef, FxBuildHasher>,
	properties: FxHashMap<String, Vec<PropertyRef>>,
	property_order: Vec<PropertyRef>,
}

impl MemorySymbolTable {
	pub fn builder() -> SymbolTableBuilder {
		SymbolTableBuilder::default()
	}

	pub fn from_classes(classes: impl IntoIterator<Item = ClassDecl>) -> Result<Self, SymbolError> {
		let mut builder = SymbolTableBuilder::default();
		for class in classes {
			builder.push_class(class)?;
		}
		Ok(builder.build())
	}

	pub fn from_snapshot(snapshot: SymbolSnapshot) -> Result<Self, SymbolError> {
		let mut builder = SymbolTableBuilder::default();
		for class in snapshot.classes {
			builder.push_class(class)?;
		}
		for property in snapshot.properties {
			builder.push_property(property);
		}
		Ok(builder.build())
	}

	pub fn from_json(json: &str) -> Result<Self, SymbolError> {
		Self::from_snapshot(serde_json::from_str(json)?)
	}

	pub fn to_snapshot(&self) -> SymbolSnapshot {
		SymbolSnapshot {
			classes: self.classes.values().map(|class| class.decl().clone()).collect(),
			properties: self.property_order.iter().map(|property| (**property).clone()).collect(),
		}
	}

	pub fn to_json(&self) -> Result<String, SymbolError> {
		Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
	}

	pub fn len(&self) -> usize {
		self.classes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.is_empty() && self.property_order.is_empty()
	}

	pub fn classes(&self) -> impl Iterator<Item = &ClassRef> {
		self.classes.values()
	}

	/// Returns a new snapshot containing every declaration of `self` plus `declarations`.
	pub fn with_generated(&self, declarations: impl IntoIterator<Item = Declaration>) -> Result<Self, SymbolError> {
		let mut builder = SymbolTableBuilder {
			table: self.clone(),
		};
		for declaration in declarations {
			builder.push(declaration)?;
		}
		Ok(builder.build())
	}

	/// Returns a new snapshot in which the class named `decl.name` is replaced by `decl`.
	pub fn with_replaced(&self, decl: ClassDecl) -> Result<Self, SymbolError> {
		let mut next = self.clone();
		match next.classes.get_mut(decl.name.as_str()) {
			Some(slot) => *slot = ClassRef::new(decl),
			None => return Err(SymbolError::NotFound { name: decl.name }),
		}
		Ok(next)
	}
}

impl SymbolTable for MemorySymbolTable {
	fn find_class(&self, name: &str) -> Option<ClassRef> {
		self.classes.get(name).cloned()
	}

	fn package_properties(&self, package: &str) -> Vec<PropertyRef> {
		self.properties.get(package).cloned().unwrap_or_default()
	}

	fn source_classes(&self) -> Vec<ClassRef> {
		self.classes.values().filter(|class| class.provenance.is_source()).cloned().collect()
	}
}

#[derive(Debug, Default)]
pub struct SymbolTableBuilder {
	table: MemorySymbolTable,
}

impl SymbolTableBuilder {
	pub fn push(&mut self, declaration: Declaration) -> Result<&mut Self, SymbolError> {
		match declaration {
			Declaration::Class(class) => self.push_class(class),
			Declaration::Property(property) => Ok(self.push_property(property)),
		}
	}

	pub fn push_class(&mut self, mut class: ClassDecl) -> Result<&mut Self, SymbolError> {
		if class.package.is_empty() {
			class.package = class.name.guess_package();
		}
		if self.table.classes.contains_key(class.name.as_str()) {
			return Err(SymbolError::Duplicate { name: class.name });
		}
		self.table.classes.insert(class.name.clone(), ClassRef::new(class));
		Ok(self)
	}

	/// Properties are not unique: the same marker may be contributed by more than one artifact.
	pub fn push_property(&mut self, property: TopLevelProperty) -> &mut Self {
		let property = PropertyRef::new(property);
		self.table
			.properties
			.entry(property.package.clone())
			.or_default()
			.push(property.clone());
		self.table.property_order.push(property);
		self
	}

	pub fn build(self) -> MemorySymbolTable {
		self.table
	}
}
