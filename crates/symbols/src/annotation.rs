//! Annotation instances with typed argument access.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::FqName;

/// Value of a single annotation argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnnotationValue {
	Bool(bool),
	Int(i64),
	String(String),
	/// Enum entry, stored by its qualified name.
	Enum(FqName),
	/// Class literal, stored by the qualified name of the referenced class.
	Class(FqName),
	Array(Vec<AnnotationValue>),
	Annotation(Annotation),
}

impl AnnotationValue {
	pub fn class(name: impl Into<FqName>) -> Self {
		Self::Class(name.into())
	}

	pub fn classes<I, N>(names: I) -> Self
	where
		I: IntoIterator<Item = N>,
		N: Into<FqName>,
	{
		Self::Array(names.into_iter().map(|name| Self::Class(name.into())).collect())
	}
}

/// Stable textual form used for grouping keys. Class references render as their qualified name.
impl fmt::Display for AnnotationValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(value) => write!(f, "{value}"),
			Self::Int(value) => write!(f, "{value}"),
			Self::String(value) => f.write_str(value),
			Self::Enum(name) | Self::Class(name) => write!(f, "{name}"),
			Self::Array(values) => {
				f.write_str("[")?;
				for (i, value) in values.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{value}")?;
				}
				f.write_str("]")
			}
			Self::Annotation(annotation) => write!(f, "{annotation}"),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationArgument {
	pub name: String,
	pub value: AnnotationValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
	pub name: FqName,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub arguments: Vec<AnnotationArgument>,
}

impl Annotation {
	pub fn new(name: impl Into<FqName>) -> Self {
		Self {
			name: name.into(),
			arguments: Vec::new(),
		}
	}

	/// Adds or overwrites an argument.
	pub fn with(mut self, name: &str, value: AnnotationValue) -> Self {
		match self.arguments.iter_mut().find(|arg| arg.name == name) {
			Some(existing) => existing.value = value,
			None => self.arguments.push(AnnotationArgument {
				name: name.to_string(),
				value,
			}),
		}
		self
	}

	pub fn is(&self, name: &str) -> bool {
		self.name == name
	}

	pub fn argument(&self, name: &str) -> Option<&AnnotationValue> {
		self.arguments.iter().find(|arg| arg.name == name).map(|arg| &arg.value)
	}

	pub fn bool_argument(&self, name: &str) -> Option<bool> {
		match self.argument(name)? {
			AnnotationValue::Bool(value) => Some(*value),
			_ => None,
		}
	}

	pub fn int_argument(&self, name: &str) -> Option<i64> {
		match self.argument(name)? {
			AnnotationValue::Int(value) => Some(*value),
			_ => None,
		}
	}

	pub fn string_argument(&self, name: &str) -> Option<&str> {
		match self.argument(name)? {
			AnnotationValue::String(value) => Some(value),
			_ => None,
		}
	}

	pub fn class_argument(&self, name: &str) -> Option<&FqName> {
		match self.argument(name)? {
			AnnotationValue::Class(value) => Some(value),
			_ => None,
		}
	}

	/// Class-literal array argument. A single class literal is accepted as a one-element array,
	/// a missing argument yields an empty list.
	pub fn class_array(&self, name: &str) -> Vec<&FqName> {
		match self.argument(name) {
			Some(AnnotationValue::Array(values)) => values
				.iter()
				.filter_map(|value| match value {
					AnnotationValue::Class(class) => Some(class),
					_ => None,
				})
				.collect(),
			Some(AnnotationValue::Class(class)) => vec![class],
			_ => Vec::new(),
		}
	}

	pub fn annotation_argument(&self, name: &str) -> Option<&Annotation> {
		match self.argument(name)? {
			AnnotationValue::Annotation(value) => Some(value),
			_ => None,
		}
	}
}

impl fmt::Display for Annotation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "@{}", self.name)?;
		if self.arguments.is_empty() {
			return Ok(());
		}
		f.write_str("(")?;
		for (i, arg) in self.arguments.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{} = {}", arg.name, arg.value)?;
		}
		f.write_str(")")
	}
}
