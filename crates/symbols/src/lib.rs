//! Symbol abstraction layer for graft.
//!
//! A uniform, read-only view over classes, functions, properties and annotations, independent of
//! whether a declaration is under active compilation or comes from an already-compiled artifact.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`SymbolTable`] | Lookup contract consumed by the index and the merge engine. |
//! | [`ClassRef`] | Shared handle to an immutable [`ClassDecl`], compared by qualified name. |
//! | [`MemorySymbolTable`] | Frozen snapshot, loadable from JSON, extended by copy. |
//! | [`Annotation`] | Annotation instance with typed argument accessors. |

mod annotation;
mod class;
mod error;
mod memory;
mod name;
mod table;

pub use annotation::{Annotation, AnnotationArgument, AnnotationValue};
pub use class::{
	ClassDecl, ClassKind, ClassRef, ConstructorDecl, FunctionDecl, ParameterDecl, PropertyDecl, PropertyRef, Provenance, SourcePosition,
	TopLevelProperty, Visibility,
};
pub use error::SymbolError;
pub use memory::{Declaration, MemorySymbolTable, SymbolSnapshot, SymbolTableBuilder};
pub use name::FqName;
pub use table::{SymbolTable, all_supertypes};
