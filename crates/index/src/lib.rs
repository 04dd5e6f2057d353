//! Contribution index for graft.
//!
//! Contributions are discovered through hint markers (see [`hints`]) rather than by scanning
//! every declaration of every dependency. [`ContributionIndex`] interprets those markers for a
//! single frozen [`graft_symbols::SymbolTable`].

pub mod hints;
pub mod names;

mod error;
mod index;
mod kind;

pub use error::IndexError;
pub use index::{ContributionIndex, carries};
pub use kind::ContributionAnnotation;
