//! Binding resolution.
//!
//! # Role
//!
//! Groups contributed bindings by scope and [`BindingKey`] and keeps, per key, every
//! multibinding plus the single highest-ranked plain binding.
//!
//! # Invariants
//!
//! - At most one plain binding survives per key.
//!   - Enforced in: [`ContributedBindings::resolve`]
//!   - Tested by: `tests::test_highest_rank_wins`, `tests::test_equal_top_rank_is_ambiguous`
//!   - Failure symptom: the DI framework reports a duplicate binding, or the wrong override wins.
//!
//! - Multibindings are never pruned.
//!   - Enforced in: [`ContributedBindings::resolve`]
//!   - Tested by: `tests::test_multibindings_are_additive`
//!   - Failure symptom: set/map entries silently disappear.
//!
//! Two *different* origins tied at the top rank are always ambiguous, even when they would bind
//! the same implementation. Only repeated contributions from the same origin collapse.

use std::fmt;

use graft_symbols::{ClassRef, FqName};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use crate::error::{MergeError, MergeErrorKind, Site};

pub const RANK_NORMAL: i32 = i32::MIN;
pub const RANK_HIGH: i32 = 0;
pub const RANK_HIGHEST: i32 = i32::MAX;

pub fn rank_name(rank: i32) -> String {
	match rank {
		RANK_NORMAL => "NORMAL".to_string(),
		RANK_HIGH => "HIGH".to_string(),
		RANK_HIGHEST => "HIGHEST".to_string(),
		other => other.to_string(),
	}
}

/// Identity of a binding within a scope. An absent qualifier is the empty key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingKey {
	pub scope: FqName,
	pub bound_type: FqName,
	pub qualifier_key: String,
}

impl BindingKey {
	pub fn new(scope: &str, bound_type: &str, qualifier_key: &str) -> Self {
		Self {
			scope: FqName::new(scope),
			bound_type: FqName::new(bound_type),
			qualifier_key: qualifier_key.to_string(),
		}
	}
}

impl fmt::Display for BindingKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {}, {:?})", self.scope, self.bound_type, self.qualifier_key)
	}
}

/// A binding as recorded by its generated binding module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContributedBinding {
	pub scope: ClassRef,
	pub bound_type: ClassRef,
	pub origin: ClassRef,
	/// Generated module wrapping the binding.
	pub module: ClassRef,
	pub is_multibinding: bool,
	pub qualifier_key: String,
	pub rank: i32,
}

impl ContributedBinding {
	pub fn key(&self) -> BindingKey {
		BindingKey {
			scope: self.scope.name.clone(),
			bound_type: self.bound_type.name.clone(),
			qualifier_key: self.qualifier_key.clone(),
		}
	}
}

type KeyedBindings = IndexMap<BindingKey, Vec<ContributedBinding>, FxBuildHasher>;

/// Surviving bindings: scope, then key, then the ordered survivors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContributedBindings {
	scopes: IndexMap<FqName, KeyedBindings, FxBuildHasher>,
}

impl ContributedBindings {
	/// Groups `bindings` and prunes plain bindings to the single highest rank.
	pub fn resolve(bindings: Vec<ContributedBinding>) -> Result<Self, MergeError> {
		let mut grouped: IndexMap<FqName, KeyedBindings, FxBuildHasher> = IndexMap::default();
		for binding in bindings {
			grouped
				.entry(binding.scope.name.clone())
				.or_default()
				.entry(binding.key())
				.or_default()
				.push(binding);
		}

		for keyed in grouped.values_mut() {
			for (key, group) in keyed.iter_mut() {
				resolve_group(key, group)?;
			}
		}

		Ok(Self { scopes: grouped })
	}

	pub fn get(&self, key: &BindingKey) -> Option<&[ContributedBinding]> {
		self.scopes.get(&key.scope)?.get(key).map(Vec::as_slice)
	}

	pub fn scopes(&self) -> impl Iterator<Item = &FqName> {
		self.scopes.keys()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&BindingKey, &[ContributedBinding])> {
		self.scopes.values().flat_map(|keyed| keyed.iter().map(|(key, group)| (key, group.as_slice())))
	}

	pub fn bindings(&self) -> impl Iterator<Item = &ContributedBinding> {
		self.iter().flat_map(|(_, group)| group.iter())
	}

	/// Generated modules of every surviving binding, in discovery order.
	pub fn modules(&self) -> Vec<ClassRef> {
		self.bindings().map(|binding| binding.module.clone()).collect()
	}

	pub fn len(&self) -> usize {
		self.bindings().count()
	}

	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}
}

impl TryFrom<Vec<ContributedBinding>> for ContributedBindings {
	type Error = MergeError;

	fn try_from(bindings: Vec<ContributedBinding>) -> Result<Self, MergeError> {
		Self::resolve(bindings)
	}
}

fn resolve_group(key: &BindingKey, group: &mut Vec<ContributedBinding>) -> Result<(), MergeError> {
	if group.len() < 2 {
		return Ok(());
	}
	let plain: Vec<&ContributedBinding> = group.iter().filter(|b| !b.is_multibinding).collect();
	if plain.len() < 2 {
		return Ok(());
	}

	let Some(top_rank) = plain.iter().map(|b| b.rank).max() else {
		return Ok(());
	};
	let mut winners: Vec<&ContributedBinding> = Vec::new();
	for binding in plain.iter().filter(|b| b.rank == top_rank) {
		if !winners.iter().any(|w| w.origin == binding.origin) {
			winners.push(binding);
		}
	}

	if winners.len() > 1 {
		winners.sort_by(|a, b| a.origin.name.cmp(&b.origin.name));
		let origins: Vec<FqName> = winners.iter().map(|b| b.origin.name.clone()).collect();
		let site = Site::of(&winners[0].origin).with_related(origins[1..].iter().cloned());
		return Err(MergeErrorKind::AmbiguousBinding {
			bound_type: key.bound_type.clone(),
			rank: top_rank,
			origins,
		}
		.at(site));
	}

	let winner = winners[0].module.clone();
	let dropped: Vec<&str> = plain
		.iter()
		.filter(|b| b.module != winner)
		.map(|b| b.origin.name.as_str())
		.collect();
	if !dropped.is_empty() {
		debug!(%key, winner = %winner, ?dropped, "dropped lower-ranked bindings");
	}

	let mut kept_winner = false;
	group.retain(|b| {
		if b.is_multibinding {
			return true;
		}
		if b.module == winner && !kept_winner {
			kept_winner = true;
			return true;
		}
		false
	});
	Ok(())
}
