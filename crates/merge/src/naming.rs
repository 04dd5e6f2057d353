//! Names of generated declarations.

use std::hash::Hasher;
use std::path::PathBuf;

use graft_symbols::{FqName, Provenance};
use rustc_hash::FxHasher;

/// Longest simple name whose class file, plus the longest extension and DI suffix, still fits a
/// 255-byte file name.
pub const MAX_FILE_NAME_LENGTH: usize = 255 - 14 - 8;

const HASH_LENGTH: usize = 8;

/// Stable hash of `salt`, as eight hex digits.
pub fn stable_hash(salt: &str) -> String {
	let mut hasher = FxHasher::default();
	hasher.write(salt.as_bytes());
	format!("{:08x}", hasher.finish() as u32)
}

fn prefix_within(value: &str, max_bytes: usize) -> &str {
	let mut end = 0;
	for (index, c) in value.char_indices() {
		if index + c.len_utf8() > max_bytes {
			break;
		}
		end = index + c.len_utf8();
	}
	&value[..end]
}

/// Joins simple names with `_` and appends `suffix`.
///
/// Names longer than [`MAX_FILE_NAME_LENGTH`] are truncated and disambiguated with a hash of
/// `salt`, so distinct long inputs stay distinct.
pub fn join_simple_names<'a>(simple_names: impl IntoIterator<Item = &'a str>, suffix: &str, salt: &str) -> String {
	let joined = simple_names.into_iter().collect::<Vec<_>>().join("_");
	if joined.len() + suffix.len() <= MAX_FILE_NAME_LENGTH {
		return format!("{joined}{suffix}");
	}
	let keep = MAX_FILE_NAME_LENGTH.saturating_sub(suffix.len() + HASH_LENGTH + 1);
	format!("{}_{}{suffix}", prefix_within(&joined, keep), stable_hash(salt))
}

/// Provenance attached to generated declarations.
pub fn generated_provenance(name: &FqName) -> Provenance {
	let mut path = PathBuf::from("graft-generated");
	for segment in name.segments() {
		path.push(segment);
	}
	path.set_extension("kt");
	Provenance::Source { path }
}
