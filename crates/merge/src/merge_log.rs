//! Merge log.
//!
//! A JSON record of what every merge point received. Hosts with incremental compilation read it
//! to notice structural changes the backend made invisibly; it is always written when the host
//! declares [`crate::config::Capabilities::ir_only`].

use std::path::{Path, PathBuf};

use graft_symbols::FqName;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::merge_point::MergeKind;
use crate::resolver::MergeResult;

#[derive(Debug, thiserror::Error)]
pub enum MergeLogError {
	#[error("failed to write merge log {}: {source}", path.display())]
	Write { path: PathBuf, source: std::io::Error },
	#[error("failed to encode merge log: {0}")]
	Encode(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeLogEntry {
	pub merge_point: FqName,
	pub kind: MergeKind,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub modules: Vec<FqName>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub interfaces: Vec<FqName>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeLog {
	pub entries: Vec<MergeLogEntry>,
}

impl MergeLog {
	/// Entries sorted by merge point, so the log is stable across passes.
	pub fn from_results<'r>(results: impl IntoIterator<Item = &'r MergeResult>) -> Self {
		let mut entries: Vec<MergeLogEntry> = results
			.into_iter()
			.map(|result| MergeLogEntry {
				merge_point: result.merge_point.clone(),
				kind: result.kind,
				modules: result.modules.iter().map(|m| m.name.clone()).collect(),
				interfaces: result.supertypes.iter().map(|s| s.name.clone()).collect(),
			})
			.collect();
		entries.sort_by(|a, b| a.merge_point.cmp(&b.merge_point));
		Self { entries }
	}

	pub fn to_json(&self) -> Result<String, MergeLogError> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	pub fn write(&self, path: &Path) -> Result<(), MergeLogError> {
		let json = self.to_json()?;
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent).map_err(|source| MergeLogError::Write {
				path: path.to_path_buf(),
				source,
			})?;
		}
		std::fs::write(path, json).map_err(|source| MergeLogError::Write {
			path: path.to_path_buf(),
			source,
		})?;
		info!(path = %path.display(), entries = self.entries.len(), "wrote merge log");
		Ok(())
	}
}
