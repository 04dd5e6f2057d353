//! Engine configuration.
//!
//! Loaded from `graft.toml`; every key is optional.
//!
//! ```toml
//! disable_merging = false
//! generate_factories = true
//! allowed_paths = ["src/main/**"]
//! max_passes = 10
//! track_merge_log = true
//! merge_log_path = "build/graft/merge-log.json"
//!
//! [capabilities]
//! ir_only = false
//! ```

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use graft_symbols::ClassDecl;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_PASSES: u32 = 10;
pub const CONFIG_FILE_NAME: &str = "graft.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", path.display())]
	Read { path: PathBuf, source: std::io::Error },
	#[error("failed to parse {}: {source}", path.display())]
	Parse { path: PathBuf, source: toml::de::Error },
	#[error("invalid allowed_paths pattern: {0}")]
	Glob(#[from] globset::Error),
	#[error("max_passes must be at least 1")]
	InvalidMaxPasses,
}

/// Optional host features, declared by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Capabilities {
	/// Merging happens in a backend whose structural changes incremental compilation cannot
	/// observe. Forces the merge log on.
	pub ir_only: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
	/// Skip merge resolution. Hint markers and binding modules are still generated.
	pub disable_merging: bool,
	/// Forwarded to the emitter with each amendment.
	pub generate_factories: bool,
	/// Only emit factories: no hints, no binding modules, no merging.
	pub generate_factories_only: bool,
	/// Globs restricting which source files get hints and binding modules. Empty allows all.
	pub allowed_paths: Vec<String>,
	pub max_passes: u32,
	pub track_merge_log: bool,
	pub merge_log_path: Option<PathBuf>,
	pub capabilities: Capabilities,
}

impl Default for MergeConfig {
	fn default() -> Self {
		Self {
			disable_merging: false,
			generate_factories: false,
			generate_factories_only: false,
			allowed_paths: Vec::new(),
			max_passes: DEFAULT_MAX_PASSES,
			track_merge_log: false,
			merge_log_path: None,
			capabilities: Capabilities::default(),
		}
	}
}

impl MergeConfig {
	/// Loads `path`, falling back to defaults when the file does not exist.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let content = match std::fs::read_to_string(path) {
			Ok(content) => content,
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
			Err(source) => {
				return Err(ConfigError::Read {
					path: path.to_path_buf(),
					source,
				});
			}
		};
		Self::parse(&content).map_err(|error| match error {
			ConfigError::Parse { source, .. } => ConfigError::Parse {
				path: path.to_path_buf(),
				source,
			},
			other => other,
		})
	}

	pub fn parse(content: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
			path: PathBuf::from(CONFIG_FILE_NAME),
			source,
		})?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_passes == 0 {
			return Err(ConfigError::InvalidMaxPasses);
		}
		self.path_filter()?;
		Ok(())
	}

	pub fn path_filter(&self) -> Result<PathFilter, ConfigError> {
		PathFilter::new(&self.allowed_paths)
	}

	/// Whether the merge log must be written.
	pub fn writes_merge_log(&self) -> bool {
		self.track_merge_log || self.capabilities.ir_only
	}
}

/// Compiled form of [`MergeConfig::allowed_paths`].
#[derive(Clone, Debug)]
pub struct PathFilter {
	globs: Option<GlobSet>,
}

impl PathFilter {
	pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
		if patterns.is_empty() {
			return Ok(Self::allow_all());
		}
		let mut builder = GlobSetBuilder::new();
		for pattern in patterns {
			builder.add(Glob::new(pattern)?);
		}
		Ok(Self {
			globs: Some(builder.build()?),
		})
	}

	pub fn allow_all() -> Self {
		Self { globs: None }
	}

	/// Compiled declarations are never generated for; sources must match a pattern.
	pub fn allows(&self, class: &ClassDecl) -> bool {
		let Some(path) = class.provenance.source_path() else {
			return false;
		};
		match &self.globs {
			None => true,
			Some(globs) => globs.is_match(path),
		}
	}
}
