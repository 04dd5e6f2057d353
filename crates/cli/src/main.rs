//! Graft command line driver.
//!
//! Loads a symbol table snapshot and a `graft.toml`, runs the multi-pass compilation and writes
//! whatever the host asked for: the amended snapshot, the amendments and the merge log.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use graft_merge::{Compilation, CompilationOutput, MergeConfig};
use graft_symbols::MemorySymbolTable;
use tracing::info;

mod cli;

use cli::Cli;

/// Merge log location when neither the flag nor the configuration names one.
const DEFAULT_MERGE_LOG: &str = "build/graft/merge-log.json";

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("graft_merge=debug,graft_index=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(true))
		.init();
}

/// Effective configuration: the file, overridden by command-line switches.
fn load_config(cli: &Cli) -> anyhow::Result<MergeConfig> {
	let mut config = MergeConfig::load(&cli.config)?;
	if cli.disable_merging {
		config.disable_merging = true;
	}
	if let Some(path) = &cli.merge_log {
		config.track_merge_log = true;
		config.merge_log_path = Some(path.clone());
	}
	Ok(config)
}

fn load_symbols(path: &Path) -> anyhow::Result<MemorySymbolTable> {
	let json = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
	MemorySymbolTable::from_json(&json).with_context(|| format!("invalid symbol snapshot {}", path.display()))
}

fn write(path: &Path, contents: String) -> anyhow::Result<()> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
	}
	fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// One line per resolved merge point.
fn summary(output: &CompilationOutput) -> Vec<String> {
	output
		.results
		.values()
		.map(|result| {
			format!(
				"{} ({}): {} interfaces, {} modules, {} bindings",
				result.merge_point,
				result.kind,
				result.supertypes.len(),
				result.modules.len(),
				result.bindings.len()
			)
		})
		.collect()
}

fn run(cli: &Cli) -> anyhow::Result<CompilationOutput> {
	let config = load_config(cli)?;
	let table = load_symbols(&cli.symbols)?;
	info!(symbols = %cli.symbols.display(), declarations = table.len(), "loaded snapshot");

	let output = Compilation::new(table, config.clone())?.run()?;

	if config.writes_merge_log() {
		let path = config.merge_log_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_MERGE_LOG));
		output.merge_log().write(&path)?;
	}
	if let Some(path) = &cli.amendments {
		write(path, serde_json::to_string_pretty(&output.amendments)?)?;
	}
	if let Some(path) = &cli.output {
		write(path, output.table.to_json()?)?;
	}
	Ok(output)
}

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let output = run(&cli)?;
	for line in summary(&output) {
		println!("{line}");
	}
	Ok(())
}
