use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "graft")]
#[command(about = "Merges contributed modules, bindings and interfaces into their components")]
#[command(version)]
pub struct Cli {
	/// Symbol table snapshot (JSON) describing every visible declaration
	#[arg(value_name = "SYMBOLS")]
	pub symbols: PathBuf,

	/// Engine configuration; defaults apply when the file does not exist
	#[arg(long, short = 'c', value_name = "PATH", default_value = graft_merge::config::CONFIG_FILE_NAME)]
	pub config: PathBuf,

	/// Write the amended snapshot, including generated declarations
	#[arg(long, short = 'o', value_name = "PATH")]
	pub output: Option<PathBuf>,

	/// Write the amendments for the emitter
	#[arg(long, value_name = "PATH")]
	pub amendments: Option<PathBuf>,

	/// Write the merge log here, enabling it regardless of the configuration
	#[arg(long, value_name = "PATH")]
	pub merge_log: Option<PathBuf>,

	/// Skip merge resolution; hints and binding modules are still generated
	#[arg(long)]
	pub disable_merging: bool,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}
