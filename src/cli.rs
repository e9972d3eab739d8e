use std::path::PathBuf;
use clap::Parser;

/// Watches for android devices and runs an init tool against every device that connects.
#[derive(Parser, Debug, Clone, Default)]
#[command(version, about)]
pub struct Args {
    /// Server address forwarded to the init tool as `--server <address>`
    #[arg(long, value_name = "ADDRESS")]
    pub server: Option<String>,

    /// Path to a JSON config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the adb binary, instead of looking in PATH and the android sdk
    #[arg(long, value_name = "FILE")]
    pub adb: Option<PathBuf>,

    /// Directory for the single-instance lock file, instead of the per-user runtime directory
    #[arg(long, value_name = "DIR")]
    pub lock_dir: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long)]
    pub verbose: bool,
}
