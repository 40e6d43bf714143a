//! CLI commands

mod deploy;
pub mod install;
pub mod uninstall;

use clap::Args;
use heoctl_core::MANIFEST_FILE;
use heoctl_kube::{DEFAULT_CALL_TIMEOUT, DEFAULT_CONCURRENCY};
use std::path::PathBuf;

use crate::display::OutputFormat;

/// Arguments shared by `install` and `uninstall`
#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// Extension name (a directory under the extensions directory)
    pub extension: String,

    /// Inputs as comma-separated key=value pairs
    #[arg(short, long, default_value = "")]
    pub input: String,

    /// Manifest file inside the extension
    #[arg(short, long, default_value = MANIFEST_FILE)]
    pub manifest: String,

    /// Directory holding extensions
    #[arg(long, env = "HEOCTL_EXTENSIONS_DIR", default_value = "examples")]
    pub extensions_dir: PathBuf,

    /// Stage a copy of the extension here before running
    #[arg(long, env = "WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Resource files processed in parallel
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Timeout for each cluster call, in seconds (0 disables it)
    #[arg(long, default_value_t = DEFAULT_CALL_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}
