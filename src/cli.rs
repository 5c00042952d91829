//! CLI argument parsing via clap.

use clap::Parser;

/// Organize a directory with an AI-proposed plan you approve first.
#[derive(Debug, Parser)]
#[command(name = "tidy", version, after_help = tidy::build_info::HELP_BUILD_METADATA)]
pub struct Args {
    /// Directory to organize (overrides DEFAULT_TARGET_DIR).
    #[arg(short = 'd', long = "target-dir", value_name = "DIR")]
    pub target_dir: Option<String>,

    /// Outermost directory the target must live under (overrides TOP_LEVEL_ALLOWED_PATH).
    #[arg(long = "allowed-root", value_name = "DIR")]
    pub allowed_root: Option<String>,

    /// Override the Gemini model name.
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// How you'd like the files organized; skips the interactive question.
    #[arg(short = 'c', long = "context")]
    pub context: Option<String>,

    /// Echo raw model responses and enable debug logging.
    #[arg(long = "debug")]
    pub debug: bool,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}
