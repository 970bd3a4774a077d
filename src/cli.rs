use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
pub struct Args {
    /// Claude data path whose `projects/` subdirectory is scanned first.
    /// Defaults to ~/.claude and ~/.config/claude
    #[arg(long, env = "CLAUDE_CONFIG_DIR")]
    pub claude_config_dir: Option<String>,

    /// Directory for the persisted token cache
    #[arg(long, env = "USAGE_LEDGER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Rescan log files even if the last scan was under a minute ago
    #[arg(long)]
    pub force: bool,

    /// Emit JSON instead of colored text
    #[arg(long)]
    pub json: bool,

    /// Debug mode: log cache and scan decisions to stderr
    #[arg(long, env = "CLAUDE_DEBUG")]
    pub debug: bool,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }
}
