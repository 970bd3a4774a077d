use anyhow::Result;

use usage_ledger::cli::Args;
use usage_ledger::display::{print_json_output, print_text_output};
use usage_ledger::host::{StdFileSystem, SystemClock};
use usage_ledger::probe::{ProbeContext, ProbeSettings, plugin};
use usage_ledger::utils::{default_data_dir, home_dir};

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let home = home_dir();
    let data_dir = args.data_dir.clone().unwrap_or_else(|| default_data_dir(&home));
    let fs = StdFileSystem;
    let clock = SystemClock;
    let ctx = ProbeContext {
        fs: &fs,
        clock: &clock,
        settings: ProbeSettings {
            config_dir: args.claude_config_dir.clone(),
            home,
            data_dir,
            force: args.force,
        },
    };

    let registration = plugin();
    log::debug!("probing plugin {}", registration.id);
    let output = (registration.probe)(&ctx)?;

    if args.json {
        print_json_output(registration.id, &output)?;
    } else {
        print_text_output(registration.id, &output);
    }
    Ok(())
}
