//! # Probe Module
//!
//! The Claude usage probe and its registration. A loader gets a
//! [`PluginRegistration`] value back from [`plugin`]; capabilities reach the
//! probe through an explicit [`ProbeContext`].

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::cache::{CACHE_FILE_NAME, LedgerConfig, TokenLedger};
use crate::credentials::{load_credentials, plan_label};
use crate::days::local_today;
use crate::host::{Clock, FileSystem};
use crate::report::{Line, usage_lines};
use crate::utils::{credential_paths, log_roots};

pub const PLUGIN_ID: &str = "claude";

const STATUS_LABEL: &str = "Status";
const NO_USAGE: &str = "No usage data";

#[derive(Clone, Debug, Default)]
pub struct ProbeSettings {
    /// `CLAUDE_CONFIG_DIR` override, if any.
    pub config_dir: Option<String>,
    pub home: PathBuf,
    /// Application data directory; the plugin keeps its state in a
    /// subdirectory named after its id.
    pub data_dir: PathBuf,
    /// Ignore the rescan interval for this probe.
    pub force: bool,
}

pub struct ProbeContext<'a> {
    pub fs: &'a dyn FileSystem,
    pub clock: &'a dyn Clock,
    pub settings: ProbeSettings,
}

impl ProbeContext<'_> {
    pub fn plugin_data_dir(&self) -> PathBuf {
        self.settings.data_dir.join(PLUGIN_ID)
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig::new(
            log_roots(self.settings.config_dir.as_deref(), &self.settings.home),
            self.plugin_data_dir().join(CACHE_FILE_NAME),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProbeOutput {
    pub plan: Option<String>,
    pub lines: Vec<Line>,
}

impl ProbeOutput {
    pub fn line(&self, label: &str) -> Option<&Line> {
        self.lines.iter().find(|l| l.label == label)
    }
}

pub type ProbeFn = fn(&ProbeContext<'_>) -> Result<ProbeOutput>;

#[derive(Clone, Copy)]
pub struct PluginRegistration {
    pub id: &'static str,
    pub probe: ProbeFn,
}

pub fn plugin() -> PluginRegistration {
    PluginRegistration {
        id: PLUGIN_ID,
        probe,
    }
}

pub fn probe(ctx: &ProbeContext<'_>) -> Result<ProbeOutput> {
    let cred_paths = credential_paths(ctx.settings.config_dir.as_deref(), &ctx.settings.home);
    let plan = load_credentials(ctx.fs, &cred_paths)
        .and_then(|oauth| oauth.subscription_type)
        .and_then(|s| plan_label(&s));

    let ledger = TokenLedger::new(ctx.fs, ctx.clock, ctx.ledger_config());
    let days = if ctx.settings.force {
        ledger.force_scan()
    } else {
        ledger.scan()
    };

    let mut lines = usage_lines(&days, local_today(ctx.clock.now()));
    if lines.is_empty() {
        lines.push(Line {
            label: STATUS_LABEL.to_string(),
            value: NO_USAGE.to_string(),
        });
    }
    Ok(ProbeOutput { plan, lines })
}
