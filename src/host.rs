//! # Host Capabilities
//!
//! The narrow surface the ledger needs from its environment: file access and
//! a clock. Production code uses [`StdFileSystem`] and [`SystemClock`]; tests
//! inject in-memory fakes.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::utils::decode_utf8;

/// A file found by [`FileSystem::glob`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub path: PathBuf,
    pub size: u64,
    pub mtime_ms: i64,
}

pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn read_text(&self, path: &Path) -> Result<String>;

    fn write_text(&self, path: &Path, text: &str) -> Result<()>;

    /// Recursively list regular files under `root` with the given extension.
    /// A missing root is an empty listing, not an error.
    fn glob(&self, root: &Path, extension: &str) -> Result<Vec<FileStat>>;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant, for deterministic probes and tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        Ok(decode_utf8(&bytes))
    }

    /// Writes through a sibling temp file and a rename, so readers never see
    /// a half-written document.
    fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, text).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("rename to {}", path.display()))?;
        Ok(())
    }

    fn glob(&self, root: &Path, extension: &str) -> Result<Vec<FileStat>> {
        if !root.exists() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) if e.depth() == 0 => {
                    return Err(e).with_context(|| format!("walk {}", root.display()));
                }
                Err(e) => {
                    log::debug!("skipping unreadable entry under {}: {e}", root.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }
            let meta = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    log::debug!("no metadata for {}: {e}", entry.path().display());
                    continue;
                }
            };
            let mtime_ms = meta
                .modified()
                .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
                .unwrap_or(0);
            out.push(FileStat {
                path: entry.into_path(),
                size: meta.len(),
                mtime_ms,
            });
        }
        Ok(out)
    }
}
