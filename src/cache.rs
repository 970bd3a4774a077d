//! # Cache Module
//!
//! Persistent, incremental token ledger. The cache remembers, per log file,
//! the size and mtime it had when scanned and the day-map contribution it
//! produced; the global `days` map is the running sum of those contributions.
//! A pass re-reads only new or modified files and retracts the contribution
//! of files that vanished or grew past the size limit.
//!
//! Nothing here fails the caller: unreadable roots, unreadable files and a
//! corrupt cache file are logged and worked around.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::days::{DayMap, MergeSign, day_key_offset, local_today};
use crate::host::{Clock, FileStat, FileSystem};
use crate::scanner::scan_file;

/// Bump when the persisted layout or the aggregation rules change.
/// A cache carrying another version is discarded and rebuilt.
pub const CACHE_VERSION: u64 = 1;

pub const CACHE_FILE_NAME: &str = "token-cache.json";

/// Files above this size are never scanned.
pub const MAX_FILE_BYTES: u64 = 100 * 1024 * 1024;

/// Minimum time between two full passes over the log roots.
pub const MIN_SCAN_INTERVAL_MS: i64 = 60 * 1000;

/// Day buckets older than this many days before today are pruned.
pub const RETENTION_DAYS: u64 = 31;

const LOG_EXTENSION: &str = "jsonl";

/// What one file contributed when it was last scanned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileScanRecord {
    pub size: u64,
    pub mtime_ms: i64,
    #[serde(default)]
    pub days: DayMap,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentCache {
    pub version: u64,
    #[serde(default)]
    pub last_scan_ms: i64,
    #[serde(default)]
    pub files: BTreeMap<String, FileScanRecord>,
    #[serde(default)]
    pub days: DayMap,
}

impl Default for PersistentCache {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            last_scan_ms: 0,
            files: BTreeMap::new(),
            days: DayMap::new(),
        }
    }
}

impl PersistentCache {
    /// Parse a persisted cache. Corrupt JSON, a foreign version or a
    /// malformed body all yield `None`.
    pub fn from_json(text: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(text).ok()?;
        if value.get("version").and_then(Value::as_u64) != Some(CACHE_VERSION) {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("serialize token cache")
    }
}

/// Counters for one pass, logged at debug level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub discovered: usize,
    pub cache_hits: usize,
    pub scanned: usize,
    pub failed: usize,
    pub oversized: usize,
    pub removed: usize,
    pub pruned_days: usize,
}

#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Log roots in precedence order.
    pub roots: Vec<PathBuf>,
    pub cache_path: PathBuf,
    pub max_file_bytes: u64,
    pub min_scan_interval_ms: i64,
    pub retention_days: u64,
}

impl LedgerConfig {
    pub fn new(roots: Vec<PathBuf>, cache_path: PathBuf) -> Self {
        Self {
            roots,
            cache_path,
            max_file_bytes: MAX_FILE_BYTES,
            min_scan_interval_ms: MIN_SCAN_INTERVAL_MS,
            retention_days: RETENTION_DAYS,
        }
    }
}

pub struct TokenLedger<'a> {
    fs: &'a dyn FileSystem,
    clock: &'a dyn Clock,
    config: LedgerConfig,
}

impl<'a> TokenLedger<'a> {
    pub fn new(fs: &'a dyn FileSystem, clock: &'a dyn Clock, config: LedgerConfig) -> Self {
        Self { fs, clock, config }
    }

    /// Load the persisted cache, or a fresh one when it is missing,
    /// unreadable, corrupt or from another version.
    pub fn load_cache(&self) -> PersistentCache {
        let path = &self.config.cache_path;
        if !self.fs.exists(path) {
            return PersistentCache::default();
        }
        match self.fs.read_text(path) {
            Ok(text) => PersistentCache::from_json(&text).unwrap_or_else(|| {
                log::info!("token cache at {} discarded (corrupt or old version)", path.display());
                PersistentCache::default()
            }),
            Err(e) => {
                log::warn!("token cache load failed: {e:#}");
                PersistentCache::default()
            }
        }
    }

    pub fn save_cache(&self, cache: &PersistentCache) {
        let result = cache
            .to_json()
            .and_then(|text| self.fs.write_text(&self.config.cache_path, &text));
        if let Err(e) = result {
            log::warn!("token cache save failed: {e:#}");
        }
    }

    /// Current day map, refreshed from disk unless the last pass was less
    /// than the minimum interval ago.
    pub fn scan(&self) -> DayMap {
        self.scan_with(false)
    }

    /// Like [`scan`](Self::scan) but ignores the interval throttle.
    pub fn force_scan(&self) -> DayMap {
        self.scan_with(true)
    }

    fn scan_with(&self, force: bool) -> DayMap {
        let mut cache = self.load_cache();
        let now_ms = self.clock.now().timestamp_millis();

        if !force && self.is_throttled(&cache, now_ms) {
            log::debug!("token scan throttled, last pass at {}", cache.last_scan_ms);
            return cache.days;
        }

        let stats = self.refresh(&mut cache);
        log::debug!("token scan: {stats:?}");

        cache.last_scan_ms = now_ms;
        self.save_cache(&cache);
        cache.days
    }

    // A last-scan stamp in the future (clock moved back) never throttles.
    fn is_throttled(&self, cache: &PersistentCache, now_ms: i64) -> bool {
        if cache.last_scan_ms <= 0 {
            return false;
        }
        let elapsed = now_ms - cache.last_scan_ms;
        (0..self.config.min_scan_interval_ms).contains(&elapsed)
    }

    /// Enumerate every root. A root that cannot be listed contributes no
    /// files; the same path reached from two roots is kept once.
    pub fn discover_files(&self) -> Vec<FileStat> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut files = Vec::new();
        for root in &self.config.roots {
            match self.fs.glob(root, LOG_EXTENSION) {
                Ok(found) => {
                    for file in found {
                        if seen.insert(file.path.clone()) {
                            files.push(file);
                        }
                    }
                }
                Err(e) => log::warn!("glob failed for {}: {e:#}", root.display()),
            }
        }
        files
    }

    /// One incremental pass over the log roots, applied to `cache` in place.
    /// Does not touch `last_scan_ms` and does not persist.
    pub fn refresh(&self, cache: &mut PersistentCache) -> ScanStats {
        let mut stats = ScanStats::default();
        let files = self.discover_files();
        stats.discovered = files.len();

        let mut touched: HashSet<String> = HashSet::with_capacity(files.len());
        for file in &files {
            let key = path_key(&file.path);
            touched.insert(key.clone());

            if file.size > self.config.max_file_bytes {
                if let Some(old) = cache.files.remove(&key) {
                    cache.days.apply(&old.days, MergeSign::Subtract);
                    log::debug!("retracted oversized {}", file.path.display());
                }
                stats.oversized += 1;
                continue;
            }

            if let Some(old) = cache.files.get(&key) {
                if old.size == file.size && old.mtime_ms == file.mtime_ms {
                    stats.cache_hits += 1;
                    continue;
                }
            }

            // Old contribution stays in place until the new one is in hand,
            // so a failed read leaves the file as it was.
            match scan_file(self.fs, &file.path) {
                Ok(days) => {
                    if let Some(old) = cache.files.get(&key) {
                        cache.days.apply(&old.days, MergeSign::Subtract);
                    }
                    cache.days.apply(&days, MergeSign::Add);
                    cache.files.insert(
                        key,
                        FileScanRecord {
                            size: file.size,
                            mtime_ms: file.mtime_ms,
                            days,
                        },
                    );
                    stats.scanned += 1;
                }
                Err(e) => {
                    log::warn!("scan failed for {}: {e:#}", file.path.display());
                    stats.failed += 1;
                }
            }
        }

        let gone: Vec<String> = cache
            .files
            .keys()
            .filter(|path| !touched.contains(*path))
            .cloned()
            .collect();
        for path in gone {
            if let Some(old) = cache.files.remove(&path) {
                cache.days.apply(&old.days, MergeSign::Subtract);
                stats.removed += 1;
            }
        }

        let today = local_today(self.clock.now());
        if let Some(cutoff) = day_key_offset(today, self.config.retention_days) {
            stats.pruned_days = cache.days.prune_before(&cutoff);
        }
        stats
    }
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
