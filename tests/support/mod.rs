#![allow(dead_code)]

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use usage_ledger::host::{FileStat, FileSystem};

/// In-memory file system. Log files are listed by `glob` with a size and
/// mtime that tests can set independently of their content.
#[derive(Default)]
pub struct MemoryFs {
    contents: RefCell<HashMap<PathBuf, String>>,
    listed: RefCell<BTreeMap<PathBuf, (u64, i64)>>,
    failing_roots: RefCell<HashSet<PathBuf>>,
    unreadable: RefCell<HashSet<PathBuf>>,
    pub glob_calls: Cell<usize>,
    pub reads: RefCell<Vec<PathBuf>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a log file; its listed size follows the content.
    pub fn put_log(&self, path: &str, content: &str, mtime_ms: i64) {
        let path = PathBuf::from(path);
        self.listed
            .borrow_mut()
            .insert(path.clone(), (content.len() as u64, mtime_ms));
        self.contents.borrow_mut().insert(path, content.to_string());
    }

    /// Change what `glob` reports without touching the content.
    pub fn set_stat(&self, path: &str, size: u64, mtime_ms: i64) {
        self.listed
            .borrow_mut()
            .insert(PathBuf::from(path), (size, mtime_ms));
    }

    /// A plain file that `glob` never lists (cache, credentials).
    pub fn put_file(&self, path: &str, content: &str) {
        self.contents
            .borrow_mut()
            .insert(PathBuf::from(path), content.to_string());
    }

    pub fn remove(&self, path: &str) {
        let path = PathBuf::from(path);
        self.listed.borrow_mut().remove(&path);
        self.contents.borrow_mut().remove(&path);
    }

    pub fn fail_glob(&self, root: &str) {
        self.failing_roots.borrow_mut().insert(PathBuf::from(root));
    }

    pub fn make_unreadable(&self, path: &str) {
        self.unreadable.borrow_mut().insert(PathBuf::from(path));
    }

    pub fn make_readable(&self, path: &str) {
        self.unreadable.borrow_mut().remove(Path::new(path));
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.contents.borrow().get(Path::new(path)).cloned()
    }

    pub fn reads_of(&self, path: &str) -> usize {
        self.reads
            .borrow()
            .iter()
            .filter(|p| p.as_path() == Path::new(path))
            .count()
    }
}

impl FileSystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.contents.borrow().contains_key(path)
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        self.reads.borrow_mut().push(path.to_path_buf());
        if self.unreadable.borrow().contains(path) {
            return Err(anyhow!("EACCES: {}", path.display()));
        }
        self.contents
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("ENOENT: {}", path.display()))
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        self.contents
            .borrow_mut()
            .insert(path.to_path_buf(), text.to_string());
        Ok(())
    }

    fn glob(&self, root: &Path, extension: &str) -> Result<Vec<FileStat>> {
        self.glob_calls.set(self.glob_calls.get() + 1);
        if self.failing_roots.borrow().contains(root) {
            return Err(anyhow!("permission denied: {}", root.display()));
        }
        Ok(self
            .listed
            .borrow()
            .iter()
            .filter(|(path, _)| path.starts_with(root))
            .filter(|(path, _)| path.extension().and_then(|e| e.to_str()) == Some(extension))
            .map(|(path, (size, mtime_ms))| FileStat {
                path: path.clone(),
                size: *size,
                mtime_ms: *mtime_ms,
            })
            .collect())
    }
}

pub fn ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// One assistant record as Claude Code writes it.
pub fn assistant_line(
    timestamp: &str,
    msg_id: Option<&str>,
    req_id: Option<&str>,
    model: &str,
    input: u64,
    output: u64,
) -> String {
    let mut obj = serde_json::json!({
        "type": "assistant",
        "timestamp": timestamp,
        "message": {
            "model": model,
            "usage": {
                "input_tokens": input,
                "output_tokens": output,
                "cache_read_input_tokens": 0,
                "cache_creation_input_tokens": 0
            }
        }
    });
    if let Some(m) = msg_id {
        obj["message"]["id"] = m.into();
    }
    if let Some(r) = req_id {
        obj["requestId"] = r.into();
    }
    serde_json::to_string(&obj).unwrap()
}

pub fn jsonl(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
