//! # Scanner Module
//!
//! Turns the text of one append-only session log into that file's day-map
//! contribution.
//!
//! Streaming responses log several partial records for the same request; the
//! records sharing a `messageId:requestId` key collapse to the one with the
//! largest output count. Records missing either id are always kept.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::days::{DayMap, Tally, day_key_from_timestamp};
use crate::host::FileSystem;
use crate::models::{TranscriptLine, UsageEntry};
use crate::pricing::{UNKNOWN_MODEL, cost_nanos, normalize_model};

const ASSISTANT_MARKER: &str = r#""type":"assistant""#;
const USAGE_MARKER: &str = r#""usage""#;

/// Cheap substring check run before any JSON parsing.
fn is_candidate(line: &str) -> bool {
    line.contains(ASSISTANT_MARKER) && line.contains(USAGE_MARKER)
}

/// Parse one log line into a usage entry. Anything malformed, non-assistant,
/// undated or with all-zero usage yields `None`.
pub fn parse_usage_line(line: &str) -> Option<UsageEntry> {
    if line.is_empty() || !is_candidate(line) {
        return None;
    }
    let parsed: TranscriptLine = serde_json::from_str(line).ok()?;
    if parsed.r#type.as_deref() != Some("assistant") {
        return None;
    }
    let message = parsed.message?;
    let usage = message.usage?;
    let day_key = day_key_from_timestamp(parsed.timestamp.as_deref()?)?;
    if usage.is_empty() {
        return None;
    }
    let dedup_key = match (message.id.as_deref(), parsed.request_id.as_deref()) {
        (Some(mid), Some(rid)) => Some(format!("{mid}:{rid}")),
        _ => None,
    };
    Some(UsageEntry {
        day_key,
        model: message.model.unwrap_or_else(|| UNKNOWN_MODEL.to_string()),
        input: usage.input_tokens,
        cache_read: usage.cache_read_input_tokens,
        cache_create: usage.cache_creation_input_tokens,
        output: usage.output_tokens,
        dedup_key,
    })
}

/// Collapse streamed duplicates: one entry per dedup key (max output wins),
/// every key-less entry kept as is.
pub fn dedupe_entries<I>(entries: I) -> Vec<UsageEntry>
where
    I: IntoIterator<Item = UsageEntry>,
{
    let mut by_request: HashMap<String, UsageEntry> = HashMap::new();
    let mut unkeyed = Vec::new();
    for entry in entries {
        match entry.dedup_key.clone() {
            Some(key) => {
                let replace = by_request
                    .get(&key)
                    .map(|existing| entry.output > existing.output)
                    .unwrap_or(true);
                if replace {
                    by_request.insert(key, entry);
                }
            }
            None => unkeyed.push(entry),
        }
    }
    by_request.into_values().chain(unkeyed).collect()
}

fn accumulate_entry(days: &mut DayMap, entry: &UsageEntry) {
    let model = normalize_model(&entry.model);
    let cost = cost_nanos(
        &model,
        entry.input,
        entry.cache_read,
        entry.cache_create,
        entry.output,
    )
    .unwrap_or(0);
    days.accumulate(
        &entry.day_key,
        &model,
        Tally::new(entry.input, entry.cache_read, entry.cache_create, entry.output, cost),
    );
}

/// Day-map contribution of one log file's full text.
pub fn scan_text(text: &str) -> DayMap {
    let entries = dedupe_entries(text.lines().filter_map(|line| parse_usage_line(line.trim())));
    let mut days = DayMap::new();
    for entry in &entries {
        accumulate_entry(&mut days, entry);
    }
    days
}

pub fn scan_file(fs: &dyn FileSystem, path: &Path) -> Result<DayMap> {
    let text = fs
        .read_text(path)
        .with_context(|| format!("read {}", path.display()))?;
    Ok(scan_text(&text))
}
