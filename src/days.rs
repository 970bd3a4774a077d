//! # Day Buckets
//!
//! Per-day, per-model token tallies and the merge arithmetic used to add and
//! retract one log file's contribution to the global day map.
//!
//! A tally is a fixed 5-slot vector `[input, cache_read, cache_create,
//! output, cost_nanos]`. Cost is kept in nanodollars so repeated incremental
//! merges never drift.

use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NANOS_PER_USD: f64 = 1e9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally(pub [u64; 5]);

impl Tally {
    pub const ZERO: Tally = Tally([0; 5]);

    pub fn new(input: u64, cache_read: u64, cache_create: u64, output: u64, cost_nanos: u64) -> Self {
        Tally([input, cache_read, cache_create, output, cost_nanos])
    }

    pub fn input(&self) -> u64 {
        self.0[0]
    }

    pub fn cache_read(&self) -> u64 {
        self.0[1]
    }

    pub fn cache_create(&self) -> u64 {
        self.0[2]
    }

    pub fn output(&self) -> u64 {
        self.0[3]
    }

    pub fn cost_nanos(&self) -> u64 {
        self.0[4]
    }

    /// All four token components; cost is not a token.
    pub fn tokens(&self) -> u64 {
        self.0[..4].iter().fold(0u64, |acc, n| acc.saturating_add(*n))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|n| *n == 0)
    }

    /// Component-wise combine. Subtraction clamps every slot at zero.
    pub fn merged(&self, other: &Tally, sign: MergeSign) -> Tally {
        let mut out = [0u64; 5];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = match sign {
                MergeSign::Add => self.0[k].saturating_add(other.0[k]),
                MergeSign::Subtract => self.0[k].saturating_sub(other.0[k]),
            };
        }
        Tally(out)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeSign {
    Add,
    Subtract,
}

/// `day_key -> normalized model -> tally`.
///
/// Never holds an all-zero tally or an empty day.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayMap(BTreeMap<String, BTreeMap<String, Tally>>);

impl DayMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of day buckets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn day(&self, day_key: &str) -> Option<&BTreeMap<String, Tally>> {
        self.0.get(day_key)
    }

    pub fn get(&self, day_key: &str, model: &str) -> Option<&Tally> {
        self.0.get(day_key).and_then(|models| models.get(model))
    }

    pub fn day_keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Accumulate one entry's tally into its `(day, model)` slot.
    pub fn accumulate(&mut self, day_key: &str, model: &str, tally: Tally) {
        if tally.is_zero() {
            return;
        }
        let slot = self
            .0
            .entry(day_key.to_string())
            .or_default()
            .entry(model.to_string())
            .or_default();
        *slot = slot.merged(&tally, MergeSign::Add);
    }

    /// Add or retract another map (one file's contribution) slot by slot.
    pub fn apply(&mut self, delta: &DayMap, sign: MergeSign) {
        for (day, delta_models) in &delta.0 {
            let mut models = self.0.remove(day).unwrap_or_default();
            for (model, incoming) in delta_models {
                let current = models.get(model).copied().unwrap_or(Tally::ZERO);
                let merged = current.merged(incoming, sign);
                if merged.is_zero() {
                    models.remove(model);
                } else {
                    models.insert(model.clone(), merged);
                }
            }
            if !models.is_empty() {
                self.0.insert(day.clone(), models);
            }
        }
    }

    /// Drop every day bucket strictly older than `cutoff_key`.
    pub fn prune_before(&mut self, cutoff_key: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|day, _| day.as_str() >= cutoff_key);
        before - self.0.len()
    }
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Calendar day of `now` in the scanning process's local timezone.
pub fn local_today(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}

/// Key of the local day `days_ago` days before `today`.
pub fn day_key_offset(today: NaiveDate, days_ago: u64) -> Option<String> {
    today.checked_sub_days(Days::new(days_ago)).map(day_key)
}

pub fn parse_timestamp(ts: &str) -> Option<DateTime<Local>> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Local));
    }
    // Zone-less timestamps are local wall-clock time
    if let Ok(naive) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        return Local.from_local_datetime(&naive).earliest();
    }
    // Date-only strings are UTC midnight
    if let Ok(date) = NaiveDate::parse_from_str(ts, "%Y-%m-%d") {
        let utc = date.and_hms_opt(0, 0, 0)?.and_utc();
        return Some(utc.with_timezone(&Local));
    }
    None
}

pub fn day_key_from_timestamp(ts: &str) -> Option<String> {
    parse_timestamp(ts).map(|dt| day_key(dt.date_naive()))
}
