//! # Report Module
//!
//! Rolls the day map up into the "Today" and "Last 30 days" windows shown by
//! the probe. A window with no priced usage reports no cost at all, which is
//! different from a verified $0.00.

use chrono::NaiveDate;
use serde::Serialize;

use crate::days::{DayMap, NANOS_PER_USD, day_key, day_key_offset};
use crate::utils::{format_currency, format_tokens};

pub const TODAY_LABEL: &str = "Today";
pub const LAST_30_DAYS_LABEL: &str = "Last 30 days";
pub const WINDOW_DAYS: u64 = 30;

const SEPARATOR: &str = " \u{b7} ";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UsageTotals {
    pub tokens: u64,
    /// `None` when no model in the window had a nonzero cost.
    pub cost_nanos: Option<u64>,
}

impl UsageTotals {
    pub fn cost_usd(&self) -> Option<f64> {
        self.cost_nanos.map(|n| n as f64 / NANOS_PER_USD)
    }

    fn combine(self, other: UsageTotals) -> UsageTotals {
        let cost_nanos = match (self.cost_nanos, other.cost_nanos) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(0).saturating_add(b.unwrap_or(0))),
        };
        UsageTotals {
            tokens: self.tokens.saturating_add(other.tokens),
            cost_nanos,
        }
    }
}

/// Display line: label plus formatted value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Line {
    pub label: String,
    pub value: String,
}

pub fn aggregate_day(days: &DayMap, day_key: &str) -> UsageTotals {
    let Some(models) = days.day(day_key) else {
        return UsageTotals::default();
    };
    models.values().fold(UsageTotals::default(), |acc, tally| {
        let cost = tally.cost_nanos();
        acc.combine(UsageTotals {
            tokens: tally.tokens(),
            cost_nanos: (cost > 0).then_some(cost),
        })
    })
}

/// Totals over `today` and the `count - 1` local days before it.
pub fn aggregate_days(days: &DayMap, today: NaiveDate, count: u64) -> UsageTotals {
    (0..count)
        .filter_map(|offset| day_key_offset(today, offset))
        .fold(UsageTotals::default(), |acc, key| {
            acc.combine(aggregate_day(days, &key))
        })
}

/// `"$1.23 · 45K tokens"`; either part may be missing.
pub fn cost_and_tokens_label(totals: &UsageTotals) -> String {
    let mut parts = Vec::with_capacity(2);
    if let Some(nanos) = totals.cost_nanos {
        parts.push(format!("${}", format_currency(nanos)));
    }
    if totals.tokens > 0 {
        parts.push(format!("{} tokens", format_tokens(totals.tokens as i64)));
    }
    parts.join(SEPARATOR)
}

/// "Today" and "Last 30 days" lines; a window without tokens is omitted.
pub fn usage_lines(days: &DayMap, today: NaiveDate) -> Vec<Line> {
    let windows = [
        (TODAY_LABEL, aggregate_day(days, &day_key(today))),
        (LAST_30_DAYS_LABEL, aggregate_days(days, today, WINDOW_DAYS)),
    ];
    windows
        .into_iter()
        .filter(|(_, totals)| totals.tokens > 0)
        .map(|(label, totals)| Line {
            label: label.to_string(),
            value: cost_and_tokens_label(&totals),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::days::Tally;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 15).unwrap()
    }

    #[test]
    fn day_cost_is_none_without_priced_usage() {
        let mut days = DayMap::new();
        days.accumulate("2026-04-15", "claude-future-model-9000", Tally::new(500, 0, 0, 100, 0));
        let totals = aggregate_day(&days, "2026-04-15");
        assert_eq!(totals.tokens, 600);
        assert_eq!(totals.cost_nanos, None);
        assert_eq!(cost_and_tokens_label(&totals), "600 tokens");
    }

    #[test]
    fn day_sums_tokens_of_all_models_and_cost_of_priced_ones() {
        let mut days = DayMap::new();
        days.accumulate("2026-04-15", "a", Tally::new(1, 2, 3, 4, 0));
        days.accumulate("2026-04-15", "b", Tally::new(10, 0, 0, 0, 2_500_000_000));
        let totals = aggregate_day(&days, "2026-04-15");
        assert_eq!(totals.tokens, 20);
        assert_eq!(totals.cost_usd(), Some(2.5));
        assert_eq!(aggregate_day(&days, "2026-04-14"), UsageTotals::default());
    }

    #[test]
    fn window_covers_exactly_count_days() {
        let mut days = DayMap::new();
        days.accumulate("2026-04-15", "a", Tally::new(1, 0, 0, 0, 0));
        days.accumulate("2026-03-17", "a", Tally::new(10, 0, 0, 0, 1_000_000_000));
        // 30 days back from 04-15 ends at 03-17 inclusive; 03-16 is outside
        days.accumulate("2026-03-16", "a", Tally::new(100, 0, 0, 0, 1_000_000_000));
        let totals = aggregate_days(&days, today(), 30);
        assert_eq!(totals.tokens, 11);
        assert_eq!(totals.cost_usd(), Some(1.0));
    }

    #[test]
    fn lines_are_omitted_for_empty_windows() {
        let mut days = DayMap::new();
        assert!(usage_lines(&days, today()).is_empty());

        days.accumulate("2026-04-10", "claude-opus-4-5", Tally::new(1_000_000, 0, 0, 0, 5_000_000_000));
        let lines = usage_lines(&days, today());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].label, LAST_30_DAYS_LABEL);
        assert_eq!(lines[0].value, "$5.00 \u{b7} 1M tokens");
    }

    #[test]
    fn label_rounds_halves_up() {
        let totals = UsageTotals {
            tokens: 1_250,
            cost_nanos: Some(125_000_000),
        };
        assert_eq!(cost_and_tokens_label(&totals), "$0.13 \u{b7} 1.3K tokens");
    }
}
