//! # Pricing Module
//!
//! Model-name normalization and per-token pricing for Claude models.
//!
//! ## Pricing Structure
//!
//! Each model has per-token rates for:
//! - Input tokens
//! - Output tokens
//! - Cache creation
//! - Cache reads
//!
//! Rates are integer nanodollars per token, so a cost is exact and can be
//! accumulated across incremental merges without rounding drift. Some models
//! are tiered: tokens beyond the threshold are billed at the `above` rates,
//! per token category.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::days::NANOS_PER_USD;

static VERSION_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-v\d+:\d+$").unwrap());
static DATE_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+)-(\d{8})$").unwrap());

/// Model key used when a log record carries no model at all.
pub const UNKNOWN_MODEL: &str = "unknown";

/// Nanodollars per token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rates {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_create: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tier {
    pub threshold: u64,
    pub above: Rates,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pricing {
    pub base: Rates,
    pub tier: Option<Tier>,
}

const HAIKU_4_5: Pricing = Pricing {
    base: Rates { input: 1_000, output: 5_000, cache_read: 100, cache_create: 1_250 },
    tier: None,
};

const OPUS_4_5: Pricing = Pricing {
    base: Rates { input: 5_000, output: 25_000, cache_read: 500, cache_create: 6_250 },
    tier: None,
};

const OPUS_4: Pricing = Pricing {
    base: Rates { input: 15_000, output: 75_000, cache_read: 1_500, cache_create: 18_750 },
    tier: None,
};

// $3 / $15 per 1M, doubled input and 1.5x output past 200k tokens
const SONNET_4: Pricing = Pricing {
    base: Rates { input: 3_000, output: 15_000, cache_read: 300, cache_create: 3_750 },
    tier: Some(Tier {
        threshold: 200_000,
        above: Rates { input: 6_000, output: 22_500, cache_read: 600, cache_create: 7_500 },
    }),
};

/// Canonical model name -> pricing. Anything absent is unpriced.
const PRICING_TABLE: &[(&str, Pricing)] = &[
    ("claude-haiku-4-5-20251001", HAIKU_4_5),
    ("claude-haiku-4-5", HAIKU_4_5),
    ("claude-opus-4-5-20251101", OPUS_4_5),
    ("claude-opus-4-5", OPUS_4_5),
    ("claude-opus-4-6-20260205", OPUS_4_5),
    ("claude-opus-4-6", OPUS_4_5),
    ("claude-sonnet-4-6", SONNET_4),
    ("claude-sonnet-4-5-20250929", SONNET_4),
    ("claude-sonnet-4-5", SONNET_4),
    ("claude-opus-4-20250514", OPUS_4),
    ("claude-opus-4-1", OPUS_4),
    ("claude-sonnet-4-20250514", SONNET_4),
];

pub fn pricing_for_model(model: &str) -> Option<&'static Pricing> {
    PRICING_TABLE
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, pricing)| pricing)
}

/// Reduce a raw model identifier to the key used for tallies and pricing.
///
/// Strips Bedrock/Vertex decorations (`anthropic.` / `us.anthropic.` prefixes,
/// `-v1:0` suffixes, `@...` suffixes). A trailing `-YYYYMMDD` is dropped only
/// when the undated name is priced, so unknown dated models keep their date.
pub fn normalize_model(raw: &str) -> String {
    let mut model = raw.trim();
    if let Some(rest) = model.strip_prefix("anthropic.") {
        model = rest;
    }
    if let Some(idx) = model.rfind('.') {
        let tail = &model[idx + 1..];
        if tail.starts_with("claude-") {
            model = tail;
        }
    }
    let model = VERSION_SUFFIX_RE.replace(model, "");
    let model = match model.find('@') {
        Some(idx) => &model[..idx],
        None => &model[..],
    };
    if let Some(caps) = DATE_SUFFIX_RE.captures(model) {
        let undated = &caps[1];
        if pricing_for_model(undated).is_some() {
            return undated.to_string();
        }
    }
    model.to_string()
}

fn tiered(tokens: u64, base: u64, above: u64, threshold: Option<u64>) -> u64 {
    match threshold {
        Some(threshold) => {
            let below = tokens.min(threshold);
            let over = tokens.saturating_sub(threshold);
            below
                .saturating_mul(base)
                .saturating_add(over.saturating_mul(above))
        }
        None => tokens.saturating_mul(base),
    }
}

impl Pricing {
    pub fn cost_nanos(&self, input: u64, cache_read: u64, cache_create: u64, output: u64) -> u64 {
        let threshold = self.tier.map(|t| t.threshold);
        let above = self.tier.map(|t| t.above).unwrap_or(self.base);
        let b = self.base;
        tiered(input, b.input, above.input, threshold)
            .saturating_add(tiered(cache_read, b.cache_read, above.cache_read, threshold))
            .saturating_add(tiered(cache_create, b.cache_create, above.cache_create, threshold))
            .saturating_add(tiered(output, b.output, above.output, threshold))
    }
}

/// Cost in nanodollars for an already-normalized model; `None` when unpriced.
pub fn cost_nanos(
    model: &str,
    input: u64,
    cache_read: u64,
    cache_create: u64,
    output: u64,
) -> Option<u64> {
    pricing_for_model(model).map(|p| p.cost_nanos(input, cache_read, cache_create, output))
}

/// Cost in USD for an already-normalized model; `None` when unpriced.
pub fn cost_usd(
    model: &str,
    input: u64,
    cache_read: u64,
    cache_create: u64,
    output: u64,
) -> Option<f64> {
    cost_nanos(model, input, cache_read, cache_create, output).map(|n| n as f64 / NANOS_PER_USD)
}
