//! # Usage Ledger
//!
//! Local token-usage ledger for Claude Code session logs, rendered as the
//! "Today" and "Last 30 days" lines of a usage probe.
//!
//! ## Overview
//!
//! Session logs (`projects/**/*.jsonl`) only ever grow, and there can be a
//! lot of them. The ledger keeps a persisted cache keyed by file path,
//! size and mtime, and on each probe:
//! - re-reads only new or modified files
//! - deduplicates streamed chunks of the same request
//! - prices tokens per model in integer nanodollars
//! - retracts the contribution of deleted or oversized files
//! - prunes day buckets older than the retention horizon
//!
//! ## Features
//!
//! - `colors` (default): Enables terminal color output via owo-colors

/// Persistent incremental token cache
pub mod cache;

/// Command-line argument parsing and configuration
pub mod cli;

/// Read-only credential decoding for the plan label
pub mod credentials;

/// Day-bucketed token tallies and merge arithmetic
pub mod days;

/// Display formatting for text and JSON output
pub mod display;

/// File system and clock capabilities
pub mod host;

/// Data models for log records and usage entries
pub mod models;

/// Model normalization and per-token pricing
pub mod pricing;

/// Probe orchestration and plugin registration
pub mod probe;

/// Today / last-N-days rollups
pub mod report;

/// Single log file scanning
pub mod scanner;

/// Utility functions for paths, formatting, and decoding
pub mod utils;
