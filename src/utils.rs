use std::path::{Path, PathBuf};

pub const CREDENTIALS_FILE: &str = ".credentials.json";

pub fn home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~"))
}

fn projects_dir(base: &str) -> Option<PathBuf> {
    let base = base.trim().trim_end_matches('/');
    if base.is_empty() {
        return None;
    }
    let path = PathBuf::from(base);
    if path.file_name().and_then(|n| n.to_str()) == Some("projects") {
        Some(path)
    } else {
        Some(path.join("projects"))
    }
}

/// Session-log roots in precedence order: the `CLAUDE_CONFIG_DIR` override
/// (with `/projects` appended when missing), then `~/.claude/projects` and
/// `~/.config/claude/projects`.
pub fn log_roots(config_dir: Option<&str>, home: &Path) -> Vec<PathBuf> {
    let mut roots = Vec::with_capacity(3);
    if let Some(dir) = config_dir.and_then(projects_dir) {
        roots.push(dir);
    }
    for base in [home.join(".claude"), home.join(".config").join("claude")] {
        let dir = base.join("projects");
        if !roots.contains(&dir) {
            roots.push(dir);
        }
    }
    roots
}

/// Candidate credential files, override first.
pub fn credential_paths(config_dir: Option<&str>, home: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(2);
    if let Some(dir) = config_dir.map(str::trim).filter(|d| !d.is_empty()) {
        let dir = PathBuf::from(dir);
        // an override pointing at the projects dir still means its parent
        let dir = if dir.file_name().and_then(|n| n.to_str()) == Some("projects") {
            dir.parent().map(Path::to_path_buf).unwrap_or(dir)
        } else {
            dir
        };
        paths.push(dir.join(CREDENTIALS_FILE));
    }
    let default = home.join(".claude").join(CREDENTIALS_FILE);
    if !paths.contains(&default) {
        paths.push(default);
    }
    paths
}

/// Private data directory for the ledger's persisted state.
pub fn default_data_dir(home: &Path) -> PathBuf {
    directories::ProjectDirs::from("", "", "usage-ledger")
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| home.join(".usage-ledger"))
}

/// Dollars with two decimals from a nanodollar amount, halves rounded up.
pub fn format_currency(nanos: u64) -> String {
    let cents = nanos.saturating_add(5_000_000) / 10_000_000;
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Abbreviate a token count: `950`, `1.5K`, `12K`, `3M`, `1.2B`.
/// One decimal below 10 units of the chosen scale, none above. Halves round
/// away from zero.
pub fn format_tokens(n: i64) -> String {
    let sign = if n < 0 { "-" } else { "" };
    let abs = n.unsigned_abs() as f64;
    for (threshold, suffix) in [(1e9, "B"), (1e6, "M"), (1e3, "K")] {
        if abs >= threshold {
            let scaled = abs / threshold;
            let formatted = if scaled >= 10.0 {
                format!("{}", scaled.round())
            } else {
                let one_decimal = format!("{:.1}", (scaled * 10.0).round() / 10.0);
                one_decimal
                    .strip_suffix(".0")
                    .map(str::to_string)
                    .unwrap_or(one_decimal)
            };
            return format!("{sign}{formatted}{suffix}");
        }
    }
    format!("{sign}{}", abs.round())
}

/// Decode bytes as UTF-8, substituting U+FFFD for malformed sequences.
pub fn decode_utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Decode a hex string (optionally `0x`-prefixed) into text. `None` when the
/// input is empty, of odd length or contains non-hex characters.
pub fn decode_hex_utf8(text: &str) -> Option<String> {
    let hex = text.trim();
    let hex = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);
    if hex.is_empty() || hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let bytes = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
        .collect::<Result<Vec<u8>, _>>()
        .ok()?;
    Some(decode_utf8(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(0), "0");
        assert_eq!(format_tokens(999), "999");
        assert_eq!(format_tokens(1_000), "1K");
        assert_eq!(format_tokens(1_500), "1.5K");
        assert_eq!(format_tokens(9_949), "9.9K");
        assert_eq!(format_tokens(12_345), "12K");
        assert_eq!(format_tokens(300), "300");
        assert_eq!(format_tokens(1_000_000), "1M");
        assert_eq!(format_tokens(25_600_000), "26M");
        assert_eq!(format_tokens(1_200_000_000), "1.2B");
        assert_eq!(format_tokens(-1_500), "-1.5K");
        // exact halves round up
        assert_eq!(format_tokens(1_250), "1.3K");
        assert_eq!(format_tokens(2_250_000), "2.3M");
        assert_eq!(format_tokens(-1_250), "-1.3K");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0), "0.00");
        assert_eq!(format_currency(5_000_000_000), "5.00");
        assert_eq!(format_currency(125_000_000), "0.13");
        assert_eq!(format_currency(124_999_999), "0.12");
        assert_eq!(format_currency(2_000_000), "0.00");
        assert_eq!(format_currency(1_234_995_000_000), "1235.00");
    }

    #[test]
    fn test_log_roots_override_precedes_defaults() {
        let home = Path::new("/home/u");
        let roots = log_roots(Some("/custom/config/"), home);
        assert_eq!(
            roots,
            vec![
                PathBuf::from("/custom/config/projects"),
                PathBuf::from("/home/u/.claude/projects"),
                PathBuf::from("/home/u/.config/claude/projects"),
            ]
        );
        let roots = log_roots(Some("/custom/projects"), home);
        assert_eq!(roots[0], PathBuf::from("/custom/projects"));
        assert_eq!(log_roots(Some("   "), home).len(), 2);
        assert_eq!(log_roots(Some("/home/u/.claude"), home).len(), 2);
    }

    #[test]
    fn test_credential_paths() {
        let home = Path::new("/home/u");
        assert_eq!(
            credential_paths(Some("/c/projects"), home),
            vec![
                PathBuf::from("/c/.credentials.json"),
                PathBuf::from("/home/u/.claude/.credentials.json"),
            ]
        );
        assert_eq!(credential_paths(None, home).len(), 1);
    }

    #[test]
    fn test_decode_hex_utf8() {
        assert_eq!(decode_hex_utf8("7b7d").as_deref(), Some("{}"));
        assert_eq!(decode_hex_utf8("0x7B0A7D").as_deref(), Some("{\n}"));
        // "pró€🙂"
        assert_eq!(
            decode_hex_utf8("7072c3b3e282acf09f9982").as_deref(),
            Some("pró€🙂")
        );
        assert_eq!(decode_hex_utf8("c200ff").as_deref(), Some("\u{fffd}\0\u{fffd}"));
        assert!(decode_hex_utf8("abc").is_none());
        assert!(decode_hex_utf8("zz").is_none());
        assert!(decode_hex_utf8("").is_none());
    }
}
