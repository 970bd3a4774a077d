//! Read-only access to the Claude OAuth credentials blob, used for the plan
//! label. Token refresh is not handled here.

use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::host::FileSystem;
use crate::utils::decode_hex_utf8;

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct OAuthCredentials {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub subscription_type: Option<String>,
}

impl OAuthCredentials {
    pub fn has_access_token(&self) -> bool {
        self.access_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

/// Parse a credentials blob. Accepts plain JSON, or JSON stored as
/// hex-encoded UTF-8 (some keychain exports look like `7b0a...`).
pub fn parse_credentials_blob(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    if let Ok(v) = serde_json::from_str::<Value>(text) {
        return Some(v);
    }
    let decoded = decode_hex_utf8(text)?;
    serde_json::from_str(&decoded).ok()
}

pub fn oauth_from_blob(text: &str) -> Option<OAuthCredentials> {
    let blob = parse_credentials_blob(text)?;
    let oauth: OAuthCredentials = serde_json::from_value(blob.get("claudeAiOauth")?.clone()).ok()?;
    oauth.has_access_token().then_some(oauth)
}

/// First usable credentials among `paths`.
pub fn load_credentials(fs: &dyn FileSystem, paths: &[PathBuf]) -> Option<OAuthCredentials> {
    for path in paths {
        if !fs.exists(path) {
            continue;
        }
        match fs.read_text(path) {
            Ok(text) => match oauth_from_blob(&text) {
                Some(oauth) => {
                    log::debug!("credentials loaded from {}", path.display());
                    return Some(oauth);
                }
                None => log::warn!("credentials at {} hold no valid oauth data", path.display()),
            },
            Err(e) => log::warn!("credentials read failed: {e:#}"),
        }
    }
    None
}

/// `"pro"` -> `"Pro"`, `"team_premium"` -> `"Team Premium"`.
pub fn plan_label(subscription_type: &str) -> Option<String> {
    let words: Vec<String> = subscription_type
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> String {
        s.bytes().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn plain_and_hex_blobs_parse() {
        let json = r#"{"claudeAiOauth":{"accessToken":"tok","subscriptionType":"pró€🙂"}}"#;
        let plain = oauth_from_blob(json).unwrap();
        assert_eq!(plain.subscription_type.as_deref(), Some("pró€🙂"));

        let from_hex = oauth_from_blob(&hex(json)).unwrap();
        assert_eq!(from_hex.subscription_type.as_deref(), Some("pró€🙂"));
        let prefixed = oauth_from_blob(&format!("0x{}", hex(json))).unwrap();
        assert_eq!(prefixed.access_token.as_deref(), Some("tok"));
    }

    #[test]
    fn invalid_blobs_yield_nothing() {
        assert!(oauth_from_blob("c200ff").is_none());
        assert!(oauth_from_blob("not hex, not json").is_none());
        assert!(oauth_from_blob(r#"{"claudeAiOauth":{"accessToken":"  "}}"#).is_none());
        assert!(oauth_from_blob(r#"{"other":{}}"#).is_none());
    }

    #[test]
    fn plan_labels_are_title_cased() {
        assert_eq!(plan_label("pro").as_deref(), Some("Pro"));
        assert_eq!(plan_label("max").as_deref(), Some("Max"));
        assert_eq!(plan_label("team_premium").as_deref(), Some("Team Premium"));
        assert_eq!(plan_label("  ").as_deref(), None);
    }
}
