use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Token counters of one assistant turn. Missing, null, negative or
/// non-numeric counts read as zero.
#[derive(Deserialize, Debug, Default, Clone, Copy)]
pub struct MessageUsage {
    #[serde(default, deserialize_with = "lenient_count")]
    pub input_tokens: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub output_tokens: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub cache_creation_input_tokens: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub cache_read_input_tokens: u64,
}

impl MessageUsage {
    pub fn is_empty(&self) -> bool {
        self.input_tokens == 0
            && self.output_tokens == 0
            && self.cache_creation_input_tokens == 0
            && self.cache_read_input_tokens == 0
    }
}

#[derive(Deserialize, Debug)]
pub struct MessageObj {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: Option<String>,
    pub usage: Option<MessageUsage>,
}

/// One line of a Claude session log, reduced to the fields the ledger reads.
#[derive(Deserialize, Debug)]
pub struct TranscriptLine {
    #[serde(default, deserialize_with = "lenient_string")]
    pub r#type: Option<String>,
    #[serde(rename = "requestId", default, deserialize_with = "lenient_string")]
    pub request_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    pub message: Option<MessageObj>,
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref()
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n as u64)
        .unwrap_or(0))
}

// Empty strings behave like absent ids.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_token_values_read_as_zero() {
        let line: TranscriptLine = serde_json::from_str(
            r#"{"type":"assistant","message":{"usage":{"input_tokens":-5,"output_tokens":"12","cache_read_input_tokens":null,"cache_creation_input_tokens":7.9}}}"#,
        )
        .unwrap();
        let usage = line.message.unwrap().usage.unwrap();
        assert_eq!(usage.input_tokens, 0);
        assert_eq!(usage.output_tokens, 0);
        assert_eq!(usage.cache_read_input_tokens, 0);
        assert_eq!(usage.cache_creation_input_tokens, 7);
    }

    #[test]
    fn empty_ids_are_absent() {
        let line: TranscriptLine = serde_json::from_str(
            r#"{"type":"assistant","requestId":"","message":{"id":42,"usage":{}}}"#,
        )
        .unwrap();
        assert!(line.request_id.is_none());
        assert!(line.message.unwrap().id.is_none());
    }
}
