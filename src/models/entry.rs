/// One accepted usage record, already bucketed to its local day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsageEntry {
    pub day_key: String,
    pub model: String,
    pub input: u64,
    pub cache_read: u64,
    pub cache_create: u64,
    pub output: u64,
    /// `messageId:requestId`, present only when both ids were logged.
    pub dedup_key: Option<String>,
}
