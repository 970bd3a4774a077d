pub mod entry;
pub mod message;

pub use entry::UsageEntry;
pub use message::{MessageObj, MessageUsage, TranscriptLine};
