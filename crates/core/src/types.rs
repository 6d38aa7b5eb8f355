/// Generation numbers start at 0 for the empty roster and increase by one
/// per committed poll cycle.
pub type GenerationId = u64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
