use chrono::{DateTime, Utc};

/// One row per channel that has ever gone live.
///
/// `updated_at` is advanced by the media engine whenever a new thumbnail
/// arrives; rows are kept as history even when the channel goes offline.
#[derive(Debug, Clone)]
pub struct LiveChannel {
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

impl LiveChannel {
    /// Last update as Unix milliseconds, the shape the directory exposes
    #[must_use]
    pub fn last_update_millis(&self) -> i64 {
        self.updated_at.timestamp_millis()
    }
}
