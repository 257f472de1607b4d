use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{models::LiveChannel, repository::LivenessStore, Result};

/// Ordered directory of channels that have published, with their cached
/// thumbnails.
pub struct DirectoryService {
    store: Arc<dyn LivenessStore>,
}

impl DirectoryService {
    #[must_use]
    pub fn new(store: Arc<dyn LivenessStore>) -> Self {
        Self { store }
    }

    /// All channels ever live, most recently updated first, with the
    /// recency gap floored at one minute (see [`sort_by_staleness`]).
    pub async fn list_channels(&self) -> Result<Vec<LiveChannel>> {
        let mut rows = self.store.list_liveness().await?;
        sort_by_staleness(&mut rows, Utc::now());
        Ok(rows)
    }

    pub async fn thumbnail(&self, name: &str) -> Result<Vec<u8>> {
        self.store.thumbnail(name).await
    }

    /// Insert-or-replace the channel's preview image, refreshing its
    /// liveness timestamp.
    pub async fn put_thumbnail(&self, name: &str, data: &[u8]) -> Result<()> {
        self.store.put_thumbnail(name, data).await
    }
}

/// Order by `max(now - updated_at, 1 minute)` ascending, then name.
///
/// The floor collapses every channel updated within the last minute into a
/// single alphabetical bucket, so a channel refreshing its thumbnail every
/// few seconds does not reshuffle the top of the list on every poll, while
/// channels untouched for longer still sink in roughly-recency order.
fn sort_by_staleness(rows: &mut [LiveChannel], now: DateTime<Utc>) {
    rows.sort_by(|a, b| {
        staleness(now, a.updated_at)
            .cmp(&staleness(now, b.updated_at))
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn staleness(now: DateTime<Utc>, updated_at: DateTime<Utc>) -> Duration {
    std::cmp::max(now - updated_at, Duration::minutes(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, seconds_ago: i64, now: DateTime<Utc>) -> LiveChannel {
        LiveChannel {
            name: name.to_string(),
            updated_at: now - Duration::seconds(seconds_ago),
        }
    }

    #[test]
    fn test_orders_by_recency_beyond_the_floor() {
        let now = Utc::now();
        let mut rows = vec![row("c", 200, now), row("a", 10, now), row("b", 70, now)];
        sort_by_staleness(&mut rows, now);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_ties_break_alphabetically() {
        let now = Utc::now();
        let mut rows = vec![row("d", 5, now), row("a", 5, now)];
        sort_by_staleness(&mut rows, now);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "d"]);
    }

    #[test]
    fn test_floor_collapses_the_freshest_minute() {
        let now = Utc::now();
        // 5s and 50s apart in recency, but both within the one-minute
        // floor, so the order is alphabetical rather than by timestamp.
        let mut rows = vec![row("zeta", 5, now), row("alpha", 50, now)];
        sort_by_staleness(&mut rows, now);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn test_future_timestamps_join_the_fresh_bucket() {
        let now = Utc::now();
        let mut rows = vec![row("b", -30, now), row("a", 10, now)];
        sort_by_staleness(&mut rows, now);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
