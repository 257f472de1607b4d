use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// In-process set of currently-publishing channels, maintained by the media
/// engine's publish start/stop notifications. Backs the `live` flag of the
/// public directory listing.
#[derive(Debug, Default)]
pub struct LiveRegistry {
    live: DashMap<String, DateTime<Utc>>,
}

impl LiveRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_live(&self, name: &str) {
        self.live.insert(name.to_string(), Utc::now());
    }

    pub fn set_offline(&self, name: &str) {
        self.live.remove(name);
    }

    #[must_use]
    pub fn is_live(&self, name: &str) -> bool {
        self.live.contains_key(name)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_lifecycle() {
        let registry = LiveRegistry::new();
        assert!(!registry.is_live("demo"));

        registry.set_live("demo");
        assert!(registry.is_live("demo"));
        assert_eq!(registry.live_count(), 1);

        registry.set_offline("demo");
        assert!(!registry.is_live("demo"));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_offline_unknown_channel_is_a_noop() {
        let registry = LiveRegistry::new();
        registry.set_offline("ghost");
        assert_eq!(registry.live_count(), 0);
    }
}
