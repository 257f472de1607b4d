use std::sync::Arc;

use chrono::Duration;

use crate::{models::SessionIdentity, service::CookieSealer, Result};

/// Issues and reads the sealed session cookie.
///
/// Reading is deliberately lenient: most identity reads are passive UI
/// population, so an absent, expired, or tampered cookie yields the
/// anonymous identity rather than an error.
pub struct SessionService {
    sealer: Arc<CookieSealer>,
    ttl: Duration,
}

impl SessionService {
    #[must_use]
    pub fn new(sealer: Arc<CookieSealer>, ttl: Duration) -> Self {
        Self { sealer, ttl }
    }

    pub fn issue(&self, identity: &SessionIdentity) -> Result<String> {
        self.sealer.seal(identity, self.ttl)
    }

    #[must_use]
    pub fn read(&self, cookie: Option<&str>) -> SessionIdentity {
        cookie
            .and_then(|sealed| self.sealer.unseal(sealed).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SessionService {
        SessionService::new(Arc::new(CookieSealer::ephemeral()), Duration::days(30))
    }

    #[test]
    fn test_issue_read_roundtrip() {
        let service = service();
        let identity = SessionIdentity {
            id: "42".to_string(),
            username: "viewer".to_string(),
            discriminator: "0007".to_string(),
            avatar: String::new(),
        };
        let cookie = service.issue(&identity).expect("issue");
        assert_eq!(service.read(Some(&cookie)), identity);
    }

    #[test]
    fn test_absent_cookie_is_anonymous() {
        assert!(service().read(None).is_anonymous());
    }

    #[test]
    fn test_invalid_cookie_is_anonymous() {
        assert!(service().read(Some("garbage")).is_anonymous());
    }

    #[test]
    fn test_foreign_cookie_is_anonymous() {
        let other = service();
        let cookie = other
            .issue(&SessionIdentity {
                id: "42".to_string(),
                ..Default::default()
            })
            .expect("issue");
        // Sealed under a different key, unreadable here
        assert!(service().read(Some(&cookie)).is_anonymous());
    }
}
