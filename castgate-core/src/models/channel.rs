use serde::{Deserialize, Serialize};

use super::id::OwnerId;

/// One publishable channel.
///
/// `name` is globally unique and immutable once set. `secret` is the sole
/// ingest credential for both wire protocols; it is generated server-side
/// at creation and must never be logged or shown to anyone but the owner.
/// Deliberately not serde-serializable; only the owner-facing
/// [`crate::service::ChannelDef`] view crosses the HTTP boundary.
#[derive(Clone)]
pub struct Channel {
    pub owner_id: OwnerId,
    pub name: String,
    pub secret: String,
    pub ftl_id: Option<String>,
    pub announce: bool,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("owner_id", &self.owner_id)
            .field("name", &self.name)
            .field("secret", &"[REDACTED]")
            .field("ftl_id", &self.ftl_id)
            .field("announce", &self.announce)
            .finish()
    }
}

/// Joined channel + owner-preference read used by the ingest authenticator.
///
/// `announce` here is already the effective flag: channel opt-in AND owner
/// opt-in, coalesced to false when the owner row is missing.
#[derive(Clone)]
pub struct ChannelCredential {
    pub owner_id: OwnerId,
    pub name: String,
    pub secret: String,
    pub announce: bool,
}

impl ChannelCredential {
    /// Strip the secret once verification succeeded
    #[must_use]
    pub fn into_auth(self) -> ChannelAuth {
        ChannelAuth {
            owner_id: self.owner_id,
            name: self.name,
            announce: self.announce,
        }
    }
}

impl std::fmt::Debug for ChannelCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelCredential")
            .field("owner_id", &self.owner_id)
            .field("name", &self.name)
            .field("secret", &"[REDACTED]")
            .field("announce", &self.announce)
            .finish()
    }
}

/// Result of a successful ingest authentication, handed to the media engine
/// to authorize starting a publish session. Transient; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelAuth {
    pub owner_id: OwnerId,
    pub name: String,
    /// Effective publicity flag (channel AND owner opt-in)
    pub announce: bool,
}

/// Effective listing visibility: the channel opt-in AND the owner's global
/// opt-in. A missing owner-preference row counts as opted out.
#[must_use]
pub fn effective_announce(channel: bool, owner: Option<bool>) -> bool {
    channel && owner.unwrap_or(false)
}
