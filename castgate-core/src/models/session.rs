use serde::{Deserialize, Serialize};

/// Sealed-cookie session payload.
///
/// The all-empty value is the anonymous identity: identity reads are a
/// lenient path and an absent or invalid cookie is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    #[serde(default)]
    pub avatar: String,
}

impl SessionIdentity {
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.id.is_empty()
    }
}
