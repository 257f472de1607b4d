//! Registry store contract and its Postgres implementation.
//!
//! Services depend on the [`ChannelStore`] / [`LivenessStore`] traits, never
//! on `sqlx` types directly, so store-level sentinels ("no rows", unique
//! violations) are translated into domain errors exactly once, here.

pub mod channel;
pub mod liveness;

pub use channel::ChannelRepository;
pub use liveness::LivenessRepository;

use async_trait::async_trait;

use crate::{
    models::{Channel, ChannelCredential, LiveChannel, OwnerId},
    Result,
};

/// Column a channel lookup is scoped to. Exact-match equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindColumn {
    Name,
    FtlId,
}

/// Channel registry operations consumed by the core services
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn channels_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Channel>>;

    /// Insert a channel with a freshly generated secret.
    /// Fails with `Conflict` when the name is already taken by any owner.
    async fn create_channel(&self, owner_id: &OwnerId, name: &str) -> Result<Channel>;

    /// Fails with `NotFound` when no row was affected
    async fn set_announce(&self, owner_id: &OwnerId, name: &str, announce: bool) -> Result<()>;

    async fn delete_channel(&self, owner_id: &OwnerId, name: &str) -> Result<()>;

    /// Combined channel + owner-preference read yielding the effective
    /// announce flag in one round trip
    async fn find_channel(&self, column: FindColumn, value: &str) -> Result<ChannelCredential>;

    /// Per-owner global announce preference (upsert)
    async fn set_owner_announce(&self, owner_id: &OwnerId, announce: bool) -> Result<()>;
}

/// Liveness/thumbnail operations consumed by the directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LivenessStore: Send + Sync {
    /// Fails with `NotFound` when the channel has never published
    async fn thumbnail(&self, name: &str) -> Result<Vec<u8>>;

    /// Insert-or-replace; always refreshes `updated_at`
    async fn put_thumbnail(&self, name: &str, data: &[u8]) -> Result<()>;

    /// All liveness rows, unordered; ordering is the directory's concern
    async fn list_liveness(&self) -> Result<Vec<LiveChannel>>;
}
