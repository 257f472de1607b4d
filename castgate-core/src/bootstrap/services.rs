//! Service initialization and dependency injection

use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::{
    config::SessionConfig,
    repository::{ChannelRepository, LivenessRepository},
    service::{
        ChannelService, CookieSealer, DirectoryService, IngestService, LiveRegistry, LoginService,
        SessionService,
    },
    Config,
};

/// Container for all initialized services
#[derive(Clone)]
pub struct Services {
    /// Owner-facing channel management
    pub channels: Arc<ChannelService>,
    /// Publish authentication for both ingest protocols
    pub ingest: Arc<IngestService>,
    /// OAuth login flow
    pub login: Arc<LoginService>,
    /// Sealed session cookie issue/read
    pub sessions: Arc<SessionService>,
    /// Liveness directory and thumbnails
    pub directory: Arc<DirectoryService>,
    /// Currently-publishing channels
    pub live: Arc<LiveRegistry>,
}

/// Initialize all core services
pub fn init_services(pool: PgPool, config: &Config) -> Result<Services, anyhow::Error> {
    info!("Initializing services...");

    let channel_repo = Arc::new(ChannelRepository::new(pool.clone()));
    let liveness_repo = Arc::new(LivenessRepository::new(pool));

    let sealer = Arc::new(build_sealer(&config.session)?);

    let sessions = Arc::new(SessionService::new(
        sealer.clone(),
        Duration::days(config.session.session_ttl_days),
    ));

    if !config.oauth.is_configured() {
        warn!("oauth client not configured; login endpoints will answer 400");
    }
    let login = Arc::new(LoginService::new(
        &config.oauth,
        config.oauth_redirect_url(),
        sealer,
        Duration::minutes(config.session.state_ttl_minutes),
    )?);

    let channels = Arc::new(ChannelService::new(
        channel_repo.clone(),
        config.ingest.rtmp_base.clone(),
    ));
    let ingest = Arc::new(IngestService::new(channel_repo));
    let directory = Arc::new(DirectoryService::new(liveness_repo));
    let live = Arc::new(LiveRegistry::new());

    info!("Services initialized");

    Ok(Services {
        channels,
        ingest,
        login,
        sessions,
        directory,
        live,
    })
}

fn build_sealer(config: &SessionConfig) -> Result<CookieSealer, anyhow::Error> {
    if config.seal_key.is_empty() {
        warn!("session.seal_key not set; using a random key, sessions will not survive restarts");
        Ok(CookieSealer::ephemeral())
    } else {
        Ok(CookieSealer::from_hex_key(&config.seal_key)?)
    }
}
