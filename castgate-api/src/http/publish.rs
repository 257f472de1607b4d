//! Media-engine hook handlers.
//!
//! These routes live under /internal/ and must not be forwarded by the
//! public reverse proxy; the media engine is the only caller. It posts here
//! to authorize inbound publishes and to report stream lifecycle and
//! thumbnails.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::warn;

use castgate_core::{models::ChannelAuth, Error};

use super::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RtmpAuthRequest {
    /// Channel name from the connection URL path
    pub name: String,
    /// Stream key from the connection URL query
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct FtlAuthRequest {
    pub channel_id: String,
    /// Hex-encoded connection nonce
    pub nonce: String,
    /// Hex-encoded HMAC-SHA512 digest presented by the client
    pub digest: String,
}

/// POST /internal/publish/rtmp
pub async fn authenticate_rtmp(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<RtmpAuthRequest>,
) -> AppResult<Json<ChannelAuth>> {
    match state.ingest.authenticate_rtmp(&req.name, &req.key).await {
        Ok(auth) => {
            state.live.set_live(&auth.name);
            Ok(Json(auth))
        }
        Err(Error::UserNotFound) => {
            warn!("rejected RTMP publish for {:?} from {}", req.name, addr);
            Err(AppError::forbidden("not authorized"))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /internal/publish/ftl
pub async fn authenticate_ftl(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<FtlAuthRequest>,
) -> AppResult<Json<ChannelAuth>> {
    let nonce = hex::decode(&req.nonce)
        .map_err(|_| AppError::bad_request("nonce must be hex-encoded"))?;
    let digest = hex::decode(&req.digest)
        .map_err(|_| AppError::bad_request("digest must be hex-encoded"))?;

    match state
        .ingest
        .authenticate_ftl(&req.channel_id, &nonce, &digest)
        .await
    {
        Ok(auth) => {
            state.live.set_live(&auth.name);
            Ok(Json(auth))
        }
        Err(Error::UserNotFound) => {
            warn!("rejected FTL publish for {:?} from {}", req.channel_id, addr);
            Err(AppError::forbidden("not authorized"))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /internal/publish/{name}/stop
pub async fn publish_stopped(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<serde_json::Value> {
    state.live.set_offline(&name);
    Json(serde_json::json!({}))
}

/// PUT /internal/publish/{name}/thumb: upsert the preview image, which
/// also advances the channel's liveness timestamp
pub async fn put_thumbnail(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    state.directory.put_thumbnail(&name, &body).await?;
    Ok(Json(serde_json::json!({})))
}
