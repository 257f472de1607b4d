//! Owner-facing channel management handlers. All routes here require a
//! signed-in session.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::Uri,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use castgate_core::service::ChannelDef;

use super::{auth::require_owner, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateChannelRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AnnounceRequest {
    pub announce: bool,
}

/// GET /api/mychannels
pub async fn list(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    uri: Uri,
    jar: CookieJar,
) -> AppResult<Json<Vec<ChannelDef>>> {
    let owner = require_owner(&state, &jar, addr, &uri)?;
    Ok(Json(state.channels.list(&owner).await?))
}

/// POST /api/mychannels
pub async fn create(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    uri: Uri,
    jar: CookieJar,
    Json(req): Json<CreateChannelRequest>,
) -> AppResult<Json<ChannelDef>> {
    let owner = require_owner(&state, &jar, addr, &uri)?;
    Ok(Json(state.channels.create(&owner, &req.name).await?))
}

/// PUT /api/mychannels/{name}
pub async fn update(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    uri: Uri,
    Path(name): Path<String>,
    jar: CookieJar,
    Json(req): Json<AnnounceRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let owner = require_owner(&state, &jar, addr, &uri)?;
    state.channels.set_announce(&owner, &name, req.announce).await?;
    Ok(Json(serde_json::json!({})))
}

/// DELETE /api/mychannels/{name}
pub async fn remove(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    uri: Uri,
    Path(name): Path<String>,
    jar: CookieJar,
) -> AppResult<Json<serde_json::Value>> {
    let owner = require_owner(&state, &jar, addr, &uri)?;
    state.channels.delete(&owner, &name).await?;
    Ok(Json(serde_json::json!({})))
}

/// PUT /api/user/announce: owner-level global publicity opt-in
pub async fn set_owner_announce(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    uri: Uri,
    jar: CookieJar,
    Json(req): Json<AnnounceRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let owner = require_owner(&state, &jar, addr, &uri)?;
    state.channels.set_owner_announce(&owner, req.announce).await?;
    Ok(Json(serde_json::json!({})))
}
