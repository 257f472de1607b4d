//! Public liveness directory handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use castgate_core::Error;

use super::{AppError, AppResult, AppState};

/// One directory entry as exposed to viewers
#[derive(Debug, Serialize)]
pub struct ChannelInfo {
    pub name: String,
    pub live: bool,
    /// Last liveness update, Unix milliseconds
    pub last: i64,
    /// Thumbnail URL for this channel
    pub thumb: String,
}

/// GET /api/channels: every channel that has ever published, freshest
/// first (with the one-minute tie bucket), plus its current live flag.
pub async fn list_channels(State(state): State<AppState>) -> AppResult<Json<Vec<ChannelInfo>>> {
    let rows = state.directory.list_channels().await?;
    let infos = rows
        .into_iter()
        .map(|row| ChannelInfo {
            live: state.live.is_live(&row.name),
            last: row.last_update_millis(),
            thumb: format!("/api/thumbs/{}", row.name),
            name: row.name,
        })
        .collect();
    Ok(Json(infos))
}

/// GET /api/thumbs/{name}: most recent preview image
pub async fn thumbnail(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.directory.thumbnail(&name).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response(),
        Err(Error::NotFound(_)) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}
