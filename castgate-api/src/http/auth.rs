//! Login flow, logout, and session identity handlers

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{error, warn};

use castgate_core::{
    models::{OwnerId, SessionIdentity},
    Error,
};

use super::{AppError, AppState};

pub const SESSION_COOKIE: &str = "session";
pub const STATE_COOKIE: &str = "oauth_state";

// Cookie lifetimes mirror the sealed-payload TTLs; the seal is what is
// actually enforced, Max-Age just keeps well-behaved browsers tidy.
const STATE_COOKIE_MAX_AGE: cookie::time::Duration = cookie::time::Duration::minutes(15);
const SESSION_COOKIE_MAX_AGE: cookie::time::Duration = cookie::time::Duration::days(30);

fn sealed_cookie(
    name: &'static str,
    value: String,
    max_age: cookie::time::Duration,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

/// GET /oauth2/login: redirect the user agent to the identity provider
/// with a fresh sealed CSRF state cookie.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> Response {
    match state.login.begin() {
        Ok(start) => {
            let jar = jar.add(sealed_cookie(
                STATE_COOKIE,
                start.state_cookie,
                STATE_COOKIE_MAX_AGE,
            ));
            (jar, Redirect::to(&start.auth_url)).into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// GET /oauth2/cb: provider callback.
///
/// The state cookie is removed from the response before the outcome is
/// decided: the CSRF state is single-use, and a duplicate callback delivery
/// must find it already gone and fail closed.
pub async fn callback(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Response {
    let state_cookie = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::build((STATE_COOKIE, "")).path("/"));

    let identity = match state
        .login
        .complete(
            query.code.as_deref(),
            query.state.as_deref(),
            state_cookie.as_deref(),
        )
        .await
    {
        Ok(identity) => identity,
        Err(e @ Error::Configuration(_)) => {
            return (jar, AppError::from(e)).into_response();
        }
        Err(e) => {
            error!("oauth callback from {}: {}", addr, e);
            return (jar, AppError::bad_request("oauth failure")).into_response();
        }
    };

    match state.sessions.issue(&identity) {
        Ok(sealed) => {
            let jar = jar.add(sealed_cookie(SESSION_COOKIE, sealed, SESSION_COOKIE_MAX_AGE));
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => {
            error!("persisting login for {}: {}", addr, e);
            (jar, AppError::internal_server_error("error setting login cookie")).into_response()
        }
    }
}

/// POST /oauth2/logout: clear the session cookie
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    (jar, Json(serde_json::json!({})))
}

/// GET /api/user: session identity, anonymous-safe
pub async fn current_user(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Json<SessionIdentity> {
    let mut identity = state
        .sessions
        .read(jar.get(SESSION_COOKIE).map(|c| c.value()));
    if !identity.avatar.is_empty() {
        identity.avatar = format!("/avatars/{}/{}.png", identity.id, identity.avatar);
    }
    Json(identity)
}

/// Resolve the signed-in owner or reject with 401.
///
/// Unlike `current_user`, this path gates mutations, so an anonymous or
/// invalid session is an error here.
pub fn require_owner(
    state: &AppState,
    jar: &CookieJar,
    addr: SocketAddr,
    uri: &Uri,
) -> Result<OwnerId, AppError> {
    let identity = state
        .sessions
        .read(jar.get(SESSION_COOKIE).map(|c| c.value()));
    if identity.is_anonymous() {
        warn!("authentication failed for {} to {}", addr, uri);
        return Err(AppError::unauthorized("not authorized"));
    }
    Ok(OwnerId::from(identity.id))
}
