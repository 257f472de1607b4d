// Module: http
// HTTP/JSON surface over the core services

pub mod auth;
pub mod channels;
pub mod error;
pub mod live;
pub mod middleware;
pub mod publish;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use castgate_core::bootstrap::Services;
use castgate_core::service::{
    ChannelService, DirectoryService, IngestService, LiveRegistry, LoginService, SessionService,
};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub channels: Arc<ChannelService>,
    pub ingest: Arc<IngestService>,
    pub login: Arc<LoginService>,
    pub sessions: Arc<SessionService>,
    pub directory: Arc<DirectoryService>,
    pub live: Arc<LiveRegistry>,
}

impl From<Services> for AppState {
    fn from(services: Services) -> Self {
        Self {
            channels: services.channels,
            ingest: services.ingest,
            login: services.login,
            sessions: services.sessions,
            directory: services.directory,
            live: services.live,
        }
    }
}

/// Create the HTTP router with all routes
pub fn create_router(services: Services) -> Router {
    let state = AppState::from(services);

    let router = Router::new()
        // Login flow (redirect-driven)
        .route("/oauth2/login", get(auth::login))
        .route("/oauth2/cb", get(auth::callback))
        .route("/oauth2/logout", post(auth::logout))
        // Session identity (anonymous-safe)
        .route("/api/user", get(auth::current_user))
        .route("/api/user/announce", put(channels::set_owner_announce))
        // Owner-facing channel management
        .route("/api/mychannels", get(channels::list).post(channels::create))
        .route(
            "/api/mychannels/{name}",
            put(channels::update).delete(channels::remove),
        )
        // Public directory
        .route("/api/channels", get(live::list_channels))
        .route("/api/thumbs/{name}", get(live::thumbnail))
        // Media-engine hooks; never exposed through the public proxy
        .route("/internal/publish/rtmp", post(publish::authenticate_rtmp))
        .route("/internal/publish/ftl", post(publish::authenticate_ftl))
        .route("/internal/publish/{name}/stop", post(publish::publish_stopped))
        .route("/internal/publish/{name}/thumb", put(publish::put_thumbnail));

    router
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{header, Request, StatusCode};
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use castgate_core::models::{Channel, ChannelCredential, LiveChannel, OwnerId, SessionIdentity};
    use castgate_core::repository::{ChannelStore, FindColumn, LivenessStore};
    use castgate_core::service::CookieSealer;
    use castgate_core::{Error, Result};

    struct EmptyChannelStore;

    #[async_trait]
    impl ChannelStore for EmptyChannelStore {
        async fn channels_by_owner(&self, _owner_id: &OwnerId) -> Result<Vec<Channel>> {
            Ok(vec![])
        }
        async fn create_channel(&self, owner_id: &OwnerId, name: &str) -> Result<Channel> {
            Ok(Channel {
                owner_id: owner_id.clone(),
                name: name.to_string(),
                secret: "f".repeat(48),
                ftl_id: None,
                announce: true,
            })
        }
        async fn set_announce(&self, _: &OwnerId, name: &str, _: bool) -> Result<()> {
            Err(Error::NotFound(format!("channel {name:?}")))
        }
        async fn delete_channel(&self, _: &OwnerId, _: &str) -> Result<()> {
            Ok(())
        }
        async fn find_channel(&self, _: FindColumn, _: &str) -> Result<ChannelCredential> {
            Err(Error::NotFound("channel".to_string()))
        }
        async fn set_owner_announce(&self, _: &OwnerId, _: bool) -> Result<()> {
            Ok(())
        }
    }

    struct StubLivenessStore {
        rows: Vec<(&'static str, i64)>,
    }

    #[async_trait]
    impl LivenessStore for StubLivenessStore {
        async fn thumbnail(&self, name: &str) -> Result<Vec<u8>> {
            Err(Error::NotFound(format!("thumbnail for {name:?}")))
        }
        async fn put_thumbnail(&self, _: &str, _: &[u8]) -> Result<()> {
            Ok(())
        }
        async fn list_liveness(&self) -> Result<Vec<LiveChannel>> {
            let now = Utc::now();
            Ok(self
                .rows
                .iter()
                .map(|(name, seconds_ago)| LiveChannel {
                    name: (*name).to_string(),
                    updated_at: now - Duration::seconds(*seconds_ago),
                })
                .collect())
        }
    }

    fn test_router(rows: Vec<(&'static str, i64)>) -> (Router, Arc<SessionService>) {
        let sealer = Arc::new(CookieSealer::ephemeral());
        let sessions = Arc::new(SessionService::new(sealer.clone(), Duration::days(30)));
        let login = Arc::new(
            LoginService::new(
                &castgate_core::config::OAuthConfig::default(),
                "http://localhost/oauth2/cb".to_string(),
                sealer,
                Duration::minutes(15),
            )
            .expect("login service"),
        );
        let channel_store = Arc::new(EmptyChannelStore);
        let services = Services {
            channels: Arc::new(ChannelService::new(
                channel_store.clone(),
                "rtmp://localhost/live".to_string(),
            )),
            ingest: Arc::new(IngestService::new(channel_store)),
            login,
            sessions: sessions.clone(),
            directory: Arc::new(DirectoryService::new(Arc::new(StubLivenessStore { rows }))),
            live: Arc::new(LiveRegistry::new()),
        };
        (create_router(services), sessions)
    }

    fn request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .extension(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))))
            .body(Body::empty())
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn test_identity_read_without_cookie_is_anonymous() {
        let (router, _) = test_router(vec![]);
        let response = router.oneshot(request("GET", "/api/user")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["id"], "");
        assert_eq!(body["username"], "");
    }

    #[tokio::test]
    async fn test_identity_read_with_session_cookie() {
        let (router, sessions) = test_router(vec![]);
        let sealed = sessions
            .issue(&SessionIdentity {
                id: "42".to_string(),
                username: "streamer".to_string(),
                discriminator: "0001".to_string(),
                avatar: "abc".to_string(),
            })
            .expect("issue");

        let mut req = request("GET", "/api/user");
        req.headers_mut().insert(
            header::COOKIE,
            format!("{}={}", auth::SESSION_COOKIE, sealed).parse().expect("header"),
        );
        let response = router.oneshot(req).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["id"], "42");
        assert_eq!(body["avatar"], "/avatars/42/abc.png");
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_reads_anonymous() {
        let (router, sessions) = test_router(vec![]);
        let sealed = sessions
            .issue(&SessionIdentity {
                id: "42".to_string(),
                ..Default::default()
            })
            .expect("issue");

        let mut req = request("POST", "/oauth2/logout");
        req.headers_mut().insert(
            header::COOKIE,
            format!("{}={}", auth::SESSION_COOKIE, sealed).parse().expect("header"),
        );
        let response = router.clone().oneshot(req).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        // The response instructs the browser to drop the cookie
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("set-cookie")
            .to_str()
            .expect("ascii");
        assert!(set_cookie.starts_with(&format!("{}=", auth::SESSION_COOKIE)));
        assert!(set_cookie.contains("Max-Age=0"));

        // A subsequent identity read without the cookie is anonymous, not an error
        let response = router.oneshot(request("GET", "/api/user")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], "");
    }

    #[tokio::test]
    async fn test_channel_management_requires_session() {
        let (router, _) = test_router(vec![]);
        let response = router
            .oneshot(request("GET", "/api/mychannels"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_unconfigured_answers_400() {
        let (router, _) = test_router(vec![]);
        let response = router
            .oneshot(request("GET", "/oauth2/login"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_directory_listing_order_and_shape() {
        let (router, _) = test_router(vec![("c", 200), ("a", 10), ("b", 70)]);
        let response = router
            .oneshot(request("GET", "/api/channels"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let names: Vec<_> = body
            .as_array()
            .expect("array")
            .iter()
            .map(|e| e["name"].as_str().expect("name"))
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(body[0]["live"], false);
        assert_eq!(body[0]["thumb"], "/api/thumbs/a");
    }

    #[tokio::test]
    async fn test_missing_thumbnail_is_404() {
        let (router, _) = test_router(vec![]);
        let response = router
            .oneshot(request("GET", "/api/thumbs/ghost"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_publisher_is_rejected() {
        let (router, _) = test_router(vec![]);
        let mut req = request("POST", "/internal/publish/rtmp");
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            "application/json".parse().expect("header"),
        );
        *req.body_mut() = Body::from(r#"{"name":"ghost","key":"whatever"}"#);

        let response = router.oneshot(req).await.expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let (router, _) = test_router(vec![]);
        let response = router.oneshot(request("GET", "/api/user")).await.expect("response");
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).map(|v| v.as_bytes()),
            Some(b"nosniff".as_slice())
        );
        assert_eq!(
            response.headers().get(header::REFERRER_POLICY).map(|v| v.as_bytes()),
            Some(b"no-referrer".as_slice())
        );
    }
}
