//! OAuth login flow against the identity provider (Discord).
//!
//! A cooperative state machine across independent requests, correlated only
//! by sealed cookies: Unauthenticated -> StatePending (sealed CSRF state
//! issued, user redirected out) -> Authenticated (state verified, code
//! exchanged, profile fetched, session sealed) -> LoggedOut. `begin` drives
//! the first transition, `complete` the second; logout is a cookie clear at
//! the HTTP layer.

use std::sync::Arc;

use base64::Engine;
use chrono::Duration;
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, CsrfToken, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use rand::RngCore;
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::{
    config::OAuthConfig, models::SessionIdentity, service::CookieSealer, Error, Result,
};

const DISCORD_AUTH_URL: &str = "https://discord.com/api/oauth2/authorize";
const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// First transition of the login flow: where to send the user agent, and the
/// sealed state cookie that must come back on the callback.
pub struct LoginStart {
    pub auth_url: String,
    pub state_cookie: String,
}

pub struct LoginService {
    oauth: Option<BasicClient>,
    http: reqwest::Client,
    api_base: String,
    sealer: Arc<CookieSealer>,
    state_ttl: Duration,
}

impl LoginService {
    /// Build against the provider's public endpoints. The service stays
    /// constructible when the client is unconfigured; both flow entry points
    /// then fail with a configuration error.
    pub fn new(
        config: &OAuthConfig,
        redirect_url: String,
        sealer: Arc<CookieSealer>,
        state_ttl: Duration,
    ) -> Result<Self> {
        Self::with_endpoints(
            config,
            redirect_url,
            sealer,
            state_ttl,
            DISCORD_AUTH_URL,
            DISCORD_TOKEN_URL,
            DISCORD_API_BASE,
        )
    }

    fn with_endpoints(
        config: &OAuthConfig,
        redirect_url: String,
        sealer: Arc<CookieSealer>,
        state_ttl: Duration,
        auth_url: &str,
        token_url: &str,
        api_base: &str,
    ) -> Result<Self> {
        let oauth = if config.is_configured() {
            let client = BasicClient::new(
                ClientId::new(config.client_id.clone()),
                Some(ClientSecret::new(config.client_secret.clone())),
                AuthUrl::new(auth_url.to_string())
                    .map_err(|e| Error::Configuration(format!("bad authorize URL: {e}")))?,
                Some(
                    TokenUrl::new(token_url.to_string())
                        .map_err(|e| Error::Configuration(format!("bad token URL: {e}")))?,
                ),
            )
            .set_redirect_uri(
                RedirectUrl::new(redirect_url)
                    .map_err(|e| Error::Configuration(format!("bad redirect URL: {e}")))?,
            );
            Some(client)
        } else {
            None
        };

        Ok(Self {
            oauth,
            http: reqwest::Client::new(),
            api_base: api_base.to_string(),
            sealer,
            state_ttl,
        })
    }

    fn client(&self) -> Result<&BasicClient> {
        self.oauth
            .as_ref()
            .ok_or_else(|| Error::Configuration("oauth client not configured".to_string()))
    }

    /// Stage 1: issue a fresh CSRF state, sealed for the state cookie, and
    /// the provider authorization URL carrying the same state.
    pub fn begin(&self) -> Result<LoginStart> {
        let client = self.client()?;
        let state = new_state_token();
        let state_cookie = self.sealer.seal(&state, self.state_ttl)?;

        let (auth_url, _csrf_token) = client
            .authorize_url(|| CsrfToken::new(state.clone()))
            .add_scope(Scope::new("identify".to_string()))
            .add_scope(Scope::new("guilds".to_string()))
            .url();

        Ok(LoginStart {
            auth_url: auth_url.to_string(),
            state_cookie,
        })
    }

    /// Stages 2-4: verify the CSRF state, exchange the code, fetch the
    /// provider profile.
    ///
    /// The caller must clear the state cookie in its response no matter what
    /// this returns; the state is single-use. State verification happens
    /// before any network call to the provider.
    pub async fn complete(
        &self,
        code: Option<&str>,
        state: Option<&str>,
        state_cookie: Option<&str>,
    ) -> Result<SessionIdentity> {
        let client = self.client()?;

        let code = code.filter(|c| !c.is_empty()).ok_or(Error::MissingCode)?;

        let issued: String = state_cookie
            .ok_or(Error::StateMismatch)
            .and_then(|sealed| self.sealer.unseal(sealed).map_err(|_| Error::StateMismatch))?;
        let presented = state.unwrap_or_default();
        if !bool::from(issued.as_bytes().ct_eq(presented.as_bytes())) {
            return Err(Error::StateMismatch);
        }

        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| Error::Upstream(format!("token exchange failed: {e}")))?;

        self.fetch_identity(token.access_token().secret()).await
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<SessionIdentity> {
        #[derive(Deserialize)]
        struct ProviderUser {
            id: String,
            username: String,
            #[serde(default)]
            discriminator: String,
            #[serde(default)]
            avatar: Option<String>,
        }

        let user: ProviderUser = self
            .http
            .get(format!("{}/users/@me", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("profile fetch failed: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Upstream(format!("profile fetch failed: {e}")))?
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("profile parse failed: {e}")))?;

        Ok(SessionIdentity {
            id: user.id,
            username: user.username,
            discriminator: user.discriminator,
            avatar: user.avatar.unwrap_or_default(),
        })
    }
}

/// Fresh CSRF state: 9 random bytes, base64url
fn new_state_token() -> String {
    let mut bytes = [0u8; 9];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
