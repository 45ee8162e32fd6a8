use color_eyre::eyre::Context;
use recipes::RecipeClient;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::http_server::{cookies::CookieKey, session::SessionRegistry};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_TTL_MINUTES: i64 = 12 * 60;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub base_url: Url,
    pub port: u16,
}

impl AppConfig {
    #[instrument(name = "AppConfig::from_env")]
    pub fn from_env() -> crate::Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(port) => port.parse().wrap_err("PORT is not a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };

        let base_url = std::env::var("APP_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));
        let base_url = Url::parse(&base_url).wrap_err("Invalid APP_BASE_URL not parsable")?;

        Ok(Self { base_url, port })
    }

    pub fn app_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();

        url.set_path(path);

        url
    }

    /// Cookies are only marked `Secure` when the app is served over https.
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

/// Where the proxy route forwards to. Absent is allowed at startup; every
/// request checks for it and answers with a configuration error instead.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpstreamConfig {
    pub recipe_api_url: Option<Url>,
}

impl UpstreamConfig {
    #[instrument(name = "UpstreamConfig::from_env")]
    pub fn from_env() -> crate::Result<Self> {
        let recipe_api_url = std::env::var("RECIPE_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| Url::parse(&url).wrap_err("Invalid RECIPE_API_URL not parsable"))
            .transpose()?;

        if recipe_api_url.is_none() {
            tracing::warn!("RECIPE_API_URL is not set, recipe searches will fail");
        }

        Ok(Self { recipe_api_url })
    }

    pub fn generate_url(&self) -> Option<String> {
        self.recipe_api_url.as_ref().map(|base| {
            format!(
                "{}/api/recipes/generate",
                base.as_str().trim_end_matches('/')
            )
        })
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub idle_ttl: chrono::Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl: chrono::Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
        }
    }
}

impl SessionConfig {
    #[instrument(name = "SessionConfig::from_env")]
    pub fn from_env() -> crate::Result<Self> {
        let minutes = match std::env::var("SESSION_TTL_MINUTES") {
            Ok(minutes) => minutes
                .parse()
                .wrap_err("SESSION_TTL_MINUTES must be a whole number of minutes")?,
            Err(_) => DEFAULT_SESSION_TTL_MINUTES,
        };

        Ok(Self {
            idle_ttl: chrono::Duration::minutes(minutes),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub app: AppConfig,
    pub upstream: UpstreamConfig,
    pub http: reqwest::Client,
    pub recipe_client: RecipeClient,
    pub sessions: SessionRegistry,
    pub cookie_key: CookieKey,
}

impl AppState {
    #[instrument(name = "AppState::from_env", err)]
    pub fn from_env() -> crate::Result<Self> {
        let cookie_key = CookieKey::from_env_or_generate().wrap_err("Invalid COOKIE_KEY")?;

        Self::new(
            AppConfig::from_env()?,
            UpstreamConfig::from_env()?,
            SessionConfig::from_env()?,
            cookie_key,
        )
    }

    pub fn new(
        app: AppConfig,
        upstream: UpstreamConfig,
        sessions: SessionConfig,
        cookie_key: CookieKey,
    ) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ratatouille/", env!("CARGO_PKG_VERSION")))
            .build()
            .wrap_err("Failed to build HTTP client")?;

        let recipe_client = RecipeClient::with_client(http.clone(), app.app_url("/api/recipes"));

        Ok(Self {
            app,
            upstream,
            http,
            recipe_client,
            sessions: SessionRegistry::new(sessions.idle_ttl),
            cookie_key,
        })
    }
}
