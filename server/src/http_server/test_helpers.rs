use std::collections::BTreeMap;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use serde::de::DeserializeOwned;
use tower::ServiceExt;
use url::Url;

use crate::{
    http_server::{cookies::CookieKey, make_app},
    state::{SessionConfig, UpstreamConfig},
    AppConfig, AppState,
};

/// Builds the full app without reading the environment. `upstream` is the
/// recipe service base URL; `app_base` is where the app's own recipe client
/// sends searches, which tests point at a mock of `/api/recipes`.
pub fn create_test_app(upstream: Option<&str>, app_base: Option<&str>) -> Router {
    let app = AppConfig {
        base_url: Url::parse(app_base.unwrap_or("http://localhost:3000")).unwrap(),
        port: 0,
    };
    let upstream = UpstreamConfig {
        recipe_api_url: upstream.map(|url| Url::parse(url).unwrap()),
    };

    let state = AppState::new(
        app,
        upstream,
        SessionConfig::default(),
        CookieKey::generate(),
    )
    .unwrap();

    make_app(state)
}

pub async fn response_body_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

pub async fn response_body_text(response: Response<Body>) -> String {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body_bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Drives the app like a single browser: cookies set by one response are
/// sent with every following request. A clone acts as another tab of the
/// same browser.
#[derive(Clone)]
pub struct TestBrowser {
    app: Router,
    cookies: BTreeMap<String, String>,
}

impl TestBrowser {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            cookies: BTreeMap::new(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().method("GET").uri(uri), Body::empty())
            .await
    }

    pub async fn get_text(&mut self, uri: &str) -> String {
        response_body_text(self.get(uri).await).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(form.to_string()),
        )
        .await
    }

    async fn send(
        &mut self,
        mut builder: axum::http::request::Builder,
        body: Body,
    ) -> Response<Body> {
        if !self.cookies.is_empty() {
            let cookie_header = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie_header);
        }

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        for set_cookie in response.headers().get_all(header::SET_COOKIE) {
            let set_cookie = set_cookie.to_str().unwrap();
            let pair = set_cookie.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };

            if value.is_empty() || set_cookie.contains("Max-Age=0") {
                self.cookies.remove(name.trim());
            } else {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }

        response
    }
}
