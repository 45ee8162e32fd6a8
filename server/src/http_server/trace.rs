use std::time::Duration;

use axum::{extract::MatchedPath, http};
use recipes::client::{API_KEY_HEADER, MODEL_HEADER};
use tower_http::trace::{MakeSpan, OnResponse};
use tracing::{field::Empty, Level, Span};

/// Span and completion event for every request. The API key header is only
/// ever recorded as present or absent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestTracer;

fn header_value<'a, B>(request: &'a http::Request<B>, name: &str) -> Option<&'a str> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}

fn matched_route<B>(request: &http::Request<B>) -> &str {
    request
        .extensions()
        .get::<MatchedPath>()
        .map_or("", MatchedPath::as_str)
}

impl<B> MakeSpan<B> for RequestTracer {
    fn make_span(&mut self, request: &http::Request<B>) -> Span {
        let route = matched_route(request);

        tracing::span!(
            Level::INFO,
            "server.request",
            otel.name = format!("{} {route}", request.method()),
            http.request.method = %request.method(),
            http.route = route,
            url.path = request.uri().path(),
            url.query = request.uri().query(),
            user_agent.original = header_value(request, "user-agent"),
            recipes.provider = header_value(request, MODEL_HEADER),
            recipes.api_key_present = request.headers().contains_key(API_KEY_HEADER),
            session.cookie_present = request.headers().contains_key(http::header::COOKIE),
            http.response.status_code = Empty,
            latency_ms = Empty,
        )
    }
}

impl<B> OnResponse<B> for RequestTracer {
    fn on_response(self, response: &http::Response<B>, latency: Duration, span: &Span) {
        let status = response.status();
        let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);

        span.record("http.response.status_code", status.as_u16());
        span.record("latency_ms", latency_ms);

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), latency_ms, "request failed");
        } else {
            tracing::info!(status = status.as_u16(), latency_ms, "request finished");
        }
    }
}
