use std::net::SocketAddr;

use axum::{response::Response, Router};
use color_eyre::eyre::WrapErr;
use tokio::net::TcpListener;
use tower_cookies::CookieManagerLayer;

use crate::AppState;
use errors::MietteError;

pub(crate) mod cmd;
pub(crate) mod cookies;
pub(crate) mod session;

pub(crate) mod api {
    pub mod recipes;
}

pub(crate) mod pages {
    pub mod recipe;
    pub mod search;
    pub mod settings;
}

mod config;
pub mod errors;
pub(crate) mod routes;
mod templates;
mod trace;

#[cfg(test)]
pub(crate) mod test_helpers;

const APP_STYLES: &str = include_str!("../../static/app.css");

pub(crate) type ResponseResult<T = Response> = Result<T, MietteError>;

/// The full application: routes, state and the layers every request passes
/// through.
pub(crate) fn make_app(state: AppState) -> Router {
    let tracer = trace::RequestTracer;
    let trace_layer = tower_http::trace::TraceLayer::new_for_http()
        .make_span_with(tracer)
        .on_response(tracer);

    routes::make_router()
        .with_state(state)
        .layer(trace_layer)
        .layer(CookieManagerLayer::new())
}

pub(crate) async fn run_server(app: Router, port: u16) -> crate::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("Starting server on port {}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err("Failed to open port")?;

    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .wrap_err("Failed to run server")
}
