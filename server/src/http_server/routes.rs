use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::{api, pages, templates, APP_STYLES};
use crate::AppState;

pub(crate) fn make_router() -> Router<AppState> {
    Router::new()
        .route("/styles/app.css", get(styles))
        .route("/", get(pages::search::search_page))
        .route("/search", post(pages::search::submit))
        .route("/recipe/{index}", get(pages::recipe::recipe_page))
        .route("/settings", get(pages::settings::settings_page))
        .route("/settings/provider", post(pages::settings::select_provider))
        .route("/settings/api-key", post(pages::settings::save_api_key))
        .route("/api/recipes", post(api::recipes::generate))
        .fallback(fallback)
}

async fn styles() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], APP_STYLES)
}

async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        templates::base(
            "Not found",
            maud::html! {
              div class="panel centered" {
                p { "Nothing lives here." }
                a href="/" { "Back to Search" }
              }
            },
        ),
    )
}
