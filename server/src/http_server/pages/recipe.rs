use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use recipes::RecipeError;

use crate::http_server::{
    session::BrowserSession,
    templates::{
        base,
        recipe_views::{recipe_detail, recipe_not_found},
    },
};

/// `GET /recipe/{index}`. Reads only from the session's cached results; a
/// detail view never triggers a new search.
pub(crate) async fn recipe_page(session: BrowserSession, Path(index): Path<String>) -> Response {
    let recipe = index
        .parse::<usize>()
        .map_err(|_| RecipeError::NotFound)
        .and_then(|index| session.cache().get_by_index(index));

    match recipe {
        Ok(recipe) => base(&recipe.title, recipe_detail(&recipe)).into_response(),
        Err(err) => {
            tracing::debug!(%index, error = %err, "Recipe not in session cache");

            (
                StatusCode::NOT_FOUND,
                base("Recipe not found", recipe_not_found()),
            )
                .into_response()
        }
    }
}
