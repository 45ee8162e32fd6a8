use axum::extract::FromRef;
use recipes::RecipeClient;

use crate::{state::UpstreamConfig, AppState};

impl FromRef<AppState> for UpstreamConfig {
    fn from_ref(state: &AppState) -> Self {
        state.upstream.clone()
    }
}

impl FromRef<AppState> for reqwest::Client {
    fn from_ref(state: &AppState) -> Self {
        state.http.clone()
    }
}

impl FromRef<AppState> for RecipeClient {
    fn from_ref(state: &AppState) -> Self {
        state.recipe_client.clone()
    }
}
