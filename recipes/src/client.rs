use serde::Deserialize;
use tracing::{info, instrument, warn};
use url::Url;

use crate::{
    types::{ProviderCredential, Recipe, SearchQuery},
    RecipeError,
};

pub const MODEL_HEADER: &str = "X-LLM-Model";
pub const API_KEY_HEADER: &str = "X-API-Key";

const FALLBACK_ERROR: &str = "Failed to fetch recipes";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the app's own `POST /api/recipes` proxy route.
#[derive(Debug, Clone)]
pub struct RecipeClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl RecipeClient {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one search and waits for the whole answer. Nothing is retried.
    ///
    /// An unconfigured credential fails before any request is made.
    #[instrument(
        name = "RecipeClient::search",
        skip_all,
        fields(provider = %credential.provider, dish_type = query.dish_type()),
        err
    )]
    pub async fn search(
        &self,
        query: &SearchQuery,
        credential: &ProviderCredential,
    ) -> Result<Vec<Recipe>, RecipeError> {
        if !credential.is_configured() {
            return Err(RecipeError::MissingCredential(credential.provider));
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(MODEL_HEADER, credential.provider.as_str())
            .header(API_KEY_HEADER, &credential.api_key)
            .json(&query.to_request())
            .send()
            .await
            .map_err(RecipeError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| FALLBACK_ERROR.to_string());

            warn!(%status, %message, "Recipe search failed");

            return Err(RecipeError::Upstream(message));
        }

        let recipes = response.json::<Vec<Recipe>>().await.map_err(|e| {
            if e.is_decode() {
                RecipeError::Upstream("The recipe service returned an unexpected response".into())
            } else {
                RecipeError::Network(e)
            }
        })?;

        info!(count = recipes.len(), "Received recipes");

        Ok(recipes)
    }
}
