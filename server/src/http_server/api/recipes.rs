use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use recipes::client::{API_KEY_HEADER, MODEL_HEADER};
use serde_json::{json, Value};
use tracing::instrument;

use crate::{http_server::errors::ApiError, state::UpstreamConfig};

const DEFAULT_PROVIDER: &str = "openai";

/// `POST /api/recipes`
///
/// Forwards the search body to the recipe service with the caller's
/// provider and key attached as `llmConfig`. The upstream body is returned
/// untouched on success.
#[instrument(
    name = "api::recipes::generate",
    skip_all,
    fields(provider = tracing::field::Empty)
)]
pub(crate) async fn generate(
    State(upstream): State<UpstreamConfig>,
    State(client): State<reqwest::Client>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let url = upstream
        .generate_url()
        .ok_or(ApiError::MissingConfiguration)?;

    let provider = header_str(&headers, MODEL_HEADER)
        .unwrap_or(DEFAULT_PROVIDER)
        .to_string();
    tracing::Span::current().record("provider", provider.as_str());

    let api_key = header_str(&headers, API_KEY_HEADER).ok_or(ApiError::MissingApiKey)?;

    let mut payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Unexpected(format!("Invalid request body: {e}")))?;
    let Some(fields) = payload.as_object_mut() else {
        return Err(ApiError::Unexpected(
            "Request body must be a JSON object".to_string(),
        ));
    };
    fields.insert(
        "llmConfig".to_string(),
        json!({ "model": provider, "apiKey": api_key }),
    );

    let response = client
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| ApiError::Unexpected(format!("Failed to reach recipe service: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_owned))
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("Failed to fetch recipes from {provider} API"));

        return Err(ApiError::Upstream {
            provider,
            status: status.as_u16(),
            message,
        });
    }

    let recipes = response
        .json::<Value>()
        .await
        .map_err(|e| ApiError::Unexpected(format!("Invalid response from recipe service: {e}")))?;

    tracing::info!(%status, "Recipe service answered");

    Ok(Json(recipes))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}
