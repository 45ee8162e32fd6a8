use std::fmt::{Debug, Display};

use axum::{http::StatusCode, response::IntoResponse, Json};
use miette::{Diagnostic, NarratableReportHandler};
use recipes::RecipeError;
use serde_json::json;
use thiserror::Error;

/// Failures of the `/api/recipes` proxy route. Every variant renders as
/// `{ "message": ... }` so the client can surface it as-is.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API URL not configured")]
    MissingConfiguration,

    #[error("API key is required")]
    MissingApiKey,

    #[error("{message}")]
    Upstream {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingApiKey => StatusCode::BAD_REQUEST,
            ApiError::MissingConfiguration
            | ApiError::Upstream { .. }
            | ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            ApiError::MissingConfiguration | ApiError::Unexpected(_) => {
                sentry::capture_error(&self);
                tracing::error!(error = %self, "Recipe proxy failed");
            }
            ApiError::MissingApiKey => {
                tracing::info!("Rejected recipe request without an API key");
            }
            ApiError::Upstream {
                provider, status, ..
            } => {
                tracing::warn!(
                    %provider,
                    status,
                    error = %self,
                    "Recipe service returned an error"
                );
            }
        }

        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[derive(Diagnostic, Error)]
pub struct MietteError(pub(crate) miette::Report, pub(crate) StatusCode);

impl Display for MietteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handler = NarratableReportHandler::new();

        handler.render_report(f, &*self.0)
    }
}

impl Debug for MietteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Status Code: {}\n", self.1))?;
        f.write_str("MietteError: \n")?;

        Display::fmt(self, f)
    }
}

impl IntoResponse for MietteError {
    fn into_response(self) -> axum::response::Response {
        if self.1.is_server_error() {
            sentry::capture_error(&self);
            tracing::error!(error = ?self, "MietteError");
        } else {
            tracing::info!(status = %self.1, error = %self.0, "Request failed");
        }

        (self.1, self.0.to_string()).into_response()
    }
}

impl From<miette::Report> for MietteError {
    fn from(err: miette::Report) -> Self {
        MietteError(err, StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<RecipeError> for MietteError {
    fn from(err: RecipeError) -> Self {
        let status = match &err {
            RecipeError::NotFound => StatusCode::NOT_FOUND,
            RecipeError::InvalidForm(_)
            | RecipeError::MissingCredential(_)
            | RecipeError::UnknownValue { .. } => StatusCode::BAD_REQUEST,
            RecipeError::Upstream(_) | RecipeError::Network(_) => StatusCode::BAD_GATEWAY,
            RecipeError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        MietteError(miette::Report::new(err), status)
    }
}
