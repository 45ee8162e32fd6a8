use miette::Diagnostic;
use thiserror::Error;

use crate::types::ProviderId;

#[derive(Debug, Error, Diagnostic)]
pub enum RecipeError {
    #[error("Please add your {} API key in settings", .0.display_name())]
    #[diagnostic(
        code(recipes::missing_credential),
        help("Open the settings page and paste an API key for the selected provider")
    )]
    MissingCredential(ProviderId),

    #[error("{0}")]
    #[diagnostic(code(recipes::invalid_form))]
    InvalidForm(String),

    /// The recipe service answered but refused the request. The message is
    /// the service's own when it sent one.
    #[error("{0}")]
    #[diagnostic(code(recipes::upstream))]
    Upstream(String),

    #[error("Network error: unable to reach the recipe service")]
    #[diagnostic(code(recipes::network))]
    Network(#[source] reqwest::Error),

    #[error("Recipe not found.")]
    #[diagnostic(code(recipes::not_found))]
    NotFound,

    #[error("Unknown {kind}: {value}")]
    #[diagnostic(code(recipes::unknown_value))]
    UnknownValue { kind: &'static str, value: String },

    #[error("Failed to serialize cached state")]
    #[diagnostic(code(recipes::serialization))]
    Serialization(#[from] serde_json::Error),
}

impl RecipeError {
    pub fn is_credential(&self) -> bool {
        matches!(self, RecipeError::MissingCredential(_))
    }
}
