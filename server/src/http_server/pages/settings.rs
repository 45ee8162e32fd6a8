use axum::{
    extract::Query,
    response::{IntoResponse, Redirect},
    Form,
};
use maud::html;
use recipes::{ProviderId, RecipeError};
use serde::Deserialize;

use crate::http_server::{
    session::BrowserSession,
    templates::{base, buttons::LinkButton},
    ResponseResult,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SettingsQuery {
    #[serde(default)]
    reveal: bool,
    #[serde(default)]
    missing_key: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProviderForm {
    provider: ProviderId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiKeyForm {
    #[serde(default)]
    api_key: String,
}

/// `GET /settings`
pub(crate) async fn settings_page(
    session: BrowserSession,
    Query(query): Query<SettingsQuery>,
) -> ResponseResult {
    let settings = session.settings();
    let active = settings.active_provider();

    let (key_input_type, toggle_href, toggle_label) = if query.reveal {
        ("text", "/settings", "Hide key")
    } else {
        ("password", "/settings?reveal=true", "Show key")
    };

    Ok(base(
        "Settings",
        html! {
          div class="panel" {
            h1 { "Model Settings" }

            @if query.missing_key && !settings.has_credential() {
              p class="error" { (RecipeError::MissingCredential(active).to_string()) }
            }

            form method="post" action="/settings/provider" {
              p { "Select LLM provider:" }
              div class="options" {
                @for provider in ProviderId::ALL {
                  label class="provider" {
                    input
                      type="radio"
                      name="provider"
                      value=(provider.as_str())
                      checked[provider == active];
                    span { (provider.display_name()) }
                  }
                }
              }
              button class="button button-secondary" type="submit" { "Use provider" }
            }

            form method="post" action="/settings/api-key" {
              label for="api_key" { "API Key" }
              div class="inline" {
                input
                  id="api_key"
                  type=(key_input_type)
                  name="api_key"
                  value=(settings.api_key())
                  placeholder=(format!("Enter your {} API key", active.display_name()))
                  autocomplete="off";
                a href=(toggle_href) { (toggle_label) }
              }
              p class="hint" {
                "Your API key is kept in an encrypted cookie in this browser and only sent along with your own searches"
              }
              button class="button button-primary" type="submit" { "Save key" }
            }

            (LinkButton::secondary(html! { "Back to Search" }, "/"))
          }
        },
    )
    .into_response())
}

/// `POST /settings/provider`
pub(crate) async fn select_provider(
    session: BrowserSession,
    Form(form): Form<ProviderForm>,
) -> impl IntoResponse {
    session.settings().select_provider(form.provider);
    tracing::info!(provider = %form.provider, "Provider selected");

    Redirect::to("/settings")
}

/// `POST /settings/api-key`. Saves the key for whichever provider is active.
pub(crate) async fn save_api_key(
    session: BrowserSession,
    Form(form): Form<ApiKeyForm>,
) -> impl IntoResponse {
    let mut settings = session.settings();
    settings.set_api_key(form.api_key);
    tracing::info!(provider = %settings.active_provider(), "API key updated");

    Redirect::to("/settings")
}
