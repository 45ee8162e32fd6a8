use std::str::FromStr;

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::Form;
use maud::{html, Markup};
use recipes::{
    form::{MAX_RECIPE_COUNT, MIN_RECIPE_COUNT},
    DietaryTag, Difficulty, FormKey, KeyOutcome, RecipeClient, RecipeError, SearchForm,
};
use serde::Deserialize;
use tracing::instrument;

use crate::http_server::{
    session::BrowserSession,
    templates::{
        base,
        buttons::{ActionButton, LinkButton},
        recipe_views::recipe_cards,
    },
    ResponseResult,
};

const MISSING_KEY_REDIRECT: &str = "/settings?missing_key=true";
const SEARCH_IN_PROGRESS: &str = "A search is already in progress";

/// What the pressed button asked for. Every button on the search form
/// submits the whole form, so the draft is always saved first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchAction {
    AddIngredient,
    RemoveIngredient(usize),
    Increment,
    Decrement,
    Generate,
}

impl FromStr for SearchAction {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || RecipeError::UnknownValue {
            kind: "action",
            value: s.to_string(),
        };

        match s {
            "add_ingredient" => Ok(SearchAction::AddIngredient),
            "increment" => Ok(SearchAction::Increment),
            "decrement" => Ok(SearchAction::Decrement),
            "generate" => Ok(SearchAction::Generate),
            other => other
                .strip_prefix("remove_ingredient:")
                .and_then(|index| index.parse().ok())
                .map(SearchAction::RemoveIngredient)
                .ok_or_else(unknown),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchFormInput {
    #[serde(default)]
    dish_type: String,
    #[serde(default)]
    dietary: Vec<DietaryTag>,
    #[serde(default)]
    servings: String,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    recipe_count: String,
    #[serde(default)]
    pantry_input: String,
    #[serde(default)]
    action: String,
}

impl SearchFormInput {
    /// Copies the submitted fields onto the draft. Tags are not submitted as
    /// fields; they only change through the add and remove actions.
    fn apply_to(self, form: &mut SearchForm) {
        form.set_dish_type(self.dish_type);

        for tag in DietaryTag::ALL {
            form.set_dietary(tag, self.dietary.contains(&tag));
        }

        match self.servings.trim().parse::<i64>() {
            Ok(servings) => {
                if let Err(err) = form.set_servings(servings) {
                    tracing::debug!(error = %err, "Keeping previous servings");
                }
            }
            Err(_) => tracing::debug!(servings = %self.servings, "Ignoring non-numeric servings"),
        }

        if let Some(difficulty) = self.difficulty {
            form.set_difficulty(difficulty);
        }

        form.set_recipe_count_text(&self.recipe_count);

        if let KeyOutcome::TagCommitted { added } = form.set_pantry_input(self.pantry_input) {
            tracing::debug!(added, "Pantry input ended with a comma");
        }
    }
}

/// `GET /`
pub(crate) async fn search_page(session: BrowserSession) -> ResponseResult {
    let form = session.form();
    let error = session.take_error();
    let searching = session.is_searching();
    let recipes = session.cache().recipes().unwrap_or_default();
    let settings = session.settings();

    Ok(base(
        "Recipe Search",
        html! {
          (settings_summary(settings.active_provider().display_name(), settings.has_credential()))

          (search_form(&form, searching))

          @if searching {
            p class="notice" { "Loading..." }
          }
          @if let Some(error) = error {
            p class="error" { "Error: " (error) }
          }

          @if !recipes.is_empty() {
            (recipe_cards(&recipes))
          } @else if !searching {
            p class="notice" { "Enter a dish type to search for recipes." }
          }
        },
    )
    .into_response())
}

/// `POST /search`
#[instrument(name = "pages::search::submit", skip_all)]
pub(crate) async fn submit(
    session: BrowserSession,
    State(client): State<RecipeClient>,
    Form(input): Form<SearchFormInput>,
) -> ResponseResult {
    let action: SearchAction = input.action.parse()?;
    tracing::debug!(?action, "Search form submitted");

    let mut form = session.form();
    input.apply_to(&mut form);

    match action {
        SearchAction::AddIngredient => {
            form.commit_pantry_input();
        }
        SearchAction::RemoveIngredient(index) => {
            form.remove_pantry_ingredient(index);
        }
        SearchAction::Increment => form.adjust_recipe_count(1),
        SearchAction::Decrement => form.adjust_recipe_count(-1),
        SearchAction::Generate => {
            if form.handle_key(FormKey::Enter) == KeyOutcome::Submit {
                session.save_form(&form)?;
                return run_search(&session, &client, &form).await;
            }
        }
    }

    session.save_form(&form)?;

    Ok(Redirect::to("/").into_response())
}

async fn run_search(
    session: &BrowserSession,
    client: &RecipeClient,
    form: &SearchForm,
) -> ResponseResult {
    session.clear_error();

    let query = match form.to_query() {
        Ok(query) => query,
        Err(err) => {
            session.flash_error(err.to_string());
            return Ok(Redirect::to("/").into_response());
        }
    };

    let settings = session.settings();
    if !settings.has_credential() {
        return Ok(Redirect::to(MISSING_KEY_REDIRECT).into_response());
    }

    let Some(_in_flight) = session.begin_search() else {
        tracing::info!("Rejected overlapping search");
        session.flash_error(SEARCH_IN_PROGRESS);
        return Ok(Redirect::to("/").into_response());
    };

    match client.search(&query, &settings.credential()).await {
        Ok(recipes) => {
            session.cache().store(&recipes, form)?;
            // Drops any rejection flashed by an overlapping submit.
            session.clear_error();
        }
        Err(err) if err.is_credential() => {
            return Ok(Redirect::to(MISSING_KEY_REDIRECT).into_response());
        }
        Err(err) => session.flash_error(err.to_string()),
    }

    Ok(Redirect::to("/").into_response())
}

fn settings_summary(provider: &str, has_key: bool) -> Markup {
    html! {
      div class="settings-summary" {
        span { "Provider: " strong { (provider) } }
        span {
          @if has_key { "API key saved" } @else { "No API key yet" }
        }
        (LinkButton::secondary(html! { "Settings" }, "/settings"))
      }
    }
}

fn search_form(form: &SearchForm, searching: bool) -> Markup {
    let count = form.recipe_count();

    html! {
      form class="panel search-form" method="post" action="/search" {
        // First submit button in the form, so Enter in any text field generates.
        button class="default-action" type="submit" name="action" value="generate" tabindex="-1" aria-hidden="true" {}

        div class="field" {
          input
            class="dish-type"
            type="text"
            name="dish_type"
            value=(form.dish_type())
            placeholder="What would you like to cook?";
        }

        div class="field" {
          label for="pantry_input" { "Pantry Ingredients" }
          div class="inline" {
            input
              id="pantry_input"
              type="text"
              name="pantry_input"
              value=(form.pantry_input())
              placeholder="Type ingredient and press Enter";
            (ActionButton::secondary(html! { "Add" }, "add_ingredient"))
          }
          p class="hint" { "Add ingredients from your pantry to use in recipes" }

          @if !form.pantry_ingredients().is_empty() {
            div class="tags" {
              @for (index, ingredient) in form.pantry_ingredients().iter().enumerate() {
                span class="tag" {
                  (ingredient)
                  (ActionButton::secondary(html! { "×" }, format!("remove_ingredient:{index}"))
                    .aria_label(format!("Remove {ingredient}")))
                }
              }
            }
          }
        }

        fieldset class="field" {
          legend { "Dietary Preferences" }
          div class="options" {
            @for tag in DietaryTag::ALL {
              label {
                input type="checkbox" name="dietary" value=(tag.label()) checked[form.has_dietary(tag)];
                span class="capitalize" { (tag.label()) }
              }
            }
          }
        }

        div class="columns" {
          div class="field" {
            label for="servings" { "Servings" }
            input id="servings" type="number" name="servings" value=(form.servings()) min="1" required;
          }

          div class="field" {
            label for="difficulty" { "Difficulty" }
            select id="difficulty" name="difficulty" {
              @for difficulty in Difficulty::ALL {
                option value=(difficulty.as_str()) selected[form.difficulty() == difficulty] {
                  (difficulty.display_name())
                }
              }
            }
          }
        }

        div class="field" {
          label for="recipe_count" { "Number of Recipes (" (MIN_RECIPE_COUNT) "-" (MAX_RECIPE_COUNT) ")" }
          div class="stepper" {
            (ActionButton::secondary(html! { "-" }, "decrement").disabled(count <= MIN_RECIPE_COUNT))
            input id="recipe_count" type="number" name="recipe_count" value=(count) min=(MIN_RECIPE_COUNT) max=(MAX_RECIPE_COUNT);
            (ActionButton::secondary(html! { "+" }, "increment").disabled(count >= MAX_RECIPE_COUNT))
          }
        }

        (ActionButton::primary(html! { "Generate Recipes" }, "generate").disabled(searching))
      }
    }
}
