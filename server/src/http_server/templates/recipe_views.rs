use maud::{html, Markup};
use recipes::{Recipe, Scalar};

use super::buttons::LinkButton;

fn scalar(value: Option<&Scalar>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

pub fn recipe_cards(recipes: &[Recipe]) -> Markup {
    html! {
      div class="recipe-grid" {
        @for (index, recipe) in recipes.iter().enumerate() {
          div class="recipe-card" {
            h2 { (recipe.title) }
            p class="muted" { (recipe.description) }
            a href=(format!("/recipe/{index}")) { "View Recipe" }
          }
        }
      }
    }
}

pub fn recipe_detail(recipe: &Recipe) -> Markup {
    let nutrition = &recipe.nutritional_info;

    html! {
      article class="panel" {
        h1 { (recipe.title) }
        p class="muted description" { (recipe.description) }

        section {
          h2 { "Ingredients" }
          ul {
            @for ingredient in &recipe.ingredients {
              li { (ingredient.to_string()) }
            }
          }
        }

        section {
          h2 { "Steps" }
          ol {
            @for step in &recipe.steps {
              li { (step) }
            }
          }
        }

        section {
          h2 { "Additional Information" }
          p { strong { "Servings:" } " " (scalar(recipe.servings.as_ref())) }
          p { strong { "Prep Time:" } " " (scalar(recipe.prep_time.as_ref())) }
          p { strong { "Cook Time:" } " " (scalar(recipe.cook_time.as_ref())) }
          p { strong { "Total Time:" } " " (scalar(recipe.total_time.as_ref())) " minutes" }
          p { strong { "Difficulty:" } " " (scalar(recipe.difficulty.as_ref())) }
          p { strong { "Dietary Info:" } " " (scalar(recipe.dietary_info.as_ref())) }
        }

        section {
          h2 { "Nutritional Information" }
          p { strong { "Calories:" } " " (scalar(nutrition.calories.as_ref())) " kcal" }
          p { strong { "Protein:" } " " (scalar(nutrition.protein.as_ref())) }
          p { strong { "Fat:" } " " (scalar(nutrition.fat.as_ref())) }
          p { strong { "Carbohydrates:" } " " (scalar(nutrition.carbohydrates.as_ref())) }
          p { strong { "Sugar:" } " " (scalar(nutrition.sugar.as_ref())) }
        }

        (LinkButton::secondary(html! { "Back to Search" }, "/"))
      }
    }
}

pub fn recipe_not_found() -> Markup {
    html! {
      div class="panel centered" {
        p class="error" { "Recipe not found." }
        (LinkButton::secondary(html! { "Back to Search" }, "/"))
      }
    }
}

#[cfg(test)]
mod tests {
    use recipes::{Ingredient, NutritionalInfo};

    use super::*;

    #[test]
    fn detail_renders_every_field() {
        let recipe = Recipe {
            title: "Fish Tacos".into(),
            description: "Crispy & bright".into(),
            ingredients: vec![Ingredient {
                amount: Some(Scalar::Integer(2)),
                unit: Some(Scalar::Text("tbsp".into())),
                item: "lime juice".into(),
            }],
            steps: vec!["Fry the fish".into(), "Assemble".into()],
            total_time: Some(Scalar::Integer(35)),
            nutritional_info: NutritionalInfo {
                calories: Some(Scalar::Integer(420)),
                ..NutritionalInfo::default()
            },
            ..Recipe::default()
        };

        let html = recipe_detail(&recipe).into_string();

        assert!(html.contains("Fish Tacos"));
        assert!(html.contains("Crispy &amp; bright"));
        assert!(html.contains("<li>2tbsp lime juice</li>"));
        assert!(html.contains("<li>Assemble</li>"));
        assert!(html.contains("35 minutes"));
        assert!(html.contains("420 kcal"));
        assert!(html.contains("Back to Search"));
    }

    #[test]
    fn cards_link_to_their_index() {
        let recipes = vec![
            Recipe {
                title: "First".into(),
                ..Recipe::default()
            },
            Recipe {
                title: "Second".into(),
                ..Recipe::default()
            },
        ];

        let html = recipe_cards(&recipes).into_string();

        assert!(html.contains(r#"href="/recipe/1""#));
        assert_eq!(html.matches("View Recipe").count(), 2);
    }
}
