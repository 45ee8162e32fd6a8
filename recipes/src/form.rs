use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    types::{DietaryTag, Difficulty, SearchQuery},
    RecipeError,
};

pub const MIN_RECIPE_COUNT: u8 = 1;
pub const MAX_RECIPE_COUNT: u8 = 10;

const DEFAULT_SERVINGS: u32 = 4;
const DEFAULT_RECIPE_COUNT: u8 = 3;

/// Keys that can commit the pantry input buffer as a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKey {
    Enter,
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The buffer was non-empty and was consumed as a tag. `added` is false
    /// when the tag was already present and the list did not change.
    TagCommitted { added: bool },
    /// Enter on an empty buffer submits the form.
    Submit,
    Ignored,
}

/// Editable state behind the search page.
///
/// Stored in session storage as `formData`, so the field names follow the
/// camelCase shape the form has always been saved in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchForm {
    dish_type: String,
    dietary: BTreeSet<DietaryTag>,
    #[serde(deserialize_with = "deserialize_servings")]
    servings: u32,
    difficulty: Difficulty,
    #[serde(deserialize_with = "deserialize_recipe_count")]
    recipe_count: u8,
    #[serde(rename = "pantryIngredientsArray")]
    pantry_ingredients: Vec<String>,
    #[serde(rename = "pantryIngredients")]
    pantry_input: String,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            dish_type: String::new(),
            dietary: BTreeSet::new(),
            servings: DEFAULT_SERVINGS,
            difficulty: Difficulty::default(),
            recipe_count: DEFAULT_RECIPE_COUNT,
            pantry_ingredients: Vec::new(),
            pantry_input: String::new(),
        }
    }
}

impl SearchForm {
    pub fn dish_type(&self) -> &str {
        &self.dish_type
    }

    pub fn set_dish_type(&mut self, dish_type: impl Into<String>) {
        self.dish_type = dish_type.into();
    }

    pub fn dietary(&self) -> &BTreeSet<DietaryTag> {
        &self.dietary
    }

    pub fn has_dietary(&self, tag: DietaryTag) -> bool {
        self.dietary.contains(&tag)
    }

    /// Flips `tag` and returns whether it is now selected.
    pub fn toggle_dietary(&mut self, tag: DietaryTag) -> bool {
        if self.dietary.remove(&tag) {
            false
        } else {
            self.dietary.insert(tag);
            true
        }
    }

    pub fn set_dietary(&mut self, tag: DietaryTag, selected: bool) {
        if selected != self.has_dietary(tag) {
            self.toggle_dietary(tag);
        }
    }

    pub fn servings(&self) -> u32 {
        self.servings
    }

    pub fn set_servings(&mut self, servings: i64) -> Result<(), RecipeError> {
        let servings = u32::try_from(servings)
            .ok()
            .filter(|s| *s >= 1)
            .ok_or_else(|| RecipeError::InvalidForm("Servings must be at least 1".to_string()))?;

        self.servings = servings;
        Ok(())
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn recipe_count(&self) -> u8 {
        self.recipe_count
    }

    pub fn set_recipe_count(&mut self, count: i64) {
        self.recipe_count = clamp_recipe_count(count);
    }

    pub fn adjust_recipe_count(&mut self, delta: i64) {
        self.set_recipe_count(i64::from(self.recipe_count).saturating_add(delta));
    }

    /// Direct entry from the number input. Anything that is not an integer
    /// counts as 1.
    pub fn set_recipe_count_text(&mut self, text: &str) {
        let count = text.trim().parse::<i64>().unwrap_or(1);
        self.set_recipe_count(count);
    }

    pub fn pantry_ingredients(&self) -> &[String] {
        &self.pantry_ingredients
    }

    pub fn pantry_input(&self) -> &str {
        &self.pantry_input
    }

    /// Replaces the pantry input buffer. Text ending in a comma behaves like
    /// typing the comma key: what came before it is committed as a tag.
    pub fn set_pantry_input(&mut self, text: impl Into<String>) -> KeyOutcome {
        let text = text.into();
        let ends_with_separator = text.trim_end().ends_with(',');

        self.pantry_input = text;

        if ends_with_separator {
            self.handle_key(FormKey::Comma)
        } else {
            KeyOutcome::Ignored
        }
    }

    pub fn handle_key(&mut self, key: FormKey) -> KeyOutcome {
        if !self.pantry_input.trim().is_empty() {
            let added = self.commit_pantry_input();
            return KeyOutcome::TagCommitted { added };
        }

        match key {
            FormKey::Enter => KeyOutcome::Submit,
            FormKey::Comma => KeyOutcome::Ignored,
        }
    }

    /// Moves the input buffer into the tag list. The buffer is only cleared
    /// when a tag was actually added; empty and duplicate input stays put.
    pub fn commit_pantry_input(&mut self) -> bool {
        let ingredient = normalize_ingredient(&self.pantry_input);

        if ingredient.is_empty() || self.pantry_ingredients.iter().any(|i| i == ingredient) {
            return false;
        }

        self.pantry_ingredients.push(ingredient.to_string());
        self.pantry_input.clear();
        true
    }

    pub fn remove_pantry_ingredient(&mut self, index: usize) -> Option<String> {
        if index < self.pantry_ingredients.len() {
            Some(self.pantry_ingredients.remove(index))
        } else {
            None
        }
    }

    /// Validates the form into a query. An empty dish type is rejected here,
    /// before anything touches the network.
    pub fn to_query(&self) -> Result<SearchQuery, RecipeError> {
        let dish_type = self.dish_type.trim();
        if dish_type.is_empty() {
            return Err(RecipeError::InvalidForm(
                "Please enter a dish type".to_string(),
            ));
        }

        Ok(SearchQuery {
            dish_type: dish_type.to_string(),
            dietary: self.dietary.clone(),
            servings: self.servings,
            difficulty: self.difficulty,
            recipe_count: self.recipe_count,
            pantry_ingredients: self.pantry_ingredients.clone(),
        })
    }
}

fn normalize_ingredient(raw: &str) -> &str {
    raw.trim().trim_end_matches(',').trim_end()
}

fn clamp_recipe_count(count: i64) -> u8 {
    let clamped = count.clamp(i64::from(MIN_RECIPE_COUNT), i64::from(MAX_RECIPE_COUNT));
    u8::try_from(clamped).unwrap_or(MIN_RECIPE_COUNT)
}

fn deserialize_recipe_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let count = i64::deserialize(deserializer)?;
    Ok(clamp_recipe_count(count))
}

fn deserialize_servings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let servings = i64::deserialize(deserializer)?;
    Ok(u32::try_from(servings.max(1)).unwrap_or(DEFAULT_SERVINGS))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn recipe_count_is_clamped_on_direct_entry() {
        let mut form = SearchForm::default();

        form.set_recipe_count(-5);
        assert_eq!(form.recipe_count(), 1);

        form.set_recipe_count(57);
        assert_eq!(form.recipe_count(), 10);

        form.set_recipe_count(7);
        assert_eq!(form.recipe_count(), 7);
    }

    #[test]
    fn recipe_count_is_clamped_on_increment_and_decrement() {
        let mut form = SearchForm::default();

        for _ in 0..20 {
            form.adjust_recipe_count(1);
        }
        assert_eq!(form.recipe_count(), MAX_RECIPE_COUNT);

        form.adjust_recipe_count(-100);
        assert_eq!(form.recipe_count(), MIN_RECIPE_COUNT);

        form.adjust_recipe_count(i64::MIN);
        assert_eq!(form.recipe_count(), MIN_RECIPE_COUNT);
    }

    #[test]
    fn unparseable_recipe_count_text_becomes_one() {
        let mut form = SearchForm::default();

        form.set_recipe_count_text("abc");
        assert_eq!(form.recipe_count(), 1);

        form.set_recipe_count_text(" 12 ");
        assert_eq!(form.recipe_count(), 10);
    }

    #[test]
    fn pantry_tag_is_trimmed_and_buffer_cleared() {
        let mut form = SearchForm::default();

        form.set_pantry_input("  basil,  ");

        assert_eq!(form.pantry_ingredients(), ["basil"]);
        assert_eq!(form.pantry_input(), "");
    }

    #[test]
    fn duplicate_pantry_tag_is_a_noop() {
        let mut form = SearchForm::default();
        form.set_pantry_input("garlic");
        assert_eq!(
            form.handle_key(FormKey::Enter),
            KeyOutcome::TagCommitted { added: true }
        );

        form.set_pantry_input("garlic");
        assert_eq!(
            form.handle_key(FormKey::Enter),
            KeyOutcome::TagCommitted { added: false }
        );

        assert_eq!(form.pantry_ingredients(), ["garlic"]);
    }

    #[test]
    fn duplicate_detection_is_case_sensitive() {
        let mut form = SearchForm::default();
        form.set_pantry_input("Garlic,");
        form.set_pantry_input("garlic,");

        assert_eq!(form.pantry_ingredients(), ["Garlic", "garlic"]);
    }

    #[test]
    fn enter_submits_only_when_buffer_is_empty() {
        let mut form = SearchForm::default();

        assert_eq!(form.handle_key(FormKey::Enter), KeyOutcome::Submit);
        assert_eq!(form.handle_key(FormKey::Comma), KeyOutcome::Ignored);

        form.set_pantry_input("   ");
        assert_eq!(form.handle_key(FormKey::Enter), KeyOutcome::Submit);

        form.set_pantry_input("rice");
        assert_eq!(
            form.handle_key(FormKey::Enter),
            KeyOutcome::TagCommitted { added: true }
        );
    }

    #[test]
    fn removing_tags_by_position() {
        let mut form = SearchForm::default();
        for tag in ["a,", "b,", "c,"] {
            form.set_pantry_input(tag);
        }

        assert_eq!(form.remove_pantry_ingredient(1), Some("b".to_string()));
        assert_eq!(form.remove_pantry_ingredient(9), None);
        assert_eq!(form.pantry_ingredients(), ["a", "c"]);
    }

    #[test]
    fn servings_rejects_non_positive() {
        let mut form = SearchForm::default();

        assert!(form.set_servings(0).is_err());
        assert!(form.set_servings(-3).is_err());
        assert_eq!(form.servings(), 4);

        form.set_servings(2).unwrap();
        assert_eq!(form.servings(), 2);
    }

    #[test]
    fn dietary_toggle_keeps_a_set() {
        let mut form = SearchForm::default();

        assert!(form.toggle_dietary(DietaryTag::Vegan));
        form.set_dietary(DietaryTag::Vegan, true);
        assert_eq!(form.dietary().len(), 1);

        assert!(!form.toggle_dietary(DietaryTag::Vegan));
        assert!(form.dietary().is_empty());
    }

    #[test]
    fn empty_dish_type_is_rejected_before_sending() {
        let mut form = SearchForm::default();
        form.set_dish_type("   ");

        assert!(matches!(form.to_query(), Err(RecipeError::InvalidForm(_))));

        form.set_dish_type(" tacos ");
        let query = form.to_query().unwrap();
        assert_eq!(query.dish_type(), "tacos");
        assert_eq!(query.recipe_count(), 3);
    }

    #[test]
    fn query_serializes_to_the_proxy_wire_shape() {
        let mut form = SearchForm::default();
        form.set_dish_type("tacos");
        form.toggle_dietary(DietaryTag::Vegetarian);
        form.toggle_dietary(DietaryTag::GlutenFree);
        form.set_difficulty(Difficulty::Easy);
        form.set_pantry_input("beans,");

        let query = form.to_query().unwrap();
        let body = serde_json::to_value(query.to_request()).unwrap();

        assert_eq!(
            body,
            json!({
                "dishType": "tacos",
                "preferences": {
                    "dietary": ["gluten free", "vegetarian"],
                    "servings": 4,
                    "difficulty": "easy",
                    "recipeCount": 3,
                    "pantryIngredients": ["beans"]
                }
            })
        );
    }

    #[test]
    fn stored_form_is_reclamped_when_loaded() {
        let form: SearchForm = serde_json::from_value(json!({
            "dishType": "soup",
            "servings": 0,
            "recipeCount": 99
        }))
        .unwrap();

        assert_eq!(form.dish_type(), "soup");
        assert_eq!(form.servings(), 1);
        assert_eq!(form.recipe_count(), 10);
        assert_eq!(form.difficulty(), Difficulty::Medium);
    }
}
