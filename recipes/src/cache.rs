use tracing::warn;

use crate::{form::SearchForm, storage::Storage, types::Recipe, RecipeError};

pub const RECIPES_KEY: &str = "recipes";
pub const FORM_DATA_KEY: &str = "formData";

/// The last successful search: recipes in the order the service returned
/// them, plus the form that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeResultSet {
    pub recipes: Vec<Recipe>,
    pub source_form: SearchForm,
}

/// Session-scoped cache of the last result set, so list and detail pages can
/// render without another round trip.
#[derive(Debug, Clone)]
pub struct ResultCache<S> {
    storage: S,
}

impl<S: Storage> ResultCache<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Replaces whatever was cached before.
    pub fn store(&self, recipes: &[Recipe], form: &SearchForm) -> Result<(), RecipeError> {
        let recipes = serde_json::to_string(recipes)?;
        let form = serde_json::to_string(form)?;

        self.storage.set(RECIPES_KEY, recipes);
        self.storage.set(FORM_DATA_KEY, form);

        Ok(())
    }

    pub fn load(&self) -> Option<RecipeResultSet> {
        let recipes = self.recipes()?;
        let source_form = self.source_form().unwrap_or_default();

        Some(RecipeResultSet {
            recipes,
            source_form,
        })
    }

    pub fn recipes(&self) -> Option<Vec<Recipe>> {
        read_json(&self.storage, RECIPES_KEY)
    }

    pub fn source_form(&self) -> Option<SearchForm> {
        read_json(&self.storage, FORM_DATA_KEY)
    }

    /// A miss and an out-of-range index are the same thing to callers.
    pub fn get_by_index(&self, index: usize) -> Result<Recipe, RecipeError> {
        self.recipes()
            .and_then(|mut recipes| {
                if index < recipes.len() {
                    Some(recipes.swap_remove(index))
                } else {
                    None
                }
            })
            .ok_or(RecipeError::NotFound)
    }
}

fn read_json<S: Storage, T: serde::de::DeserializeOwned>(storage: &S, key: &str) -> Option<T> {
    let raw = storage.get(key)?;

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable cached value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn recipe(title: &str) -> Recipe {
        Recipe {
            title: title.to_string(),
            ..Recipe::default()
        }
    }

    #[test]
    fn lookup_by_index_and_not_found() {
        let cache = ResultCache::new(MemoryStorage::new());
        let mut form = SearchForm::default();
        form.set_dish_type("tacos");

        cache
            .store(&[recipe("Fish Tacos"), recipe("Bean Tacos")], &form)
            .unwrap();

        assert_eq!(cache.get_by_index(1).unwrap().title, "Bean Tacos");
        assert!(matches!(cache.get_by_index(5), Err(RecipeError::NotFound)));
        assert_eq!(cache.load().unwrap().source_form.dish_type(), "tacos");
    }

    #[test]
    fn empty_cache_is_not_found() {
        let cache = ResultCache::new(MemoryStorage::new());

        assert!(cache.load().is_none());
        assert!(matches!(cache.get_by_index(0), Err(RecipeError::NotFound)));
    }

    #[test]
    fn store_replaces_previous_results() {
        let cache = ResultCache::new(MemoryStorage::new());
        let form = SearchForm::default();

        cache.store(&[recipe("a"), recipe("b")], &form).unwrap();
        cache.store(&[recipe("c")], &form).unwrap();

        let recipes = cache.load().unwrap().recipes;
        assert_eq!(recipes, vec![recipe("c")]);
    }

    #[test]
    fn corrupt_cache_is_a_miss() {
        let storage = MemoryStorage::new();
        storage.set(RECIPES_KEY, "{not json".to_string());

        let cache = ResultCache::new(storage);

        assert!(cache.load().is_none());
        assert!(matches!(cache.get_by_index(0), Err(RecipeError::NotFound)));
    }
}
