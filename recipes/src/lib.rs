//! Domain model and client-side state for the recipe generator.
//!
//! Everything that lives "in the browser" is here: the search form, the
//! per-provider settings, the session result cache and the client that talks
//! to the `/api/recipes` proxy route. None of it knows about HTTP servers; the
//! storage it persists into is supplied by the caller through [`Storage`].

pub mod cache;
pub mod client;
pub mod error;
pub mod form;
pub mod settings;
pub mod storage;
pub mod types;

pub use cache::{RecipeResultSet, ResultCache};
pub use client::RecipeClient;
pub use error::RecipeError;
pub use form::{FormKey, KeyOutcome, SearchForm};
pub use settings::SettingsStore;
pub use storage::{MemoryStorage, Storage};
pub use types::{
    DietaryTag, Difficulty, Ingredient, NutritionalInfo, ProviderCredential, ProviderId, Recipe,
    Scalar, SearchQuery,
};
