use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::RecipeError;

/// LLM vendor the upstream service should use to generate recipes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[default]
    OpenAi,
    Anthropic,
    Grok,
    Perplexity,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::OpenAi,
        ProviderId::Anthropic,
        ProviderId::Grok,
        ProviderId::Perplexity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Grok => "grok",
            ProviderId::Perplexity => "perplexity",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "OpenAI",
            ProviderId::Anthropic => "Anthropic",
            ProviderId::Grok => "Grok",
            ProviderId::Perplexity => "Perplexity",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderId::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| RecipeError::UnknownValue {
                kind: "provider",
                value: s.to_string(),
            })
    }
}

/// The active provider and the key stored for it. An empty key means the
/// provider has not been configured.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    pub provider: ProviderId,
    pub api_key: String,
}

impl ProviderCredential {
    pub fn new(provider: ProviderId, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("provider", &self.provider)
            .field("api_key", &"[omitted]")
            .finish()
    }
}

/// Dietary filters. Variant order is the order they are sent upstream in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DietaryTag {
    #[serde(rename = "gluten free", alias = "gluten_free")]
    GlutenFree,
    #[serde(rename = "dairy free", alias = "dairy_free")]
    DairyFree,
    #[serde(rename = "vegan")]
    Vegan,
    #[serde(rename = "vegetarian")]
    Vegetarian,
}

impl DietaryTag {
    pub const ALL: [DietaryTag; 4] = [
        DietaryTag::GlutenFree,
        DietaryTag::DairyFree,
        DietaryTag::Vegan,
        DietaryTag::Vegetarian,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DietaryTag::GlutenFree => "gluten free",
            DietaryTag::DairyFree => "dairy free",
            DietaryTag::Vegan => "vegan",
            DietaryTag::Vegetarian => "vegetarian",
        }
    }
}

impl fmt::Display for DietaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// A validated search, ready to be sent. Only [`crate::SearchForm::to_query`]
/// builds one, so every instance has a non-empty dish type and an in-range
/// recipe count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub(crate) dish_type: String,
    pub(crate) dietary: BTreeSet<DietaryTag>,
    pub(crate) servings: u32,
    pub(crate) difficulty: Difficulty,
    pub(crate) recipe_count: u8,
    pub(crate) pantry_ingredients: Vec<String>,
}

impl SearchQuery {
    pub fn dish_type(&self) -> &str {
        &self.dish_type
    }

    pub fn dietary(&self) -> &BTreeSet<DietaryTag> {
        &self.dietary
    }

    pub fn servings(&self) -> u32 {
        self.servings
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn recipe_count(&self) -> u8 {
        self.recipe_count
    }

    pub fn pantry_ingredients(&self) -> &[String] {
        &self.pantry_ingredients
    }

    pub(crate) fn to_request(&self) -> GenerateRequest<'_> {
        GenerateRequest {
            dish_type: &self.dish_type,
            preferences: Preferences {
                dietary: self.dietary.iter().copied().collect(),
                servings: self.servings,
                difficulty: self.difficulty,
                recipe_count: self.recipe_count,
                pantry_ingredients: &self.pantry_ingredients,
            },
        }
    }
}

/// Body of `POST /api/recipes`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest<'a> {
    pub dish_type: &'a str,
    pub preferences: Preferences<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Preferences<'a> {
    pub dietary: Vec<DietaryTag>,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub recipe_count: u8,
    pub pantry_ingredients: &'a [String],
}

/// A loosely typed value from the LLM output. Models are inconsistent about
/// whether `"servings": 4` or `"servings": "4"`, so both are kept as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    List(Vec<Scalar>),
    Object(Map<String, Value>),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Bool(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Null => Ok(()),
            Scalar::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            // `{"vegan": true, "note": "x"}` reads as "vegan, note: x".
            Scalar::Object(fields) => {
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match value {
                        Value::Bool(true) => f.write_str(key)?,
                        Value::Bool(false) | Value::Null => write!(f, "{key}: no")?,
                        Value::String(text) => write!(f, "{key}: {text}")?,
                        other => write!(f, "{key}: {other}")?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingredient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Scalar>,
    #[serde(deserialize_with = "null_as_default")]
    pub item: String,
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(amount) = &self.amount {
            write!(f, "{amount}")?;
        }
        if let Some(unit) = &self.unit {
            write!(f, "{unit}")?;
        }
        if self.amount.is_some() || self.unit.is_some() {
            f.write_str(" ")?;
        }
        f.write_str(&self.item)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionalInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<Scalar>,
}

/// A generated recipe as returned by the upstream service. Only ever
/// deserialized, stored and rendered here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ingredients: Vec<Ingredient>,
    #[serde(deserialize_with = "null_as_default")]
    pub steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_info: Option<Scalar>,
    #[serde(deserialize_with = "null_as_default")]
    pub nutritional_info: NutritionalInfo,
}
