//! Drinks service models.
//!
//! Domain types for the drinks resource, request validation, and the JSON
//! envelopes the API responds with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum drink title length.
pub const MAX_TITLE_LENGTH: usize = 80;

/// One component of a drink recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name (e.g. "espresso").
    pub name: String,

    /// Display color for the ingredient layer.
    pub color: String,

    /// Relative parts of this ingredient in the drink.
    pub parts: i64,
}

/// Recipe component as exposed publicly: the name is withheld.
#[derive(Debug, Clone, Serialize)]
pub struct IngredientSummary {
    /// Display color for the ingredient layer.
    pub color: String,

    /// Relative parts of this ingredient in the drink.
    pub parts: i64,
}

/// A drink as stored in the database.
#[derive(Debug, Clone)]
pub struct Drink {
    /// Unique drink identifier.
    pub id: i64,

    /// Drink title (unique).
    pub title: String,

    /// Recipe components.
    pub recipe: Vec<Ingredient>,

    /// When the drink was created.
    #[allow(dead_code)] // Read from the database; not exposed over the API
    pub created_at: DateTime<Utc>,
}

/// Public representation: recipe without ingredient names.
#[derive(Debug, Clone, Serialize)]
pub struct DrinkSummary {
    /// Unique drink identifier.
    pub id: i64,

    /// Drink title.
    pub title: String,

    /// Recipe components without names.
    pub recipe: Vec<IngredientSummary>,
}

/// Privileged representation: the full recipe.
#[derive(Debug, Clone, Serialize)]
pub struct DrinkDetail {
    /// Unique drink identifier.
    pub id: i64,

    /// Drink title.
    pub title: String,

    /// Full recipe components.
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    /// Public representation of this drink.
    pub fn summary(&self) -> DrinkSummary {
        DrinkSummary {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|ingredient| IngredientSummary {
                    color: ingredient.color.clone(),
                    parts: ingredient.parts,
                })
                .collect(),
        }
    }

    /// Privileged representation of this drink.
    pub fn detail(&self) -> DrinkDetail {
        DrinkDetail {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

/// Validation failure for drink requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("title must be at most {MAX_TITLE_LENGTH} characters")]
    TitleTooLong,

    #[error("recipe must contain at least one ingredient")]
    EmptyRecipe,

    #[error("ingredient name and color must not be empty")]
    EmptyIngredientField,

    #[error("ingredient parts must be at least 1")]
    NonPositiveParts,

    #[error("at least one of title or recipe must be provided")]
    EmptyUpdate,
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if trimmed.len() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

fn validate_recipe(recipe: &[Ingredient]) -> Result<(), ValidationError> {
    if recipe.is_empty() {
        return Err(ValidationError::EmptyRecipe);
    }
    for ingredient in recipe {
        if ingredient.name.trim().is_empty() || ingredient.color.trim().is_empty() {
            return Err(ValidationError::EmptyIngredientField);
        }
        if ingredient.parts < 1 {
            return Err(ValidationError::NonPositiveParts);
        }
    }
    Ok(())
}

/// Request body for `POST /drinks`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDrinkRequest {
    /// Drink title.
    pub title: String,

    /// Recipe components.
    pub recipe: Vec<Ingredient>,
}

impl CreateDrinkRequest {
    /// Validate the request body.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_recipe(&self.recipe)
    }
}

/// Request body for `PATCH /drinks/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDrinkRequest {
    /// New title, if changing.
    pub title: Option<String>,

    /// New recipe, if changing.
    pub recipe: Option<Vec<Ingredient>>,
}

impl UpdateDrinkRequest {
    /// Validate the request body.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_none() && self.recipe.is_none() {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(recipe) = &self.recipe {
            validate_recipe(recipe)?;
        }
        Ok(())
    }
}

/// Success envelope for list/create/patch responses.
#[derive(Debug, Clone, Serialize)]
pub struct DrinksResponse<T> {
    /// Always true for success responses.
    pub success: bool,

    /// The drinks affected or listed.
    pub drinks: Vec<T>,
}

/// Success envelope for delete responses.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Always true for success responses.
    pub success: bool,

    /// Identifier of the deleted drink.
    pub delete: i64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status ("healthy" or "unhealthy").
    pub status: String,

    /// Database connectivity status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn mojito_recipe() -> Vec<Ingredient> {
        vec![
            Ingredient {
                name: "rum".to_string(),
                color: "#f5f5dc".to_string(),
                parts: 2,
            },
            Ingredient {
                name: "mint".to_string(),
                color: "#3eb489".to_string(),
                parts: 1,
            },
        ]
    }

    fn sample_drink() -> Drink {
        Drink {
            id: 7,
            title: "Mojito".to_string(),
            recipe: mojito_recipe(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_withholds_ingredient_names() {
        let drink = sample_drink();
        let summary = drink.summary();

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["title"], "Mojito");
        assert_eq!(json["recipe"][0]["color"], "#f5f5dc");
        assert_eq!(json["recipe"][0]["parts"], 2);
        assert!(
            json["recipe"][0].get("name").is_none(),
            "summary recipe must not expose ingredient names"
        );
    }

    #[test]
    fn test_detail_includes_full_recipe() {
        let drink = sample_drink();
        let detail = drink.detail();

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["recipe"][0]["name"], "rum");
        assert_eq!(json["recipe"][1]["name"], "mint");
    }

    #[test]
    fn test_create_request_valid() {
        let request = CreateDrinkRequest {
            title: "Mojito".to_string(),
            recipe: mojito_recipe(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_empty_title() {
        let request = CreateDrinkRequest {
            title: "   ".to_string(),
            recipe: mojito_recipe(),
        };
        assert_eq!(request.validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn test_create_request_title_too_long() {
        let request = CreateDrinkRequest {
            title: "x".repeat(MAX_TITLE_LENGTH + 1),
            recipe: mojito_recipe(),
        };
        assert_eq!(request.validate(), Err(ValidationError::TitleTooLong));
    }

    #[test]
    fn test_create_request_empty_recipe() {
        let request = CreateDrinkRequest {
            title: "Mojito".to_string(),
            recipe: vec![],
        };
        assert_eq!(request.validate(), Err(ValidationError::EmptyRecipe));
    }

    #[test]
    fn test_create_request_zero_parts() {
        let mut recipe = mojito_recipe();
        if let Some(first) = recipe.first_mut() {
            first.parts = 0;
        }
        let request = CreateDrinkRequest {
            title: "Mojito".to_string(),
            recipe,
        };
        assert_eq!(request.validate(), Err(ValidationError::NonPositiveParts));
    }

    #[test]
    fn test_create_request_blank_ingredient_name() {
        let mut recipe = mojito_recipe();
        if let Some(first) = recipe.first_mut() {
            first.name = " ".to_string();
        }
        let request = CreateDrinkRequest {
            title: "Mojito".to_string(),
            recipe,
        };
        assert_eq!(
            request.validate(),
            Err(ValidationError::EmptyIngredientField)
        );
    }

    #[test]
    fn test_update_request_requires_some_field() {
        let request = UpdateDrinkRequest {
            title: None,
            recipe: None,
        };
        assert_eq!(request.validate(), Err(ValidationError::EmptyUpdate));
    }

    #[test]
    fn test_update_request_title_only() {
        let request = UpdateDrinkRequest {
            title: Some("Virgin Mojito".to_string()),
            recipe: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_request_invalid_recipe() {
        let request = UpdateDrinkRequest {
            title: None,
            recipe: Some(vec![]),
        };
        assert_eq!(request.validate(), Err(ValidationError::EmptyRecipe));
    }

    #[test]
    fn test_ingredient_round_trip() {
        let json = r##"{"name":"espresso","color":"#4b3621","parts":1}"##;
        let ingredient: Ingredient = serde_json::from_str(json).unwrap();
        assert_eq!(ingredient.name, "espresso");
        assert_eq!(ingredient.parts, 1);

        let back = serde_json::to_string(&ingredient).unwrap();
        let reparsed: Ingredient = serde_json::from_str(&back).unwrap();
        assert_eq!(reparsed, ingredient);
    }
}
