//! Drinks repository for database operations.
//!
//! # Security
//!
//! - All queries use parameterized statements (SQL injection safe)
//! - Uniqueness of titles is enforced by the database, not by
//!   check-then-insert races

use crate::errors::ApiError;
use crate::models::{Drink, Ingredient};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;

/// Drink row as read from the database.
#[derive(Debug, sqlx::FromRow)]
struct DrinkRow {
    id: i64,
    title: String,
    recipe: Json<Vec<Ingredient>>,
    created_at: DateTime<Utc>,
}

impl DrinkRow {
    fn into_drink(self) -> Drink {
        Drink {
            id: self.id,
            title: self.title,
            recipe: self.recipe.0,
            created_at: self.created_at,
        }
    }
}

/// Repository for drink operations.
pub struct DrinksRepository;

impl DrinksRepository {
    /// List all drinks, oldest first.
    #[instrument(skip_all)]
    pub async fn list(pool: &PgPool) -> Result<Vec<Drink>, ApiError> {
        let rows: Vec<DrinkRow> = sqlx::query_as(
            r#"
            SELECT id, title, recipe, created_at
            FROM drinks
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(DrinkRow::into_drink).collect())
    }

    /// Find a drink by its identifier.
    #[instrument(skip_all, fields(drink_id = %id))]
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Drink>, ApiError> {
        let row: Option<DrinkRow> = sqlx::query_as(
            r#"
            SELECT id, title, recipe, created_at
            FROM drinks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(DrinkRow::into_drink))
    }

    /// Insert a new drink and return it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Conflict` when the title is already taken.
    #[instrument(skip_all, fields(title = %title))]
    pub async fn insert(
        pool: &PgPool,
        title: &str,
        recipe: &[Ingredient],
    ) -> Result<Drink, ApiError> {
        let row: DrinkRow = sqlx::query_as(
            r#"
            INSERT INTO drinks (title, recipe)
            VALUES ($1, $2)
            RETURNING id, title, recipe, created_at
            "#,
        )
        .bind(title)
        .bind(Json(recipe))
        .fetch_one(pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(row.into_drink())
    }

    /// Update a drink's title and/or recipe, returning the updated row.
    ///
    /// Returns `None` when no drink with the given id exists.
    #[instrument(skip_all, fields(drink_id = %id))]
    pub async fn update(
        pool: &PgPool,
        id: i64,
        title: Option<&str>,
        recipe: Option<&[Ingredient]>,
    ) -> Result<Option<Drink>, ApiError> {
        let row: Option<DrinkRow> = sqlx::query_as(
            r#"
            UPDATE drinks
            SET title = COALESCE($2, title),
                recipe = COALESCE($3, recipe)
            WHERE id = $1
            RETURNING id, title, recipe, created_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(recipe.map(Json))
        .fetch_optional(pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(row.map(DrinkRow::into_drink))
    }

    /// Delete a drink, returning its id.
    ///
    /// Returns `None` when no drink with the given id exists.
    #[instrument(skip_all, fields(drink_id = %id))]
    pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<i64>, ApiError> {
        let deleted: Option<i64> = sqlx::query_scalar(
            r#"
            DELETE FROM drinks
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(deleted)
    }
}

/// Map a unique-constraint violation to a conflict; pass everything else on.
fn map_unique_violation(err: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return ApiError::Conflict("a drink with this title already exists".to_string());
        }
    }
    err.into()
}
