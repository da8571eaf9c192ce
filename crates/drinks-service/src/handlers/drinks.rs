//! Drink handlers.
//!
//! Implements the drinks CRUD surface:
//!
//! - `GET /drinks` - public summary listing
//! - `GET /drinks-detail` - full listing (requires `get:drinks-detail`)
//! - `POST /drinks` - create (requires `post:drinks`)
//! - `PATCH /drinks/{id}` - update (requires `patch:drinks`)
//! - `DELETE /drinks/{id}` - delete (requires `delete:drinks`)
//!
//! Authorization for the protected routes happens in the auth middleware
//! before these handlers run; by the time a handler executes, the verified
//! claims are already in the request extensions.

use crate::errors::ApiError;
use crate::models::{
    CreateDrinkRequest, DeleteResponse, Drink, DrinkDetail, DrinkSummary, DrinksResponse,
    UpdateDrinkRequest,
};
use crate::repositories::DrinksRepository;
use crate::routes::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use tracing::{info, instrument};

/// Handler for GET /drinks
///
/// Public endpoint; drinks are returned in the summary representation
/// (ingredient names withheld).
#[instrument(skip_all, name = "ds.handlers.drinks.list")]
pub async fn list_drinks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DrinksResponse<DrinkSummary>>, ApiError> {
    let drinks = DrinksRepository::list(&state.pool).await?;

    Ok(Json(DrinksResponse {
        success: true,
        drinks: drinks.iter().map(Drink::summary).collect(),
    }))
}

/// Handler for GET /drinks-detail
///
/// Returns the full recipe representation. Requires `get:drinks-detail`.
#[instrument(skip_all, name = "ds.handlers.drinks.list_detail")]
pub async fn list_drinks_detail(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DrinksResponse<DrinkDetail>>, ApiError> {
    let drinks = DrinksRepository::list(&state.pool).await?;

    Ok(Json(DrinksResponse {
        success: true,
        drinks: drinks.iter().map(Drink::detail).collect(),
    }))
}

/// Handler for POST /drinks
///
/// Creates a new drink. Requires `post:drinks`. Responds with the created
/// drink as a single-element array, matching the list envelope.
#[instrument(skip_all, name = "ds.handlers.drinks.create")]
pub async fn create_drink(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkDetail>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Unprocessable(e.body_text()))?;
    request
        .validate()
        .map_err(|e| ApiError::Unprocessable(e.to_string()))?;

    let drink = DrinksRepository::insert(&state.pool, request.title.trim(), &request.recipe).await?;

    info!(
        target: "ds.handlers.drinks",
        drink_id = drink.id,
        "Drink created"
    );

    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![drink.detail()],
    }))
}

/// Handler for PATCH /drinks/{id}
///
/// Partially updates a drink. Requires `patch:drinks`. Responds 404 when the
/// drink does not exist.
#[instrument(skip_all, fields(drink_id = %id), name = "ds.handlers.drinks.update")]
pub async fn update_drink(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkDetail>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Unprocessable(e.body_text()))?;
    request
        .validate()
        .map_err(|e| ApiError::Unprocessable(e.to_string()))?;

    let title = request.title.as_deref().map(str::trim);
    let recipe = request.recipe.as_deref();

    let drink = DrinksRepository::update(&state.pool, id, title, recipe)
        .await?
        .ok_or_else(|| ApiError::NotFound("drink not found".to_string()))?;

    info!(
        target: "ds.handlers.drinks",
        drink_id = drink.id,
        "Drink updated"
    );

    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![drink.detail()],
    }))
}

/// Handler for DELETE /drinks/{id}
///
/// Deletes a drink. Requires `delete:drinks`. Responds 404 when the drink
/// does not exist.
#[instrument(skip_all, fields(drink_id = %id), name = "ds.handlers.drinks.delete")]
pub async fn delete_drink(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = DrinksRepository::delete(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("drink not found".to_string()))?;

    info!(
        target: "ds.handlers.drinks",
        drink_id = deleted,
        "Drink deleted"
    );

    Ok(Json(DeleteResponse {
        success: true,
        delete: deleted,
    }))
}
