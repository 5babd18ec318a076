use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::db::DbPool;
use crate::dto::{CreateExpansionDto, CreatePrintingDto};
use crate::errors::ApiError;
use crate::models::{Expansion, Printing};
use crate::repo;

/// Handler for creating a new expansion
///
/// This function handles POST requests to `/expansions`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The expansion name and optional short name
///
/// ### Returns
///
/// The newly created expansion as JSON
#[instrument(skip(pool), fields(name = %payload.name))]
pub async fn create_expansion_handler(
    State(pool): State<Arc<DbPool>>,
    Json(payload): Json<CreateExpansionDto>,
) -> Result<Json<Expansion>, ApiError> {
    info!("Creating new expansion");

    let expansion = repo::create_expansion(&pool, payload.name, payload.short_name).await?;

    info!("Successfully created expansion with id: {}", expansion.get_id());
    Ok(Json(expansion))
}

/// Handler for listing all expansions
///
/// This function handles GET requests to `/expansions`.
#[instrument(skip(pool))]
pub async fn list_expansions_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<Expansion>>, ApiError> {
    let expansions = repo::list_expansions(&pool)?;

    debug!("Retrieved {} expansions", expansions.len());
    Ok(Json(expansions))
}

/// Handler for retrieving a specific expansion
///
/// This function handles GET requests to `/expansions/{id}`.
#[instrument(skip(pool), fields(expansion_id = %id))]
pub async fn get_expansion_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<Expansion>, ApiError> {
    let expansion = repo::get_expansion(&pool, &id)?
        .ok_or_else(|| ApiError::NotFound("Expansion not found".to_string()))?;

    Ok(Json(expansion))
}

/// Handler for adding a named printing to an expansion
///
/// This function handles POST requests to `/expansions/{id}/printings`.
#[instrument(skip(pool), fields(expansion_id = %id, name = %payload.name))]
pub async fn create_printing_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
    Json(payload): Json<CreatePrintingDto>,
) -> Result<Json<Printing>, ApiError> {
    let printing = repo::create_printing(&pool, &id, payload.name).await?;

    info!("Successfully created printing with id: {}", printing.get_id());
    Ok(Json(printing))
}

/// Handler for listing the printings of an expansion
///
/// This function handles GET requests to `/expansions/{id}/printings`.
#[instrument(skip(pool), fields(expansion_id = %id))]
pub async fn list_printings_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Printing>>, ApiError> {
    repo::get_expansion(&pool, &id)?
        .ok_or_else(|| ApiError::NotFound("Expansion not found".to_string()))?;

    let printings = repo::list_printings(&pool, &id)?;

    debug!("Retrieved {} printings", printings.len());
    Ok(Json(printings))
}
