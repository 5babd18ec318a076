use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Query;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::db::DbPool;
use crate::dto::{CardSetCardsDto, CopyCardSetDto, CreateCardSetDto, FilterQueryDto, UpdateCardSetDto};
use crate::errors::ApiError;
use crate::handlers::filter_handlers::resolve_filter;
use crate::models::{CardSet, CardSetCard, CardSetSummary};
use crate::repo;
use crate::FilterSettings;

fn card_set_not_found() -> ApiError {
    ApiError::NotFound("Card set not found".to_string())
}

/// Handler for listing the card sets matching a filter
///
/// This function handles GET requests to `/card_sets`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `settings` - The configured saved filters
/// * `query` - The filter expression, saved filter name and variable bindings
///
/// ### Returns
///
/// The matching card sets, ordered by name, as JSON
#[instrument(skip(pool, settings), fields(query = %query))]
pub async fn list_card_sets_handler(
    State(pool): State<Arc<DbPool>>,
    State(settings): State<Arc<FilterSettings>>,
    Query(query): Query<FilterQueryDto>,
) -> Result<Json<Vec<CardSet>>, ApiError> {
    let filter = resolve_filter(&settings, &query, false)?;

    let card_sets = repo::select_card_sets(&pool, &filter)?;

    info!("Retrieved {} card sets", card_sets.len());
    Ok(Json(card_sets))
}

/// Handler for creating a new card set
///
/// This function handles POST requests to `/card_sets`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The name, parent and descriptive fields of the set
///
/// ### Returns
///
/// The newly created card set as JSON
#[instrument(skip(pool, payload), fields(name = %payload.name))]
pub async fn create_card_set_handler(
    State(pool): State<Arc<DbPool>>,
    Json(payload): Json<CreateCardSetDto>,
) -> Result<Json<CardSet>, ApiError> {
    info!("Creating new card set");

    let card_set = repo::create_card_set(&pool, &payload).await?;

    info!("Successfully created card set with id: {}", card_set.get_id());
    Ok(Json(card_set))
}

/// Handler for retrieving a specific card set
///
/// This function handles GET requests to `/card_sets/{id}`.
#[instrument(skip(pool), fields(card_set_id = %id))]
pub async fn get_card_set_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<CardSet>, ApiError> {
    debug!("Getting card set");

    let card_set = repo::get_card_set(&pool, &id)?.ok_or_else(card_set_not_found)?;

    Ok(Json(card_set))
}

/// Handler for updating a card set
///
/// This function handles PATCH requests to `/card_sets/{id}`. Fields absent
/// from the body are left alone; `"parent_id": null` moves the set to the
/// top level.
///
/// ### Returns
///
/// The updated card set as JSON
#[instrument(skip(pool, payload), fields(card_set_id = %id))]
pub async fn update_card_set_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCardSetDto>,
) -> Result<Json<CardSet>, ApiError> {
    info!("Updating card set");

    let card_set = repo::update_card_set(&pool, &id, &payload).await?;

    Ok(Json(card_set))
}

/// Handler for deleting a card set
///
/// This function handles DELETE requests to `/card_sets/{id}`. Child sets
/// move up to the deleted set's parent.
#[instrument(skip(pool), fields(card_set_id = %id))]
pub async fn delete_card_set_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    info!("Deleting card set");

    repo::delete_card_set(&pool, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for listing the sets nested directly under a card set
///
/// This function handles GET requests to `/card_sets/{id}/children`.
#[instrument(skip(pool), fields(card_set_id = %id))]
pub async fn list_child_card_sets_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CardSet>>, ApiError> {
    let children = repo::list_child_card_sets(&pool, &id)?;

    debug!("Retrieved {} child card sets", children.len());
    Ok(Json(children))
}

/// Handler for listing the entries of a card set
///
/// This function handles GET requests to `/card_sets/{id}/cards`. The
/// filter, if any, is applied to the physical cards of the set.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `settings` - The configured saved filters
/// * `id` - The ID of the card set, extracted from the URL path
/// * `query` - The filter expression, saved filter name and variable bindings
///
/// ### Returns
///
/// The matching entries with their counts as JSON
#[instrument(skip(pool, settings), fields(card_set_id = %id, query = %query))]
pub async fn list_card_set_cards_handler(
    State(pool): State<Arc<DbPool>>,
    State(settings): State<Arc<FilterSettings>>,
    Path(id): Path<String>,
    Query(query): Query<FilterQueryDto>,
) -> Result<Json<Vec<CardSetCard>>, ApiError> {
    let filter = resolve_filter(&settings, &query, false)?;

    let cards = repo::select_card_set_cards(&pool, &id, &filter)?;

    info!("Retrieved {} entries", cards.len());
    Ok(Json(cards))
}

/// Handler for adding cards to a card set
///
/// This function handles POST requests to `/card_sets/{id}/cards`.
///
/// ### Returns
///
/// The entries of the set after the addition as JSON
#[instrument(skip(pool, payload), fields(card_set_id = %id, cards = payload.cards.len()))]
pub async fn add_card_set_cards_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
    Json(payload): Json<CardSetCardsDto>,
) -> Result<Json<Vec<CardSetCard>>, ApiError> {
    let cards = repo::add_cards_to_card_set(&pool, &id, &payload.cards).await?;

    Ok(Json(cards))
}

/// Handler for removing cards from a card set
///
/// This function handles DELETE requests to `/card_sets/{id}/cards`. Counts
/// never drop below zero and entries that reach zero are removed.
///
/// ### Returns
///
/// The entries of the set after the removal as JSON
#[instrument(skip(pool, payload), fields(card_set_id = %id, cards = payload.cards.len()))]
pub async fn remove_card_set_cards_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
    Json(payload): Json<CardSetCardsDto>,
) -> Result<Json<Vec<CardSetCard>>, ApiError> {
    let cards = repo::remove_cards_from_card_set(&pool, &id, &payload.cards).await?;

    Ok(Json(cards))
}

/// Handler for copying a card set
///
/// This function handles POST requests to `/card_sets/{id}/copy`.
#[instrument(skip(pool), fields(card_set_id = %id, name = %payload.name))]
pub async fn copy_card_set_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
    Json(payload): Json<CopyCardSetDto>,
) -> Result<Json<CardSet>, ApiError> {
    let copy = repo::copy_card_set(&pool, &id, &payload.name).await?;

    info!("Copied card set to {}", copy.get_id());
    Ok(Json(copy))
}

/// Handler for counting the cards of a card set
///
/// This function handles GET requests to `/card_sets/{id}/summary`.
#[instrument(skip(pool), fields(card_set_id = %id))]
pub async fn card_set_summary_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<CardSetSummary>, ApiError> {
    let summary = repo::card_set_summary(&pool, &id)?;

    Ok(Json(summary))
}
