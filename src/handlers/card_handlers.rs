use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Query;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::db::DbPool;
use crate::dto::{CreateAbstractCardDto, CreatePhysicalCardDto, CreateRulingDto, FilterQueryDto};
use crate::errors::ApiError;
use crate::handlers::filter_handlers::resolve_filter;
use crate::models::{AbstractCard, CardDetails, PhysicalCard, PhysicalCardView, Ruling};
use crate::repo;
use crate::FilterSettings;

/// Handler for listing the cards matching a filter
///
/// This function handles GET requests to `/cards`. Without `filter` and
/// `saved` the configured default card filter applies.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `settings` - The configured default and saved filters
/// * `query` - The filter expression, saved filter name and variable bindings
///
/// ### Returns
///
/// The matching cards, ordered by name, as JSON
#[instrument(skip(pool, settings), fields(query = %query))]
pub async fn list_cards_handler(
    // Extract the database connection pool from the application state
    State(pool): State<Arc<DbPool>>,
    State(settings): State<Arc<FilterSettings>>,
    // Repeated `var` parameters need the axum-extra extractor
    Query(query): Query<FilterQueryDto>,
) -> Result<Json<Vec<AbstractCard>>, ApiError> {
    let filter = resolve_filter(&settings, &query, true)?;
    debug!("Listing cards with filter: {:?}", filter);

    let cards = repo::select_abstract_cards(&pool, &filter)?;

    info!("Retrieved {} cards", cards.len());
    Ok(Json(cards))
}

/// Handler for creating a new card
///
/// This function handles POST requests to `/cards`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The card definition
///
/// ### Returns
///
/// The newly created card as JSON
#[instrument(skip(pool, payload), fields(name = %payload.name))]
pub async fn create_card_handler(
    State(pool): State<Arc<DbPool>>,
    Json(payload): Json<CreateAbstractCardDto>,
) -> Result<Json<AbstractCard>, ApiError> {
    info!("Creating new card");

    let card = repo::create_abstract_card(&pool, &payload).await?;

    info!("Successfully created card with id: {}", card.get_id());
    Ok(Json(card))
}

/// Handler for retrieving a card with everything attached to it
///
/// This function handles GET requests to `/cards/{id}`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `id` - The ID of the card, extracted from the URL path
///
/// ### Returns
///
/// The card, its vocabulary, rarities and rulings as JSON
#[instrument(skip(pool), fields(card_id = %id))]
pub async fn get_card_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<CardDetails>, ApiError> {
    debug!("Getting card");

    let details = repo::get_card_details(&pool, &id)?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    Ok(Json(details))
}

/// Handler for deleting a card
///
/// This function handles DELETE requests to `/cards/{id}`.
///
/// ### Returns
///
/// `204 No Content` once the card is gone
#[instrument(skip(pool), fields(card_id = %id))]
pub async fn delete_card_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    info!("Deleting card");

    repo::delete_abstract_card(&pool, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for adding a ruling to a card
///
/// This function handles POST requests to `/cards/{id}/rulings`.
#[instrument(skip(pool, payload), fields(card_id = %id, code = %payload.code))]
pub async fn add_ruling_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
    Json(payload): Json<CreateRulingDto>,
) -> Result<Json<Ruling>, ApiError> {
    let ruling = repo::add_ruling(&pool, &id, payload.text, payload.code, payload.url).await?;

    info!("Successfully added ruling with id: {}", ruling.get_id());
    Ok(Json(ruling))
}

/// Handler for listing the physical cards of a card
///
/// This function handles GET requests to `/cards/{id}/physical`.
#[instrument(skip(pool), fields(card_id = %id))]
pub async fn list_physical_cards_for_card_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PhysicalCardView>>, ApiError> {
    repo::get_abstract_card(&pool, &id)?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    let physical_cards = repo::list_physical_cards_for_card(&pool, &id)?;

    debug!("Retrieved {} physical cards", physical_cards.len());
    Ok(Json(physical_cards))
}

/// Handler for getting or creating the physical card of a printing
///
/// This function handles POST requests to `/cards/{id}/physical`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `id` - The ID of the card, extracted from the URL path
/// * `payload` - The expansion and printing names; both may be omitted
///
/// ### Returns
///
/// The physical card as JSON; the same one on every call for a printing
#[instrument(skip(pool), fields(card_id = %id))]
pub async fn get_or_create_physical_card_handler(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<String>,
    Json(payload): Json<CreatePhysicalCardDto>,
) -> Result<Json<PhysicalCard>, ApiError> {
    let printing_id =
        repo::resolve_printing(&pool, payload.expansion.as_deref(), payload.printing.as_deref()).await?;

    let physical_card = repo::get_or_create_physical_card(&pool, &id, printing_id.as_deref()).await?;

    info!("Resolved physical card {}", physical_card.get_id());
    Ok(Json(physical_card))
}

/// Handler for listing the physical cards matching a filter
///
/// This function handles GET requests to `/physical_cards`.
#[instrument(skip(pool, settings), fields(query = %query))]
pub async fn list_physical_cards_handler(
    State(pool): State<Arc<DbPool>>,
    State(settings): State<Arc<FilterSettings>>,
    Query(query): Query<FilterQueryDto>,
) -> Result<Json<Vec<PhysicalCardView>>, ApiError> {
    let filter = resolve_filter(&settings, &query, false)?;

    let physical_cards = repo::select_physical_cards(&pool, &filter)?;

    info!("Retrieved {} physical cards", physical_cards.len());
    Ok(Json(physical_cards))
}
