use crate::db::{transaction_with_retry, DbPool, ExecuteWithRetry};
use crate::errors::RepoError;
use crate::models::{AbstractCard, PhysicalCard, PhysicalCardView, Printing};
use crate::schema::{abstract_cards, physical_cards, printings};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use anyhow::Result;
use tracing::{instrument, debug, info};

use super::expansion_repo::{find_expansion, standard_printing};
use super::filter_repo::load_physical_card_views;

/// Resolves an expansion name and optional printing name to a printing ID
///
/// No expansion means the unknown printing (`None`). An expansion without a
/// printing name means its standard printing.
///
/// ### Errors
///
/// Returns an error if:
/// - A printing is named without an expansion (`RepoError::Invalid`)
/// - The expansion or the named printing does not exist (`RepoError::NotFound`)
/// - The database query fails
#[instrument(skip(pool))]
pub async fn resolve_printing(pool: &DbPool, expansion: Option<&str>, printing: Option<&str>) -> Result<Option<String>> {
    debug!("Resolving printing");

    let conn = &mut pool.get()?;
    let expansion = match expansion.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => find_expansion(conn, name)?.ok_or(RepoError::NotFound("Expansion"))?,
        None => {
            if printing.is_some() {
                return Err(RepoError::Invalid("A printing needs an expansion".to_string()).into());
            }
            return Ok(None);
        }
    };

    let printing = match printing.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => printings::table
            .filter(printings::expansion_id.eq(expansion.get_id()))
            .filter(printings::name.eq(name))
            .first::<Printing>(conn)
            .optional()?
            .ok_or(RepoError::NotFound("Printing"))?,
        None => {
            transaction_with_retry(conn, |conn| Ok(standard_printing(conn, &expansion.get_id())?)).await?
        }
    };

    Ok(Some(printing.get_id()))
}

fn find_physical_card(
    conn: &mut SqliteConnection,
    abstract_card_id: &str,
    printing_id: Option<&str>,
) -> QueryResult<Option<PhysicalCard>> {
    let query = physical_cards::table
        .filter(physical_cards::abstract_card_id.eq(abstract_card_id))
        .into_boxed();
    let query = match printing_id {
        Some(printing_id) => query.filter(physical_cards::printing_id.eq(printing_id)),
        None => query.filter(physical_cards::printing_id.is_null()),
    };
    query.first::<PhysicalCard>(conn).optional()
}

/// Returns the physical card for an abstract card and printing, creating it if needed
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `abstract_card_id` - The card
/// * `printing_id` - The printing, or `None` for an unknown printing
///
/// ### Errors
///
/// Returns an error if:
/// - The card or the printing does not exist (`RepoError::NotFound`)
/// - The database query or insert fails
#[instrument(skip(pool), fields(card_id = %abstract_card_id))]
pub async fn get_or_create_physical_card(
    pool: &DbPool,
    abstract_card_id: &str,
    printing_id: Option<&str>,
) -> Result<PhysicalCard> {
    debug!("Getting or creating physical card");

    let conn = &mut pool.get()?;

    abstract_cards::table
        .find(abstract_card_id)
        .first::<AbstractCard>(conn)
        .optional()?
        .ok_or(RepoError::NotFound("Card"))?;
    if let Some(printing_id) = printing_id {
        printings::table
            .find(printing_id)
            .first::<Printing>(conn)
            .optional()?
            .ok_or(RepoError::NotFound("Printing"))?;
    }

    if let Some(existing) = find_physical_card(conn, abstract_card_id, printing_id)? {
        debug!("Physical card already exists with id: {}", existing.get_id());
        return Ok(existing);
    }

    let physical_card = PhysicalCard::new(abstract_card_id.to_string(), printing_id.map(str::to_string));
    diesel::insert_into(physical_cards::table)
        .values(physical_card.clone())
        .execute_with_retry(conn).await?;

    info!("Successfully created physical card with id: {}", physical_card.get_id());
    Ok(physical_card)
}

/// Retrieves a physical card by its ID
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(physical_card_id = %id))]
pub fn get_physical_card(pool: &DbPool, id: &str) -> Result<Option<PhysicalCard>> {
    debug!("Retrieving physical card");

    let conn = &mut pool.get()?;
    let result = physical_cards::table
        .find(id)
        .first::<PhysicalCard>(conn)
        .optional()?;

    Ok(result)
}

/// Lists the physical cards of an abstract card with their printings
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(card_id = %abstract_card_id))]
pub fn list_physical_cards_for_card(pool: &DbPool, abstract_card_id: &str) -> Result<Vec<PhysicalCardView>> {
    debug!("Listing physical cards for card");

    let conn = &mut pool.get()?;
    load_physical_card_views(conn, "pc.abstract_card_id = ?", &[abstract_card_id.into()])
}
