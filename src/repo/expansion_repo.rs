use crate::db::{DbPool, ExecuteWithRetry};
use crate::errors::RepoError;
use crate::models::{Expansion, Printing};
use crate::schema::{expansions, printings};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use anyhow::Result;
use tracing::{instrument, debug, info};

/// Finds an expansion by its name or short name, ignoring case
pub(crate) fn find_expansion(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<Expansion>> {
    let name = name.trim();
    expansions::table
        .filter(expansions::name.eq(name).or(expansions::short_name.eq(name)))
        .first::<Expansion>(conn)
        .optional()
}

/// Returns the standard printing of an expansion, creating it when missing
pub(crate) fn standard_printing(conn: &mut SqliteConnection, expansion_id: &str) -> QueryResult<Printing> {
    let existing = printings::table
        .filter(printings::expansion_id.eq(expansion_id))
        .filter(printings::name.is_null())
        .first::<Printing>(conn)
        .optional()?;

    match existing {
        Some(printing) => Ok(printing),
        None => {
            let printing = Printing::new(expansion_id.to_string(), None);
            diesel::insert_into(printings::table).values(&printing).execute(conn)?;
            Ok(printing)
        }
    }
}

/// Creates a new expansion together with its standard printing
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `name` - The full expansion name
/// * `short_name` - An optional abbreviation
///
/// ### Returns
///
/// A Result containing the newly created Expansion if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The name is blank (`RepoError::Invalid`)
/// - The name or short name is already used by another expansion (`RepoError::NameConflict`)
/// - The database insert operation fails
#[instrument(skip(pool), fields(name = %name))]
pub async fn create_expansion(pool: &DbPool, name: String, short_name: Option<String>) -> Result<Expansion> {
    debug!("Creating new expansion");

    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(RepoError::Invalid("Expansion name cannot be empty".to_string()).into());
    }
    let short_name = short_name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let conn = &mut pool.get()?;

    for candidate in std::iter::once(&name).chain(short_name.iter()) {
        if find_expansion(conn, candidate)?.is_some() {
            return Err(RepoError::NameConflict { entity: "expansion", name: candidate.clone() }.into());
        }
    }

    let expansion = Expansion::new(name, short_name);
    diesel::insert_into(expansions::table)
        .values(expansion.clone())
        .execute_with_retry(conn).await?;

    let printing = Printing::new(expansion.get_id(), None);
    diesel::insert_into(printings::table)
        .values(printing)
        .execute_with_retry(conn).await?;

    info!("Successfully created expansion with id: {}", expansion.get_id());
    Ok(expansion)
}

/// Retrieves an expansion by its ID
///
/// ### Returns
///
/// A Result containing an Option with the Expansion if found, or None if not found
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(expansion_id = %id))]
pub fn get_expansion(pool: &DbPool, id: &str) -> Result<Option<Expansion>> {
    debug!("Retrieving expansion");

    let conn = &mut pool.get()?;
    let result = expansions::table
        .find(id)
        .first::<Expansion>(conn)
        .optional()?;

    Ok(result)
}

/// Retrieves an expansion by its name or short name, ignoring case
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(name = %name))]
pub fn get_expansion_by_name(pool: &DbPool, name: &str) -> Result<Option<Expansion>> {
    debug!("Retrieving expansion by name");

    let conn = &mut pool.get()?;
    Ok(find_expansion(conn, name)?)
}

/// Lists all expansions sorted by name
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool))]
pub fn list_expansions(pool: &DbPool) -> Result<Vec<Expansion>> {
    debug!("Listing expansions");

    let conn = &mut pool.get()?;
    let result = expansions::table
        .order(expansions::name.asc())
        .load::<Expansion>(conn)?;

    debug!("Found {} expansions", result.len());
    Ok(result)
}

/// Creates a named printing (variant) of an expansion
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `expansion_id` - The expansion the printing belongs to
/// * `name` - The printing name, e.g. "No Draft Text"
///
/// ### Errors
///
/// Returns an error if:
/// - The expansion does not exist (`RepoError::NotFound`)
/// - The name is blank (`RepoError::Invalid`)
/// - The expansion already has a printing with this name (`RepoError::NameConflict`)
/// - The database insert operation fails
#[instrument(skip(pool), fields(expansion_id = %expansion_id, name = %name))]
pub async fn create_printing(pool: &DbPool, expansion_id: &str, name: String) -> Result<Printing> {
    debug!("Creating new printing");

    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(RepoError::Invalid("Printing name cannot be empty".to_string()).into());
    }

    let conn = &mut pool.get()?;

    expansions::table
        .find(expansion_id)
        .first::<Expansion>(conn)
        .optional()?
        .ok_or(RepoError::NotFound("Expansion"))?;

    let exists = printings::table
        .filter(printings::expansion_id.eq(expansion_id))
        .filter(printings::name.eq(&name))
        .first::<Printing>(conn)
        .optional()?
        .is_some();
    if exists {
        return Err(RepoError::NameConflict { entity: "printing", name }.into());
    }

    let printing = Printing::new(expansion_id.to_string(), Some(name));
    diesel::insert_into(printings::table)
        .values(printing.clone())
        .execute_with_retry(conn).await?;

    info!("Successfully created printing with id: {}", printing.get_id());
    Ok(printing)
}

/// Lists the printings of an expansion, the standard printing first
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(expansion_id = %expansion_id))]
pub fn list_printings(pool: &DbPool, expansion_id: &str) -> Result<Vec<Printing>> {
    debug!("Listing printings");

    let conn = &mut pool.get()?;
    let result = printings::table
        .filter(printings::expansion_id.eq(expansion_id))
        .order(printings::name.asc())
        .load::<Printing>(conn)?;

    Ok(result)
}
