use crate::db::{transaction_with_retry, DbPool};
use crate::errors::RepoError;
use crate::models::Vocabulary;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use anyhow::Result;
use tracing::{instrument, debug, info};

#[derive(QueryableByName, Debug)]
pub(crate) struct NameRow {
    #[diesel(sql_type = Text)]
    pub(crate) name: String,
}

/// Makes sure a vocabulary name exists and returns it as stored
///
/// Names compare case-insensitively, so "ventrue" resolves to an existing
/// "Ventrue" instead of creating a second entry.
///
/// ### Errors
///
/// Returns an error if the name is blank or a statement fails
pub(crate) fn ensure_vocabulary_name(
    conn: &mut SqliteConnection,
    vocabulary: Vocabulary,
    name: &str,
) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RepoError::Invalid(format!("Empty {} name", vocabulary)).into());
    }

    diesel::sql_query(format!("INSERT OR IGNORE INTO {} (name) VALUES (?)", vocabulary.table()))
        .bind::<Text, _>(name)
        .execute(conn)?;

    let stored = diesel::sql_query(format!("SELECT name FROM {} WHERE name = ?", vocabulary.table()))
        .bind::<Text, _>(name)
        .get_result::<NameRow>(conn)?;

    Ok(stored.name)
}

/// Adds a name to a vocabulary table
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `vocabulary` - The vocabulary to add to
/// * `name` - The name to add
///
/// ### Returns
///
/// The name as stored, which keeps the casing of an existing entry
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The name is blank
/// - The database insert operation fails
#[instrument(skip(pool), fields(vocabulary = %vocabulary, name = %name))]
pub async fn add_vocabulary_name(pool: &DbPool, vocabulary: Vocabulary, name: &str) -> Result<String> {
    debug!("Adding vocabulary name");

    let conn = &mut pool.get()?;
    let stored = transaction_with_retry(conn, |conn| ensure_vocabulary_name(conn, vocabulary, name)).await?;

    info!("Vocabulary name available: {}", stored);
    Ok(stored)
}

/// Lists every name of a vocabulary, sorted case-insensitively
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(vocabulary = %vocabulary))]
pub fn list_vocabulary(pool: &DbPool, vocabulary: Vocabulary) -> Result<Vec<String>> {
    debug!("Listing vocabulary");

    let conn = &mut pool.get()?;
    let rows = diesel::sql_query(format!("SELECT name FROM {} ORDER BY name", vocabulary.table()))
        .load::<NameRow>(conn)?;

    debug!("Found {} names", rows.len());
    Ok(rows.into_iter().map(|row| row.name).collect())
}

/// Names of one vocabulary linked to an abstract card
pub(crate) fn card_vocabulary(
    conn: &mut SqliteConnection,
    vocabulary: Vocabulary,
    abstract_card_id: &str,
) -> Result<Vec<String>> {
    let rows = diesel::sql_query(format!(
        "SELECT {column} AS name FROM {table} WHERE abstract_card_id = ? ORDER BY {column}",
        column = vocabulary.card_column(),
        table = vocabulary.card_table(),
    ))
    .bind::<Text, _>(abstract_card_id)
    .load::<NameRow>(conn)?;

    Ok(rows.into_iter().map(|row| row.name).collect())
}

/// Links an abstract card to vocabulary names, creating missing names
///
/// Rarities and disciplines carry extra columns and are linked by the card
/// repository itself.
pub(crate) fn link_card_vocabulary(
    conn: &mut SqliteConnection,
    vocabulary: Vocabulary,
    abstract_card_id: &str,
    names: &[String],
) -> Result<()> {
    for name in names {
        let stored = ensure_vocabulary_name(conn, vocabulary, name)?;
        diesel::sql_query(format!(
            "INSERT OR IGNORE INTO {} (abstract_card_id, {}) VALUES (?, ?)",
            vocabulary.card_table(),
            vocabulary.card_column(),
        ))
        .bind::<Text, _>(abstract_card_id)
        .bind::<Text, _>(stored)
        .execute(conn)?;
    }
    Ok(())
}
