use crate::db::{transaction_with_retry, DbPool, ExecuteWithRetry};
use crate::dto::{CardCountDto, CreateCardSetDto, UpdateCardSetDto};
use crate::errors::RepoError;
use crate::filters::{Filter, FilterTarget, SqlValue};
use crate::models::{CardSet, CardSetCard, CardSetEntry, CardSetSummary, PhysicalCard};
use crate::schema::{card_set_cards, card_sets, physical_cards};
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use diesel::upsert::excluded;
use anyhow::Result;
use tracing::{instrument, debug, info, warn};

use super::filter_repo::{bound_query, select_card_set_cards};

fn find_card_set(conn: &mut SqliteConnection, id: &str) -> QueryResult<Option<CardSet>> {
    card_sets::table.find(id).first::<CardSet>(conn).optional()
}

fn find_card_set_by_name(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<CardSet>> {
    card_sets::table
        .filter(card_sets::name.eq(name.trim()))
        .first::<CardSet>(conn)
        .optional()
}

fn require_card_set(conn: &mut SqliteConnection, id: &str) -> Result<CardSet> {
    Ok(find_card_set(conn, id)?.ok_or(RepoError::NotFound("Card set"))?)
}

fn checked_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RepoError::Invalid("Card set name cannot be empty".to_string()).into());
    }
    Ok(name.to_string())
}

/// Fails if another card set already uses `name`
fn ensure_name_free(conn: &mut SqliteConnection, name: &str, id: Option<&str>) -> Result<()> {
    if let Some(existing) = find_card_set_by_name(conn, name)? {
        if id != Some(existing.get_id().as_str()) {
            return Err(RepoError::NameConflict { entity: "card set", name: name.to_string() }.into());
        }
    }
    Ok(())
}

/// Creates a new card set
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `dto` - Name, parent and metadata of the new set
///
/// ### Returns
///
/// A Result containing the newly created CardSet if successful
///
/// ### Errors
///
/// Returns an error if:
/// - The name is blank (`RepoError::Invalid`)
/// - Another card set has the same name (`RepoError::NameConflict`)
/// - The parent card set does not exist (`RepoError::NotFound`)
/// - The database insert operation fails
#[instrument(skip(pool, dto), fields(name = %dto.name))]
pub async fn create_card_set(pool: &DbPool, dto: &CreateCardSetDto) -> Result<CardSet> {
    debug!("Creating new card set");

    let name = checked_name(&dto.name)?;
    let conn = &mut pool.get()?;

    ensure_name_free(conn, &name, None)?;
    if let Some(parent_id) = &dto.parent_id {
        find_card_set(conn, parent_id)?.ok_or(RepoError::NotFound("Parent card set"))?;
    }

    let mut card_set = CardSet::new(name, dto.parent_id.clone());
    card_set.set_author(dto.author.clone());
    card_set.set_comment(dto.comment.clone());
    card_set.set_annotations(dto.annotations.clone());
    card_set.set_in_use(dto.in_use);

    diesel::insert_into(card_sets::table)
        .values(card_set.clone())
        .execute_with_retry(conn).await?;

    info!("Successfully created card set with id: {}", card_set.get_id());
    Ok(card_set)
}

/// Retrieves a card set by its ID
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(card_set_id = %id))]
pub fn get_card_set(pool: &DbPool, id: &str) -> Result<Option<CardSet>> {
    debug!("Retrieving card set");

    let conn = &mut pool.get()?;
    Ok(find_card_set(conn, id)?)
}

/// Retrieves a card set by name, ignoring case
#[instrument(skip(pool), fields(name = %name))]
pub fn get_card_set_by_name(pool: &DbPool, name: &str) -> Result<Option<CardSet>> {
    debug!("Retrieving card set by name");

    let conn = &mut pool.get()?;
    Ok(find_card_set_by_name(conn, name)?)
}

/// Lists all card sets sorted by name
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool))]
pub fn list_card_sets(pool: &DbPool) -> Result<Vec<CardSet>> {
    debug!("Listing card sets");

    let conn = &mut pool.get()?;
    let result = card_sets::table
        .order(card_sets::name.asc())
        .load::<CardSet>(conn)?;

    debug!("Found {} card sets", result.len());
    Ok(result)
}

/// Lists the card sets directly nested under a card set
///
/// ### Errors
///
/// Returns an error if:
/// - The card set does not exist (`RepoError::NotFound`)
/// - The database query fails
#[instrument(skip(pool), fields(card_set_id = %id))]
pub fn list_child_card_sets(pool: &DbPool, id: &str) -> Result<Vec<CardSet>> {
    debug!("Listing child card sets");

    let conn = &mut pool.get()?;
    require_card_set(conn, id)?;

    let result = card_sets::table
        .filter(card_sets::parent_id.eq(id))
        .order(card_sets::name.asc())
        .load::<CardSet>(conn)?;

    Ok(result)
}

/// Walks up from `parent_id` and fails if the chain reaches `id`
fn check_parent_chain(conn: &mut SqliteConnection, id: &str, parent_id: &str) -> Result<()> {
    let mut current = Some(parent_id.to_string());
    while let Some(ancestor_id) = current {
        if ancestor_id == id {
            return Err(RepoError::ParentLoop(
                "A card set cannot be nested under itself or one of its descendants".to_string(),
            )
            .into());
        }
        let ancestor = find_card_set(conn, &ancestor_id)?.ok_or(RepoError::NotFound("Parent card set"))?;
        current = ancestor.get_parent_id();
    }
    Ok(())
}

/// Updates the fields of a card set that are present in `dto`
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `id` - The card set to update
/// * `dto` - The fields to change; `parent_id: Some(None)` detaches the set
///
/// ### Returns
///
/// A Result containing the updated CardSet
///
/// ### Errors
///
/// Returns an error if:
/// - The card set or the new parent does not exist (`RepoError::NotFound`)
/// - The new name is blank (`RepoError::Invalid`) or taken (`RepoError::NameConflict`)
/// - The new parent would create a loop (`RepoError::ParentLoop`)
/// - The database update operation fails
#[instrument(skip(pool, dto), fields(card_set_id = %id))]
pub async fn update_card_set(pool: &DbPool, id: &str, dto: &UpdateCardSetDto) -> Result<CardSet> {
    debug!("Updating card set");

    let conn = &mut pool.get()?;
    let mut card_set = require_card_set(conn, id)?;

    if let Some(name) = &dto.name {
        let name = checked_name(name)?;
        ensure_name_free(conn, &name, Some(id))?;
        card_set.set_name(name);
    }
    if let Some(author) = &dto.author {
        card_set.set_author(author.clone());
    }
    if let Some(comment) = &dto.comment {
        card_set.set_comment(comment.clone());
    }
    if let Some(annotations) = &dto.annotations {
        card_set.set_annotations(annotations.clone());
    }
    if let Some(in_use) = dto.in_use {
        card_set.set_in_use(in_use);
    }
    if let Some(parent_id) = &dto.parent_id {
        if let Some(parent_id) = parent_id {
            check_parent_chain(conn, id, parent_id)?;
        }
        card_set.set_parent_id(parent_id.clone());
    }
    card_set.touch();

    diesel::update(card_sets::table.find(id))
        .set(&card_set)
        .execute_with_retry(conn).await?;

    info!("Updated card set");
    Ok(card_set)
}

/// Deletes a card set
///
/// Its children move up to its own parent and its entries are removed. The
/// physical cards stay.
///
/// ### Errors
///
/// Returns an error if:
/// - The card set does not exist (`RepoError::NotFound`)
/// - The database operations fail
#[instrument(skip(pool), fields(card_set_id = %id))]
pub async fn delete_card_set(pool: &DbPool, id: &str) -> Result<()> {
    debug!("Deleting card set");

    let conn = &mut pool.get()?;
    let moved = transaction_with_retry(conn, |conn| -> Result<usize> {
        let card_set = require_card_set(conn, id)?;

        let moved = diesel::update(card_sets::table.filter(card_sets::parent_id.eq(id)))
            .set(card_sets::parent_id.eq(card_set.get_parent_id()))
            .execute(conn)?;
        diesel::delete(card_sets::table.find(id)).execute(conn)?;

        Ok(moved)
    })
    .await?;

    info!("Deleted card set, moved {} children to its parent", moved);
    Ok(())
}

/// Lists the entries of a card set with their card names and printings
///
/// ### Errors
///
/// Returns an error if:
/// - The card set does not exist (`RepoError::NotFound`)
/// - The database query fails
pub fn list_card_set_cards(pool: &DbPool, id: &str) -> Result<Vec<CardSetCard>> {
    select_card_set_cards(pool, id, &Filter::Null)
}

fn require_physical_cards(conn: &mut SqliteConnection, cards: &[CardCountDto]) -> Result<()> {
    for card in cards {
        physical_cards::table
            .find(&card.physical_card_id)
            .first::<PhysicalCard>(conn)
            .optional()?
            .ok_or(RepoError::NotFound("Physical card"))?;
    }
    Ok(())
}

/// Fails if adding `count` copies would take an entry past what it can hold
fn check_total(card: &CardCountDto, existing: i32) -> Result<i32> {
    let total = i64::from(existing) + i64::from(card.count);
    i32::try_from(total).map_err(|_| {
        RepoError::Invalid(format!(
            "Card set would hold {} copies of {}, more than {}",
            total,
            card.physical_card_id,
            i32::MAX
        ))
        .into()
    })
}

fn check_counts(cards: &[CardCountDto]) -> Result<()> {
    if let Some(card) = cards.iter().find(|card| card.count <= 0) {
        return Err(RepoError::Invalid(format!(
            "Card count must be positive, got {} for {}",
            card.count, card.physical_card_id
        ))
        .into());
    }
    Ok(())
}

/// Touches the card set so its modification time follows its entries
fn touch_card_set(conn: &mut SqliteConnection, card_set: &mut CardSet) -> QueryResult<usize> {
    card_set.touch();
    diesel::update(card_sets::table.find(card_set.get_id()))
        .set(card_sets::updated_at.eq(card_set.get_updated_at().naive_utc()))
        .execute(conn)
}

/// Adds copies of physical cards to a card set
///
/// Counts add to what the set already holds.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `id` - The card set
/// * `cards` - Physical cards and how many copies of each to add
///
/// ### Returns
///
/// The entries of the set after the change
///
/// ### Errors
///
/// Returns an error if:
/// - The card set or a physical card does not exist (`RepoError::NotFound`)
/// - A count is not positive, or an entry would pass `i32::MAX` copies (`RepoError::Invalid`)
/// - The database operations fail
#[instrument(skip(pool, cards), fields(card_set_id = %id, cards = cards.len()))]
pub async fn add_cards_to_card_set(pool: &DbPool, id: &str, cards: &[CardCountDto]) -> Result<Vec<CardSetCard>> {
    debug!("Adding cards to card set");

    check_counts(cards)?;
    {
        let conn = &mut pool.get()?;
        transaction_with_retry(conn, |conn| -> Result<()> {
            let mut card_set = require_card_set(conn, id)?;
            require_physical_cards(conn, cards)?;

            for card in cards {
                let existing = card_set_cards::table
                    .find((id, &card.physical_card_id))
                    .select(card_set_cards::card_count)
                    .first::<i32>(conn)
                    .optional()?;
                check_total(card, existing.unwrap_or(0))?;

                let entry = CardSetEntry::new(id.to_string(), card.physical_card_id.clone(), card.count);
                diesel::insert_into(card_set_cards::table)
                    .values(&entry)
                    .on_conflict((card_set_cards::card_set_id, card_set_cards::physical_card_id))
                    .do_update()
                    .set(card_set_cards::card_count.eq(card_set_cards::card_count + excluded(card_set_cards::card_count)))
                    .execute(conn)?;
            }
            touch_card_set(conn, &mut card_set)?;
            Ok(())
        })
        .await?;
    }

    info!("Added {} cards", cards.iter().map(|card| i64::from(card.count)).sum::<i64>());
    list_card_set_cards(pool, id)
}

/// Removes copies of physical cards from a card set
///
/// A count never drops below zero; entries that reach zero are deleted.
/// Removing a card the set does not hold is not an error.
///
/// ### Errors
///
/// Returns an error if:
/// - The card set does not exist (`RepoError::NotFound`)
/// - A count is not positive (`RepoError::Invalid`)
/// - The database operations fail
#[instrument(skip(pool, cards), fields(card_set_id = %id, cards = cards.len()))]
pub async fn remove_cards_from_card_set(pool: &DbPool, id: &str, cards: &[CardCountDto]) -> Result<Vec<CardSetCard>> {
    debug!("Removing cards from card set");

    check_counts(cards)?;
    {
        let conn = &mut pool.get()?;
        transaction_with_retry(conn, |conn| -> Result<()> {
            let mut card_set = require_card_set(conn, id)?;

            for card in cards {
                let entry = card_set_cards::table
                    .find((id, &card.physical_card_id))
                    .first::<CardSetEntry>(conn)
                    .optional()?;
                let Some(entry) = entry else {
                    warn!("Card set does not hold {}", card.physical_card_id);
                    continue;
                };

                let target = card_set_cards::table.find((id, &card.physical_card_id));
                let remaining = entry.get_count() - card.count;
                if remaining > 0 {
                    diesel::update(target)
                        .set(card_set_cards::card_count.eq(remaining))
                        .execute(conn)?;
                } else {
                    diesel::delete(target).execute(conn)?;
                }
            }
            touch_card_set(conn, &mut card_set)?;
            Ok(())
        })
        .await?;
    }

    info!("Removed cards");
    list_card_set_cards(pool, id)
}

/// Copies a card set under a new name, with the same parent and cards
///
/// The copy is never marked in use.
///
/// ### Errors
///
/// Returns an error if:
/// - The card set does not exist (`RepoError::NotFound`)
/// - The name is blank (`RepoError::Invalid`) or taken (`RepoError::NameConflict`)
/// - The database operations fail
#[instrument(skip(pool), fields(card_set_id = %id, name = %name))]
pub async fn copy_card_set(pool: &DbPool, id: &str, name: &str) -> Result<CardSet> {
    debug!("Copying card set");

    let name = checked_name(name)?;
    let conn = &mut pool.get()?;
    let copy = transaction_with_retry(conn, |conn| -> Result<CardSet> {
        let original = require_card_set(conn, id)?;
        ensure_name_free(conn, &name, None)?;

        let copy = original.copy_as(name.clone());
        diesel::insert_into(card_sets::table).values(&copy).execute(conn)?;
        diesel::sql_query(
            "INSERT INTO card_set_cards (card_set_id, physical_card_id, card_count) \
             SELECT ?, physical_card_id, card_count FROM card_set_cards WHERE card_set_id = ?",
        )
        .bind::<Text, _>(copy.get_id())
        .bind::<Text, _>(id)
        .execute(conn)?;

        Ok(copy)
    })
    .await?;

    info!("Copied card set to {}", copy.get_id());
    Ok(copy)
}

/// Counts the cards of a set, split into crypt and library
///
/// ### Errors
///
/// Returns an error if:
/// - The card set does not exist (`RepoError::NotFound`)
/// - The database query fails
#[instrument(skip(pool), fields(card_set_id = %id))]
pub fn card_set_summary(pool: &DbPool, id: &str) -> Result<CardSetSummary> {
    debug!("Summarising card set");

    let crypt = Filter::Crypt.compile(FilterTarget::PhysicalCard)?;
    let conn = &mut pool.get()?;
    require_card_set(conn, id)?;

    let sql = format!(
        "SELECT COALESCE(SUM(m.card_count), 0) AS total, \
         COALESCE(SUM(CASE WHEN {crypt} THEN m.card_count ELSE 0 END), 0) AS crypt, \
         COALESCE(SUM(CASE WHEN {crypt} THEN 0 ELSE m.card_count END), 0) AS library \
         FROM card_set_cards m \
         JOIN physical_cards pc ON pc.id = m.physical_card_id \
         JOIN abstract_cards ac ON ac.id = pc.abstract_card_id \
         WHERE m.card_set_id = ?",
        crypt = crypt.sql,
    );

    // the crypt condition appears twice, ahead of the set id
    let mut binds = crypt.binds.clone();
    binds.extend(crypt.binds);
    binds.push(SqlValue::from(id));
    let summary = bound_query(sql, &binds).get_result::<CardSetSummary>(conn)?;

    Ok(summary)
}
