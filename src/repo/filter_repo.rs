use crate::db::DbPool;
use crate::errors::RepoError;
use crate::filters::{Filter, FilterTarget, KeywordKind, KeywordSpec, SqlValue, NO_EXPANSION};
use crate::models::{AbstractCard, CardSet, CardSetCard, DisciplineLevel, PhysicalCardView, Vocabulary};
use crate::schema::card_sets;
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{Integer, Text};
use diesel::sqlite::{Sqlite, SqliteConnection};
use anyhow::Result;
use tracing::{instrument, debug};

use super::vocabulary_repo::NameRow;

/// Largest exact count offered for `CardCount`
const MAX_LISTED_COUNT: u32 = 30;

const PHYSICAL_CARD_VIEW: &str = "SELECT pc.id, pc.abstract_card_id, ac.name AS card_name, pc.printing_id, \
     e.name AS expansion, p.name AS printing \
     FROM physical_cards pc \
     JOIN abstract_cards ac ON ac.id = pc.abstract_card_id \
     LEFT JOIN printings p ON p.id = pc.printing_id \
     LEFT JOIN expansions e ON e.id = p.expansion_id";

const CARD_SET_CARD_VIEW: &str = "SELECT m.physical_card_id, pc.abstract_card_id, ac.name AS card_name, \
     e.name AS expansion, p.name AS printing, m.card_count \
     FROM card_set_cards m \
     JOIN physical_cards pc ON pc.id = m.physical_card_id \
     JOIN abstract_cards ac ON ac.id = pc.abstract_card_id \
     LEFT JOIN printings p ON p.id = pc.printing_id \
     LEFT JOIN expansions e ON e.id = p.expansion_id";

#[derive(QueryableByName, Debug)]
struct NumberRow {
    #[diesel(sql_type = Integer)]
    value: i32,
}

/// Builds a boxed raw query with its positional bind values applied in order
pub(crate) fn bound_query(sql: String, binds: &[SqlValue]) -> BoxedSqlQuery<'static, Sqlite, SqlQuery> {
    let mut query = diesel::sql_query(sql).into_boxed::<Sqlite>();
    for value in binds {
        query = match value {
            SqlValue::Text(text) => query.bind::<Text, _>(text.clone()),
            SqlValue::Integer(number) => query.bind::<Integer, _>(*number),
        };
    }
    query
}

/// Loads physical card views matching a SQL condition over `pc` and `ac`
pub(crate) fn load_physical_card_views(
    conn: &mut SqliteConnection,
    condition: &str,
    binds: &[SqlValue],
) -> Result<Vec<PhysicalCardView>> {
    let sql = format!("{PHYSICAL_CARD_VIEW} WHERE {condition} ORDER BY ac.name, e.name, p.name");
    Ok(bound_query(sql, binds).load::<PhysicalCardView>(conn)?)
}

/// Selects the abstract cards matching a filter, sorted by name
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `filter` - A validated filter
///
/// ### Errors
///
/// Returns an error if:
/// - The filter does not apply to abstract cards (`FilterError::UnsupportedTarget`)
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool, filter))]
pub fn select_abstract_cards(pool: &DbPool, filter: &Filter) -> Result<Vec<AbstractCard>> {
    let fragment = filter.compile(FilterTarget::AbstractCard)?;
    debug!("Selecting abstract cards where {}", fragment.sql);

    let conn = &mut pool.get()?;
    let sql = format!(
        "SELECT ac.* FROM {} WHERE {} ORDER BY ac.name",
        FilterTarget::AbstractCard.from_clause(),
        fragment.sql
    );
    let result = bound_query(sql, &fragment.binds).load::<AbstractCard>(conn)?;

    debug!("Filter matched {} abstract cards", result.len());
    Ok(result)
}

/// Selects the physical cards matching a filter, sorted by card name and printing
///
/// ### Errors
///
/// Returns an error if:
/// - The filter does not apply to physical cards (`FilterError::UnsupportedTarget`)
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool, filter))]
pub fn select_physical_cards(pool: &DbPool, filter: &Filter) -> Result<Vec<PhysicalCardView>> {
    let fragment = filter.compile(FilterTarget::PhysicalCard)?;
    debug!("Selecting physical cards where {}", fragment.sql);

    let conn = &mut pool.get()?;
    let result = load_physical_card_views(conn, &fragment.sql, &fragment.binds)?;

    debug!("Filter matched {} physical cards", result.len());
    Ok(result)
}

/// Selects the card sets matching a filter, sorted by name
///
/// ### Errors
///
/// Returns an error if:
/// - The filter does not apply to card sets (`FilterError::UnsupportedTarget`)
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool, filter))]
pub fn select_card_sets(pool: &DbPool, filter: &Filter) -> Result<Vec<CardSet>> {
    let fragment = filter.compile(FilterTarget::CardSet)?;
    debug!("Selecting card sets where {}", fragment.sql);

    let conn = &mut pool.get()?;
    let sql = format!(
        "SELECT cs.* FROM {} WHERE {} ORDER BY cs.name",
        FilterTarget::CardSet.from_clause(),
        fragment.sql
    );
    let result = bound_query(sql, &fragment.binds).load::<CardSet>(conn)?;

    debug!("Filter matched {} card sets", result.len());
    Ok(result)
}

/// Selects the entries of a card set whose physical cards match a filter
///
/// `Filter::Null` lists every entry of the set.
///
/// ### Errors
///
/// Returns an error if:
/// - The card set does not exist (`RepoError::NotFound`)
/// - The filter does not apply to physical cards (`FilterError::UnsupportedTarget`)
/// - The database query fails
#[instrument(skip(pool, filter), fields(card_set_id = %card_set_id))]
pub fn select_card_set_cards(pool: &DbPool, card_set_id: &str, filter: &Filter) -> Result<Vec<CardSetCard>> {
    let fragment = filter.compile(FilterTarget::PhysicalCard)?;
    debug!("Selecting card set entries where {}", fragment.sql);

    let conn = &mut pool.get()?;
    card_sets::table
        .find(card_set_id)
        .first::<CardSet>(conn)
        .optional()?
        .ok_or(RepoError::NotFound("Card set"))?;

    let sql = format!(
        "{CARD_SET_CARD_VIEW} WHERE m.card_set_id = ? AND ({}) ORDER BY ac.name, e.name, p.name",
        fragment.sql
    );
    let mut binds = vec![SqlValue::from(card_set_id)];
    binds.extend(fragment.binds);
    let result = bound_query(sql, &binds).load::<CardSetCard>(conn)?;

    debug!("Filter matched {} entries", result.len());
    Ok(result)
}

fn load_names(conn: &mut SqliteConnection, sql: &str) -> Result<Vec<String>> {
    let rows = diesel::sql_query(sql).load::<NameRow>(conn)?;
    Ok(rows.into_iter().map(|row| row.name).collect())
}

/// Lists the values a keyword accepts, as they would be written in a filter
///
/// Values come from the database where the keyword refers to stored data.
/// Free-text and argument-less keywords have no listed values.
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool, spec), fields(keyword = %spec.keyword))]
pub fn filter_values(pool: &DbPool, spec: &KeywordSpec) -> Result<Vec<String>> {
    debug!("Listing filter values");

    let conn = &mut pool.get()?;
    let values = match spec.kind {
        KeywordKind::Vocabulary(vocabulary) => {
            load_names(conn, &format!("SELECT name FROM {} ORDER BY name", vocabulary.table()))?
        }
        KeywordKind::DisciplineWithLevel => {
            let disciplines = load_names(
                conn,
                &format!("SELECT name FROM {} ORDER BY name", Vocabulary::Discipline.table()),
            )?;
            disciplines
                .iter()
                .flat_map(|name| {
                    [DisciplineLevel::Inferior, DisciplineLevel::Superior]
                        .map(|level| format!("{} with {}", name, level.as_str()))
                })
                .collect()
        }
        KeywordKind::Expansion => load_names(conn, "SELECT name FROM expansions ORDER BY name")?,
        KeywordKind::ExpansionWithRarity => load_names(
            conn,
            "SELECT DISTINCT e.name || ' with ' || r.rarity_name AS name \
             FROM abstract_card_rarities r JOIN expansions e ON e.id = r.expansion_id \
             ORDER BY name",
        )?,
        KeywordKind::Numeric(field) => {
            let column = field.column();
            let rows = diesel::sql_query(format!(
                "SELECT DISTINCT {column} AS value FROM abstract_cards WHERE {column} IS NOT NULL ORDER BY {column}"
            ))
            .load::<NumberRow>(conn)?;
            rows.into_iter()
                .map(|row| match field.special_value() {
                    Some((word, special)) if special == row.value => word.to_string(),
                    _ => row.value.to_string(),
                })
                .collect()
        }
        KeywordKind::CostType => load_names(
            conn,
            "SELECT DISTINCT cost_type AS name FROM abstract_cards WHERE cost_type IS NOT NULL ORDER BY cost_type",
        )?,
        KeywordKind::PhysicalExpansion => {
            let mut names = vec![NO_EXPANSION.to_string()];
            names.extend(load_names(conn, "SELECT name FROM expansions ORDER BY name")?);
            names
        }
        KeywordKind::CardSets | KeywordKind::ParentCardSet => {
            load_names(conn, "SELECT name FROM card_sets ORDER BY name")?
        }
        KeywordKind::CardCount => (0..=MAX_LISTED_COUNT)
            .map(|count| count.to_string())
            .chain(std::iter::once(format!(">{}", MAX_LISTED_COUNT)))
            .collect(),
        KeywordKind::CardText
        | KeywordKind::CardName
        | KeywordKind::CardSetText(_)
        | KeywordKind::Crypt
        | KeywordKind::Library
        | KeywordKind::SetsInUse => Vec::new(),
    };

    debug!("Found {} values", values.len());
    Ok(values)
}

#[cfg(test)]
mod tests;
