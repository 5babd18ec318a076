use crate::db::{transaction_with_retry, DbPool, ExecuteWithRetry};
use crate::dto::CreateAbstractCardDto;
use crate::errors::RepoError;
use crate::models::{
    canonical_name, AbstractCard, CardDetails, DisciplineLevel, DisciplinePair, RarityPair, Ruling, Vocabulary,
};
use crate::schema::{abstract_card_disciplines, abstract_card_rarities, abstract_cards, expansions, rulings};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use anyhow::{Result, anyhow};
use tracing::{instrument, debug, info};

use super::expansion_repo::find_expansion;
use super::vocabulary_repo::{card_vocabulary, ensure_vocabulary_name, link_card_vocabulary};

/// Creates a new abstract card with its vocabulary, disciplines and rarities
///
/// Vocabulary names that are not known yet are added. Everything is written
/// in one transaction, so a failure leaves no partial card behind.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `dto` - The card definition
///
/// ### Returns
///
/// A Result containing the newly created AbstractCard if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The name is blank (`RepoError::Invalid`)
/// - A card with the same name exists (`RepoError::NameConflict`)
/// - A rarity names an unknown expansion (`RepoError::NotFound`)
/// - Any database statement fails
#[instrument(skip(pool, dto), fields(name = %dto.name))]
pub async fn create_abstract_card(pool: &DbPool, dto: &CreateAbstractCardDto) -> Result<AbstractCard> {
    debug!("Creating new abstract card");

    let name = dto.name.trim();
    if name.is_empty() {
        return Err(RepoError::Invalid("Card name cannot be empty".to_string()).into());
    }

    let mut card = AbstractCard::new(name.to_string(), dto.text.clone());
    card.set_group(dto.group);
    card.set_capacity(dto.capacity);
    card.set_cost(dto.cost);
    card.set_cost_type(dto.cost_type.clone());
    card.set_life(dto.life);
    card.set_level(dto.level.clone());

    let conn = &mut pool.get()?;

    let exists = abstract_cards::table
        .filter(abstract_cards::canonical_name.eq(card.get_canonical_name()))
        .first::<AbstractCard>(conn)
        .optional()?
        .is_some();
    if exists {
        return Err(RepoError::NameConflict { entity: "card", name: name.to_string() }.into());
    }

    transaction_with_retry(conn, |conn| insert_card(conn, &card, dto)).await?;

    info!("Successfully created abstract card with id: {}", card.get_id());
    Ok(card)
}

fn insert_card(conn: &mut SqliteConnection, card: &AbstractCard, dto: &CreateAbstractCardDto) -> Result<()> {
    let card_id = card.get_id();

    diesel::insert_into(abstract_cards::table).values(card).execute(conn)?;

    let lists = [
        (Vocabulary::Clan, &dto.clans),
        (Vocabulary::CardType, &dto.card_types),
        (Vocabulary::Sect, &dto.sects),
        (Vocabulary::Title, &dto.titles),
        (Vocabulary::Creed, &dto.creeds),
        (Vocabulary::Virtue, &dto.virtues),
        (Vocabulary::Keyword, &dto.keywords),
        (Vocabulary::Artist, &dto.artists),
    ];
    for (vocabulary, names) in lists {
        link_card_vocabulary(conn, vocabulary, &card_id, names)?;
    }

    for pair in &dto.disciplines {
        let discipline = ensure_vocabulary_name(conn, Vocabulary::Discipline, &pair.discipline)?;
        diesel::replace_into(abstract_card_disciplines::table)
            .values((
                abstract_card_disciplines::abstract_card_id.eq(&card_id),
                abstract_card_disciplines::discipline_name.eq(discipline),
                abstract_card_disciplines::level.eq(pair.level.as_str()),
            ))
            .execute(conn)?;
    }

    for pair in &dto.rarities {
        let expansion = find_expansion(conn, &pair.expansion)?
            .ok_or(RepoError::NotFound("Expansion"))?;
        let rarity = ensure_vocabulary_name(conn, Vocabulary::Rarity, &pair.rarity)?;
        diesel::insert_or_ignore_into(abstract_card_rarities::table)
            .values((
                abstract_card_rarities::abstract_card_id.eq(&card_id),
                abstract_card_rarities::expansion_id.eq(expansion.get_id()),
                abstract_card_rarities::rarity_name.eq(rarity),
            ))
            .execute(conn)?;
    }

    Ok(())
}

/// Retrieves an abstract card by its ID
///
/// ### Returns
///
/// A Result containing an Option with the AbstractCard if found, or None if not found
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(card_id = %id))]
pub fn get_abstract_card(pool: &DbPool, id: &str) -> Result<Option<AbstractCard>> {
    debug!("Retrieving abstract card");

    let conn = &mut pool.get()?;
    let result = abstract_cards::table
        .find(id)
        .first::<AbstractCard>(conn)
        .optional()?;

    Ok(result)
}

/// Retrieves an abstract card by name, ignoring case
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(name = %name))]
pub fn get_abstract_card_by_name(pool: &DbPool, name: &str) -> Result<Option<AbstractCard>> {
    debug!("Retrieving abstract card by name");

    let conn = &mut pool.get()?;
    let result = abstract_cards::table
        .filter(abstract_cards::canonical_name.eq(canonical_name(name)))
        .first::<AbstractCard>(conn)
        .optional()?;

    Ok(result)
}

/// Lists all abstract cards sorted by name
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool))]
pub fn list_abstract_cards(pool: &DbPool) -> Result<Vec<AbstractCard>> {
    debug!("Listing abstract cards");

    let conn = &mut pool.get()?;
    let result = abstract_cards::table
        .order(abstract_cards::name.asc())
        .load::<AbstractCard>(conn)?;

    debug!("Found {} abstract cards", result.len());
    Ok(result)
}

/// Loads an abstract card together with everything linked to it
///
/// ### Returns
///
/// A Result containing an Option with the CardDetails if the card exists
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - Any of the queries fails
/// - A stored discipline level is not recognised
#[instrument(skip(pool), fields(card_id = %id))]
pub fn get_card_details(pool: &DbPool, id: &str) -> Result<Option<CardDetails>> {
    debug!("Retrieving card details");

    let conn = &mut pool.get()?;
    let card = match abstract_cards::table.find(id).first::<AbstractCard>(conn).optional()? {
        Some(card) => card,
        None => return Ok(None),
    };

    let disciplines = abstract_card_disciplines::table
        .filter(abstract_card_disciplines::abstract_card_id.eq(id))
        .order(abstract_card_disciplines::discipline_name.asc())
        .select((abstract_card_disciplines::discipline_name, abstract_card_disciplines::level))
        .load::<(String, String)>(conn)?
        .into_iter()
        .map(|(discipline, level)| {
            let level = level.parse::<DisciplineLevel>().map_err(|e| anyhow!(e))?;
            Ok(DisciplinePair { discipline, level })
        })
        .collect::<Result<Vec<_>>>()?;

    let rarities = abstract_card_rarities::table
        .inner_join(expansions::table)
        .filter(abstract_card_rarities::abstract_card_id.eq(id))
        .order((expansions::name.asc(), abstract_card_rarities::rarity_name.asc()))
        .select((expansions::name, abstract_card_rarities::rarity_name))
        .load::<(String, String)>(conn)?
        .into_iter()
        .map(|(expansion, rarity)| RarityPair { expansion, rarity })
        .collect();

    let card_rulings = rulings::table
        .filter(rulings::abstract_card_id.eq(id))
        .order(rulings::code.asc())
        .load::<Ruling>(conn)?;

    Ok(Some(CardDetails {
        clans: card_vocabulary(conn, Vocabulary::Clan, id)?,
        disciplines,
        card_types: card_vocabulary(conn, Vocabulary::CardType, id)?,
        sects: card_vocabulary(conn, Vocabulary::Sect, id)?,
        titles: card_vocabulary(conn, Vocabulary::Title, id)?,
        creeds: card_vocabulary(conn, Vocabulary::Creed, id)?,
        virtues: card_vocabulary(conn, Vocabulary::Virtue, id)?,
        keywords: card_vocabulary(conn, Vocabulary::Keyword, id)?,
        artists: card_vocabulary(conn, Vocabulary::Artist, id)?,
        rarities,
        rulings: card_rulings,
        card,
    }))
}

/// Adds a ruling to an abstract card
///
/// ### Errors
///
/// Returns an error if:
/// - The card does not exist (`RepoError::NotFound`)
/// - The text or code is blank (`RepoError::Invalid`)
/// - The database insert operation fails
#[instrument(skip(pool, text), fields(card_id = %abstract_card_id, code = %code))]
pub async fn add_ruling(
    pool: &DbPool,
    abstract_card_id: &str,
    text: String,
    code: String,
    url: Option<String>,
) -> Result<Ruling> {
    debug!("Adding ruling");

    if text.trim().is_empty() || code.trim().is_empty() {
        return Err(RepoError::Invalid("Ruling text and code are required".to_string()).into());
    }

    let conn = &mut pool.get()?;
    abstract_cards::table
        .find(abstract_card_id)
        .first::<AbstractCard>(conn)
        .optional()?
        .ok_or(RepoError::NotFound("Card"))?;

    let ruling = Ruling::new(abstract_card_id.to_string(), text, code, url);
    diesel::insert_into(rulings::table)
        .values(ruling.clone())
        .execute_with_retry(conn).await?;

    info!("Successfully added ruling with id: {}", ruling.get_id());
    Ok(ruling)
}

/// Deletes an abstract card
///
/// Its vocabulary links, rulings, physical cards and the card set entries
/// of those physical cards go with it.
///
/// ### Errors
///
/// Returns an error if:
/// - The card does not exist (`RepoError::NotFound`)
/// - The database delete operation fails
#[instrument(skip(pool), fields(card_id = %id))]
pub async fn delete_abstract_card(pool: &DbPool, id: &str) -> Result<()> {
    debug!("Deleting abstract card");

    let conn = &mut pool.get()?;
    let deleted = diesel::delete(abstract_cards::table.find(id))
        .execute_with_retry(conn).await?;

    if deleted == 0 {
        return Err(RepoError::NotFound("Card").into());
    }

    info!("Deleted abstract card");
    Ok(())
}
