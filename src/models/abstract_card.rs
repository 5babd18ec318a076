use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DisciplineLevel, Ruling};

/// The canonical definition of a card, independent of any printing
#[derive(Queryable, QueryableByName, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::abstract_cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AbstractCard {
    /// Unique identifier for the card (UUID v4 as string)
    id: String,

    /// The card name as printed
    name: String,

    /// Lower-cased name, used for case-insensitive lookups
    canonical_name: String,

    /// Rules text
    card_text: String,

    /// Lower-cased rules text searched by `CardText`
    search_text: String,

    /// Crypt group, -1 for "any"
    card_group: Option<i32>,

    /// Crypt capacity
    capacity: Option<i32>,

    /// Cost, -1 for "X"
    cost: Option<i32>,

    /// What the cost is paid in: pool, blood or conviction
    cost_type: Option<String>,

    /// Life of allies and retainers
    life: Option<i32>,

    /// Advanced/normal level of a vampire
    level: Option<String>,

    /// When this card was added
    created_at: NaiveDateTime,
}

/// Lower-cases a card name the way lookups expect it
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl AbstractCard {
    /// Creates a new abstract card with no stats
    ///
    /// ### Arguments
    ///
    /// * `name` - The card name
    /// * `card_text` - The card's rules text
    ///
    /// ### Returns
    ///
    /// A new `AbstractCard` with its canonical name and search text derived
    pub fn new(name: String, card_text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            canonical_name: canonical_name(&name),
            search_text: card_text.to_lowercase(),
            name,
            card_text,
            card_group: None,
            capacity: None,
            cost: None,
            cost_type: None,
            life: None,
            level: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_canonical_name(&self) -> String {
        self.canonical_name.clone()
    }

    pub fn get_card_text(&self) -> String {
        self.card_text.clone()
    }

    pub fn get_search_text(&self) -> String {
        self.search_text.clone()
    }

    pub fn get_group(&self) -> Option<i32> {
        self.card_group
    }

    pub fn set_group(&mut self, group: Option<i32>) {
        self.card_group = group;
    }

    pub fn get_capacity(&self) -> Option<i32> {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: Option<i32>) {
        self.capacity = capacity;
    }

    pub fn get_cost(&self) -> Option<i32> {
        self.cost
    }

    pub fn set_cost(&mut self, cost: Option<i32>) {
        self.cost = cost;
    }

    pub fn get_cost_type(&self) -> Option<String> {
        self.cost_type.clone()
    }

    pub fn set_cost_type(&mut self, cost_type: Option<String>) {
        self.cost_type = cost_type;
    }

    pub fn get_life(&self) -> Option<i32> {
        self.life
    }

    pub fn set_life(&mut self, life: Option<i32>) {
        self.life = life;
    }

    pub fn get_level(&self) -> Option<String> {
        self.level.clone()
    }

    pub fn set_level(&mut self, level: Option<String>) {
        self.level = level;
    }

    /// Gets the card's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}

/// A discipline carried by a card together with its level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplinePair {
    pub discipline: String,
    pub level: DisciplineLevel,
}

/// An expansion a card was printed in together with its rarity there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityPair {
    pub expansion: String,
    pub rarity: String,
}

/// An abstract card with everything attached to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub card: AbstractCard,
    pub clans: Vec<String>,
    pub disciplines: Vec<DisciplinePair>,
    pub card_types: Vec<String>,
    pub sects: Vec<String>,
    pub titles: Vec<String>,
    pub creeds: Vec<String>,
    pub virtues: Vec<String>,
    pub keywords: Vec<String>,
    pub artists: Vec<String>,
    pub rarities: Vec<RarityPair>,
    pub rulings: Vec<Ruling>,
}
