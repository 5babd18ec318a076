use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named collection of physical cards, such as a deck or a collection
#[derive(
    Queryable, QueryableByName, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Eq, Serialize, Deserialize,
)]
#[diesel(table_name = crate::schema::card_sets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct CardSet {
    /// Unique identifier for the card set (UUID v4 as string)
    id: String,

    /// Unique name of the set
    name: String,

    author: String,

    /// Free-form description
    comment: String,

    annotations: String,

    /// Whether the set is currently in use (e.g. a deck being played)
    in_use: bool,

    /// The set this one is nested under
    parent_id: Option<String>,

    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,
}

impl CardSet {
    /// Creates a new, empty card set
    ///
    /// ### Arguments
    ///
    /// * `name` - The unique name of the set
    /// * `parent_id` - The set to nest this one under, if any
    ///
    /// ### Returns
    ///
    /// A new `CardSet` that is not in use and has no author, comment or annotations
    pub fn new(name: String, parent_id: Option<String>) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            author: String::new(),
            comment: String::new(),
            annotations: String::new(),
            in_use: false,
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn get_author(&self) -> String {
        self.author.clone()
    }

    pub fn set_author(&mut self, author: String) {
        self.author = author;
    }

    pub fn get_comment(&self) -> String {
        self.comment.clone()
    }

    pub fn set_comment(&mut self, comment: String) {
        self.comment = comment;
    }

    pub fn get_annotations(&self) -> String {
        self.annotations.clone()
    }

    pub fn set_annotations(&mut self, annotations: String) {
        self.annotations = annotations;
    }

    pub fn get_in_use(&self) -> bool {
        self.in_use
    }

    pub fn set_in_use(&mut self, in_use: bool) {
        self.in_use = in_use;
    }

    pub fn get_parent_id(&self) -> Option<String> {
        self.parent_id.clone()
    }

    pub fn set_parent_id(&mut self, parent_id: Option<String>) {
        self.parent_id = parent_id;
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }

    /// Marks the set as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().naive_utc();
    }

    /// Builds a copy under a new name, keeping parent and metadata
    pub fn copy_as(&self, name: String) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            author: self.author.clone(),
            comment: self.comment.clone(),
            annotations: self.annotations.clone(),
            in_use: false,
            parent_id: self.parent_id.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// How many copies of a physical card a set holds
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::card_set_cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CardSetEntry {
    card_set_id: String,
    physical_card_id: String,
    card_count: i32,
}

impl CardSetEntry {
    pub fn new(card_set_id: String, physical_card_id: String, card_count: i32) -> Self {
        Self { card_set_id, physical_card_id, card_count }
    }

    pub fn get_card_set_id(&self) -> String {
        self.card_set_id.clone()
    }

    pub fn get_physical_card_id(&self) -> String {
        self.physical_card_id.clone()
    }

    pub fn get_count(&self) -> i32 {
        self.card_count
    }
}

/// A card set entry joined with its card name and printing
#[derive(QueryableByName, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSetCard {
    #[diesel(sql_type = Text)]
    pub physical_card_id: String,
    #[diesel(sql_type = Text)]
    pub abstract_card_id: String,
    #[diesel(sql_type = Text)]
    pub card_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub expansion: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub printing: Option<String>,
    #[diesel(sql_type = Integer)]
    pub card_count: i32,
}

/// Card totals of a set
#[derive(QueryableByName, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardSetSummary {
    #[diesel(sql_type = BigInt)]
    pub total: i64,
    #[diesel(sql_type = BigInt)]
    pub crypt: i64,
    #[diesel(sql_type = BigInt)]
    pub library: i64,
}
