use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A card expansion (set release)
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::expansions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Expansion {
    /// Unique identifier for the expansion (UUID v4 as string)
    id: String,

    /// Full name, e.g. "Camarilla Edition"
    name: String,

    /// Abbreviation, e.g. "CE"
    short_name: Option<String>,

    /// When this expansion was added
    created_at: NaiveDateTime,
}

impl Expansion {
    /// Creates a new expansion
    ///
    /// ### Arguments
    ///
    /// * `name` - The full expansion name
    /// * `short_name` - An optional abbreviation
    ///
    /// ### Returns
    ///
    /// A new `Expansion` instance
    pub fn new(name: String, short_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            short_name,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_short_name(&self) -> Option<String> {
        self.short_name.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}

/// A printing of an expansion
///
/// Every expansion has a standard printing with no name; variants such as
/// "No Draft Text" are named printings of the same expansion.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::printings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Printing {
    id: String,
    expansion_id: String,
    name: Option<String>,
}

impl Printing {
    pub fn new(expansion_id: String, name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            expansion_id,
            name,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_expansion_id(&self) -> String {
        self.expansion_id.clone()
    }

    pub fn get_name(&self) -> Option<String> {
        self.name.clone()
    }

    /// True for the unnamed standard printing
    pub fn is_standard(&self) -> bool {
        self.name.is_none()
    }
}
