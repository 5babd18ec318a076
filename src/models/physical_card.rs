use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An abstract card bound to a printing
///
/// A missing `printing_id` stands for an owned card whose printing is not
/// known; there is at most one such physical card per abstract card.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::physical_cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PhysicalCard {
    id: String,
    abstract_card_id: String,
    printing_id: Option<String>,
}

impl PhysicalCard {
    pub fn new(abstract_card_id: String, printing_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            abstract_card_id,
            printing_id,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_abstract_card_id(&self) -> String {
        self.abstract_card_id.clone()
    }

    pub fn get_printing_id(&self) -> Option<String> {
        self.printing_id.clone()
    }
}

/// A physical card joined with its card name and printing
#[derive(QueryableByName, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalCardView {
    #[diesel(sql_type = Text)]
    pub id: String,
    #[diesel(sql_type = Text)]
    pub abstract_card_id: String,
    #[diesel(sql_type = Text)]
    pub card_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub printing_id: Option<String>,
    /// Expansion name, `None` for an unknown printing
    #[diesel(sql_type = Nullable<Text>)]
    pub expansion: Option<String>,
    /// Printing name, `None` for the standard printing
    #[diesel(sql_type = Nullable<Text>)]
    pub printing: Option<String>,
}
