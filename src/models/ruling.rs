use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rules clarification attached to an abstract card
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::rulings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Ruling {
    id: String,
    abstract_card_id: String,
    text: String,
    /// Short reference code, e.g. `[LSJ 20040518]`
    code: String,
    url: Option<String>,
}

impl Ruling {
    pub fn new(abstract_card_id: String, text: String, code: String, url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            abstract_card_id,
            text,
            code,
            url,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_abstract_card_id(&self) -> String {
        self.abstract_card_id.clone()
    }

    pub fn get_text(&self) -> String {
        self.text.clone()
    }

    pub fn get_code(&self) -> String {
        self.code.clone()
    }

    pub fn get_url(&self) -> Option<String> {
        self.url.clone()
    }
}
