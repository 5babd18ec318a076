use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::filters::{ArgShape, FilterTarget, KeywordSpec};
use crate::models::{DisciplinePair, RarityPair};

/// Query parameters selecting rows through the filter language
///
/// `var` entries are `name=value` pairs; repeating a name builds a list.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FilterQueryDto {
    /// A filter expression
    pub filter: Option<String>,

    /// Name of a filter saved in the configuration
    pub saved: Option<String>,

    /// Variable bindings for `$name` placeholders
    pub var: Vec<String>,
}

impl FilterQueryDto {
    /// True when neither an expression nor a saved filter was given
    pub fn is_empty(&self) -> bool {
        self.filter.as_deref().is_none_or(|f| f.trim().is_empty()) && self.saved.is_none()
    }

    /// Groups the `var` pairs by name
    ///
    /// ### Errors
    ///
    /// Returns the offending entry when it has no `=` or an empty name.
    pub fn variables(&self) -> Result<HashMap<String, Vec<String>>, String> {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for entry in &self.var {
            match entry.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => {
                    values
                        .entry(name.trim().trim_start_matches('$').to_string())
                        .or_default()
                        .push(value.trim().to_string());
                }
                _ => return Err(format!("Invalid variable binding '{}', expected name=value", entry)),
            }
        }
        Ok(values)
    }
}

impl fmt::Display for FilterQueryDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FilterQueryDto {{ filter: {}, saved: {}, var: {:?} }}",
            self.filter.as_deref().unwrap_or("None"),
            self.saved.as_deref().unwrap_or("None"),
            self.var
        )
    }
}

/// Builder for [`FilterQueryDto`], used by the command-line client
#[derive(Debug, Default)]
pub struct FilterQueryDtoBuilder {
    dto: FilterQueryDto,
}

impl FilterQueryDtoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.dto.filter = Some(filter.into());
        self
    }

    pub fn saved(mut self, saved: impl Into<String>) -> Self {
        self.dto.saved = Some(saved.into());
        self
    }

    pub fn var(mut self, name: &str, value: &str) -> Self {
        self.dto.var.push(format!("{}={}", name, value));
        self
    }

    pub fn build(self) -> FilterQueryDto {
        self.dto
    }
}

/// Data transfer object for creating a new abstract card
///
/// Vocabulary names that do not exist yet are created along with the card.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CreateAbstractCardDto {
    pub name: String,
    pub text: String,
    pub group: Option<i32>,
    pub capacity: Option<i32>,
    /// Cost, -1 for "X"
    pub cost: Option<i32>,
    pub cost_type: Option<String>,
    pub life: Option<i32>,
    pub level: Option<String>,
    pub clans: Vec<String>,
    pub disciplines: Vec<DisciplinePair>,
    pub card_types: Vec<String>,
    pub sects: Vec<String>,
    pub titles: Vec<String>,
    pub creeds: Vec<String>,
    pub virtues: Vec<String>,
    pub keywords: Vec<String>,
    pub artists: Vec<String>,
    /// Expansions (by name or short name) the card was printed in
    pub rarities: Vec<RarityPair>,
}

/// Data transfer object for adding a ruling to a card
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateRulingDto {
    pub text: String,
    pub code: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Data transfer object for getting or creating a physical card
///
/// Without an expansion the card's unknown-printing physical card is used;
/// without a printing name the expansion's standard printing is used.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CreatePhysicalCardDto {
    pub expansion: Option<String>,
    pub printing: Option<String>,
}

/// Data transfer object for creating an expansion
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateExpansionDto {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
}

/// Data transfer object for creating a named printing of an expansion
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreatePrintingDto {
    pub name: String,
}

/// Data transfer object for creating a card set
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CreateCardSetDto {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub annotations: String,
    #[serde(default)]
    pub in_use: bool,
}

/// Data transfer object for updating a card set
///
/// Absent fields are left alone. `parent_id` distinguishes a missing field
/// (keep the parent) from an explicit `null` (make the set top level).
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateCardSetDto {
    pub name: Option<String>,
    pub author: Option<String>,
    pub comment: Option<String>,
    pub annotations: Option<String>,
    pub in_use: Option<bool>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<String>>,
}

fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn default_count() -> i32 {
    1
}

/// A number of copies of one physical card
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CardCountDto {
    pub physical_card_id: String,
    #[serde(default = "default_count")]
    pub count: i32,
}

/// Data transfer object for adding cards to or removing cards from a set
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CardSetCardsDto {
    pub cards: Vec<CardCountDto>,
}

/// Data transfer object for copying a card set
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CopyCardSetDto {
    pub name: String,
}

/// Data transfer object for validating a filter expression
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ParseFilterDto {
    pub filter: String,
    /// Values for `$name` placeholders
    #[serde(default)]
    pub variables: HashMap<String, Vec<String>>,
}

/// Result of validating a filter expression
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ParseFilterResponse {
    /// The expression in canonical form, variables bound
    pub filter: String,
    /// Placeholders still waiting for a value
    pub variables: Vec<String>,
    /// Targets the filter can be run against, empty while variables remain
    pub targets: Vec<FilterTarget>,
}

/// A filter keyword as reported by the API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeywordDto {
    pub keyword: String,
    pub description: String,
    pub shape: ArgShape,
    pub targets: Vec<FilterTarget>,
}

impl From<&KeywordSpec> for KeywordDto {
    fn from(spec: &KeywordSpec) -> Self {
        Self {
            keyword: spec.keyword.to_string(),
            description: spec.description.to_string(),
            shape: spec.shape(),
            targets: spec.targets().to_vec(),
        }
    }
}

/// Values accepted by a filter keyword
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeywordValuesDto {
    pub keyword: String,
    pub values: Vec<String>,
}

/// A named filter from the configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SavedFilterDto {
    pub name: String,
    pub filter: String,
}
