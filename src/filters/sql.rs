use serde::Serialize;

use super::filter::{CountSpec, Filter};
use super::{FilterError, FilterTarget};
use crate::models::Vocabulary;

/// Card types that make up the crypt
pub const CRYPT_TYPES: [&str; 2] = ["Vampire", "Imbued"];

/// A positional bind value for a compiled filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    Integer(i32),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(value)
    }
}

/// A SQL boolean expression with its `?` bind values in order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SqlFragment {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

impl FilterTarget {
    /// The `FROM` clause whose aliases compiled filters refer to
    pub fn from_clause(self) -> &'static str {
        match self {
            FilterTarget::AbstractCard => "abstract_cards ac",
            FilterTarget::PhysicalCard => {
                "physical_cards pc JOIN abstract_cards ac ON ac.id = pc.abstract_card_id"
            }
            FilterTarget::CardSet => "card_sets cs",
        }
    }
}

impl Filter {
    /// Compiles the filter into a predicate over the target's `FROM` clause
    ///
    /// ### Errors
    ///
    /// Returns `FilterError::UnsupportedTarget` when any part of the filter
    /// does not apply to `target`.
    pub fn compile(&self, target: FilterTarget) -> Result<SqlFragment, FilterError> {
        let mut compiler = Compiler { target, next_alias: 0, binds: Vec::new() };
        let sql = compiler.compile(self)?;
        Ok(SqlFragment { sql, binds: compiler.binds })
    }
}

struct Compiler {
    target: FilterTarget,
    next_alias: usize,
    binds: Vec<SqlValue>,
}

/// Escapes `LIKE` wildcards and wraps the text for a substring match
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Compiler {
    fn alias(&mut self, prefix: &str) -> String {
        self.next_alias += 1;
        format!("{}_{}", prefix, self.next_alias)
    }

    fn bind_text(&mut self, value: &str) -> &'static str {
        self.binds.push(SqlValue::Text(value.to_string()));
        "?"
    }

    fn bind_int(&mut self, value: i32) -> &'static str {
        self.binds.push(SqlValue::Integer(value));
        "?"
    }

    fn text_list<S: AsRef<str>>(&mut self, values: &[S]) -> String {
        values.iter().map(|value| self.bind_text(value.as_ref())).collect::<Vec<_>>().join(", ")
    }

    fn join(&mut self, parts: &[Filter], separator: &str, empty: &str) -> Result<String, FilterError> {
        if parts.is_empty() {
            return Ok(empty.to_string());
        }
        let compiled = parts
            .iter()
            .map(|part| self.compile(part).map(|sql| format!("({})", sql)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(compiled.join(separator))
    }

    fn compile(&mut self, filter: &Filter) -> Result<String, FilterError> {
        if let Some(spec) = filter.spec() {
            if !spec.applies_to(self.target) {
                return Err(FilterError::UnsupportedTarget { keyword: spec.keyword, target: self.target });
            }
        }

        let sql = match filter {
            Filter::Null => "1".to_string(),
            Filter::And(parts) => self.join(parts, " AND ", "1")?,
            Filter::Or(parts) => self.join(parts, " OR ", "0")?,
            Filter::Not(inner) => format!("NOT ({})", self.compile(inner)?),
            Filter::Vocabulary { vocabulary, names } => self.vocabulary(*vocabulary, names),
            Filter::DisciplineWithLevel(pairs) => {
                let alias = self.alias("discipline");
                let conditions = pairs
                    .iter()
                    .map(|(name, level)| {
                        let name = self.bind_text(name);
                        let level = self.bind_text(level.as_str());
                        format!(
                            "({alias}.discipline_name = {name} COLLATE NOCASE AND {alias}.level = {level})"
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(" OR ");
                format!(
                    "EXISTS (SELECT 1 FROM abstract_card_disciplines {alias} \
                     WHERE {alias}.abstract_card_id = ac.id AND ({conditions}))"
                )
            }
            Filter::Expansion(names) => {
                let rarity = self.alias("rarity");
                let expansion = self.alias("expansion");
                let matches = self.expansion_match(&expansion, names);
                format!(
                    "EXISTS (SELECT 1 FROM abstract_card_rarities {rarity} \
                     JOIN expansions {expansion} ON {expansion}.id = {rarity}.expansion_id \
                     WHERE {rarity}.abstract_card_id = ac.id AND {matches})"
                )
            }
            Filter::ExpansionWithRarity(pairs) => {
                let rarity = self.alias("rarity");
                let expansion = self.alias("expansion");
                let conditions = pairs
                    .iter()
                    .map(|(name, rarity_name)| {
                        let matches = self.expansion_match(&expansion, std::slice::from_ref(name));
                        let rarity_name = self.bind_text(rarity_name);
                        format!("({matches} AND {rarity}.rarity_name = {rarity_name} COLLATE NOCASE)")
                    })
                    .collect::<Vec<_>>()
                    .join(" OR ");
                format!(
                    "EXISTS (SELECT 1 FROM abstract_card_rarities {rarity} \
                     JOIN expansions {expansion} ON {expansion}.id = {rarity}.expansion_id \
                     WHERE {rarity}.abstract_card_id = ac.id AND ({conditions}))"
                )
            }
            Filter::Numeric { field, values } => {
                let list = values.iter().map(|value| self.bind_int(*value)).collect::<Vec<_>>().join(", ");
                let column = field.column();
                format!("(ac.{column} IS NOT NULL AND ac.{column} IN ({list}))")
            }
            Filter::CostType(names) => {
                let names = self.text_list(names);
                format!("(ac.cost_type IS NOT NULL AND ac.cost_type COLLATE NOCASE IN ({names}))")
            }
            Filter::CardText(text) => {
                format!("ac.search_text LIKE {} ESCAPE '\\'", self.bind_text(&like_pattern(text)))
            }
            Filter::CardName(text) => {
                format!("ac.canonical_name LIKE {} ESCAPE '\\'", self.bind_text(&like_pattern(text)))
            }
            Filter::Crypt => format!("EXISTS ({})", self.crypt_type_query()),
            Filter::Library => format!("NOT EXISTS ({})", self.crypt_type_query()),
            Filter::PhysicalExpansion(names) => self.physical_expansion(names),
            Filter::CardSets(names) => {
                let entry = self.alias("entry");
                let set = self.alias("card_set");
                let (join, owner) = self.entry_owner(&entry);
                let names = self.text_list(names);
                format!(
                    "EXISTS (SELECT 1 FROM card_set_cards {entry} \
                     JOIN card_sets {set} ON {set}.id = {entry}.card_set_id{join} \
                     WHERE {owner} AND {set}.name COLLATE NOCASE IN ({names}))"
                )
            }
            Filter::CardCount { counts, card_sets } => self.card_count(counts, card_sets),
            Filter::CardSetText { field, text } => {
                // LIKE only folds ASCII, so compare against the Unicode lowercase form
                format!(
                    "{}(cs.{}) LIKE {} ESCAPE '\\'",
                    crate::db::FOLD_CASE_FUNCTION,
                    field.column(),
                    self.bind_text(&like_pattern(text))
                )
            }
            Filter::SetsInUse => "cs.in_use = 1".to_string(),
            Filter::ParentCardSet(names) => {
                let parent = self.alias("parent");
                let names = self.text_list(names);
                format!(
                    "EXISTS (SELECT 1 FROM card_sets {parent} \
                     WHERE {parent}.id = cs.parent_id AND {parent}.name COLLATE NOCASE IN ({names}))"
                )
            }
        };
        Ok(sql)
    }

    fn vocabulary(&mut self, vocabulary: Vocabulary, names: &[String]) -> String {
        let alias = self.alias(vocabulary.alias_prefix());
        let names = self.text_list(names);
        format!(
            "EXISTS (SELECT 1 FROM {table} {alias} \
             WHERE {alias}.abstract_card_id = ac.id AND {alias}.{column} COLLATE NOCASE IN ({names}))",
            table = vocabulary.card_table(),
            column = vocabulary.card_column(),
        )
    }

    fn expansion_match(&mut self, alias: &str, names: &[String]) -> String {
        let by_name = self.text_list(names);
        let by_short_name = self.text_list(names);
        format!(
            "({alias}.name COLLATE NOCASE IN ({by_name}) \
             OR {alias}.short_name COLLATE NOCASE IN ({by_short_name}))"
        )
    }

    fn crypt_type_query(&mut self) -> String {
        let alias = self.alias("card_type");
        let types = self.text_list(&CRYPT_TYPES);
        format!(
            "SELECT 1 FROM abstract_card_types {alias} \
             WHERE {alias}.abstract_card_id = ac.id AND {alias}.card_type_name COLLATE NOCASE IN ({types})"
        )
    }

    fn physical_expansion(&mut self, names: &[Option<String>]) -> String {
        let mut conditions = Vec::new();
        if names.iter().any(Option::is_none) {
            conditions.push("pc.printing_id IS NULL".to_string());
        }
        let known: Vec<String> = names.iter().flatten().cloned().collect();
        if !known.is_empty() {
            let printing = self.alias("printing");
            let expansion = self.alias("expansion");
            let matches = self.expansion_match(&expansion, &known);
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM printings {printing} \
                 JOIN expansions {expansion} ON {expansion}.id = {printing}.expansion_id \
                 WHERE {printing}.id = pc.printing_id AND {matches})"
            ));
        }
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            format!("({})", conditions.join(" OR "))
        }
    }

    /// Joins and condition tying a `card_set_cards` alias to the outer row
    fn entry_owner(&mut self, entry: &str) -> (String, String) {
        match self.target {
            FilterTarget::PhysicalCard => (String::new(), format!("{entry}.physical_card_id = pc.id")),
            _ => {
                let physical = self.alias("physical");
                (
                    format!(" JOIN physical_cards {physical} ON {physical}.id = {entry}.physical_card_id"),
                    format!("{physical}.abstract_card_id = ac.id"),
                )
            }
        }
    }

    /// Total copies of the outer row's abstract card across the named sets
    fn count_query(&mut self, card_sets: &[String]) -> String {
        let entry = self.alias("entry");
        let set = self.alias("card_set");
        let physical = self.alias("physical");
        let names = self.text_list(card_sets);
        format!(
            "(SELECT COALESCE(SUM({entry}.card_count), 0) FROM card_set_cards {entry} \
             JOIN card_sets {set} ON {set}.id = {entry}.card_set_id \
             JOIN physical_cards {physical} ON {physical}.id = {entry}.physical_card_id \
             WHERE {physical}.abstract_card_id = ac.id AND {set}.name COLLATE NOCASE IN ({names}))"
        )
    }

    fn card_count(&mut self, counts: &[CountSpec], card_sets: &[String]) -> String {
        let mut conditions = Vec::new();
        let exact: Vec<u32> = counts
            .iter()
            .filter_map(|count| match count {
                CountSpec::Exactly(value) => Some(*value),
                CountSpec::MoreThan(_) => None,
            })
            .collect();
        if !exact.is_empty() {
            let total = self.count_query(card_sets);
            let list = exact
                .iter()
                .map(|value| self.bind_int(i32::try_from(*value).unwrap_or(i32::MAX)))
                .collect::<Vec<_>>()
                .join(", ");
            conditions.push(format!("{total} IN ({list})"));
        }
        for count in counts {
            if let CountSpec::MoreThan(bound) = count {
                let total = self.count_query(card_sets);
                let bound = self.bind_int(i32::try_from(*bound).unwrap_or(i32::MAX));
                conditions.push(format!("{total} > {bound}"));
            }
        }
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            format!("({})", conditions.join(" OR "))
        }
    }
}
