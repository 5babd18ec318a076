use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The name-keyed vocabulary tables attached to abstract cards
///
/// Each vocabulary has a table of known names and a join table linking
/// abstract cards to those names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vocabulary {
    Clan,
    Discipline,
    CardType,
    Sect,
    Title,
    Creed,
    Virtue,
    Keyword,
    Artist,
    Rarity,
}

impl Vocabulary {
    pub const ALL: [Vocabulary; 10] = [
        Vocabulary::Clan,
        Vocabulary::Discipline,
        Vocabulary::CardType,
        Vocabulary::Sect,
        Vocabulary::Title,
        Vocabulary::Creed,
        Vocabulary::Virtue,
        Vocabulary::Keyword,
        Vocabulary::Artist,
        Vocabulary::Rarity,
    ];

    /// Table holding the known names
    pub fn table(self) -> &'static str {
        match self {
            Vocabulary::Clan => "clans",
            Vocabulary::Discipline => "disciplines",
            Vocabulary::CardType => "card_types",
            Vocabulary::Sect => "sects",
            Vocabulary::Title => "titles",
            Vocabulary::Creed => "creeds",
            Vocabulary::Virtue => "virtues",
            Vocabulary::Keyword => "keywords",
            Vocabulary::Artist => "artists",
            Vocabulary::Rarity => "rarities",
        }
    }

    /// Join table linking abstract cards to names
    pub fn card_table(self) -> &'static str {
        match self {
            Vocabulary::Clan => "abstract_card_clans",
            Vocabulary::Discipline => "abstract_card_disciplines",
            Vocabulary::CardType => "abstract_card_types",
            Vocabulary::Sect => "abstract_card_sects",
            Vocabulary::Title => "abstract_card_titles",
            Vocabulary::Creed => "abstract_card_creeds",
            Vocabulary::Virtue => "abstract_card_virtues",
            Vocabulary::Keyword => "abstract_card_keywords",
            Vocabulary::Artist => "abstract_card_artists",
            Vocabulary::Rarity => "abstract_card_rarities",
        }
    }

    /// Name column in the join table
    pub fn card_column(self) -> &'static str {
        match self {
            Vocabulary::Clan => "clan_name",
            Vocabulary::Discipline => "discipline_name",
            Vocabulary::CardType => "card_type_name",
            Vocabulary::Sect => "sect_name",
            Vocabulary::Title => "title_name",
            Vocabulary::Creed => "creed_name",
            Vocabulary::Virtue => "virtue_name",
            Vocabulary::Keyword => "keyword_name",
            Vocabulary::Artist => "artist_name",
            Vocabulary::Rarity => "rarity_name",
        }
    }

    /// Short prefix used when aliasing the join table in generated SQL
    pub fn alias_prefix(self) -> &'static str {
        match self {
            Vocabulary::Clan => "clan",
            Vocabulary::Discipline => "discipline",
            Vocabulary::CardType => "card_type",
            Vocabulary::Sect => "sect",
            Vocabulary::Title => "title",
            Vocabulary::Creed => "creed",
            Vocabulary::Virtue => "virtue",
            Vocabulary::Keyword => "keyword",
            Vocabulary::Artist => "artist",
            Vocabulary::Rarity => "rarity",
        }
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias_prefix())
    }
}

/// The level at which a card carries a discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisciplineLevel {
    Inferior,
    Superior,
}

impl DisciplineLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            DisciplineLevel::Inferior => "inferior",
            DisciplineLevel::Superior => "superior",
        }
    }
}

impl fmt::Display for DisciplineLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisciplineLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inferior" | "inf" => Ok(DisciplineLevel::Inferior),
            "superior" | "sup" => Ok(DisciplineLevel::Superior),
            other => Err(format!("unknown discipline level '{}'", other)),
        }
    }
}
