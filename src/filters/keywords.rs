use serde::{Deserialize, Serialize};

use super::FilterTarget;
use crate::models::Vocabulary;

/// Numeric columns of an abstract card that can be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Group,
    Capacity,
    Cost,
    Life,
}

impl NumericField {
    pub fn column(self) -> &'static str {
        match self {
            NumericField::Group => "card_group",
            NumericField::Capacity => "capacity",
            NumericField::Cost => "cost",
            NumericField::Life => "life",
        }
    }

    /// The word accepted in place of a number, and the value it stands for
    pub fn special_value(self) -> Option<(&'static str, i32)> {
        match self {
            NumericField::Group => Some(("Any", -1)),
            NumericField::Cost => Some(("X", -1)),
            NumericField::Capacity | NumericField::Life => None,
        }
    }
}

/// Free-text columns of a card set that can be searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSetField {
    Name,
    Author,
    Description,
    Annotations,
}

impl CardSetField {
    pub fn column(self) -> &'static str {
        match self {
            CardSetField::Name => "name",
            CardSetField::Author => "author",
            CardSetField::Description => "comment",
            CardSetField::Annotations => "annotations",
        }
    }
}

/// What a keyword filters on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "field")]
pub enum KeywordKind {
    Vocabulary(Vocabulary),
    DisciplineWithLevel,
    Expansion,
    ExpansionWithRarity,
    Numeric(NumericField),
    CostType,
    CardText,
    CardName,
    Crypt,
    Library,
    PhysicalExpansion,
    CardSets,
    CardCount,
    CardSetText(CardSetField),
    SetsInUse,
    ParentCardSet,
}

/// The argument layout a keyword expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgShape {
    /// Written without `in`
    NoArgs,
    /// `in a, b, c`
    List,
    /// `in a with x, b with y`
    Pairs,
    /// `in "text"`
    Text,
    /// `in 1, >3 from "Set A", "Set B"`
    CountsFrom,
}

const CARD_TARGETS: &[FilterTarget] = &[FilterTarget::AbstractCard, FilterTarget::PhysicalCard];
const PHYSICAL_TARGETS: &[FilterTarget] = &[FilterTarget::PhysicalCard];
const CARD_SET_TARGETS: &[FilterTarget] = &[FilterTarget::CardSet];

impl KeywordKind {
    pub fn shape(self) -> ArgShape {
        match self {
            KeywordKind::Crypt | KeywordKind::Library | KeywordKind::SetsInUse => ArgShape::NoArgs,
            KeywordKind::DisciplineWithLevel | KeywordKind::ExpansionWithRarity => ArgShape::Pairs,
            KeywordKind::CardText | KeywordKind::CardName | KeywordKind::CardSetText(_) => {
                ArgShape::Text
            }
            KeywordKind::CardCount => ArgShape::CountsFrom,
            _ => ArgShape::List,
        }
    }

    pub fn targets(self) -> &'static [FilterTarget] {
        match self {
            KeywordKind::PhysicalExpansion => PHYSICAL_TARGETS,
            KeywordKind::CardSetText(_) | KeywordKind::SetsInUse | KeywordKind::ParentCardSet => {
                CARD_SET_TARGETS
            }
            _ => CARD_TARGETS,
        }
    }
}

/// A registered filter keyword
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KeywordSpec {
    pub keyword: &'static str,
    pub description: &'static str,
    pub kind: KeywordKind,
}

impl KeywordSpec {
    pub fn shape(&self) -> ArgShape {
        self.kind.shape()
    }

    pub fn targets(&self) -> &'static [FilterTarget] {
        self.kind.targets()
    }

    pub fn applies_to(&self, target: FilterTarget) -> bool {
        self.targets().contains(&target)
    }
}

/// Every keyword understood by the filter language
pub static KEYWORDS: &[KeywordSpec] = &[
    KeywordSpec {
        keyword: "Clan",
        description: "Cards belonging to any of the given clans",
        kind: KeywordKind::Vocabulary(Vocabulary::Clan),
    },
    KeywordSpec {
        keyword: "Discipline",
        description: "Cards requiring or having any of the given disciplines",
        kind: KeywordKind::Vocabulary(Vocabulary::Discipline),
    },
    KeywordSpec {
        keyword: "Discipline_with_Level",
        description: "Cards with a discipline at the given level (inferior or superior)",
        kind: KeywordKind::DisciplineWithLevel,
    },
    KeywordSpec {
        keyword: "CardType",
        description: "Cards of any of the given card types",
        kind: KeywordKind::Vocabulary(Vocabulary::CardType),
    },
    KeywordSpec {
        keyword: "Sect",
        description: "Cards of any of the given sects",
        kind: KeywordKind::Vocabulary(Vocabulary::Sect),
    },
    KeywordSpec {
        keyword: "Title",
        description: "Cards holding any of the given titles",
        kind: KeywordKind::Vocabulary(Vocabulary::Title),
    },
    KeywordSpec {
        keyword: "Creed",
        description: "Cards of any of the given creeds",
        kind: KeywordKind::Vocabulary(Vocabulary::Creed),
    },
    KeywordSpec {
        keyword: "Virtue",
        description: "Cards with any of the given virtues",
        kind: KeywordKind::Vocabulary(Vocabulary::Virtue),
    },
    KeywordSpec {
        keyword: "Keyword",
        description: "Cards with any of the given keywords",
        kind: KeywordKind::Vocabulary(Vocabulary::Keyword),
    },
    KeywordSpec {
        keyword: "Artist",
        description: "Cards illustrated by any of the given artists",
        kind: KeywordKind::Vocabulary(Vocabulary::Artist),
    },
    KeywordSpec {
        keyword: "Expansion",
        description: "Cards printed in any of the given expansions",
        kind: KeywordKind::Expansion,
    },
    KeywordSpec {
        keyword: "Expansion_with_Rarity",
        description: "Cards printed in an expansion with the given rarity",
        kind: KeywordKind::ExpansionWithRarity,
    },
    KeywordSpec {
        keyword: "Group",
        description: "Crypt cards of the given groups ('Any' for any group)",
        kind: KeywordKind::Numeric(NumericField::Group),
    },
    KeywordSpec {
        keyword: "Capacity",
        description: "Crypt cards with the given capacities",
        kind: KeywordKind::Numeric(NumericField::Capacity),
    },
    KeywordSpec {
        keyword: "Cost",
        description: "Cards with the given costs ('X' for variable cost)",
        kind: KeywordKind::Numeric(NumericField::Cost),
    },
    KeywordSpec {
        keyword: "Life",
        description: "Allies and retainers with the given life",
        kind: KeywordKind::Numeric(NumericField::Life),
    },
    KeywordSpec {
        keyword: "CostType",
        description: "Cards whose cost is paid in the given currency (pool, blood, conviction)",
        kind: KeywordKind::CostType,
    },
    KeywordSpec {
        keyword: "CardText",
        description: "Cards whose text contains the given string",
        kind: KeywordKind::CardText,
    },
    KeywordSpec {
        keyword: "CardName",
        description: "Cards whose name contains the given string",
        kind: KeywordKind::CardName,
    },
    KeywordSpec {
        keyword: "Crypt",
        description: "Crypt cards (vampires and imbued)",
        kind: KeywordKind::Crypt,
    },
    KeywordSpec {
        keyword: "Library",
        description: "Library cards (everything outside the crypt)",
        kind: KeywordKind::Library,
    },
    KeywordSpec {
        keyword: "PhysicalExpansion",
        description: "Physical cards of the given expansions ('No Expansion' for unknown printings)",
        kind: KeywordKind::PhysicalExpansion,
    },
    KeywordSpec {
        keyword: "Card_Sets",
        description: "Cards present in any of the given card sets",
        kind: KeywordKind::CardSets,
    },
    KeywordSpec {
        keyword: "CardCount",
        description: "Cards whose total number of copies across the given card sets is one of the counts",
        kind: KeywordKind::CardCount,
    },
    KeywordSpec {
        keyword: "CardSetName",
        description: "Card sets whose name contains the given string",
        kind: KeywordKind::CardSetText(CardSetField::Name),
    },
    KeywordSpec {
        keyword: "CardSetAuthor",
        description: "Card sets whose author contains the given string",
        kind: KeywordKind::CardSetText(CardSetField::Author),
    },
    KeywordSpec {
        keyword: "CardSetDescription",
        description: "Card sets whose description contains the given string",
        kind: KeywordKind::CardSetText(CardSetField::Description),
    },
    KeywordSpec {
        keyword: "CardSetAnnotations",
        description: "Card sets whose annotations contain the given string",
        kind: KeywordKind::CardSetText(CardSetField::Annotations),
    },
    KeywordSpec {
        keyword: "SetsInUse",
        description: "Card sets marked as in use",
        kind: KeywordKind::SetsInUse,
    },
    KeywordSpec {
        keyword: "ParentCardSet",
        description: "Card sets whose parent is any of the given card sets",
        kind: KeywordKind::ParentCardSet,
    },
];

/// Finds a keyword by name, ignoring case
pub fn lookup_keyword(name: &str) -> Option<&'static KeywordSpec> {
    KEYWORDS.iter().find(|spec| spec.keyword.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup_keyword("clan").map(|s| s.keyword), Some("Clan"));
        assert_eq!(
            lookup_keyword("DISCIPLINE_WITH_LEVEL").map(|s| s.keyword),
            Some("Discipline_with_Level")
        );
        assert!(lookup_keyword("Colour").is_none());
    }

    #[test]
    fn test_keywords_are_unique() {
        for (index, spec) in KEYWORDS.iter().enumerate() {
            assert!(
                KEYWORDS[index + 1..].iter().all(|other| !other.keyword.eq_ignore_ascii_case(spec.keyword)),
                "duplicate keyword {}",
                spec.keyword
            );
        }
    }

    #[test]
    fn test_card_set_keywords_only_target_card_sets() {
        let spec = lookup_keyword("CardSetAuthor").unwrap();
        assert!(spec.applies_to(FilterTarget::CardSet));
        assert!(!spec.applies_to(FilterTarget::AbstractCard));

        let spec = lookup_keyword("PhysicalExpansion").unwrap();
        assert_eq!(spec.targets(), &[FilterTarget::PhysicalCard]);

        let spec = lookup_keyword("Clan").unwrap();
        assert!(spec.applies_to(FilterTarget::AbstractCard));
        assert!(spec.applies_to(FilterTarget::PhysicalCard));
        assert!(!spec.applies_to(FilterTarget::CardSet));
    }

    #[test]
    fn test_shapes() {
        assert_eq!(lookup_keyword("SetsInUse").unwrap().shape(), ArgShape::NoArgs);
        assert_eq!(lookup_keyword("Expansion_with_Rarity").unwrap().shape(), ArgShape::Pairs);
        assert_eq!(lookup_keyword("CardText").unwrap().shape(), ArgShape::Text);
        assert_eq!(lookup_keyword("CardCount").unwrap().shape(), ArgShape::CountsFrom);
        assert_eq!(lookup_keyword("Cost").unwrap().shape(), ArgShape::List);
    }
}
