use serde::Serialize;

use super::ast::{ArgItem, FilterAst, Term, TermArgs, Value};
use super::keywords::{lookup_keyword, ArgShape, CardSetField, KeywordKind, KeywordSpec, NumericField, KEYWORDS};
use super::{FilterError, FilterTarget};
use crate::models::{DisciplineLevel, Vocabulary};

/// Accepted spelling for the unknown printing in `PhysicalExpansion`
pub const NO_EXPANSION: &str = "No Expansion";

/// A card count accepted by `CardCount`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CountSpec {
    Exactly(u32),
    MoreThan(u32),
}

impl CountSpec {
    fn parse(text: &str) -> Option<CountSpec> {
        let text = text.trim();
        match text.strip_prefix('>') {
            Some(bound) => bound.trim().parse().ok().map(CountSpec::MoreThan),
            None => text.parse().ok().map(CountSpec::Exactly),
        }
    }
}

/// A validated filter, ready to be compiled to SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Matches everything
    Null,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Vocabulary { vocabulary: Vocabulary, names: Vec<String> },
    DisciplineWithLevel(Vec<(String, DisciplineLevel)>),
    Expansion(Vec<String>),
    ExpansionWithRarity(Vec<(String, String)>),
    Numeric { field: NumericField, values: Vec<i32> },
    CostType(Vec<String>),
    CardText(String),
    CardName(String),
    Crypt,
    Library,
    /// `None` selects physical cards without a known printing
    PhysicalExpansion(Vec<Option<String>>),
    CardSets(Vec<String>),
    CardCount { counts: Vec<CountSpec>, card_sets: Vec<String> },
    CardSetText { field: CardSetField, text: String },
    SetsInUse,
    ParentCardSet(Vec<String>),
}

impl Filter {
    /// Validates a syntax tree into a typed filter
    ///
    /// ### Errors
    ///
    /// Fails on unknown keywords, unbound variables, arguments that do not
    /// match the keyword's shape, and values of the wrong kind.
    pub fn from_ast(ast: &FilterAst) -> Result<Filter, FilterError> {
        match ast {
            FilterAst::Null => Ok(Filter::Null),
            FilterAst::And(children) => Ok(Filter::And(
                children.iter().map(Filter::from_ast).collect::<Result<_, _>>()?,
            )),
            FilterAst::Or(children) => Ok(Filter::Or(
                children.iter().map(Filter::from_ast).collect::<Result<_, _>>()?,
            )),
            FilterAst::Not(inner) => Ok(Filter::Not(Box::new(Filter::from_ast(inner)?))),
            FilterAst::Term(term) => Filter::from_term(term),
        }
    }

    fn from_term(term: &Term) -> Result<Filter, FilterError> {
        let spec = lookup_keyword(&term.keyword)
            .ok_or_else(|| FilterError::UnknownKeyword(term.keyword.clone()))?;
        let keyword = spec.keyword;
        let invalid = |reason: &str| FilterError::InvalidArguments {
            keyword,
            reason: reason.to_string(),
        };

        let (items, from) = match &term.args {
            TermArgs::Variable(name) => return Err(FilterError::UnboundVariable(name.clone())),
            TermArgs::None => {
                if spec.shape() != ArgShape::NoArgs {
                    return Err(invalid("expects values after 'in'"));
                }
                (Vec::new(), Vec::new())
            }
            TermArgs::Values { items, from } => {
                if spec.shape() == ArgShape::NoArgs {
                    return Err(invalid("takes no arguments"));
                }
                (items.clone(), from.clone())
            }
        };

        if spec.shape() != ArgShape::NoArgs && items.is_empty() {
            return Err(invalid("expects at least one value"));
        }
        match spec.shape() {
            ArgShape::Pairs => {
                if items.iter().any(|item| item.with.is_none()) {
                    return Err(invalid("expects 'value with value' pairs"));
                }
            }
            _ => {
                if items.iter().any(|item| item.with.is_some()) {
                    return Err(invalid("does not accept 'with'"));
                }
            }
        }
        match spec.shape() {
            ArgShape::CountsFrom => {
                if from.is_empty() {
                    return Err(invalid("expects 'from' followed by card set names"));
                }
            }
            _ => {
                if !from.is_empty() {
                    return Err(invalid("does not accept 'from'"));
                }
            }
        }
        if spec.shape() == ArgShape::Text && items.len() != 1 {
            return Err(invalid("expects a single string"));
        }

        let texts = || items.iter().map(|item| item.value.as_text()).collect::<Vec<_>>();
        let pairs = || {
            items
                .iter()
                .map(|item| (item.value.as_text(), item.with.as_ref().map(Value::as_text).unwrap_or_default()))
                .collect::<Vec<_>>()
        };

        let filter = match spec.kind {
            KeywordKind::Vocabulary(vocabulary) => Filter::Vocabulary { vocabulary, names: texts() },
            KeywordKind::DisciplineWithLevel => Filter::DisciplineWithLevel(
                pairs()
                    .into_iter()
                    .map(|(name, level)| {
                        level
                            .parse::<DisciplineLevel>()
                            .map(|level| (name, level))
                            .map_err(|_| FilterError::InvalidValue { keyword, value: level })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            KeywordKind::Expansion => Filter::Expansion(texts()),
            KeywordKind::ExpansionWithRarity => Filter::ExpansionWithRarity(pairs()),
            KeywordKind::Numeric(field) => Filter::Numeric {
                field,
                values: items
                    .iter()
                    .map(|item| numeric_value(spec, field, item))
                    .collect::<Result<_, _>>()?,
            },
            KeywordKind::CostType => Filter::CostType(texts()),
            KeywordKind::CardText => Filter::CardText(items[0].value.as_text()),
            KeywordKind::CardName => Filter::CardName(items[0].value.as_text()),
            KeywordKind::Crypt => Filter::Crypt,
            KeywordKind::Library => Filter::Library,
            KeywordKind::PhysicalExpansion => Filter::PhysicalExpansion(
                texts()
                    .into_iter()
                    .map(|name| if name.eq_ignore_ascii_case(NO_EXPANSION) { None } else { Some(name) })
                    .collect(),
            ),
            KeywordKind::CardSets => Filter::CardSets(texts()),
            KeywordKind::CardCount => Filter::CardCount {
                counts: items
                    .iter()
                    .map(|item| count_value(spec, &item.value))
                    .collect::<Result<_, _>>()?,
                card_sets: from.iter().map(Value::as_text).collect(),
            },
            KeywordKind::CardSetText(field) => {
                Filter::CardSetText { field, text: items[0].value.as_text() }
            }
            KeywordKind::SetsInUse => Filter::SetsInUse,
            KeywordKind::ParentCardSet => Filter::ParentCardSet(texts()),
        };
        Ok(filter)
    }

    /// Combines two filters so both must match
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::Null, other) | (other, Filter::Null) => other,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), other) => {
                left.push(other);
                Filter::And(left)
            }
            (left, right) => Filter::And(vec![left, right]),
        }
    }

    /// The registry entry of a leaf filter, `None` for combinators
    pub fn spec(&self) -> Option<&'static KeywordSpec> {
        let kind = match self {
            Filter::Null | Filter::And(_) | Filter::Or(_) | Filter::Not(_) => return None,
            Filter::Vocabulary { vocabulary, .. } => KeywordKind::Vocabulary(*vocabulary),
            Filter::DisciplineWithLevel(_) => KeywordKind::DisciplineWithLevel,
            Filter::Expansion(_) => KeywordKind::Expansion,
            Filter::ExpansionWithRarity(_) => KeywordKind::ExpansionWithRarity,
            Filter::Numeric { field, .. } => KeywordKind::Numeric(*field),
            Filter::CostType(_) => KeywordKind::CostType,
            Filter::CardText(_) => KeywordKind::CardText,
            Filter::CardName(_) => KeywordKind::CardName,
            Filter::Crypt => KeywordKind::Crypt,
            Filter::Library => KeywordKind::Library,
            Filter::PhysicalExpansion(_) => KeywordKind::PhysicalExpansion,
            Filter::CardSets(_) => KeywordKind::CardSets,
            Filter::CardCount { .. } => KeywordKind::CardCount,
            Filter::CardSetText { field, .. } => KeywordKind::CardSetText(*field),
            Filter::SetsInUse => KeywordKind::SetsInUse,
            Filter::ParentCardSet(_) => KeywordKind::ParentCardSet,
        };
        KEYWORDS.iter().find(|spec| spec.kind == kind)
    }

    /// Targets every part of this filter can be applied to
    pub fn targets(&self) -> Vec<FilterTarget> {
        match self {
            Filter::Null => FilterTarget::ALL.to_vec(),
            Filter::And(children) | Filter::Or(children) => {
                let mut targets = FilterTarget::ALL.to_vec();
                for child in children {
                    let child_targets = child.targets();
                    targets.retain(|target| child_targets.contains(target));
                }
                targets
            }
            Filter::Not(inner) => inner.targets(),
            leaf => leaf.spec().map(|spec| spec.targets().to_vec()).unwrap_or_default(),
        }
    }
}

fn numeric_value(spec: &KeywordSpec, field: NumericField, item: &ArgItem) -> Result<i32, FilterError> {
    let invalid = || FilterError::InvalidValue { keyword: spec.keyword, value: item.value.as_text() };
    match &item.value {
        Value::Int(value) => i32::try_from(*value).map_err(|_| invalid()),
        Value::Text(text) => {
            if let Some((word, value)) = field.special_value() {
                if text.trim().eq_ignore_ascii_case(word) {
                    return Ok(value);
                }
            }
            text.trim().parse::<u16>().map(i32::from).map_err(|_| invalid())
        }
        Value::MoreThan(_) => Err(invalid()),
    }
}

fn count_value(spec: &KeywordSpec, value: &Value) -> Result<CountSpec, FilterError> {
    let invalid = || FilterError::InvalidValue { keyword: spec.keyword, value: value.as_text() };
    match value {
        Value::Int(count) => u32::try_from(*count).map(CountSpec::Exactly).map_err(|_| invalid()),
        Value::MoreThan(bound) => Ok(CountSpec::MoreThan(*bound)),
        Value::Text(text) => CountSpec::parse(text).ok_or_else(invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::parse;

    fn filter(input: &str) -> Result<Filter, FilterError> {
        Filter::from_ast(&parse(input).unwrap())
    }

    #[test]
    fn test_vocabulary_filter() {
        assert_eq!(
            filter("clan in Ventrue, \"Tremere\"").unwrap(),
            Filter::Vocabulary {
                vocabulary: Vocabulary::Clan,
                names: vec!["Ventrue".to_string(), "Tremere".to_string()],
            }
        );
    }

    #[test]
    fn test_numeric_filters_accept_special_words() {
        assert_eq!(
            filter("Cost in 0, 2, x").unwrap(),
            Filter::Numeric { field: NumericField::Cost, values: vec![0, 2, -1] }
        );
        assert_eq!(
            filter("Group in Any, \"4\"").unwrap(),
            Filter::Numeric { field: NumericField::Group, values: vec![-1, 4] }
        );
        assert_eq!(
            filter("Capacity in X"),
            Err(FilterError::InvalidValue { keyword: "Capacity", value: "X".to_string() })
        );
    }

    #[test]
    fn test_discipline_levels_are_validated() {
        assert_eq!(
            filter("Discipline_with_Level in Auspex with superior, Dominate with inf").unwrap(),
            Filter::DisciplineWithLevel(vec![
                ("Auspex".to_string(), DisciplineLevel::Superior),
                ("Dominate".to_string(), DisciplineLevel::Inferior),
            ])
        );
        assert_eq!(
            filter("Discipline_with_Level in Auspex with great"),
            Err(FilterError::InvalidValue {
                keyword: "Discipline_with_Level",
                value: "great".to_string(),
            })
        );
    }

    #[test]
    fn test_pairs_are_required_where_expected() {
        assert!(matches!(
            filter("Expansion_with_Rarity in Jyhad"),
            Err(FilterError::InvalidArguments { keyword: "Expansion_with_Rarity", .. })
        ));
        assert!(matches!(
            filter("Clan in Ventrue with Tremere"),
            Err(FilterError::InvalidArguments { keyword: "Clan", .. })
        ));
    }

    #[test]
    fn test_card_count() {
        assert_eq!(
            filter("CardCount in 0, \"2\", >4 from \"Deck A\", Collection").unwrap(),
            Filter::CardCount {
                counts: vec![CountSpec::Exactly(0), CountSpec::Exactly(2), CountSpec::MoreThan(4)],
                card_sets: vec!["Deck A".to_string(), "Collection".to_string()],
            }
        );
        assert!(matches!(
            filter("CardCount in 1"),
            Err(FilterError::InvalidArguments { keyword: "CardCount", .. })
        ));
        assert!(matches!(
            filter("Clan in Ventrue from Deck"),
            Err(FilterError::InvalidArguments { keyword: "Clan", .. })
        ));
    }

    #[test]
    fn test_argument_counts() {
        assert!(matches!(
            filter("SetsInUse in 1"),
            Err(FilterError::InvalidArguments { keyword: "SetsInUse", .. })
        ));
        assert!(matches!(
            filter("Clan"),
            Err(FilterError::InvalidArguments { keyword: "Clan", .. })
        ));
        assert!(matches!(
            filter("CardText in \"bleed\", \"stealth\""),
            Err(FilterError::InvalidArguments { keyword: "CardText", .. })
        ));
        assert_eq!(filter("SetsInUse").unwrap(), Filter::SetsInUse);
    }

    #[test]
    fn test_physical_expansion_no_expansion() {
        assert_eq!(
            filter("PhysicalExpansion in \"no expansion\", Jyhad").unwrap(),
            Filter::PhysicalExpansion(vec![None, Some("Jyhad".to_string())])
        );
    }

    #[test]
    fn test_unknown_keyword_and_unbound_variable() {
        assert_eq!(filter("Colour in red"), Err(FilterError::UnknownKeyword("Colour".to_string())));
        assert_eq!(filter("Clan in $clans"), Err(FilterError::UnboundVariable("clans".to_string())));
    }

    #[test]
    fn test_targets_intersect_over_combinators() {
        let mixed = filter("Clan in Ventrue AND PhysicalExpansion in Jyhad").unwrap();
        assert_eq!(mixed.targets(), vec![FilterTarget::PhysicalCard]);

        let impossible = filter("Clan in Ventrue OR SetsInUse").unwrap();
        assert!(impossible.targets().is_empty());

        assert_eq!(Filter::Null.targets(), FilterTarget::ALL.to_vec());
        assert_eq!(
            filter("NOT CardSetName in Deck").unwrap().targets(),
            vec![FilterTarget::CardSet]
        );
    }

    #[test]
    fn test_and_merges() {
        let clan = filter("Clan in Ventrue").unwrap();
        let crypt = Filter::Crypt;
        assert_eq!(Filter::Null.and(clan.clone()), clan);
        assert_eq!(
            clan.clone().and(crypt.clone()).and(Filter::Library),
            Filter::And(vec![clan, crypt, Filter::Library])
        );
    }
}
