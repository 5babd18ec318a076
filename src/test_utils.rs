use crate::db::DbPool;
use crate::dto::{CardCountDto, CreateAbstractCardDto, CreateCardSetDto};
use crate::models::{AbstractCard, DisciplineLevel, DisciplinePair, RarityPair};
use crate::repo;
use proptest::prelude::*;
use std::collections::HashSet;

/// Strings with surrounding whitespace, quotes, escapes and non-ASCII text
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "\\PC{0,24}",
        "[ \t]{0,2}[A-Za-z' \"\\\\$=,()]{0,16}[ \t]{0,2}",
        Just(String::new()),
        Just("Malkavian Antitribu".to_string()),
        Just("Ñandú «Ω» 😀".to_string()),
    ]
}

/// Removes names that collide case-insensitively, keeping the first
pub fn dedup_names(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| !name.trim().is_empty() && seen.insert(name.trim().to_lowercase()))
        .collect()
}

/// Names of the given cards, in order
pub fn card_names(cards: &[AbstractCard]) -> Vec<String> {
    cards.iter().map(AbstractCard::get_name).collect()
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn discipline(name: &str, level: DisciplineLevel) -> DisciplinePair {
    DisciplinePair { discipline: name.to_string(), level }
}

fn rarity(expansion: &str, rarity: &str) -> RarityPair {
    RarityPair { expansion: expansion.to_string(), rarity: rarity.to_string() }
}

/// The cards loaded by [`load_fixture`], sorted by name
pub const FIXTURE_CARDS: [&str; 9] = [
    "Aabbt Kindred",
    "Anson",
    "Carlton Van Wyk",
    "Deflection",
    "Dreams of the Sphinx",
    "Ghoul Retainer",
    "Govern the Unaligned",
    "Lazar Dobrescu",
    "Minion Tap",
];

/// The fixture as card definitions
pub fn fixture_cards() -> Vec<CreateAbstractCardDto> {
    use DisciplineLevel::{Inferior, Superior};

    vec![
        CreateAbstractCardDto {
            name: "Aabbt Kindred".to_string(),
            text: "Independent: Aabbt Kindred are Followers of Set.".to_string(),
            group: Some(2),
            capacity: Some(4),
            clans: names(&["Follower of Set"]),
            disciplines: vec![
                discipline("Fortitude", Inferior),
                discipline("Presence", Inferior),
                discipline("Serpentis", Inferior),
            ],
            card_types: names(&["Vampire"]),
            sects: names(&["Independent"]),
            rarities: vec![rarity("Camarilla Edition", "Uncommon")],
            ..Default::default()
        },
        CreateAbstractCardDto {
            name: "Anson".to_string(),
            text: "Camarilla prince of Los Angeles. +1 bleed.".to_string(),
            group: Some(1),
            capacity: Some(8),
            clans: names(&["Toreador"]),
            disciplines: vec![
                discipline("Auspex", Superior),
                discipline("Celerity", Inferior),
                discipline("Dominate", Inferior),
                discipline("Presence", Superior),
            ],
            card_types: names(&["Vampire"]),
            sects: names(&["Camarilla"]),
            titles: names(&["Prince"]),
            rarities: vec![rarity("Jyhad", "Vampire")],
            ..Default::default()
        },
        CreateAbstractCardDto {
            name: "Lazar Dobrescu".to_string(),
            text: "Independent: Lazar may move one blood to a vampire in torpor.".to_string(),
            group: Some(2),
            capacity: Some(3),
            clans: names(&["Ravnos"]),
            disciplines: vec![discipline("Fortitude", Inferior)],
            card_types: names(&["Vampire"]),
            sects: names(&["Independent"]),
            rarities: vec![rarity("KoT", "Uncommon")],
            ..Default::default()
        },
        CreateAbstractCardDto {
            name: "Carlton Van Wyk".to_string(),
            text: "Carlton gets +1 strength in combat with a vampire.".to_string(),
            group: Some(4),
            life: Some(4),
            card_types: names(&["Imbued"]),
            creeds: names(&["Avenger"]),
            virtues: names(&["Vengeance", "Defense"]),
            rarities: vec![rarity("Keepers of Tradition", "Rare")],
            ..Default::default()
        },
        CreateAbstractCardDto {
            name: "Ghoul Retainer".to_string(),
            text: "Ghoul with 2 life. During combat, the minion may strike for 1R damage (100% safe)."
                .to_string(),
            cost: Some(2),
            cost_type: Some("pool".to_string()),
            life: Some(2),
            card_types: names(&["Retainer"]),
            artists: names(&["Mark Nelson"]),
            rarities: vec![rarity("Jyhad", "Common"), rarity("CE", "Common")],
            ..Default::default()
        },
        CreateAbstractCardDto {
            name: "Deflection".to_string(),
            text: "Only usable when a bleed is announced against you. Choose another Methuselah to be bled instead."
                .to_string(),
            disciplines: vec![discipline("Dominate", Inferior)],
            card_types: names(&["Reaction"]),
            rarities: vec![rarity("Jyhad", "Common")],
            ..Default::default()
        },
        CreateAbstractCardDto {
            name: "Govern the Unaligned".to_string(),
            text: "+1 bleed. [DOM] Bleed at +2 bleed.".to_string(),
            disciplines: vec![discipline("Dominate", Inferior)],
            card_types: names(&["Action"]),
            artists: names(&["Mark Nelson"]),
            rarities: vec![rarity("Jyhad", "Common")],
            ..Default::default()
        },
        CreateAbstractCardDto {
            name: "Minion Tap".to_string(),
            text: "Move X blood from the acting vampire to your pool.".to_string(),
            cost: Some(-1),
            cost_type: Some("blood".to_string()),
            card_types: names(&["Action"]),
            rarities: vec![rarity("CE", "Common")],
            ..Default::default()
        },
        CreateAbstractCardDto {
            name: "Dreams of the Sphinx".to_string(),
            text: "Master: unique location. During your discard phase, you may discard one card.".to_string(),
            cost: Some(1),
            cost_type: Some("pool".to_string()),
            card_types: names(&["Master"]),
            keywords: names(&["unique", "location"]),
            rarities: vec![rarity("Camarilla Edition", "Rare")],
            ..Default::default()
        },
    ]
}

/// Loads three expansions and the fixture cards into the database
pub async fn load_fixture(pool: &DbPool) {
    repo::create_expansion(pool, "Jyhad".to_string(), None).await.unwrap();
    repo::create_expansion(pool, "Camarilla Edition".to_string(), Some("CE".to_string()))
        .await
        .unwrap();
    repo::create_expansion(pool, "Keepers of Tradition".to_string(), Some("KoT".to_string()))
        .await
        .unwrap();

    for card in fixture_cards() {
        repo::create_abstract_card(pool, &card).await.unwrap();
    }
}

/// Returns the physical card of a fixture card, creating it if needed
///
/// `expansion` selects the standard printing of that expansion; `None` is
/// the unknown printing.
pub async fn physical_card_id(pool: &DbPool, card: &str, expansion: Option<&str>) -> String {
    let card = repo::get_abstract_card_by_name(pool, card).unwrap().unwrap();
    let printing = repo::resolve_printing(pool, expansion, None).await.unwrap();
    repo::get_or_create_physical_card(pool, &card.get_id(), printing.as_deref())
        .await
        .unwrap()
        .get_id()
}

pub fn counts(cards: &[(&str, i32)]) -> Vec<CardCountDto> {
    cards
        .iter()
        .map(|(id, count)| CardCountDto { physical_card_id: id.to_string(), count: *count })
        .collect()
}

pub fn card_set_dto(name: &str, parent_id: Option<&str>) -> CreateCardSetDto {
    CreateCardSetDto {
        name: name.to_string(),
        parent_id: parent_id.map(str::to_string),
        ..Default::default()
    }
}
