use super::*;
use crate::db::DbPool;
use crate::dto::CreateCardSetDto;
use crate::filters::{lookup_keyword, parse_filter, FilterError};
use crate::repo::tests::setup_test_db;
use crate::repo::{add_cards_to_card_set, create_card_set};
use crate::test_utils::{card_names, card_set_dto, counts, load_fixture, physical_card_id, FIXTURE_CARDS};

fn card_matches(pool: &DbPool, input: &str) -> Vec<String> {
    let filter = parse_filter(input).unwrap();
    card_names(&select_abstract_cards(pool, &filter).unwrap())
}

fn physical_matches(pool: &DbPool, input: &str) -> Vec<(String, Option<String>)> {
    let filter = parse_filter(input).unwrap();
    select_physical_cards(pool, &filter)
        .unwrap()
        .into_iter()
        .map(|view| (view.card_name, view.expansion))
        .collect()
}

fn set_matches(pool: &DbPool, input: &str) -> Vec<String> {
    let filter = parse_filter(input).unwrap();
    select_card_sets(pool, &filter).unwrap().iter().map(CardSet::get_name).collect()
}

fn values(pool: &DbPool, keyword: &str) -> Vec<String> {
    filter_values(pool, lookup_keyword(keyword).unwrap()).unwrap()
}

/// The fixture card names without `excluded`, in listing order
fn all_cards_but(excluded: &[&str]) -> Vec<String> {
    FIXTURE_CARDS.iter().filter(|name| !excluded.contains(name)).map(|name| name.to_string()).collect()
}

fn owned(pairs: &[(&str, Option<&str>)]) -> Vec<(String, Option<String>)> {
    pairs.iter().map(|(name, expansion)| (name.to_string(), expansion.map(str::to_string))).collect()
}

/// Loads the fixture plus two card sets
///
/// - "Collection": Anson (Jyhad) x2, Govern the Unaligned (Jyhad) x5, Ghoul Retainer (CE) x1
/// - "Deck", nested under "Collection" and in use: Govern the Unaligned (Jyhad) x3, Anson (unknown) x1
async fn load_card_sets(pool: &DbPool) -> (String, String) {
    load_fixture(pool).await;

    let anson_jyhad = physical_card_id(pool, "Anson", Some("Jyhad")).await;
    let anson_unknown = physical_card_id(pool, "Anson", None).await;
    let govern = physical_card_id(pool, "Govern the Unaligned", Some("Jyhad")).await;
    let retainer = physical_card_id(pool, "Ghoul Retainer", Some("CE")).await;

    let collection = CreateCardSetDto { annotations: "binder 3".to_string(), ..card_set_dto("Collection", None) };
    let collection = create_card_set(pool, &collection).await.unwrap().get_id();
    let deck = CreateCardSetDto {
        author: "Ana".to_string(),
        comment: "Bleed deck for the tournament".to_string(),
        in_use: true,
        ..card_set_dto("Deck", Some(&collection))
    };
    let deck = create_card_set(pool, &deck).await.unwrap().get_id();

    add_cards_to_card_set(pool, &collection, &counts(&[(&anson_jyhad, 2), (&govern, 5), (&retainer, 1)]))
        .await
        .unwrap();
    add_cards_to_card_set(pool, &deck, &counts(&[(&govern, 3), (&anson_unknown, 1)])).await.unwrap();

    (collection, deck)
}

#[tokio::test]
async fn test_null_filter_selects_everything() {
    let pool = setup_test_db();
    load_fixture(&pool).await;

    assert_eq!(card_matches(&pool, ""), FIXTURE_CARDS.to_vec());
    assert_eq!(card_matches(&pool, "   "), FIXTURE_CARDS.to_vec());
}

#[tokio::test]
async fn test_vocabulary_keywords() {
    let pool = setup_test_db();
    load_fixture(&pool).await;

    assert_eq!(card_matches(&pool, "Clan in Toreador, Ravnos"), vec!["Anson", "Lazar Dobrescu"]);
    assert_eq!(card_matches(&pool, "clan in \"toreador\""), vec!["Anson"]);
    assert_eq!(
        card_matches(&pool, "Discipline in Dominate"),
        vec!["Anson", "Deflection", "Govern the Unaligned"]
    );
    assert_eq!(card_matches(&pool, "CardType in Action"), vec!["Govern the Unaligned", "Minion Tap"]);
    assert_eq!(card_matches(&pool, "Sect in Independent"), vec!["Aabbt Kindred", "Lazar Dobrescu"]);
    assert_eq!(card_matches(&pool, "Title in Prince"), vec!["Anson"]);
    assert_eq!(card_matches(&pool, "Creed in Avenger"), vec!["Carlton Van Wyk"]);
    assert_eq!(card_matches(&pool, "Virtue in Defense"), vec!["Carlton Van Wyk"]);
    assert_eq!(card_matches(&pool, "Keyword in location"), vec!["Dreams of the Sphinx"]);
    assert_eq!(
        card_matches(&pool, "Artist in \"Mark Nelson\""),
        vec!["Ghoul Retainer", "Govern the Unaligned"]
    );
    assert!(card_matches(&pool, "Clan in Malkavian").is_empty());
}

#[tokio::test]
async fn test_discipline_with_level() {
    let pool = setup_test_db();
    load_fixture(&pool).await;

    assert_eq!(card_matches(&pool, "Discipline_with_Level in Presence with superior"), vec!["Anson"]);
    assert_eq!(
        card_matches(&pool, "Discipline_with_Level in Presence with inferior"),
        vec!["Aabbt Kindred"]
    );
    assert_eq!(
        card_matches(
            &pool,
            "Discipline_with_Level in Presence with superior, Fortitude with inferior"
        ),
        vec!["Aabbt Kindred", "Anson", "Lazar Dobrescu"]
    );
}

#[tokio::test]
async fn test_expansion_keywords() {
    let pool = setup_test_db();
    load_fixture(&pool).await;

    assert_eq!(
        card_matches(&pool, "Expansion in CE"),
        vec!["Aabbt Kindred", "Dreams of the Sphinx", "Ghoul Retainer", "Minion Tap"]
    );
    assert_eq!(
        card_matches(&pool, "Expansion in \"Keepers of Tradition\""),
        vec!["Carlton Van Wyk", "Lazar Dobrescu"]
    );
    assert_eq!(
        card_matches(&pool, "Expansion_with_Rarity in Jyhad with Common"),
        vec!["Deflection", "Ghoul Retainer", "Govern the Unaligned"]
    );
    assert_eq!(
        card_matches(&pool, "Expansion_with_Rarity in \"Camarilla Edition\" with Rare, KoT with Rare"),
        vec!["Carlton Van Wyk", "Dreams of the Sphinx"]
    );
}

#[tokio::test]
async fn test_numeric_keywords() {
    let pool = setup_test_db();
    load_fixture(&pool).await;

    assert_eq!(card_matches(&pool, "Group in 2"), vec!["Aabbt Kindred", "Lazar Dobrescu"]);
    assert!(card_matches(&pool, "Group in Any").is_empty());
    assert_eq!(card_matches(&pool, "Capacity in 3, 4"), vec!["Aabbt Kindred", "Lazar Dobrescu"]);
    assert_eq!(card_matches(&pool, "Cost in X"), vec!["Minion Tap"]);
    assert_eq!(card_matches(&pool, "Cost in 1, 2"), vec!["Dreams of the Sphinx", "Ghoul Retainer"]);
    assert_eq!(card_matches(&pool, "Life in 4"), vec!["Carlton Van Wyk"]);
    assert_eq!(card_matches(&pool, "CostType in Blood"), vec!["Minion Tap"]);
}

#[tokio::test]
async fn test_negated_numeric_keywords_keep_cards_without_the_stat() {
    let pool = setup_test_db();
    load_fixture(&pool).await;

    assert_eq!(card_matches(&pool, "NOT Capacity in 3"), all_cards_but(&["Lazar Dobrescu"]));
    assert_eq!(card_matches(&pool, "NOT Group in 2"), all_cards_but(&["Aabbt Kindred", "Lazar Dobrescu"]));
    assert_eq!(card_matches(&pool, "NOT Cost in X"), all_cards_but(&["Minion Tap"]));
    assert_eq!(card_matches(&pool, "NOT Life in 4"), all_cards_but(&["Carlton Van Wyk"]));
    assert_eq!(
        card_matches(&pool, "NOT CostType in pool"),
        all_cards_but(&["Dreams of the Sphinx", "Ghoul Retainer"])
    );
    assert_eq!(
        card_matches(&pool, "NOT (Capacity in 3 OR CostType in blood)"),
        all_cards_but(&["Lazar Dobrescu", "Minion Tap"])
    );
    // a filter and its negation partition the cards
    let mut both = card_matches(&pool, "Cost in 1, 2");
    both.extend(card_matches(&pool, "NOT Cost in 1, 2"));
    both.sort();
    assert_eq!(both, FIXTURE_CARDS.to_vec());
}

#[tokio::test]
async fn test_text_keywords() {
    let pool = setup_test_db();
    load_fixture(&pool).await;

    assert_eq!(card_matches(&pool, "CardText in \"+1 BLEED\""), vec!["Anson", "Govern the Unaligned"]);
    assert_eq!(
        card_matches(&pool, "CardText in bleed"),
        vec!["Anson", "Deflection", "Govern the Unaligned"]
    );
    assert_eq!(card_matches(&pool, "CardText in \"100%\""), vec!["Ghoul Retainer"]);
    // wildcards are matched literally
    assert!(card_matches(&pool, "CardName in \"%\"").is_empty());
    assert!(card_matches(&pool, "CardName in \"_\"").is_empty());
    assert_eq!(
        card_matches(&pool, "CardName in \"the\""),
        vec!["Dreams of the Sphinx", "Govern the Unaligned"]
    );
}

#[tokio::test]
async fn test_crypt_and_library() {
    let pool = setup_test_db();
    load_fixture(&pool).await;

    assert_eq!(
        card_matches(&pool, "Crypt"),
        vec!["Aabbt Kindred", "Anson", "Carlton Van Wyk", "Lazar Dobrescu"]
    );
    assert_eq!(
        card_matches(&pool, "Library"),
        vec!["Deflection", "Dreams of the Sphinx", "Ghoul Retainer", "Govern the Unaligned", "Minion Tap"]
    );
}

#[tokio::test]
async fn test_combinators() {
    let pool = setup_test_db();
    load_fixture(&pool).await;

    assert_eq!(
        card_matches(&pool, "Crypt AND NOT Clan in Toreador"),
        vec!["Aabbt Kindred", "Carlton Van Wyk", "Lazar Dobrescu"]
    );
    assert_eq!(
        card_matches(&pool, "Clan in Toreador OR CardType in Reaction"),
        vec!["Anson", "Deflection"]
    );
    assert_eq!(
        card_matches(&pool, "Discipline in Dominate AND (CardType in Action OR Crypt)"),
        vec!["Anson", "Govern the Unaligned"]
    );
    // the same join table used twice must not collapse into one row
    assert!(card_matches(&pool, "Clan in Toreador AND Clan in Ravnos").is_empty());
    assert_eq!(
        card_matches(&pool, "NOT Discipline in Dominate AND NOT Discipline in Fortitude"),
        vec!["Carlton Van Wyk", "Dreams of the Sphinx", "Ghoul Retainer", "Minion Tap"]
    );
    assert_eq!(
        card_matches(&pool, "NOT (Crypt OR CardType in Action)"),
        vec!["Deflection", "Dreams of the Sphinx", "Ghoul Retainer"]
    );
}

#[tokio::test]
async fn test_physical_card_target() {
    let pool = setup_test_db();
    load_card_sets(&pool).await;

    assert_eq!(
        physical_matches(&pool, ""),
        owned(&[
            ("Anson", None),
            ("Anson", Some("Jyhad")),
            ("Ghoul Retainer", Some("Camarilla Edition")),
            ("Govern the Unaligned", Some("Jyhad")),
        ])
    );
    assert_eq!(
        physical_matches(&pool, "Clan in Toreador"),
        owned(&[("Anson", None), ("Anson", Some("Jyhad"))])
    );
    assert_eq!(physical_matches(&pool, "PhysicalExpansion in \"No Expansion\""), owned(&[("Anson", None)]));
    assert_eq!(
        physical_matches(&pool, "PhysicalExpansion in ce"),
        owned(&[("Ghoul Retainer", Some("Camarilla Edition"))])
    );
    assert_eq!(
        physical_matches(&pool, "PhysicalExpansion in Jyhad, \"No Expansion\" AND Library"),
        owned(&[("Govern the Unaligned", Some("Jyhad"))])
    );
}

#[tokio::test]
async fn test_card_sets_keyword() {
    let pool = setup_test_db();
    load_card_sets(&pool).await;

    assert_eq!(card_matches(&pool, "Card_Sets in Deck"), vec!["Anson", "Govern the Unaligned"]);
    assert_eq!(
        card_matches(&pool, "Card_Sets in Collection, deck"),
        vec!["Anson", "Ghoul Retainer", "Govern the Unaligned"]
    );
    // physical targets only see the printing held by the set
    assert_eq!(
        physical_matches(&pool, "Card_Sets in Deck"),
        owned(&[("Anson", None), ("Govern the Unaligned", Some("Jyhad"))])
    );
}

#[tokio::test]
async fn test_card_count_keyword() {
    let pool = setup_test_db();
    load_card_sets(&pool).await;

    assert_eq!(
        card_matches(&pool, "CardCount in 0 from Deck"),
        vec![
            "Aabbt Kindred",
            "Carlton Van Wyk",
            "Deflection",
            "Dreams of the Sphinx",
            "Ghoul Retainer",
            "Lazar Dobrescu",
            "Minion Tap",
        ]
    );
    assert_eq!(card_matches(&pool, "CardCount in 8 from Collection, Deck"), vec!["Govern the Unaligned"]);
    assert_eq!(
        card_matches(&pool, "CardCount in >2 from Collection, Deck"),
        vec!["Anson", "Govern the Unaligned"]
    );
    assert_eq!(
        card_matches(&pool, "CardCount in 1, >5 from Collection, Deck"),
        vec!["Ghoul Retainer", "Govern the Unaligned"]
    );
    // counts are per abstract card, across every printing
    assert_eq!(
        physical_matches(&pool, "CardCount in 3 from Collection, Deck"),
        owned(&[("Anson", None), ("Anson", Some("Jyhad"))])
    );
}

#[tokio::test]
async fn test_card_set_target() {
    let pool = setup_test_db();
    load_card_sets(&pool).await;

    assert_eq!(set_matches(&pool, ""), vec!["Collection", "Deck"]);
    assert_eq!(set_matches(&pool, "SetsInUse"), vec!["Deck"]);
    assert_eq!(set_matches(&pool, "NOT SetsInUse"), vec!["Collection"]);
    assert_eq!(set_matches(&pool, "CardSetName in co"), vec!["Collection"]);
    assert_eq!(set_matches(&pool, "CardSetAuthor in ana"), vec!["Deck"]);
    assert_eq!(set_matches(&pool, "CardSetDescription in Tournament"), vec!["Deck"]);
    assert_eq!(set_matches(&pool, "CardSetAnnotations in binder"), vec!["Collection"]);
    assert_eq!(set_matches(&pool, "ParentCardSet in collection"), vec!["Deck"]);
}

#[tokio::test]
async fn test_card_set_text_folds_non_ascii_case() {
    let pool = setup_test_db();

    let dto = CreateCardSetDto {
        author: "ÉMILE".to_string(),
        comment: "Ölkrug league".to_string(),
        ..card_set_dto("Élan Deck", None)
    };
    create_card_set(&pool, &dto).await.unwrap();
    create_card_set(&pool, &card_set_dto("Other", None)).await.unwrap();

    assert_eq!(set_matches(&pool, "CardSetName in \"élan\""), vec!["Élan Deck"]);
    assert_eq!(set_matches(&pool, "CardSetName in \"ÉLAN\""), vec!["Élan Deck"]);
    assert_eq!(set_matches(&pool, "CardSetAuthor in \"émile\""), vec!["Élan Deck"]);
    assert_eq!(set_matches(&pool, "CardSetDescription in \"ÖLKRUG\""), vec!["Élan Deck"]);
    assert_eq!(set_matches(&pool, "NOT CardSetName in \"élan\""), vec!["Other"]);
}

#[tokio::test]
async fn test_select_card_set_cards() {
    let pool = setup_test_db();
    let (collection, deck) = load_card_sets(&pool).await;

    let all = select_card_set_cards(&pool, &collection, &Filter::Null).unwrap();
    assert_eq!(all.len(), 3);

    let toreador = select_card_set_cards(&pool, &collection, &parse_filter("Clan in Toreador").unwrap()).unwrap();
    assert_eq!(toreador.len(), 1);
    assert_eq!(toreador[0].card_name, "Anson");
    assert_eq!(toreador[0].card_count, 2);
    assert_eq!(toreador[0].expansion.as_deref(), Some("Jyhad"));

    let unknown = select_card_set_cards(
        &pool,
        &deck,
        &parse_filter("PhysicalExpansion in \"No Expansion\"").unwrap(),
    )
    .unwrap();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].expansion, None);

    let err = select_card_set_cards(&pool, "missing", &Filter::Null).unwrap_err();
    assert!(matches!(err.downcast_ref::<RepoError>(), Some(RepoError::NotFound(_))));
}

#[tokio::test]
async fn test_unsupported_target_is_an_error() {
    let pool = setup_test_db();
    load_fixture(&pool).await;

    let err = select_abstract_cards(&pool, &parse_filter("SetsInUse").unwrap()).unwrap_err();
    assert!(matches!(err.downcast_ref::<FilterError>(), Some(FilterError::UnsupportedTarget { .. })));

    let err = select_card_sets(&pool, &parse_filter("Clan in Toreador").unwrap()).unwrap_err();
    assert!(matches!(err.downcast_ref::<FilterError>(), Some(FilterError::UnsupportedTarget { .. })));

    let err = select_abstract_cards(&pool, &parse_filter("PhysicalExpansion in Jyhad").unwrap()).unwrap_err();
    assert!(matches!(err.downcast_ref::<FilterError>(), Some(FilterError::UnsupportedTarget { .. })));
}

#[tokio::test]
async fn test_filter_values() {
    let pool = setup_test_db();
    load_card_sets(&pool).await;

    assert_eq!(values(&pool, "Clan"), vec!["Follower of Set", "Ravnos", "Toreador"]);
    assert_eq!(values(&pool, "Expansion"), vec!["Camarilla Edition", "Jyhad", "Keepers of Tradition"]);
    assert_eq!(
        values(&pool, "PhysicalExpansion"),
        vec!["No Expansion", "Camarilla Edition", "Jyhad", "Keepers of Tradition"]
    );
    assert_eq!(
        values(&pool, "Expansion_with_Rarity"),
        vec![
            "Camarilla Edition with Common",
            "Camarilla Edition with Rare",
            "Camarilla Edition with Uncommon",
            "Jyhad with Common",
            "Jyhad with Vampire",
            "Keepers of Tradition with Rare",
            "Keepers of Tradition with Uncommon",
        ]
    );

    let disciplines = values(&pool, "Discipline_with_Level");
    assert_eq!(disciplines.len(), 12);
    assert_eq!(disciplines[..2], ["Auspex with inferior", "Auspex with superior"]);

    assert_eq!(values(&pool, "Cost"), vec!["X", "1", "2"]);
    assert_eq!(values(&pool, "Group"), vec!["1", "2", "4"]);
    assert_eq!(values(&pool, "CostType"), vec!["blood", "pool"]);
    assert_eq!(values(&pool, "Card_Sets"), vec!["Collection", "Deck"]);

    let count_values = values(&pool, "CardCount");
    assert_eq!(count_values.len(), 32);
    assert_eq!(count_values.first().map(String::as_str), Some("0"));
    assert_eq!(count_values.last().map(String::as_str), Some(">30"));

    assert!(values(&pool, "CardText").is_empty());
    assert!(values(&pool, "Crypt").is_empty());
}

#[tokio::test]
async fn test_listed_values_are_accepted_by_filters() {
    let pool = setup_test_db();
    load_card_sets(&pool).await;

    for keyword in ["Clan", "Expansion", "Cost", "Group", "PhysicalExpansion", "Card_Sets"] {
        let spec = lookup_keyword(keyword).unwrap();
        for value in filter_values(&pool, spec).unwrap() {
            let input = format!("{} in \"{}\"", keyword, value);
            assert!(parse_filter(&input).is_ok(), "{} should parse", input);
        }
    }
}
