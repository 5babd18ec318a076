/// Integration tests for the filter endpoints
///
/// This file covers:
/// - Listing keywords and the values they accept
/// - Parsing and normalising filter expressions
/// - Saved filters

use axum::http::StatusCode;
use serde_json::json;
use std::collections::BTreeMap;
use sutekh::FilterSettings;

mod common;
use common::*;

// ============================================================================
// Keywords
// ============================================================================

/// Tests that every keyword is listed with the targets it applies to
#[tokio::test]
async fn test_list_keywords() {
    let app = create_test_app();

    let (status, keywords) = get(&app, "/filters/keywords").await;
    assert_eq!(status, StatusCode::OK);

    let keywords = keywords.as_array().unwrap();
    let find = |name: &str| {
        keywords
            .iter()
            .find(|keyword| keyword["keyword"] == name)
            .unwrap_or_else(|| panic!("missing keyword {}", name))
            .clone()
    };

    assert_eq!(find("Clan")["targets"], json!(["abstract_card", "physical_card"]));
    assert_eq!(find("PhysicalExpansion")["targets"], json!(["physical_card"]));
    assert_eq!(find("SetsInUse")["targets"], json!(["card_set"]));
    assert!(find("CardCount")["description"].is_string());
    assert!(keywords.len() >= 30);
}

/// Tests listing the values a keyword accepts
#[tokio::test]
async fn test_keyword_values() {
    let app = create_test_app();
    load_cards(&app).await;

    let (status, body) = get(&app, "/filters/keywords/clan/values").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "keyword": "Clan", "values": ["Ravnos", "Toreador"] }));

    let (_, body) = get(&app, "/filters/keywords/PhysicalExpansion/values").await;
    assert_eq!(body["values"], json!(["No Expansion", "Camarilla Edition", "Jyhad"]));

    let (_, body) = get(&app, "/filters/keywords/Discipline_with_Level/values").await;
    let values = body["values"].as_array().unwrap();
    assert!(values.contains(&json!("Presence with superior")));
    assert!(values.contains(&json!("Fortitude with inferior")));

    let (_, body) = get(&app, "/filters/keywords/Capacity/values").await;
    assert_eq!(body["values"], json!(["3", "8"]));

    // keywords without arguments take no values
    let (_, body) = get(&app, "/filters/keywords/Crypt/values").await;
    assert_eq!(body["values"], json!([]));
}

/// Tests asking for the values of a keyword that does not exist
#[tokio::test]
async fn test_unknown_keyword_values() {
    let app = create_test_app();

    let (status, body) = get(&app, "/filters/keywords/Colour/values").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Unknown filter keyword 'Colour'");
}

// ============================================================================
// Parsing
// ============================================================================

/// Tests that parsing returns the canonical form and where it can run
#[tokio::test]
async fn test_parse_filter() {
    let app = create_test_app();

    let (status, body) = post(
        &app,
        "/filters/parse",
        json!({ "filter": "Clan in Ventrue,Tremere and not Crypt" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filter"], "Clan in \"Ventrue\", \"Tremere\" AND NOT Crypt");
    assert_eq!(body["variables"], json!([]));
    assert_eq!(body["targets"], json!(["abstract_card", "physical_card"]));

    let (_, body) = post(&app, "/filters/parse", json!({ "filter": "SetsInUse OR ParentCardSet in Decks" })).await;
    assert_eq!(body["targets"], json!(["card_set"]));

    // valid, but there is nothing it can select
    let (status, body) = post(&app, "/filters/parse", json!({ "filter": "Crypt AND SetsInUse" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["targets"], json!([]));
}

/// Tests that parsing reports and binds variables
#[tokio::test]
async fn test_parse_filter_with_variables() {
    let app = create_test_app();

    let (_, body) = post(&app, "/filters/parse", json!({ "filter": "Clan in $clan AND Sect in $sect" })).await;
    assert_eq!(body["variables"], json!(["clan", "sect"]));
    assert_eq!(body["targets"], json!([]));

    let (status, body) = post(
        &app,
        "/filters/parse",
        json!({ "filter": "Clan in $clan", "variables": { "clan": ["Ravnos", "Gangrel"] } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filter"], "Clan in \"Ravnos\", \"Gangrel\"");
    assert_eq!(body["variables"], json!([]));
}

/// Tests that malformed expressions are reported as client errors
#[tokio::test]
async fn test_parse_invalid_filters() {
    let app = create_test_app();

    let cases = [
        ("Clan in Ventrue AND", "Syntax error"),
        ("(Crypt", "Syntax error"),
        ("Clan in \"Ventrue", "Invalid filter"),
        ("Colour in Red", "Unknown filter keyword"),
        ("Capacity in many", "Capacity"),
    ];
    for (filter, message) in cases {
        let (status, body) = post(&app, "/filters/parse", json!({ "filter": filter })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", filter);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains(message), "{}: {}", filter, error);
    }
}

/// Tests that absurdly nested expressions are rejected rather than crashing the server
#[tokio::test]
async fn test_parse_deeply_nested_filter() {
    let app = create_test_app();

    for filter in [format!("{}Crypt", "NOT ".repeat(20_000)), "(".repeat(20_000)] {
        let (status, body) = post(&app, "/filters/parse", json!({ "filter": filter })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("nested"), "{}", body);
    }

    // the server keeps answering afterwards
    let (status, _) = post(&app, "/filters/parse", json!({ "filter": "NOT NOT Crypt" })).await;
    assert_eq!(status, StatusCode::OK);
}

/// Tests that a card set keyword cannot be used to list cards
#[tokio::test]
async fn test_filter_on_wrong_target() {
    let app = create_test_app();

    let (status, body) = get(&app, &format!("/cards?{}", query(&[("filter", "CardSetName in Deck")]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("CardSetName"));
}

// ============================================================================
// Saved filters
// ============================================================================

/// Tests listing the configured saved filters
#[tokio::test]
async fn test_list_saved_filters() {
    let app = create_test_app();
    let (_, body) = get(&app, "/filters/saved").await;
    assert_eq!(body, json!([]));

    let mut saved_filters = BTreeMap::new();
    saved_filters.insert("vampires".to_string(), "CardType in Vampire".to_string());
    saved_filters.insert("allies".to_string(), "CardType in Ally".to_string());
    let app = create_test_app_with_filters(FilterSettings { default_card_filter: None, saved_filters });

    let (status, body) = get(&app, "/filters/saved").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "name": "allies", "filter": "CardType in Ally" },
            { "name": "vampires", "filter": "CardType in Vampire" }
        ])
    );
}
