//! Common test utilities for Sutekh integration tests
//!
//! This file contains shared functions for all integration tests: building
//! the application on a private in-memory database, sending requests, and
//! loading a small card list through the API.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use sutekh::{create_app_with_filters, db::init_pool, FilterSettings};
use tower::ServiceExt;

/// Creates a test application with an in-memory SQLite database
///
/// Every call gets its own shared-cache database, so all pooled connections
/// of one application see the same data and tests stay isolated.
pub fn create_test_app() -> Router {
    create_test_app_with_filters(FilterSettings::default())
}

/// Creates a test application with configured default and saved filters
pub fn create_test_app_with_filters(filters: FilterSettings) -> Router {
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = Arc::new(init_pool(&database_url));

    let conn = &mut pool.get().unwrap();
    sutekh::run_migrations(conn);

    create_app_with_filters(pool, filters)
}

/// Sends a request and returns the status with the parsed JSON body
///
/// An empty body (as in `204 No Content`) comes back as `Value::Null`.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

/// Builds a query string from `(key, value)` pairs, repeating keys as given
pub fn query(pairs: &[(&str, &str)]) -> String {
    serde_html_form::to_string(pairs).unwrap()
}

/// Names of the cards in a JSON list, in order
pub fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|card| card["name"].as_str().unwrap().to_string())
        .collect()
}

/// Creates an expansion via the API and returns its ID
pub async fn create_expansion(app: &Router, name: &str, short_name: Option<&str>) -> String {
    let (status, body) = post(app, "/expansions", json!({ "name": name, "short_name": short_name })).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

/// Creates a card via the API and returns its ID
pub async fn create_card(app: &Router, card: Value) -> String {
    let (status, body) = post(app, "/cards", card).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

/// Loads two expansions and five cards
///
/// | card                 | type     | clan     | disciplines           | printed in   |
/// |----------------------|----------|----------|-----------------------|--------------|
/// | Anson                | Vampire  | Toreador | AUS, dom, PRE         | Jyhad        |
/// | Lazar Dobrescu       | Vampire  | Ravnos   | for                   | CE           |
/// | Govern the Unaligned | Action   |          | dom                   | Jyhad, CE    |
/// | Deflection           | Reaction |          | dom                   | Jyhad        |
/// | Ghoul Retainer       | Retainer |          |                       | CE           |
pub async fn load_cards(app: &Router) {
    create_expansion(app, "Jyhad", None).await;
    create_expansion(app, "Camarilla Edition", Some("CE")).await;

    let cards = [
        json!({
            "name": "Anson",
            "text": "Camarilla prince of Los Angeles. +1 bleed.",
            "group": 1,
            "capacity": 8,
            "clans": ["Toreador"],
            "disciplines": [
                { "discipline": "Auspex", "level": "superior" },
                { "discipline": "Dominate", "level": "inferior" },
                { "discipline": "Presence", "level": "superior" }
            ],
            "card_types": ["Vampire"],
            "sects": ["Camarilla"],
            "titles": ["Prince"],
            "rarities": [{ "expansion": "Jyhad", "rarity": "Vampire" }]
        }),
        json!({
            "name": "Lazar Dobrescu",
            "text": "Independent: Lazar may move one blood to a vampire in torpor.",
            "group": 2,
            "capacity": 3,
            "clans": ["Ravnos"],
            "disciplines": [{ "discipline": "Fortitude", "level": "inferior" }],
            "card_types": ["Vampire"],
            "sects": ["Independent"],
            "rarities": [{ "expansion": "CE", "rarity": "Vampire" }]
        }),
        json!({
            "name": "Govern the Unaligned",
            "text": "+1 bleed. [DOM] Bleed at +2 bleed.",
            "disciplines": [{ "discipline": "Dominate", "level": "inferior" }],
            "card_types": ["Action"],
            "rarities": [
                { "expansion": "Jyhad", "rarity": "Common" },
                { "expansion": "CE", "rarity": "Common" }
            ]
        }),
        json!({
            "name": "Deflection",
            "text": "Only usable when a bleed is announced against you.",
            "disciplines": [{ "discipline": "Dominate", "level": "inferior" }],
            "card_types": ["Reaction"],
            "rarities": [{ "expansion": "Jyhad", "rarity": "Common" }]
        }),
        json!({
            "name": "Ghoul Retainer",
            "text": "Ghoul with 2 life.",
            "cost": 2,
            "cost_type": "pool",
            "life": 2,
            "card_types": ["Retainer"],
            "rarities": [{ "expansion": "CE", "rarity": "Common" }]
        }),
    ];
    for card in cards {
        create_card(app, card).await;
    }
}

/// Looks up a loaded card's ID by exact name
pub async fn card_id(app: &Router, name: &str) -> String {
    let uri = format!("/cards?{}", query(&[("filter", &format!("CardName in \"{}\"", name))]));
    let (status, body) = get(app, &uri).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body.as_array()
        .unwrap()
        .iter()
        .find(|card| card["name"] == name)
        .and_then(|card| card["id"].as_str())
        .unwrap()
        .to_string()
}

/// Gets or creates the physical card of a loaded card and returns its ID
///
/// `expansion` selects the expansion's standard printing; `None` the
/// unknown printing.
pub async fn physical_card_id(app: &Router, name: &str, expansion: Option<&str>) -> String {
    let id = card_id(app, name).await;
    let (status, body) = post(app, &format!("/cards/{}/physical", id), json!({ "expansion": expansion })).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

/// Creates a card set via the API and returns its ID
pub async fn create_card_set(app: &Router, name: &str, parent_id: Option<&str>) -> String {
    let (status, body) = post(app, "/card_sets", json!({ "name": name, "parent_id": parent_id })).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_str().unwrap().to_string()
}
