/// Sutekh: a card collection manager for Vampire: The Eternal Struggle
///
/// This library provides the card database, the filter language used to
/// select cards and card sets, and a JSON web API over both.
///
/// ### Modules
///
/// - `db`: Database connection management
/// - `models`: Cards, expansions, printings, physical cards and card sets
/// - `filters`: The filter language, from text to SQL
/// - `repo`: Repository layer for database operations
/// - `handlers`: Axum handlers for the web API
/// - `config`: Configuration file, environment and command line handling
///
/// ### Web API
///
/// - `GET /cards?filter=&saved=&var=`: Cards matching a filter
/// - `POST /cards`: Create a card
/// - `GET /physical_cards?filter=`: Physical cards matching a filter
/// - `GET /card_sets?filter=`: Card sets matching a filter
/// - `GET /card_sets/{id}/cards?filter=`: Entries of a card set
/// - `POST /filters/parse`: Validate and normalise a filter expression

/// Database connection module
pub mod db;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Filter language module
pub mod filters;

/// Error types
pub mod errors;

/// Request and response bodies
pub mod dto;

/// Configuration module
pub mod config;

/// Web API handlers
pub mod handlers;

#[cfg(test)]
pub mod test_utils;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::db::DbPool;
use crate::handlers::*;

/// Filters the server knows by configuration rather than by request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSettings {
    /// Applied to `GET /cards` when the request names no filter
    pub default_card_filter: Option<String>,
    /// Named expressions, usable as `saved=<name>`
    pub saved_filters: BTreeMap<String, String>,
}

impl FilterSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_card_filter: config.default_card_filter.clone(),
            saved_filters: config.saved_filters.clone(),
        }
    }
}

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub filters: Arc<FilterSettings>,
}

impl FromRef<AppState> for Arc<DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<FilterSettings> {
    fn from_ref(state: &AppState) -> Self {
        state.filters.clone()
    }
}

/// Creates the application router with no configured filters
///
/// ### Arguments
///
/// * `pool` - The database connection pool to be shared with all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes
pub fn create_app(pool: Arc<DbPool>) -> Router {
    create_app_with_filters(pool, FilterSettings::default())
}

/// Creates the application router with all routes
///
/// ### Arguments
///
/// * `pool` - The database connection pool to be shared with all handlers
/// * `filters` - The default card filter and the saved filters
///
/// ### Returns
///
/// An Axum Router configured with all routes and the shared state
pub fn create_app_with_filters(pool: Arc<DbPool>, filters: FilterSettings) -> Router {
    let state = AppState { pool, filters: Arc::new(filters) };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Abstract cards
        .route("/cards", get(list_cards_handler).post(create_card_handler))
        .route("/cards/{id}", get(get_card_handler).delete(delete_card_handler))
        .route("/cards/{id}/rulings", post(add_ruling_handler))
        .route(
            "/cards/{id}/physical",
            get(list_physical_cards_for_card_handler).post(get_or_create_physical_card_handler),
        )
        // Physical cards
        .route("/physical_cards", get(list_physical_cards_handler))
        // Expansions and printings
        .route("/expansions", get(list_expansions_handler).post(create_expansion_handler))
        .route("/expansions/{id}", get(get_expansion_handler))
        .route(
            "/expansions/{id}/printings",
            get(list_printings_handler).post(create_printing_handler),
        )
        // Card sets
        .route("/card_sets", get(list_card_sets_handler).post(create_card_set_handler))
        .route(
            "/card_sets/{id}",
            get(get_card_set_handler)
                .patch(update_card_set_handler)
                .delete(delete_card_set_handler),
        )
        .route("/card_sets/{id}/children", get(list_child_card_sets_handler))
        .route(
            "/card_sets/{id}/cards",
            get(list_card_set_cards_handler)
                .post(add_card_set_cards_handler)
                .delete(remove_card_set_cards_handler),
        )
        .route("/card_sets/{id}/copy", post(copy_card_set_handler))
        .route("/card_sets/{id}/summary", get(card_set_summary_handler))
        // Filters
        .route("/filters/keywords", get(list_keywords_handler))
        .route("/filters/keywords/{keyword}/values", get(keyword_values_handler))
        .route("/filters/parse", post(parse_filter_handler))
        .route("/filters/saved", get(list_saved_filters_handler))
        .layer(cors)
        .with_state(state)
}

/// Runs the embedded migrations
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Panics
///
/// This function will panic if the migrations fail to run
pub fn run_migrations(conn: &mut diesel::SqliteConnection) {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::tests::setup_test_db;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).method("GET").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// Tests the run_migrations function on a fresh database
    #[test]
    fn test_run_migrations() {
        use diesel::{Connection, QueryDsl, RunQueryDsl, SqliteConnection};

        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        run_migrations(&mut conn);

        let card_sets: i64 = schema::card_sets::table.count().get_result(&mut conn).unwrap();
        assert_eq!(card_sets, 0);
    }

    #[test]
    fn test_filter_settings_from_config() {
        let mut config = crate::config::base_config(None);
        config.default_card_filter = Some("Crypt".to_string());
        config.saved_filters.insert("mine".to_string(), "Card_Sets in \"Mine\"".to_string());

        let settings = FilterSettings::from_config(&config);

        assert_eq!(settings.default_card_filter.as_deref(), Some("Crypt"));
        assert_eq!(settings.saved_filters.get("mine").map(String::as_str), Some("Card_Sets in \"Mine\""));
    }

    #[tokio::test]
    async fn test_saved_filters_are_served() {
        let pool = setup_test_db();
        let mut saved_filters = BTreeMap::new();
        saved_filters.insert("crypt".to_string(), "Crypt".to_string());
        let app = create_app_with_filters(pool, FilterSettings { default_card_filter: None, saved_filters });

        let (status, body) = get_json(app, "/filters/saved").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([{ "name": "crypt", "filter": "Crypt" }]));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = create_app(setup_test_db());
        let request = Request::builder().uri("/items").method("GET").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
