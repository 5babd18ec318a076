use axum::{
    extract::{Path, State},
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::db::DbPool;
use crate::dto::{FilterQueryDto, KeywordDto, KeywordValuesDto, ParseFilterDto, ParseFilterResponse, SavedFilterDto};
use crate::errors::ApiError;
use crate::filters::{lookup_keyword, parse, Filter, FilterAst, FilterError, KEYWORDS};
use crate::repo;
use crate::FilterSettings;

/// Builds the filter a request selects rows with
///
/// The saved filter named by `saved` and the `filter` expression are AND-ed.
/// When the request names neither and `apply_default` is set, the configured
/// default card filter is used instead. Variables are bound from `var`.
///
/// ### Errors
///
/// Returns an error if:
/// - The saved filter does not exist (`ApiError::BadRequest`)
/// - A `var` entry is malformed (`ApiError::BadRequest`)
/// - An expression does not parse or validate, or a variable is left
///   without a value (`ApiError::InvalidFilter`)
pub(crate) fn resolve_filter(
    settings: &FilterSettings,
    query: &FilterQueryDto,
    apply_default: bool,
) -> Result<Filter, ApiError> {
    let mut ast = FilterAst::Null;

    if let Some(name) = &query.saved {
        let expression = settings
            .saved_filters
            .get(name)
            .ok_or_else(|| ApiError::BadRequest(format!("No saved filter named '{}'", name)))?;
        ast = ast.and(parse(expression)?);
    }
    if let Some(expression) = &query.filter {
        ast = ast.and(parse(expression)?);
    }
    if apply_default && query.is_empty() {
        if let Some(expression) = &settings.default_card_filter {
            debug!("Using the default card filter: {}", expression);
            ast = parse(expression)?;
        }
    }

    let values = query.variables().map_err(ApiError::BadRequest)?;
    Ok(bind_filter(&ast, &values)?)
}

/// Binds variables and validates the result into a typed filter
fn bind_filter(ast: &FilterAst, values: &HashMap<String, Vec<String>>) -> Result<Filter, FilterError> {
    let bound = ast.bind(values);
    if let Some(name) = bound.variables().into_iter().next() {
        return Err(FilterError::UnboundVariable(name));
    }
    Filter::from_ast(&bound)
}

/// Handler for validating a filter expression
///
/// This function handles POST requests to `/filters/parse`. Unbound
/// variables are not an error here: they are reported back so a client can
/// ask for their values.
///
/// ### Returns
///
/// The canonical expression, its remaining variables and the targets it
/// applies to
#[instrument(skip(payload), fields(filter = %payload.filter))]
pub async fn parse_filter_handler(
    Json(payload): Json<ParseFilterDto>,
) -> Result<Json<ParseFilterResponse>, ApiError> {
    debug!("Parsing filter");

    let bound = parse(&payload.filter)?.bind(&payload.variables);
    let variables = bound.variables();
    let targets = if variables.is_empty() {
        Filter::from_ast(&bound)?.targets()
    } else {
        Vec::new()
    };

    Ok(Json(ParseFilterResponse { filter: bound.to_string(), variables, targets }))
}

/// Handler for listing the filter keywords
///
/// This function handles GET requests to `/filters/keywords`.
#[instrument]
pub async fn list_keywords_handler() -> Json<Vec<KeywordDto>> {
    Json(KEYWORDS.iter().map(KeywordDto::from).collect())
}

/// Handler for listing the values a filter keyword accepts
///
/// This function handles GET requests to `/filters/keywords/{keyword}/values`.
/// Keywords are matched without regard to case.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `keyword` - The filter keyword, extracted from the URL path
///
/// ### Returns
///
/// The keyword's canonical name and its values as JSON
#[instrument(skip(pool), fields(keyword = %keyword))]
pub async fn keyword_values_handler(
    State(pool): State<Arc<DbPool>>,
    Path(keyword): Path<String>,
) -> Result<Json<KeywordValuesDto>, ApiError> {
    let spec = lookup_keyword(&keyword)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown filter keyword '{}'", keyword)))?;

    let values = repo::filter_values(&pool, spec)?;

    info!("Retrieved {} values for {}", values.len(), spec.keyword);
    Ok(Json(KeywordValuesDto { keyword: spec.keyword.to_string(), values }))
}

/// Handler for listing the saved filters from the configuration
///
/// This function handles GET requests to `/filters/saved`.
#[instrument(skip(settings))]
pub async fn list_saved_filters_handler(
    State(settings): State<Arc<FilterSettings>>,
) -> Json<Vec<SavedFilterDto>> {
    Json(
        settings
            .saved_filters
            .iter()
            .map(|(name, filter)| SavedFilterDto { name: name.clone(), filter: filter.clone() })
            .collect(),
    )
}
