use serde::de::DeserializeOwned;
use serde::Serialize;
use sutekh::dto::{
    CardCountDto, CardSetCardsDto, CopyCardSetDto, CreateAbstractCardDto, CreateCardSetDto,
    CreateExpansionDto, CreatePhysicalCardDto, CreatePrintingDto, CreateRulingDto, FilterQueryDto,
    KeywordDto, KeywordValuesDto, ParseFilterDto, ParseFilterResponse, SavedFilterDto,
    UpdateCardSetDto,
};
use sutekh::models::{
    AbstractCard, CardDetails, CardSet, CardSetCard, CardSetSummary, Expansion, PhysicalCard,
    PhysicalCardView, Printing, Ruling,
};
use reqwest::Client;

/// Error type for CLI client operations
#[derive(Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    Server { status: reqwest::StatusCode, message: String },
    /// Network/connection/request error
    Request(reqwest::Error),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status.as_u16(), message)
            }
            ClientError::Request(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            ClientError::Server { .. } => None,
        }
    }
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// Builds query parameters from a FilterQueryDto
///
/// Every variable binding becomes its own `var` parameter.
fn build_query_params(query: &FilterQueryDto) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = Vec::new();

    if let Some(ref filter) = query.filter {
        params.push(("filter", filter.clone()));
    }
    if let Some(ref saved) = query.saved {
        params.push(("saved", saved.clone()));
    }
    for binding in &query.var {
        params.push(("var", binding.clone()));
    }

    params
}

/// HTTP client wrapper for communicating with the Sutekh server
pub struct SutekhClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    /// The underlying HTTP client
    client: Client,
}

impl SutekhClient {
    /// Creates a new SutekhClient
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the Sutekh server
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    async fn get_filtered<T: DeserializeOwned>(&self, path: &str, query: &FilterQueryDto) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let params = build_query_params(query);

        let response = self.client.get(&url).query(&params)
            .send().await.map_err(ClientError::Request)?
            .check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = format!("{}{}", self.base_url, path);
        self.client.delete(&url).send().await.map_err(ClientError::Request)?.check().await?;
        Ok(())
    }

    // ── Card endpoints ───────────────────────────────────────────────

    /// Lists the cards matching a filter
    pub async fn list_cards(&self, query: &FilterQueryDto) -> Result<Vec<AbstractCard>, ClientError> {
        self.get_filtered("/cards", query).await
    }

    /// Creates a new card
    pub async fn create_card(&self, dto: &CreateAbstractCardDto) -> Result<AbstractCard, ClientError> {
        self.post("/cards", dto).await
    }

    /// Gets a card with its vocabulary, rarities and rulings
    pub async fn get_card(&self, id: &str) -> Result<CardDetails, ClientError> {
        self.get(&format!("/cards/{}", id)).await
    }

    /// Deletes a card
    pub async fn delete_card(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/cards/{}", id)).await
    }

    /// Adds a ruling to a card
    pub async fn add_ruling(&self, id: &str, dto: &CreateRulingDto) -> Result<Ruling, ClientError> {
        self.post(&format!("/cards/{}/rulings", id), dto).await
    }

    /// Lists the physical cards of a card
    pub async fn list_physical_cards_for_card(&self, id: &str) -> Result<Vec<PhysicalCardView>, ClientError> {
        self.get(&format!("/cards/{}/physical", id)).await
    }

    /// Gets or creates the physical card of a card in a printing
    pub async fn get_or_create_physical_card(
        &self,
        id: &str,
        expansion: Option<String>,
        printing: Option<String>,
    ) -> Result<PhysicalCard, ClientError> {
        let dto = CreatePhysicalCardDto { expansion, printing };
        self.post(&format!("/cards/{}/physical", id), &dto).await
    }

    /// Lists the physical cards matching a filter
    pub async fn list_physical_cards(&self, query: &FilterQueryDto) -> Result<Vec<PhysicalCardView>, ClientError> {
        self.get_filtered("/physical_cards", query).await
    }

    // ── Expansion endpoints ──────────────────────────────────────────

    /// Lists all expansions
    pub async fn list_expansions(&self) -> Result<Vec<Expansion>, ClientError> {
        self.get("/expansions").await
    }

    /// Creates a new expansion
    pub async fn create_expansion(&self, name: String, short_name: Option<String>) -> Result<Expansion, ClientError> {
        self.post("/expansions", &CreateExpansionDto { name, short_name }).await
    }

    /// Gets a specific expansion by ID
    pub async fn get_expansion(&self, id: &str) -> Result<Expansion, ClientError> {
        self.get(&format!("/expansions/{}", id)).await
    }

    /// Lists the printings of an expansion
    pub async fn list_printings(&self, id: &str) -> Result<Vec<Printing>, ClientError> {
        self.get(&format!("/expansions/{}/printings", id)).await
    }

    /// Adds a named printing to an expansion
    pub async fn create_printing(&self, id: &str, name: String) -> Result<Printing, ClientError> {
        self.post(&format!("/expansions/{}/printings", id), &CreatePrintingDto { name }).await
    }

    // ── Card set endpoints ───────────────────────────────────────────

    /// Lists the card sets matching a filter
    pub async fn list_card_sets(&self, query: &FilterQueryDto) -> Result<Vec<CardSet>, ClientError> {
        self.get_filtered("/card_sets", query).await
    }

    /// Creates a new card set
    pub async fn create_card_set(&self, dto: &CreateCardSetDto) -> Result<CardSet, ClientError> {
        self.post("/card_sets", dto).await
    }

    /// Gets a specific card set by ID
    pub async fn get_card_set(&self, id: &str) -> Result<CardSet, ClientError> {
        self.get(&format!("/card_sets/{}", id)).await
    }

    /// Updates a card set
    pub async fn update_card_set(&self, id: &str, dto: &UpdateCardSetDto) -> Result<CardSet, ClientError> {
        let url = format!("{}/card_sets/{}", self.base_url, id);
        let response = self.client.patch(&url).json(dto).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Deletes a card set
    pub async fn delete_card_set(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/card_sets/{}", id)).await
    }

    /// Lists the sets nested directly under a card set
    pub async fn list_child_card_sets(&self, id: &str) -> Result<Vec<CardSet>, ClientError> {
        self.get(&format!("/card_sets/{}/children", id)).await
    }

    /// Lists the entries of a card set, optionally filtered
    pub async fn list_card_set_cards(&self, id: &str, query: &FilterQueryDto) -> Result<Vec<CardSetCard>, ClientError> {
        self.get_filtered(&format!("/card_sets/{}/cards", id), query).await
    }

    /// Adds cards to a card set
    pub async fn add_card_set_cards(&self, id: &str, cards: Vec<CardCountDto>) -> Result<Vec<CardSetCard>, ClientError> {
        self.post(&format!("/card_sets/{}/cards", id), &CardSetCardsDto { cards }).await
    }

    /// Removes cards from a card set
    pub async fn remove_card_set_cards(&self, id: &str, cards: Vec<CardCountDto>) -> Result<Vec<CardSetCard>, ClientError> {
        let url = format!("{}/card_sets/{}/cards", self.base_url, id);
        let response = self.client.delete(&url).json(&CardSetCardsDto { cards })
            .send().await.map_err(ClientError::Request)?
            .check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Copies a card set under a new name
    pub async fn copy_card_set(&self, id: &str, name: String) -> Result<CardSet, ClientError> {
        self.post(&format!("/card_sets/{}/copy", id), &CopyCardSetDto { name }).await
    }

    /// Counts the cards of a card set
    pub async fn card_set_summary(&self, id: &str) -> Result<CardSetSummary, ClientError> {
        self.get(&format!("/card_sets/{}/summary", id)).await
    }

    // ── Filter endpoints ─────────────────────────────────────────────

    /// Validates and normalises a filter expression
    pub async fn parse_filter(&self, dto: &ParseFilterDto) -> Result<ParseFilterResponse, ClientError> {
        self.post("/filters/parse", dto).await
    }

    /// Lists the filter keywords
    pub async fn list_keywords(&self) -> Result<Vec<KeywordDto>, ClientError> {
        self.get("/filters/keywords").await
    }

    /// Lists the values a filter keyword accepts
    pub async fn keyword_values(&self, keyword: &str) -> Result<KeywordValuesDto, ClientError> {
        self.get(&format!("/filters/keywords/{}/values", keyword)).await
    }

    /// Lists the saved filters
    pub async fn list_saved_filters(&self) -> Result<Vec<SavedFilterDto>, ClientError> {
        self.get("/filters/saved").await
    }
}
