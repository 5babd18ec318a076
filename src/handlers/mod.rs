/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler extracts what it needs from the request, calls the
/// repository, and returns JSON. Handlers that select rows through the
/// filter language share [`resolve_filter`](filter_handlers::resolve_filter)
/// to combine the request's expression, a saved filter and the variable
/// bindings.

mod card_handlers;
mod expansion_handlers;
mod card_set_handlers;
mod filter_handlers;

// Re-export all handlers
pub use card_handlers::*;
pub use expansion_handlers::*;
pub use card_set_handlers::*;
pub use filter_handlers::*;
