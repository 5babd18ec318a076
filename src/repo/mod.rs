/// Repository module
///
/// This module provides the data access layer for the card database. Each
/// entity gets its own file of functions taking a `&DbPool`; `filter_repo`
/// runs compiled filters against the abstract card, physical card and card
/// set tables.
///
/// Functions return `anyhow::Result`. Failures the caller is expected to
/// act on (missing rows, name conflicts, invalid input) are raised as
/// [`RepoError`](crate::errors::RepoError) inside the `anyhow::Error`.

mod vocabulary_repo;
mod expansion_repo;
mod abstract_card_repo;
mod physical_card_repo;
mod card_set_repo;
mod filter_repo;

// Re-export all repository functions
pub use vocabulary_repo::*;
pub use expansion_repo::*;
pub use abstract_card_repo::*;
pub use physical_card_repo::*;
pub use card_set_repo::*;
pub use filter_repo::*;
