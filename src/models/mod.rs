/// Data models module
///
/// This module defines the data structures stored in the card database:
/// abstract cards and their vocabulary, expansions and printings, physical
/// cards, rulings and card sets, together with the read-only views the
/// filter queries return.

mod vocabulary;
pub use vocabulary::{DisciplineLevel, Vocabulary};

mod abstract_card;
pub use abstract_card::{canonical_name, AbstractCard, CardDetails, DisciplinePair, RarityPair};

mod ruling;
pub use ruling::Ruling;

mod expansion;
pub use expansion::{Expansion, Printing};

mod physical_card;
pub use physical_card::{PhysicalCard, PhysicalCardView};

mod card_set;
pub use card_set::{CardSet, CardSetCard, CardSetEntry, CardSetSummary};
