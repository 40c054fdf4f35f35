pub mod club_search;
pub mod database;
pub mod event_parser;
pub mod event_rules;
pub mod extraction;
pub mod fuzzy;
pub mod lexicon;
pub mod normalizer;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public types
pub use club_search::{ClubSearchService, ClubStore};
pub use database::{Database, EventStore};
pub use event_parser::EventParser;
pub use extraction::{DisabledExtractor, EventExtractor, LlmExtractor};
pub use lexicon::{ClubLexicon, LexiconProvider, LexiconStore};
