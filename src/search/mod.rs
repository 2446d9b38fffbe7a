//! Recipe search: tokenizer, multi-signal ranker and suggestion synthesizer.

pub mod engine;
pub mod ranker;
pub mod scoring;
pub mod store;
pub mod suggest;
pub mod tokenizer;

#[cfg(test)]
mod memory;

pub use engine::{SearchEngine, SearchOutcome};
pub use ranker::{Ranker, ScoredRecipe};
pub use store::{SearchStore, SqliteStore};
pub use suggest::{SuggestOptions, Suggester};
pub use tokenizer::{tokenize, Query};
