use crate::config::SearchConfig;
use crate::db::models::Recipe;
use crate::error::Result;
use crate::search::ranker::Ranker;
use crate::search::store::SearchStore;
use crate::search::suggest::{SuggestOptions, Suggester};
use crate::search::tokenizer::tokenize;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of one search request
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The query had no terms
    Empty,
    /// Ranked matches, best first
    Found(Vec<Recipe>),
    /// Nothing matched; alternate terms to try instead
    NotFound {
        suggestions: Vec<String>,
        search_term: String,
    },
}

/// Tokenizes, ranks and, when nothing matches, suggests
pub struct SearchEngine<S> {
    ranker: Ranker<S>,
    suggester: Suggester<S>,
}

impl<S: SearchStore> SearchEngine<S> {
    pub fn new(store: Arc<S>, config: &SearchConfig) -> Self {
        Self {
            ranker: Ranker::new(store.clone(), config.max_results),
            suggester: Suggester::new(store, SuggestOptions::from(config)),
        }
    }

    pub async fn search(&self, raw: &str) -> Result<SearchOutcome> {
        let query = tokenize(raw);
        if query.is_empty() {
            debug!("Empty search query");
            return Ok(SearchOutcome::Empty);
        }

        let recipes = self.ranker.rank(&query).await?;
        if !recipes.is_empty() {
            debug!("Search {:?} matched {} recipes", query.joined, recipes.len());
            return Ok(SearchOutcome::Found(recipes));
        }

        let suggestions = self.suggester.suggest(&query.terms).await;
        info!(
            "No recipes for {:?}, offering {} suggestions",
            query.joined,
            suggestions.len()
        );

        Ok(SearchOutcome::NotFound {
            suggestions,
            search_term: raw.to_string(),
        })
    }
}
