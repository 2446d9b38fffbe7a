//! Alternate query terms for searches that found nothing.
//!
//! Two strategies feed one ordered, deduplicated set: spelling variants of
//! each term that exist somewhere in the catalog, then whole words from
//! records matching shortened fragments of each term.

use crate::config::SearchConfig;
use crate::db::models::RecipeField;
use crate::error::{Error, Result};
use crate::search::store::SearchStore;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Spanish spelling confusions, applied one position at a time
const CONFUSIONS: &[(&str, &str)] = &[
    ("v", "b"),
    ("b", "v"),
    ("s", "c"),
    ("c", "s"),
    ("z", "s"),
    ("s", "z"),
    ("z", "c"),
    ("c", "z"),
    ("ll", "y"),
    ("y", "ll"),
    ("j", "g"),
    ("g", "j"),
];

const PROBE_FIELDS: [RecipeField; 2] = [RecipeField::Name, RecipeField::Tags];

/// Hard upper bound on returned suggestions
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone)]
pub struct SuggestOptions {
    pub max_suggestions: usize,
    pub probe_timeout: Duration,
    pub probe_concurrency: usize,
    pub fragment_probe_limit: i64,
}

impl From<&SearchConfig> for SuggestOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_suggestions: config.max_suggestions.min(MAX_SUGGESTIONS),
            probe_timeout: config.probe_timeout(),
            probe_concurrency: config.probe_concurrency.max(1),
            fragment_probe_limit: config.fragment_probe_limit,
        }
    }
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

/// Term with a trailing "es" or "s" removed
pub fn singularize(term: &str) -> Option<String> {
    let len = term.chars().count();
    if len > 3 && term.ends_with("es") {
        Some(term[..term.len() - 2].to_string())
    } else if len > 2 && term.ends_with('s') {
        Some(term[..term.len() - 1].to_string())
    } else {
        None
    }
}

/// Single-substitution spelling variants, by position then table order
fn substitutions(term: &str) -> Vec<String> {
    let chars: Vec<char> = term.chars().collect();
    let mut variants = Vec::new();

    for pos in 0..chars.len() {
        for (from, to) in CONFUSIONS {
            let from: Vec<char> = from.chars().collect();
            if chars[pos..].starts_with(&from) {
                let variant: String = chars[..pos]
                    .iter()
                    .copied()
                    .chain(to.chars())
                    .chain(chars[pos + from.len()..].iter().copied())
                    .collect();
                variants.push(variant);
            }
        }
    }

    variants
}

/// Singular form plus spelling variants, without duplicates or the term itself
pub fn variants(term: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    singularize(term)
        .into_iter()
        .chain(substitutions(term))
        .filter(|v| v != term && seen.insert(v.clone()))
        .collect()
}

/// Term shortened by one or two characters at either end
pub fn fragments(term: &str) -> Vec<String> {
    let chars: Vec<char> = term.chars().collect();
    let n = chars.len();
    let mut ranges = Vec::new();

    if n >= 4 {
        ranges.push(1..n);
        ranges.push(0..n - 1);
    }
    if n >= 5 {
        ranges.push(2..n);
        ranges.push(0..n - 2);
    }

    let mut seen = HashSet::new();
    ranges
        .into_iter()
        .map(|r| chars[r].iter().collect::<String>())
        .filter(|f| f.chars().count() >= 3 && seen.insert(f.clone()))
        .collect()
}

/// Words of `text` containing `fragment`, lowercased
fn words_containing(text: &str, fragment: &str) -> Vec<String> {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| word.contains(fragment))
        .collect()
}

/// Insertion-ordered, capped set that never holds an original term
struct SuggestionSet {
    items: Vec<String>,
    seen: HashSet<String>,
    cap: usize,
}

impl SuggestionSet {
    fn new(excluded: &[String], cap: usize) -> Self {
        Self {
            items: Vec::new(),
            seen: excluded.iter().cloned().collect(),
            cap,
        }
    }

    fn insert(&mut self, candidate: String) {
        if !self.is_full() && self.seen.insert(candidate.clone()) {
            self.items.push(candidate);
        }
    }

    fn extend(&mut self, candidates: impl IntoIterator<Item = String>) {
        for candidate in candidates {
            self.insert(candidate);
        }
    }

    fn is_full(&self) -> bool {
        self.items.len() >= self.cap
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}

/// Builds suggestions by probing the store
pub struct Suggester<S> {
    store: Arc<S>,
    options: SuggestOptions,
}

impl<S: SearchStore> Suggester<S> {
    pub fn new(store: Arc<S>, options: SuggestOptions) -> Self {
        Self { store, options }
    }

    /// Up to `max_suggestions` alternate terms, spelling variants first.
    ///
    /// Probe failures and timeouts only drop that probe's contribution.
    pub async fn suggest(&self, terms: &[String]) -> Vec<String> {
        if terms.is_empty() {
            return Vec::new();
        }

        let excluded: HashSet<&String> = terms.iter().collect();
        let mut seen = HashSet::new();
        let candidates: Vec<String> = terms
            .iter()
            .flat_map(|t| variants(t))
            .filter(|v| !excluded.contains(v) && seen.insert(v.clone()))
            .collect();

        let mut seen = HashSet::new();
        let shortened: Vec<String> = terms
            .iter()
            .flat_map(|t| fragments(t))
            .filter(|f| seen.insert(f.clone()))
            .collect();

        debug!(
            "Probing {} variants and {} fragments for {:?}",
            candidates.len(),
            shortened.len(),
            terms
        );

        let mut suggestions = SuggestionSet::new(terms, self.options.max_suggestions);
        let concurrency = self.options.probe_concurrency;

        // `buffered` yields in input order; stop pulling once the set is full.
        // Dropping a stream cancels its in-flight lookups.
        let mut found_variants = stream::iter(candidates)
            .map(|variant| self.probe_variant(variant))
            .buffered(concurrency);
        while !suggestions.is_full() {
            match found_variants.next().await {
                Some(found) => suggestions.extend(found),
                None => break,
            }
        }
        drop(found_variants);

        let mut found_words = stream::iter(shortened)
            .map(|fragment| self.probe_fragment(fragment))
            .buffered(concurrency);
        while !suggestions.is_full() {
            match found_words.next().await {
                Some(words) => suggestions.extend(words),
                None => break,
            }
        }

        suggestions.into_vec()
    }

    /// The variant itself when any recipe or food mentions it
    async fn probe_variant(&self, variant: String) -> Option<String> {
        let probe = async {
            let probe_terms = std::slice::from_ref(&variant);

            let recipes = self
                .store
                .find_recipes(&PROBE_FIELDS, probe_terms, Some(1))
                .await?;
            if !recipes.is_empty() {
                return Ok(true);
            }

            let foods = self.store.find_foods(probe_terms, Some(1)).await?;
            Ok::<_, Error>(!foods.is_empty())
        };

        match self.bounded(probe).await {
            Ok(true) => Some(variant),
            Ok(false) => None,
            Err(e) => {
                warn!("Variant probe {:?} failed: {}", variant, e.log_safe());
                None
            }
        }
    }

    /// Words from matching recipe and food names that contain the fragment
    async fn probe_fragment(&self, fragment: String) -> Vec<String> {
        let limit = Some(self.options.fragment_probe_limit);
        let probe = async {
            let probe_terms = std::slice::from_ref(&fragment);

            let recipes = self
                .store
                .find_recipes(&PROBE_FIELDS, probe_terms, limit)
                .await?;
            let foods = self.store.find_foods(probe_terms, limit).await?;

            let names = recipes
                .iter()
                .map(|r| r.name.as_str())
                .chain(foods.iter().map(|f| f.name.as_str()));
            Ok::<_, Error>(
                names
                    .flat_map(|name| words_containing(name, &fragment))
                    .collect::<Vec<_>>(),
            )
        };

        match self.bounded(probe).await {
            Ok(words) => words,
            Err(e) => {
                warn!("Fragment probe {:?} failed: {}", fragment, e.log_safe());
                Vec::new()
            }
        }
    }

    /// Run a probe under the per-probe timeout
    async fn bounded<T>(&self, probe: impl Future<Output = Result<T>>) -> Result<T> {
        let timeout = self.options.probe_timeout;
        tokio::time::timeout(timeout, probe)
            .await
            .map_err(|_| Error::Search(format!("probe timed out after {timeout:?}")))?
    }
}
