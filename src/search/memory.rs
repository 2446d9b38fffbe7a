//! In-memory `SearchStore` for exercising the ranking and suggestion passes

use crate::db::models::{Food, Recipe, RecipeField};
use crate::error::{Error, Result};
use crate::search::store::SearchStore;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct MemoryStore {
    recipes: Vec<Recipe>,
    foods: Vec<Food>,
    /// Every lookup fails
    unavailable: bool,
    /// Lookups for these terms fail
    failing_terms: HashSet<String>,
    /// Lookups for these terms stall past any reasonable timeout
    slow_terms: HashSet<String>,
    calls: AtomicUsize,
    looked_up: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new(recipes: Vec<Recipe>, foods: Vec<Food>) -> Self {
        Self {
            recipes,
            foods,
            ..Default::default()
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn failing_on(mut self, term: &str) -> Self {
        self.failing_terms.insert(term.to_string());
        self
    }

    pub fn slow_on(mut self, term: &str) -> Self {
        self.slow_terms.insert(term.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every term looked up so far, in call order
    pub fn looked_up_terms(&self) -> Vec<String> {
        self.looked_up.lock().map(|t| t.clone()).unwrap_or_default()
    }

    async fn check(&self, terms: &[String]) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut looked_up) = self.looked_up.lock() {
            looked_up.extend(terms.iter().cloned());
        }

        if self.unavailable || terms.iter().any(|t| self.failing_terms.contains(t)) {
            return Err(Error::Internal("store unavailable".to_string()));
        }
        if terms.iter().any(|t| self.slow_terms.contains(t)) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        Ok(())
    }
}

/// Same folding as the SQLite store: both sides lowercased in Rust
fn contains_any(text: &str, terms: &[String]) -> bool {
    let text = text.to_lowercase();
    terms.iter().any(|t| text.contains(&t.to_lowercase()))
}

fn apply_limit<T>(items: Vec<T>, limit: Option<i64>) -> Vec<T> {
    match limit {
        Some(n) if n >= 0 => items.into_iter().take(n as usize).collect(),
        _ => items,
    }
}

impl SearchStore for MemoryStore {
    async fn find_recipes(
        &self,
        fields: &[RecipeField],
        terms: &[String],
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>> {
        self.check(terms).await?;

        let found = self
            .recipes
            .iter()
            .filter(|r| {
                fields.iter().any(|field| match field {
                    RecipeField::Name => contains_any(&r.name, terms),
                    RecipeField::Tags => contains_any(&r.tags_text(), terms),
                })
            })
            .cloned()
            .collect();

        Ok(apply_limit(found, limit))
    }

    async fn find_foods(&self, terms: &[String], limit: Option<i64>) -> Result<Vec<Food>> {
        self.check(terms).await?;

        let found = self
            .foods
            .iter()
            .filter(|f| contains_any(&f.name, terms) || contains_any(&f.tags.join(","), terms))
            .cloned()
            .collect();

        Ok(apply_limit(found, limit))
    }

    async fn recipes_with_foods(&self, food_ids: &[i64]) -> Result<Vec<Recipe>> {
        self.check(&[]).await?;

        Ok(self
            .recipes
            .iter()
            .filter(|r| r.food_ids.iter().any(|id| food_ids.contains(id)))
            .cloned()
            .collect())
    }
}

pub fn recipe(id: i64, name: &str, tags: &[&str], food_ids: &[i64]) -> Recipe {
    Recipe {
        id,
        name: name.to_string(),
        link: None,
        course: None,
        difficulty: 1,
        cover: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        lang: "es".to_string(),
        food_ids: food_ids.to_vec(),
    }
}

pub fn food(id: i64, name: &str, tags: &[&str]) -> Food {
    Food {
        id,
        name: name.to_string(),
        image: None,
        lang: "es".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}
