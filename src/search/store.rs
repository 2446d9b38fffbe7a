use crate::db::{self, models::*, DbPool};
use crate::error::Result;
use std::future::Future;

/// Read-only lookups the ranker and suggestion passes run against.
///
/// All matching is case-insensitive substring matching and results come back
/// in store order (ascending id).
pub trait SearchStore: Send + Sync {
    /// Recipes where any of `fields` contains any of `terms`
    fn find_recipes(
        &self,
        fields: &[RecipeField],
        terms: &[String],
        limit: Option<i64>,
    ) -> impl Future<Output = Result<Vec<Recipe>>> + Send;

    /// Foods whose name or tags contain any of `terms`
    fn find_foods(
        &self,
        terms: &[String],
        limit: Option<i64>,
    ) -> impl Future<Output = Result<Vec<Food>>> + Send;

    /// Recipes referencing any of `food_ids` as an ingredient
    fn recipes_with_foods(&self, food_ids: &[i64])
        -> impl Future<Output = Result<Vec<Recipe>>> + Send;
}

/// `SearchStore` backed by the SQLite pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl SearchStore for SqliteStore {
    async fn find_recipes(
        &self,
        fields: &[RecipeField],
        terms: &[String],
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>> {
        db::recipes::find_recipes(&self.pool, fields, terms, limit).await
    }

    async fn find_foods(&self, terms: &[String], limit: Option<i64>) -> Result<Vec<Food>> {
        db::foods::find_foods(&self.pool, terms, limit).await
    }

    async fn recipes_with_foods(&self, food_ids: &[i64]) -> Result<Vec<Recipe>> {
        db::recipes::find_recipes_with_foods(&self.pool, food_ids).await
    }
}
