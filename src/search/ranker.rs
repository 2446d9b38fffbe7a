use crate::db::models::{Food, Recipe, RecipeField};
use crate::error::Result;
use crate::search::scoring::{
    match_score, weighted, INGREDIENT_FALLBACK_SCORE, INGREDIENT_WEIGHT, NAME_WEIGHT, TAG_WEIGHT,
};
use crate::search::store::SearchStore;
use crate::search::tokenizer::Query;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// A recipe with its cumulative score across signal passes
#[derive(Debug, Clone)]
pub struct ScoredRecipe {
    pub recipe: Recipe,
    pub score: u32,
}

/// Per-request score accumulator keyed by recipe id.
///
/// Keeps first-encounter order so the final stable sort breaks ties by the
/// order the store returned recipes in.
#[derive(Default)]
struct ScoreBoard {
    entries: Vec<ScoredRecipe>,
    positions: HashMap<i64, usize>,
}

impl ScoreBoard {
    fn add(&mut self, recipe: &Recipe, score: u32) {
        match self.positions.get(&recipe.id) {
            Some(&pos) => self.entries[pos].score += score,
            None => {
                self.positions.insert(recipe.id, self.entries.len());
                self.entries.push(ScoredRecipe {
                    recipe: recipe.clone(),
                    score,
                });
            }
        }
    }

    fn into_ranked(mut self) -> Vec<ScoredRecipe> {
        // sort_by is stable
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries
    }
}

/// Scores recipes by name, tags and ingredient matches
pub struct Ranker<S> {
    store: Arc<S>,
    max_results: usize,
}

impl<S: SearchStore> Ranker<S> {
    pub fn new(store: Arc<S>, max_results: usize) -> Self {
        Self { store, max_results }
    }

    /// Ranked recipes with their scores, best first
    pub async fn rank_scored(&self, query: &Query) -> Result<Vec<ScoredRecipe>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let (by_name, by_tags, by_ingredients) = tokio::try_join!(
            self.store
                .find_recipes(&[RecipeField::Name], &query.terms, None),
            self.store
                .find_recipes(&[RecipeField::Tags], &query.terms, None),
            self.ingredient_matches(query),
        )?;

        debug!(
            "Signal passes for {:?}: {} by name, {} by tags, {} by ingredients",
            query.joined,
            by_name.len(),
            by_tags.len(),
            by_ingredients.len()
        );

        let mut board = ScoreBoard::default();

        for recipe in &by_name {
            let score = match_score(&recipe.name, query);
            board.add(recipe, weighted(score as f64, NAME_WEIGHT));
        }

        for recipe in &by_tags {
            let score = match_score(&recipe.tags_text(), query);
            board.add(recipe, weighted(score as f64, TAG_WEIGHT));
        }

        for (recipe, score) in &by_ingredients {
            board.add(recipe, *score);
        }

        let mut ranked = board.into_ranked();
        ranked.truncate(self.max_results);
        Ok(ranked)
    }

    /// Ranked recipes, best first
    pub async fn rank(&self, query: &Query) -> Result<Vec<Recipe>> {
        let ranked = self.rank_scored(query).await?;
        Ok(ranked.into_iter().map(|s| s.recipe).collect())
    }

    /// Recipes using a matching food, each with its weighted ingredient score
    async fn ingredient_matches(&self, query: &Query) -> Result<Vec<(Recipe, u32)>> {
        let foods = self.store.find_foods(&query.terms, None).await?;
        if foods.is_empty() {
            return Ok(Vec::new());
        }

        let food_scores = food_scores(&foods, query);
        let food_ids: Vec<i64> = foods.iter().map(|f| f.id).collect();
        let recipes = self.store.recipes_with_foods(&food_ids).await?;

        let matched: HashSet<i64> = food_ids.into_iter().collect();
        Ok(recipes
            .into_iter()
            .filter_map(|recipe| {
                let score = ingredient_score(&recipe, &matched, &food_scores)?;
                Some((recipe, score))
            })
            .collect())
    }
}

fn food_scores(foods: &[Food], query: &Query) -> HashMap<i64, u32> {
    foods
        .iter()
        .map(|food| (food.id, match_score(&food.name, query)))
        .collect()
}

/// Weighted average score of the recipe's matched ingredients.
///
/// `None` when the recipe references none of the matched foods. Otherwise at
/// least the weighted fallback, so a food matched only through its tags still
/// counts as a signal.
fn ingredient_score(
    recipe: &Recipe,
    matched: &HashSet<i64>,
    food_scores: &HashMap<i64, u32>,
) -> Option<u32> {
    if !recipe.food_ids.iter().any(|id| matched.contains(id)) {
        return None;
    }

    let scores: Vec<u32> = recipe
        .food_ids
        .iter()
        .filter_map(|id| food_scores.get(id).copied())
        .collect();

    let average = if scores.is_empty() {
        INGREDIENT_FALLBACK_SCORE
    } else {
        scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64
    };

    let floor = weighted(INGREDIENT_FALLBACK_SCORE, INGREDIENT_WEIGHT);
    Some(weighted(average, INGREDIENT_WEIGHT).max(floor))
}
