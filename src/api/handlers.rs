use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::{
    api::models::*,
    config::Settings,
    db::{self, DbPool},
    search::{SearchEngine, SqliteStore},
    utils::resolve_image_url,
    Result,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub engine: Arc<SearchEngine<SqliteStore>>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(pool: DbPool, settings: Settings) -> Self {
        let store = Arc::new(SqliteStore::new(pool.clone()));
        let engine = Arc::new(SearchEngine::new(store, &settings.search));
        Self {
            pool,
            engine,
            settings,
        }
    }

    fn bases(&self) -> Bases {
        Bases {
            images: self.settings.media.images_base_url.clone(),
        }
    }
}

/// GET /api/recipes/search - Search recipes
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    debug!("Search request: {:?}", params);

    let outcome = state.engine.search(&params.s).await?;
    Ok(Json(SearchResponse::from(outcome)))
}

/// GET /api/recipes/random - Random recipe cards
pub async fn random_recipes(
    State(state): State<AppState>,
    Query(params): Query<RandomParams>,
) -> Result<Json<DataResponse<RandomRecipes>>> {
    debug!("Random recipes request: {:?}", params);

    let pagination = &state.settings.pagination;
    let limit = params
        .limit
        .unwrap_or(pagination.random_default_limit)
        .min(pagination.random_max_limit)
        .max(1);

    let images = &state.settings.media.images_base_url;
    let random_recipes = db::recipes::random_recipes(&state.pool, limit)
        .await?
        .into_iter()
        .map(|recipe| RecipeCard::new(recipe, images))
        .collect();

    Ok(Json(DataResponse {
        data: RandomRecipes {
            bases: state.bases(),
            random_recipes,
        },
    }))
}

/// GET /api/recipes/:id - Get recipe details
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DataResponse<RecipeDetailData>>> {
    debug!("Get recipe request: {}", id);

    let recipe = db::recipes::get_recipe(&state.pool, id).await?;
    let images = &state.settings.media.images_base_url;

    let ingredients = db::foods::get_foods_by_ids(&state.pool, &recipe.food_ids)
        .await?
        .into_iter()
        .map(|food| IngredientDetail::new(food, images))
        .collect();

    let related = match recipe.course.as_deref() {
        Some(course) => db::recipes::related_recipes(
            &state.pool,
            recipe.id,
            course,
            state.settings.pagination.related_limit,
        )
        .await?
        .into_iter()
        .map(RelatedRecipe::from)
        .collect(),
        None => Vec::new(),
    };

    let cover_url = recipe
        .cover
        .as_deref()
        .and_then(|cover| resolve_image_url(cover, images));

    Ok(Json(DataResponse {
        data: RecipeDetailData {
            bases: state.bases(),
            recipe: RecipeDetail {
                id: recipe.id,
                name: recipe.name,
                link: recipe.link,
                course: recipe.course,
                cover: recipe.cover,
                cover_url,
                ingredients,
                related,
            },
        },
    }))
}

/// GET /api/stats - Get catalog statistics
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>> {
    debug!("Get stats request");

    let total_recipes = db::recipes::count_all_recipes(&state.pool).await?;
    let total_foods = db::foods::count_foods(&state.pool).await?;

    Ok(Json(Stats {
        total_recipes,
        total_foods,
    }))
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// GET /ready - Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<ReadinessResponse>> {
    let db_healthy = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();

    Ok(Json(ReadinessResponse {
        ready: db_healthy,
        database: if db_healthy { "ok" } else { "error" }.to_string(),
    }))
}
