use crate::db::models::{Food, Recipe};
use crate::search::SearchOutcome;
use crate::utils::resolve_image_url;
use serde::{Deserialize, Serialize};

/// Search request parameters
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub s: String,
}

/// Search response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<Recipe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(
        rename = "searchTerm",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub search_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        let empty = Self {
            data: Vec::new(),
            suggestions: None,
            search_term: None,
            error: None,
        };

        match outcome {
            SearchOutcome::Empty => Self {
                error: Some("Search is empty".to_string()),
                ..empty
            },
            SearchOutcome::Found(data) => Self { data, ..empty },
            SearchOutcome::NotFound {
                suggestions,
                search_term,
            } => Self {
                suggestions: Some(suggestions),
                search_term: Some(search_term),
                ..empty
            },
        }
    }
}

/// Random recipes query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct RandomParams {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Base URLs clients prefix relative media paths with
#[derive(Debug, Clone, Serialize)]
pub struct Bases {
    pub images: String,
}

/// Envelope shared by the read endpoints
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct RandomRecipes {
    pub bases: Bases,
    #[serde(rename = "randomRecipes")]
    pub random_recipes: Vec<RecipeCard>,
}

/// Recipe card for listings
#[derive(Debug, Clone, Serialize)]
pub struct RecipeCard {
    pub id: i64,
    pub name: String,
    pub cover: Option<String>,
    pub cover_url: Option<String>,
}

impl RecipeCard {
    pub fn new(recipe: Recipe, images_base: &str) -> Self {
        let cover_url = recipe
            .cover
            .as_deref()
            .and_then(|cover| resolve_image_url(cover, images_base));
        Self {
            id: recipe.id,
            name: recipe.name,
            cover: recipe.cover,
            cover_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetailData {
    pub bases: Bases,
    pub recipe: RecipeDetail,
}

/// Full recipe details
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub name: String,
    pub link: Option<String>,
    pub course: Option<String>,
    pub cover: Option<String>,
    pub cover_url: Option<String>,
    pub ingredients: Vec<IngredientDetail>,
    pub related: Vec<RelatedRecipe>,
}

/// Ingredient with its image
#[derive(Debug, Clone, Serialize)]
pub struct IngredientDetail {
    pub name: String,
    pub image: Option<String>,
    pub image_url: Option<String>,
}

impl IngredientDetail {
    pub fn new(food: Food, images_base: &str) -> Self {
        let image_url = food
            .image
            .as_deref()
            .and_then(|image| resolve_image_url(image, images_base));
        Self {
            name: food.name,
            image: food.image,
            image_url,
        }
    }
}

/// Another recipe of the same course
#[derive(Debug, Clone, Serialize)]
pub struct RelatedRecipe {
    pub id: i64,
    pub name: String,
    pub cover: Option<String>,
    pub kind: Option<String>,
}

impl From<Recipe> for RelatedRecipe {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            cover: recipe.cover,
            kind: recipe.course,
        }
    }
}

/// System statistics
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_recipes: i64,
    pub total_foods: i64,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: String,
}
