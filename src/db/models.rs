use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Raw `(id, data)` row shared by the `recipes` and `foods` tables
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: i64,
    pub data: String,
}

/// Searchable recipe fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeField {
    Name,
    Tags,
}

impl RecipeField {
    /// Lowercased search column holding the field
    pub fn column(self) -> &'static str {
        match self {
            RecipeField::Name => "name_lc",
            RecipeField::Tags => "tags_lc",
        }
    }
}

/// Columns matched when looking foods up by term: the name and the tag list
pub const FOOD_COLUMNS: [&str; 2] = ["name_lc", "tags_lc"];

/// Lowercased name and comma joined tags, as stored in `name_lc`/`tags_lc`.
///
/// Folding happens here rather than in SQL, where `lower()` only handles ASCII.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchText {
    pub name: String,
    pub tags: String,
}

impl SearchText {
    fn new(name: &str, tags: &[String]) -> Self {
        Self {
            name: name.to_lowercase(),
            tags: tags.join(",").to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub link: Option<String>,
    pub course: Option<String>,
    pub difficulty: i64,
    pub cover: Option<String>,
    pub tags: Vec<String>,
    pub lang: String,
    pub food_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub lang: String,
    pub tags: Vec<String>,
}

/// Stored recipe document as written by the content tools.
///
/// `tags` shows up as a comma separated string in older rows and as a list in
/// newer ones; `food_ids` and `difficulty` may hold numbers or numeric strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecipe {
    name: Option<String>,
    link: Option<String>,
    course: Option<String>,
    difficulty: Option<Value>,
    cover: Option<String>,
    tags: Option<Value>,
    lang: Option<String>,
    food_ids: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFood {
    name: Option<String>,
    image: Option<String>,
    lang: Option<String>,
    tags: Option<Value>,
}

const DEFAULT_LANG: &str = "es";
const DEFAULT_DIFFICULTY: i64 = 1;

impl Recipe {
    /// Build a recipe from its JSON document, normalizing loosely typed fields
    pub fn from_document(id: i64, data: Value) -> serde_json::Result<Self> {
        let raw: RawRecipe = serde_json::from_value(data)?;

        Ok(Recipe {
            id,
            name: raw.name.unwrap_or_default(),
            link: raw.link,
            course: raw.course,
            difficulty: raw
                .difficulty
                .as_ref()
                .and_then(value_as_i64)
                .unwrap_or(DEFAULT_DIFFICULTY),
            cover: raw.cover,
            tags: raw.tags.as_ref().map(normalize_tags).unwrap_or_default(),
            lang: raw.lang.unwrap_or_else(|| DEFAULT_LANG.to_string()),
            food_ids: raw.food_ids.as_ref().map(normalize_ids).unwrap_or_default(),
        })
    }

    /// Tags rendered as the single comma separated text used for scoring
    pub fn tags_text(&self) -> String {
        self.tags.join(",")
    }

    pub fn search_text(&self) -> SearchText {
        SearchText::new(&self.name, &self.tags)
    }
}

impl Food {
    pub fn from_document(id: i64, data: Value) -> serde_json::Result<Self> {
        let raw: RawFood = serde_json::from_value(data)?;

        Ok(Food {
            id,
            name: raw.name.unwrap_or_default(),
            image: raw.image,
            lang: raw.lang.unwrap_or_else(|| DEFAULT_LANG.to_string()),
            tags: raw.tags.as_ref().map(normalize_tags).unwrap_or_default(),
        })
    }

    pub fn search_text(&self) -> SearchText {
        SearchText::new(&self.name, &self.tags)
    }
}

impl TryFrom<DocumentRow> for Recipe {
    type Error = serde_json::Error;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Recipe::from_document(row.id, serde_json::from_str(&row.data)?)
    }
}

impl TryFrom<DocumentRow> for Food {
    type Error = serde_json::Error;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Food::from_document(row.id, serde_json::from_str(&row.data)?)
    }
}

/// Normalize a tag field into trimmed, lowercase, non-empty strings
pub fn normalize_tags(value: &Value) -> Vec<String> {
    let clean = |s: &str| {
        let tag = s.trim().to_lowercase();
        (!tag.is_empty()).then_some(tag)
    };

    match value {
        Value::String(s) => s.split(',').filter_map(clean).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .filter_map(clean)
            .collect(),
        _ => Vec::new(),
    }
}

/// Normalize an id list, dropping entries that are not integers
pub fn normalize_ids(value: &Value) -> Vec<i64> {
    match value {
        Value::Array(items) => items.iter().filter_map(value_as_i64).collect(),
        _ => Vec::new(),
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Recipe or food entry of an import document: an `id` plus the stored fields
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRecord {
    pub id: i64,
    #[serde(flatten)]
    pub data: serde_json::Map<String, Value>,
}

impl ImportRecord {
    pub fn into_recipe(self) -> serde_json::Result<Recipe> {
        Recipe::from_document(self.id, Value::Object(self.data))
    }

    pub fn into_food(self) -> serde_json::Result<Food> {
        Food::from_document(self.id, Value::Object(self.data))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportDocument {
    pub foods: Vec<ImportRecord>,
    pub recipes: Vec<ImportRecord>,
}
