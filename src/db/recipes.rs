use crate::db::filter::AnyTermFilter;
use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;
use tracing::warn;

/// Convert rows into recipes, skipping documents that fail to parse
fn into_recipes(rows: Vec<DocumentRow>) -> Vec<Recipe> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            Recipe::try_from(row)
                .map_err(|e| warn!("Skipping malformed recipe {}: {}", id, e))
                .ok()
        })
        .collect()
}

/// Insert or replace a recipe document
pub async fn upsert_recipe(pool: &DbPool, recipe: &Recipe) -> Result<()> {
    let now = Utc::now();
    let data = serde_json::to_string(recipe)?;
    let search = recipe.search_text();

    sqlx::query(
        r#"
        INSERT INTO recipes (id, data, name_lc, tags_lc, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            data = excluded.data,
            name_lc = excluded.name_lc,
            tags_lc = excluded.tags_lc,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(recipe.id)
    .bind(data)
    .bind(search.name)
    .bind(search.tags)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get recipe by ID
pub async fn get_recipe(pool: &DbPool, recipe_id: i64) -> Result<Recipe> {
    let row = sqlx::query_as::<_, DocumentRow>("SELECT id, data FROM recipes WHERE id = ?")
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Recipe {recipe_id} not found")))?;

    let recipe = Recipe::try_from(row)?;
    Ok(recipe)
}

/// Recipes where any of `fields` contains any of `terms`, in id order
pub async fn find_recipes(
    pool: &DbPool,
    fields: &[RecipeField],
    terms: &[String],
    limit: Option<i64>,
) -> Result<Vec<Recipe>> {
    let columns: Vec<&str> = fields.iter().map(|f| f.column()).collect();
    let filter = AnyTermFilter::new(&columns, terms);
    if filter.is_empty() {
        return Ok(Vec::new());
    }

    let query_str = format!(
        "SELECT id, data FROM recipes WHERE json_valid(data) AND {} ORDER BY id LIMIT ?",
        filter.clause()
    );

    let mut query = sqlx::query_as::<_, DocumentRow>(&query_str);
    for bind in filter.binds() {
        query = query.bind(bind);
    }
    // SQLite treats a negative LIMIT as "no limit"
    let rows = query.bind(limit.unwrap_or(-1)).fetch_all(pool).await?;

    Ok(into_recipes(rows))
}

/// Recipes whose ingredient list references any of `food_ids`, in id order
pub async fn find_recipes_with_foods(pool: &DbPool, food_ids: &[i64]) -> Result<Vec<Recipe>> {
    if food_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; food_ids.len()].join(",");
    let query_str = format!(
        r#"
        SELECT id, data FROM recipes
        WHERE json_valid(data) AND EXISTS (
            SELECT 1 FROM json_each(recipes.data, '$.food_ids') f
            WHERE CAST(f.value AS INTEGER) IN ({placeholders})
        )
        ORDER BY id
        "#
    );

    let mut query = sqlx::query_as::<_, DocumentRow>(&query_str);
    for id in food_ids {
        query = query.bind(id);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(into_recipes(rows))
}

/// Random sample of recipes
pub async fn random_recipes(pool: &DbPool, limit: i64) -> Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        "SELECT id, data FROM recipes ORDER BY RANDOM() LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(into_recipes(rows))
}

/// Random recipes of the same course, excluding `recipe_id`
pub async fn related_recipes(
    pool: &DbPool,
    recipe_id: i64,
    course: &str,
    limit: i64,
) -> Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, data
        FROM recipes
        WHERE id != ?
          AND json_valid(data)
          AND json_extract(data, '$.course') = ?
        ORDER BY RANDOM()
        LIMIT ?
        "#,
    )
    .bind(recipe_id)
    .bind(course)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(into_recipes(rows))
}

/// Fill `name_lc`/`tags_lc` for rows stored without them.
///
/// Rows that fail to parse get empty search text so they are not retried.
pub async fn backfill_search_columns(pool: &DbPool) -> Result<usize> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        "SELECT id, data FROM recipes WHERE name_lc IS NULL OR tags_lc IS NULL",
    )
    .fetch_all(pool)
    .await?;

    let count = rows.len();
    for row in rows {
        let id = row.id;
        let search = match Recipe::try_from(row) {
            Ok(recipe) => recipe.search_text(),
            Err(e) => {
                warn!("Malformed recipe {} has no search text: {}", id, e);
                SearchText::default()
            }
        };

        sqlx::query("UPDATE recipes SET name_lc = ?, tags_lc = ? WHERE id = ?")
            .bind(search.name)
            .bind(search.tags)
            .bind(id)
            .execute(pool)
            .await?;
    }

    Ok(count)
}

/// Count all recipes
pub async fn count_all_recipes(pool: &DbPool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_pool, run_migrations};

    fn recipe(id: i64, name: &str, course: &str, tags: &[&str], food_ids: &[i64]) -> Recipe {
        Recipe {
            id,
            name: name.to_string(),
            link: Some(format!("https://youtu.be/{id}")),
            course: Some(course.to_string()),
            difficulty: 1,
            cover: Some(format!("recipe-{id}.jpg")),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            lang: "es".to_string(),
            food_ids: food_ids.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_recipe_upsert_and_get() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let mut soup = recipe(1, "Sopa de verduras", "sopas", &["sopa"], &[10]);
        upsert_recipe(&pool, &soup).await.unwrap();

        soup.name = "Sopa de verduras frescas".to_string();
        upsert_recipe(&pool, &soup).await.unwrap();

        let retrieved = get_recipe(&pool, 1).await.unwrap();
        assert_eq!(retrieved, soup);
        assert_eq!(count_all_recipes(&pool).await.unwrap(), 1);

        let missing = get_recipe(&pool, 2).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_recipes_by_field() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        upsert_recipe(&pool, &recipe(1, "Pollo al horno", "fuertes", &["horno"], &[]))
            .await
            .unwrap();
        upsert_recipe(&pool, &recipe(2, "Arroz con coco", "fuertes", &["pollo"], &[]))
            .await
            .unwrap();

        let terms = vec!["POLLO".to_string()];
        let by_name = find_recipes(&pool, &[RecipeField::Name], &terms, None)
            .await
            .unwrap();
        assert_eq!(by_name.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);

        let by_tags = find_recipes(&pool, &[RecipeField::Tags], &terms, None)
            .await
            .unwrap();
        assert_eq!(by_tags.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);

        let either = find_recipes(
            &pool,
            &[RecipeField::Name, RecipeField::Tags],
            &terms,
            Some(1),
        )
        .await
        .unwrap();
        assert_eq!(either.len(), 1);
        assert_eq!(either[0].id, 1);
    }

    #[tokio::test]
    async fn test_find_recipes_with_foods() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        upsert_recipe(&pool, &recipe(1, "Ajiaco", "sopas", &[], &[10, 11]))
            .await
            .unwrap();
        upsert_recipe(&pool, &recipe(2, "Ensalada", "entradas", &[], &[12]))
            .await
            .unwrap();

        let found = find_recipes_with_foods(&pool, &[11, 99]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ajiaco");

        assert!(find_recipes_with_foods(&pool, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_related_recipes_share_course() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        for (id, course) in [(1, "postres"), (2, "postres"), (3, "sopas")] {
            upsert_recipe(&pool, &recipe(id, "Receta", course, &[], &[]))
                .await
                .unwrap();
        }

        let related = related_recipes(&pool, 1, "postres", 5).await.unwrap();
        assert_eq!(related.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);

        let random = random_recipes(&pool, 2).await.unwrap();
        assert_eq!(random.len(), 2);
    }

    #[tokio::test]
    async fn test_search_columns_fold_unicode() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        upsert_recipe(&pool, &recipe(1, "Ñoquis de papa", "pastas", &["ÁRBOL"], &[]))
            .await
            .unwrap();

        let terms = vec!["ñoquis".to_string()];
        let by_name = find_recipes(&pool, &[RecipeField::Name], &terms, None)
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);

        let terms = vec!["ÁRBOL".to_string()];
        let by_tags = find_recipes(&pool, &[RecipeField::Tags], &terms, None)
            .await
            .unwrap();
        assert_eq!(by_tags.len(), 1);
    }

    #[tokio::test]
    async fn test_tags_match_values_not_json_syntax() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        upsert_recipe(&pool, &recipe(1, "Pollo al horno", "fuertes", &["pollo", "horno"], &[]))
            .await
            .unwrap();
        upsert_recipe(&pool, &recipe(2, "Flan", "postres", &[], &[]))
            .await
            .unwrap();

        for term in ["\"pollo\"", "[", "]", "\",\"", "\""] {
            let terms = vec![term.to_string()];
            let found = find_recipes(&pool, &[RecipeField::Name, RecipeField::Tags], &terms, None)
                .await
                .unwrap();
            assert!(found.is_empty(), "{term:?} matched {found:?}");
        }

        // Tags are stored comma joined, so a separator-spanning term still matches
        let terms = vec!["o,h".to_string()];
        let found = find_recipes(&pool, &[RecipeField::Tags], &terms, None)
            .await
            .unwrap();
        assert_eq!(found.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn test_backfill_rows_without_search_text() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        sqlx::query(
            r#"INSERT INTO recipes (id, data) VALUES (5, '{"name": "Ñame asado", "tags": "Raíz, Asado"}')"#,
        )
        .execute(&pool)
        .await
        .unwrap();

        assert_eq!(backfill_search_columns(&pool).await.unwrap(), 1);
        assert_eq!(backfill_search_columns(&pool).await.unwrap(), 0);

        let terms = vec!["ñame".to_string()];
        let found = find_recipes(&pool, &[RecipeField::Name], &terms, None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let terms = vec!["raíz".to_string()];
        let found = find_recipes(&pool, &[RecipeField::Tags], &terms, None)
            .await
            .unwrap();
        assert_eq!(found[0].tags, vec!["raíz", "asado"]);
    }

    #[tokio::test]
    async fn test_malformed_rows_are_skipped() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        sqlx::query(r#"INSERT INTO recipes (id, data) VALUES (3, '{"name": "Pollo", "link": 7}')"#)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            r#"INSERT INTO recipes (id, data, name_lc, tags_lc) VALUES (4, '{"name": "Pollo frito", "link": 7}', 'pollo frito', '')"#,
        )
        .execute(&pool)
        .await
        .unwrap();
        upsert_recipe(&pool, &recipe(2, "Pollo guisado", "fuertes", &[], &[]))
            .await
            .unwrap();

        let terms = vec!["o".to_string()];
        let found = find_recipes(&pool, &[RecipeField::Name], &terms, None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }
}
