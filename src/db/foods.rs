use crate::db::filter::AnyTermFilter;
use crate::db::{models::*, DbPool};
use crate::error::Result;
use chrono::Utc;
use tracing::warn;

fn into_foods(rows: Vec<DocumentRow>) -> Vec<Food> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            Food::try_from(row)
                .map_err(|e| warn!("Skipping malformed food {}: {}", id, e))
                .ok()
        })
        .collect()
}

/// Insert or replace a food document
pub async fn upsert_food(pool: &DbPool, food: &Food) -> Result<()> {
    let now = Utc::now();
    let data = serde_json::to_string(food)?;
    let search = food.search_text();

    sqlx::query(
        r#"
        INSERT INTO foods (id, data, name_lc, tags_lc, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            data = excluded.data,
            name_lc = excluded.name_lc,
            tags_lc = excluded.tags_lc,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(food.id)
    .bind(data)
    .bind(search.name)
    .bind(search.tags)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Foods whose name or tags contain any of `terms`, in id order
pub async fn find_foods(pool: &DbPool, terms: &[String], limit: Option<i64>) -> Result<Vec<Food>> {
    let filter = AnyTermFilter::new(&FOOD_COLUMNS, terms);
    if filter.is_empty() {
        return Ok(Vec::new());
    }

    let query_str = format!(
        "SELECT id, data FROM foods WHERE json_valid(data) AND {} ORDER BY id LIMIT ?",
        filter.clause()
    );

    let mut query = sqlx::query_as::<_, DocumentRow>(&query_str);
    for bind in filter.binds() {
        query = query.bind(bind);
    }
    let rows = query.bind(limit.unwrap_or(-1)).fetch_all(pool).await?;

    Ok(into_foods(rows))
}

/// Get foods by id; ids without a row are skipped
pub async fn get_foods_by_ids(pool: &DbPool, food_ids: &[i64]) -> Result<Vec<Food>> {
    if food_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; food_ids.len()].join(",");
    let query_str = format!("SELECT id, data FROM foods WHERE id IN ({placeholders}) ORDER BY id");

    let mut query = sqlx::query_as::<_, DocumentRow>(&query_str);
    for id in food_ids {
        query = query.bind(id);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(into_foods(rows))
}

/// Fill `name_lc`/`tags_lc` for rows stored without them.
///
/// Rows that fail to parse get empty search text so they are not retried.
pub async fn backfill_search_columns(pool: &DbPool) -> Result<usize> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        "SELECT id, data FROM foods WHERE name_lc IS NULL OR tags_lc IS NULL",
    )
    .fetch_all(pool)
    .await?;

    let count = rows.len();
    for row in rows {
        let id = row.id;
        let search = match Food::try_from(row) {
            Ok(food) => food.search_text(),
            Err(e) => {
                warn!("Malformed food {} has no search text: {}", id, e);
                SearchText::default()
            }
        };

        sqlx::query("UPDATE foods SET name_lc = ?, tags_lc = ? WHERE id = ?")
            .bind(search.name)
            .bind(search.tags)
            .bind(id)
            .execute(pool)
            .await?;
    }

    Ok(count)
}

/// Count total foods
pub async fn count_foods(pool: &DbPool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM foods")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}
