use crate::api::models::SearchResponse;
use crate::db::{self, models::ImportDocument, DbPool};
use crate::{Error, Result};
use reqwest::Client;
use std::path::Path;
use tracing::{info, warn};

/// Run a search against the server's search endpoint
pub async fn fetch_search(server_url: &str, query: &str) -> Result<SearchResponse> {
    let url = format!(
        "{}/api/recipes/search?s={}",
        server_url.trim_end_matches('/'),
        urlencoding::encode(query)
    );

    let response = Client::new().get(&url).send().await?.error_for_status()?;
    Ok(response.json().await?)
}

/// Search for recipes and print the results
pub async fn search(server_url: &str, query: &str) -> Result<()> {
    let results = fetch_search(server_url, query).await?;
    print_search_results(&results);
    Ok(())
}

fn print_search_results(results: &SearchResponse) {
    if let Some(error) = &results.error {
        println!("{error}");
        return;
    }

    if results.data.is_empty() {
        let term = results.search_term.as_deref().unwrap_or_default();
        println!("No recipes found for \"{term}\"");

        if let Some(suggestions) = results.suggestions.as_ref().filter(|s| !s.is_empty()) {
            println!("Did you mean: {}", suggestions.join(", "));
        }
        return;
    }

    println!("\nFound {} recipes:\n", results.data.len());
    println!("{:<6} {:<50} {:<20}", "ID", "Name", "Tags");
    println!("{}", "-".repeat(76));

    for recipe in &results.data {
        let tags = recipe.tags.join(", ");

        println!(
            "{:<6} {:<50} {:<20}",
            recipe.id,
            truncate(&recipe.name, 48),
            truncate(&tags, 18)
        );
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

/// Upsert the foods and recipes of a JSON export.
///
/// Records that do not normalize are skipped. Returns the number of foods and
/// recipes written.
pub async fn import(pool: &DbPool, path: &Path) -> Result<(usize, usize)> {
    let raw = tokio::fs::read_to_string(path).await?;
    let document: ImportDocument = serde_json::from_str(&raw)
        .map_err(|e| Error::Validation(format!("Invalid import file {}: {e}", path.display())))?;

    let mut foods = 0;
    for record in document.foods {
        let id = record.id;
        match record.into_food() {
            Ok(food) => {
                db::foods::upsert_food(pool, &food).await?;
                foods += 1;
            }
            Err(e) => warn!("Skipping food {}: {}", id, e),
        }
    }

    let mut recipes = 0;
    for record in document.recipes {
        let id = record.id;
        match record.into_recipe() {
            Ok(recipe) => {
                db::recipes::upsert_recipe(pool, &recipe).await?;
                recipes += 1;
            }
            Err(e) => warn!("Skipping recipe {}: {}", id, e),
        }
    }

    info!(
        "Imported {} foods and {} recipes from {}",
        foods,
        recipes,
        path.display()
    );
    Ok((foods, recipes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_pool, run_migrations};
    use std::io::Write;

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("Piña", 10), "Piña");
        assert_eq!(truncate("Piña colada con mañanitas", 10), "Piña co...");
    }

    #[tokio::test]
    async fn test_import_upserts_and_skips_bad_records() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "foods": [
                    {{"id": 1, "name": "Tomate", "tags": "verdura, roja"}},
                    {{"id": 2, "name": 42}}
                ],
                "recipes": [
                    {{"id": 10, "name": "Salsa", "food_ids": ["1"], "difficulty": "2"}}
                ]
            }}"#
        )
        .unwrap();

        let (foods, recipes) = import(&pool, file.path()).await.unwrap();
        assert_eq!((foods, recipes), (1, 1));

        let recipe = db::recipes::get_recipe(&pool, 10).await.unwrap();
        assert_eq!(recipe.food_ids, vec![1]);
        assert_eq!(recipe.difficulty, 2);

        // Re-importing replaces rows by id
        let (foods, _) = import(&pool, file.path()).await.unwrap();
        assert_eq!(foods, 1);
        assert_eq!(db::foods::count_foods(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_json() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            import(&pool, file.path()).await,
            Err(Error::Validation(_))
        ));
    }
}
