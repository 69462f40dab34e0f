use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{HistoryEntry, HistoryRow};
use super::store::HistoryStore;

const COLUMNS: &str = "id, created_at, food_label, display_name, grams, servings, calories, \
                       protein_g, carbs_g, fat_g, nutrition_source, thumbnail_key, confidence";

/// History kept in Postgres (`history_entries`, see `migrations/`).
#[derive(Clone)]
pub struct PgHistoryStore {
    db: PgPool,
}

impl PgHistoryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_entries(rows: Vec<HistoryRow>) -> anyhow::Result<Vec<HistoryEntry>> {
    rows.into_iter().map(HistoryEntry::try_from).collect()
}

/// Escapes LIKE wildcards so the query is matched literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn put(&self, e: &HistoryEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO history_entries
                (id, created_at, food_label, display_name, grams, servings, calories,
                 protein_g, carbs_g, fat_g, nutrition_source, thumbnail_key, confidence)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(e.id)
        .bind(e.created_at)
        .bind(&e.food_label)
        .bind(&e.display_name)
        .bind(e.portion.grams)
        .bind(e.portion.servings)
        .bind(e.calories)
        .bind(e.macros.protein)
        .bind(e.macros.carbs)
        .bind(e.macros.fat)
        .bind(e.nutrition_source.as_str())
        .bind(e.thumbnail_key.as_deref())
        .bind(e.confidence)
        .execute(&self.db)
        .await
        .context("insert history entry")?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<HistoryEntry>> {
        let row = sqlx::query_as::<_, HistoryRow>(&format!(
            "SELECT {COLUMNS} FROM history_entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get history entry")?;
        row.map(HistoryEntry::try_from).transpose()
    }

    async fn list_recent(&self) -> anyhow::Result<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(&format!(
            "SELECT {COLUMNS} FROM history_entries ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list history")?;
        into_entries(rows)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<HistoryEntry>> {
        let row = sqlx::query_as::<_, HistoryRow>(&format!(
            "DELETE FROM history_entries WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("delete history entry")?;
        row.map(HistoryEntry::try_from).transpose()
    }

    async fn clear(&self) -> anyhow::Result<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(&format!(
            "DELETE FROM history_entries RETURNING {COLUMNS}"
        ))
        .fetch_all(&self.db)
        .await
        .context("clear history")?;
        into_entries(rows)
    }

    async fn search_by_name(&self, query: &str) -> anyhow::Result<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(&format!(
            r#"
            SELECT {COLUMNS}
              FROM history_entries
             WHERE food_label ILIKE $1 ESCAPE '\'
                OR display_name ILIKE $1 ESCAPE '\'
             ORDER BY created_at DESC
            "#
        ))
        .bind(like_pattern(query))
        .fetch_all(&self.db)
        .await
        .context("search history")?;
        into_entries(rows)
    }
}
