use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::record::NutritionSource;
use crate::portions::calculator::Macros;
use crate::portions::editor::PortionSpec;

#[derive(Debug, FromRow)]
pub struct HistoryRow {
    pub id: Uuid,
    pub created_at: OffsetDateTime,
    pub food_label: String,
    pub display_name: String,
    pub grams: f64,
    pub servings: f64,
    pub calories: i64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub nutrition_source: String,
    pub thumbnail_key: Option<String>,
    pub confidence: f64,
}

/// One saved meal. Written once; only ever read or deleted afterwards.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryEntry {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub food_label: String,
    pub display_name: String,
    pub portion: PortionSpec,
    pub calories: i64,
    pub macros: Macros,
    pub nutrition_source: NutritionSource,
    #[serde(skip_serializing)]
    pub thumbnail_key: Option<String>,
    /// Classifier confidence in `0.0..=1.0`.
    pub confidence: f64,
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = anyhow::Error;

    fn try_from(r: HistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            created_at: r.created_at,
            food_label: r.food_label,
            display_name: r.display_name,
            portion: PortionSpec {
                grams: r.grams,
                servings: r.servings,
            },
            calories: r.calories,
            macros: Macros {
                protein: r.protein_g,
                carbs: r.carbs_g,
                fat: r.fat_g,
            },
            nutrition_source: r.nutrition_source.parse()?,
            thumbnail_key: r.thumbnail_key,
            confidence: r.confidence,
        })
    }
}

impl HistoryEntry {
    pub fn matches_name(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        self.food_label.to_lowercase().contains(&q) || self.display_name.to_lowercase().contains(&q)
    }
}
