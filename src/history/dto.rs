use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::HistoryEntry;
use crate::nutrition::record::NutritionSource;
use crate::portions::calculator::Macros;
use crate::portions::dto::PortionInput;
use crate::portions::editor::PortionSpec;

#[derive(Debug, Deserialize)]
pub struct CreateHistoryRequest {
    pub food: String,
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub portion: PortionInput,
    pub confidence: f64,
    pub thumbnail_b64: Option<String>,
    pub content_type: Option<String>, // default image/jpeg
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub food_label: String,
    pub display_name: String,
    pub portion: PortionSpec,
    pub calories: i64,
    pub macros: Macros,
    pub nutrition_source: NutritionSource,
    pub confidence: f64,
    pub thumbnail_url: Option<String>,
}

impl From<HistoryEntry> for HistoryItem {
    fn from(e: HistoryEntry) -> Self {
        let thumbnail_url = e
            .thumbnail_key
            .as_ref()
            .map(|_| format!("/api/v1/history/{}/thumbnail", e.id));
        Self {
            id: e.id,
            created_at: e.created_at,
            food_label: e.food_label,
            display_name: e.display_name,
            portion: e.portion,
            calories: e.calories,
            macros: e.macros,
            nutrition_source: e.nutrition_source,
            confidence: e.confidence,
            thumbnail_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub deleted: usize,
}
