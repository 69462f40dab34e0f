use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::record::{NutritionRecord, NutritionSource};
use crate::config::{CalorieNinjasConfig, NutritionixConfig};
use crate::portions::calculator::round1;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider credentials are not configured")]
    Unavailable,
    #[error("provider call failed: {0}")]
    CallFailed(String),
    #[error("provider returned no match")]
    NoMatch,
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::CallFailed(e.to_string())
    }
}

#[async_trait]
pub trait NutritionProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn tier(&self) -> NutritionSource;
    async fn lookup(&self, food: &str) -> Result<NutritionRecord, ProviderError>;
}

// --- primary: Nutritionix natural-language nutrients ---

#[derive(Debug, Serialize)]
struct NutritionixRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct NutritionixResponse {
    #[serde(default)]
    foods: Vec<NutritionixFood>,
}

#[derive(Debug, Deserialize)]
struct NutritionixFood {
    nf_calories: Option<f64>,
    nf_protein: Option<f64>,
    nf_total_carbohydrate: Option<f64>,
    nf_total_fat: Option<f64>,
    serving_weight_grams: Option<f64>,
}

pub struct NutritionixProvider {
    http: reqwest::Client,
    config: Option<NutritionixConfig>,
}

impl NutritionixProvider {
    pub fn new(http: reqwest::Client, config: Option<NutritionixConfig>) -> Self {
        Self { http, config }
    }
}

/// Calories are scaled to 100 g by serving weight; macros are taken as reported.
fn normalize_nutritionix(food: &NutritionixFood) -> Result<NutritionRecord, ProviderError> {
    let weight = food
        .serving_weight_grams
        .filter(|w| w.is_finite() && *w > 0.0)
        .ok_or_else(|| ProviderError::CallFailed("missing serving_weight_grams".into()))?;
    let kcal = food.nf_calories.unwrap_or(0.0) / (weight / 100.0);
    Ok(NutritionRecord::new(
        kcal.round(),
        round1(food.nf_protein.unwrap_or(0.0)),
        round1(food.nf_total_carbohydrate.unwrap_or(0.0)),
        round1(food.nf_total_fat.unwrap_or(0.0)),
        NutritionSource::PrimaryProvider,
    ))
}

#[async_trait]
impl NutritionProvider for NutritionixProvider {
    fn name(&self) -> &'static str {
        "nutritionix"
    }

    fn tier(&self) -> NutritionSource {
        NutritionSource::PrimaryProvider
    }

    async fn lookup(&self, food: &str) -> Result<NutritionRecord, ProviderError> {
        let cfg = self.config.as_ref().ok_or(ProviderError::Unavailable)?;
        let url = format!("{}/v2/natural/nutrients", cfg.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(&url)
            .header("x-app-id", &cfg.app_id)
            .header("x-app-key", &cfg.app_key)
            .json(&NutritionixRequest { query: food })
            .send()
            .await?;

        let status = res.status();
        // Nutritionix answers 404 when the phrase matched nothing.
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NoMatch);
        }
        if !status.is_success() {
            return Err(ProviderError::CallFailed(format!("status {status}")));
        }

        let body: NutritionixResponse = res.json().await?;
        debug!(provider = "nutritionix", hits = body.foods.len(), "response decoded");
        let first = body.foods.first().ok_or(ProviderError::NoMatch)?;
        normalize_nutritionix(first)
    }
}

// --- secondary: CalorieNinjas ---

#[derive(Debug, Deserialize)]
struct CalorieNinjasResponse {
    #[serde(default)]
    items: Vec<CalorieNinjasItem>,
}

#[derive(Debug, Deserialize)]
struct CalorieNinjasItem {
    calories: Option<f64>,
    protein_g: Option<f64>,
    carbohydrates_total_g: Option<f64>,
    fat_total_g: Option<f64>,
}

pub struct CalorieNinjasProvider {
    http: reqwest::Client,
    config: Option<CalorieNinjasConfig>,
}

impl CalorieNinjasProvider {
    pub fn new(http: reqwest::Client, config: Option<CalorieNinjasConfig>) -> Self {
        Self { http, config }
    }
}

fn normalize_calorieninjas(item: &CalorieNinjasItem) -> NutritionRecord {
    NutritionRecord::new(
        item.calories.unwrap_or(0.0).round(),
        round1(item.protein_g.unwrap_or(0.0)),
        round1(item.carbohydrates_total_g.unwrap_or(0.0)),
        round1(item.fat_total_g.unwrap_or(0.0)),
        NutritionSource::SecondaryProvider,
    )
}

#[async_trait]
impl NutritionProvider for CalorieNinjasProvider {
    fn name(&self) -> &'static str {
        "calorieninjas"
    }

    fn tier(&self) -> NutritionSource {
        NutritionSource::SecondaryProvider
    }

    async fn lookup(&self, food: &str) -> Result<NutritionRecord, ProviderError> {
        let cfg = self.config.as_ref().ok_or(ProviderError::Unavailable)?;
        let url = format!("{}/v1/nutrition", cfg.base_url.trim_end_matches('/'));
        let res = self
            .http
            .get(&url)
            .query(&[("query", food)])
            .header("X-Api-Key", &cfg.api_key)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(ProviderError::CallFailed(format!("status {status}")));
        }

        let body: CalorieNinjasResponse = res.json().await?;
        debug!(provider = "calorieninjas", hits = body.items.len(), "response decoded");
        body.items
            .first()
            .map(normalize_calorieninjas)
            .ok_or(ProviderError::NoMatch)
    }
}
