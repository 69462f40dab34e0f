use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::{NutritionQuery, ProviderStatus};
use super::record::NutritionRecord;
use crate::state::AppState;

pub fn nutrition_routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition", get(get_nutrition))
        .route("/nutrition/providers", get(get_providers))
}

/// GET /nutrition?food=apple
#[instrument(skip(state))]
pub async fn get_nutrition(
    State(state): State<AppState>,
    Query(q): Query<NutritionQuery>,
) -> Result<Json<NutritionRecord>, (StatusCode, String)> {
    let food = q.food.trim();
    if food.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "food is required".into()));
    }
    Ok(Json(state.resolver.resolve(food).await))
}

#[instrument(skip(state))]
pub async fn get_providers(State(state): State<AppState>) -> Json<ProviderStatus> {
    Json(ProviderStatus {
        primary_configured: state.config.nutritionix.is_some(),
        secondary_configured: state.config.calorieninjas.is_some(),
        attempt_timeout_secs: state.config.provider_timeout.as_secs(),
    })
}
