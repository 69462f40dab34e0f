use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use tracing::{instrument, warn};

use super::calculator::{calories_for, grams_to_ounces, macros_for};
use super::dto::{PortionRequest, PortionResult, PresetList};
use super::editor::{GRAM_PRESETS, SERVING_PRESETS};
use crate::state::AppState;

pub fn portion_routes() -> Router<AppState> {
    Router::new()
        .route("/portions", post(compute_portion))
        .route("/portions/presets", get(list_presets))
}

/// POST /portions { food, grams | servings | preset }
#[instrument(skip(state, body), fields(food = %body.food))]
pub async fn compute_portion(
    State(state): State<AppState>,
    Json(body): Json<PortionRequest>,
) -> Result<Json<PortionResult>, (StatusCode, String)> {
    let food = body.food.trim();
    if food.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "food is required".into()));
    }
    let portion = body.portion.to_spec().map_err(|msg| {
        warn!(%msg, "invalid portion");
        (StatusCode::BAD_REQUEST, msg)
    })?;

    let nutrition = state.resolver.resolve(food).await;
    Ok(Json(PortionResult {
        food: food.to_string(),
        nutrition,
        portion,
        ounces: grams_to_ounces(portion.grams),
        calories: calories_for(&nutrition, portion.grams),
        macros: macros_for(&nutrition, portion.grams),
    }))
}

pub async fn list_presets() -> Json<PresetList> {
    Json(PresetList {
        servings: SERVING_PRESETS,
        grams: GRAM_PRESETS,
    })
}

#[cfg(test)]
mod portion_route_tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn post(body: Value) -> (StatusCode, Value) {
        let app = portion_routes().with_state(AppState::fake());
        let req = Request::post("/portions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn grams_portion_for_apple() {
        let (status, body) = post(json!({ "food": "apple", "grams": 250 })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["portion"], json!({ "grams": 250.0, "servings": 2.5 }));
        assert_eq!(body["calories"], 130);
        assert_eq!(body["macros"], json!({ "protein": 0.8, "carbs": 35.0, "fat": 0.5 }));
        assert_eq!(body["ounces"], 8.8);
        assert_eq!(body["nutrition"]["source"], "local");
    }

    #[tokio::test]
    async fn servings_are_clamped() {
        let (_, body) = post(json!({ "food": "pizza", "servings": 10 })).await;
        assert_eq!(body["portion"], json!({ "grams": 300.0, "servings": 3.0 }));
        assert_eq!(body["calories"], 798);
    }

    #[tokio::test]
    async fn preset_portion() {
        let (_, body) = post(json!({ "food": "banana", "preset": { "unit": "servings", "index": 0 } })).await;
        assert_eq!(body["portion"], json!({ "grams": 50.0, "servings": 0.5 }));
    }

    #[tokio::test]
    async fn missing_portion_is_bad_request() {
        let (status, _) = post(json!({ "food": "apple" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = post(json!({ "food": "", "grams": 100 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn presets_are_listed() {
        let app = portion_routes().with_state(AppState::fake());
        let res = app
            .oneshot(Request::get("/portions/presets").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["servings"], json!([0.5, 1.0, 1.5, 2.0]));
        assert_eq!(v["grams"].as_array().unwrap().len(), 5);
    }
}
