use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use base64ct::{Base64, Encoding};
use bytes::Bytes;
use tracing::{error, instrument, warn};
use uuid::Uuid;

use super::dto::{ClearedResponse, CreateHistoryRequest, HistoryItem, HistoryQuery};
use super::export::to_csv;
use super::services::{self, NewEntry, Thumbnail};
use crate::state::AppState;

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(list_history).post(create_entry).delete(clear_history))
        .route("/history/export.csv", get(export_csv))
        .route("/history/:id", get(get_entry).delete(delete_entry))
        .route("/history/:id/thumbnail", get(get_thumbnail))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

#[instrument(skip(state))]
pub async fn list_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryItem>>, (StatusCode, String)> {
    let entries = match q.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(query) => state.history.search_by_name(query).await,
        None => state.history.list_recent().await,
    }
    .map_err(internal)?;
    Ok(Json(entries.into_iter().map(HistoryItem::from).collect()))
}

/// POST /history { food, display_name?, grams|servings|preset, confidence, thumbnail_b64?, content_type? }
#[instrument(skip(state, body), fields(food = %body.food))]
pub async fn create_entry(
    State(state): State<AppState>,
    Json(body): Json<CreateHistoryRequest>,
) -> Result<(StatusCode, HeaderMap, Json<HistoryItem>), (StatusCode, String)> {
    if body.food.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "food is required".into()));
    }
    if !(0.0..=1.0).contains(&body.confidence) {
        warn!(confidence = body.confidence, "confidence out of range");
        return Err((
            StatusCode::BAD_REQUEST,
            "confidence must be between 0 and 1".into(),
        ));
    }
    let portion = body
        .portion
        .to_spec()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let thumbnail = match body.thumbnail_b64 {
        Some(b64) => {
            if state.storage.is_none() {
                return Err((
                    StatusCode::BAD_REQUEST,
                    "thumbnail storage is not configured".into(),
                ));
            }
            let bytes = Base64::decode_vec(b64.trim())
                .map_err(|_| (StatusCode::BAD_REQUEST, "invalid base64".into()))?;
            Some(Thumbnail {
                body: Bytes::from(bytes),
                content_type: body.content_type.unwrap_or_else(|| "image/jpeg".into()),
            })
        }
        None => None,
    };

    let entry = services::record_entry(
        &state,
        NewEntry {
            food: body.food,
            display_name: body.display_name,
            portion,
            confidence: body.confidence,
            thumbnail,
        },
    )
    .await
    .map_err(|e| {
        error!(error = %e, "record_entry failed");
        internal(e)
    })?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/history/{}", entry.id).parse() {
        headers.insert(header::LOCATION, location);
    }

    Ok((StatusCode::CREATED, headers, Json(HistoryItem::from(entry))))
}

#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryItem>, (StatusCode, String)> {
    match state.history.get(id).await {
        Ok(Some(entry)) => Ok(Json(HistoryItem::from(entry))),
        Ok(None) => Err((StatusCode::NOT_FOUND, "History entry not found".into())),
        Err(e) => {
            error!(error = %e, %id, "get_entry failed");
            Err(internal(e))
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    match services::delete_entry(&state, id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err((StatusCode::NOT_FOUND, "History entry not found".into())),
        Err(e) => {
            error!(error = %e, %id, "delete_entry failed");
            Err(internal(e))
        }
    }
}

#[instrument(skip(state))]
pub async fn clear_history(
    State(state): State<AppState>,
) -> Result<Json<ClearedResponse>, (StatusCode, String)> {
    let deleted = services::clear_history(&state)
        .await
        .map_err(internal)?;
    Ok(Json(ClearedResponse { deleted }))
}

#[instrument(skip(state))]
pub async fn export_csv(State(state): State<AppState>) -> Result<Response, (StatusCode, String)> {
    let entries = state.history.list_recent().await.map_err(internal)?;
    let csv = to_csv(&entries).map_err(internal)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"food-history.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// 307 → presigned thumbnail url
#[instrument(skip(state))]
pub async fn get_thumbnail(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match services::thumbnail_url(&state, id).await {
        Ok(Some(url)) => Redirect::temporary(&url).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Thumbnail not found").into_response(),
        Err(e) => {
            error!(error = %e, %id, "presign failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "presign failed").into_response()
        }
    }
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
