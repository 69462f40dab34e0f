pub mod dto;
pub mod export;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod store;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::history_routes()
}
