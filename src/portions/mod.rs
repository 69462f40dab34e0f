pub mod calculator;
pub mod dto;
pub mod editor;
pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::portion_routes()
}
