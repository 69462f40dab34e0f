pub mod dto;
pub mod handlers;
pub mod local_table;
pub mod providers;
pub mod record;
pub mod resolver;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::nutrition_routes()
}
