pub mod dto;
pub mod extract;
pub mod handlers;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::api_routes()
}
