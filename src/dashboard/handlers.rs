use axum::{extract::State, response::Response, routing::get, Router};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use tracing::{debug, instrument};

use super::services;
use crate::{auth::extractors::CurrentUser, error::AppResult, state::AppState, views::page};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/dashboard/", get(dashboard))
}

#[instrument(skip(state, jar, user))]
pub async fn home(
    State(state): State<AppState>,
    jar: CookieJar,
    user: Option<CurrentUser>,
) -> AppResult<Response> {
    let stats = match &user {
        Some(u) => Some(services::home_stats(&state.db, u.id).await?),
        None => None,
    };
    page(
        &state.templates,
        jar,
        user.as_ref(),
        "home.html",
        context! { stats => stats },
    )
}

#[instrument(skip(state, jar, user), fields(user_id = %user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
) -> AppResult<Response> {
    let data = services::dashboard(&state.db, user.id).await?;
    debug!(zones = data.zones_count, "dashboard loaded");
    page(&state.templates, jar, Some(&user), "dashboard.html", data)
}
