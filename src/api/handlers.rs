use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{ToggleResponse, ZoneStatusResponse},
    extract::ApiPath,
};
use crate::{
    auth::extractors::CurrentUser,
    error::{ApiError, ApiResult, AppError},
    schedules,
    sensors::{
        self,
        dto::{ReadingRequest, ReadingResponse},
    },
    state::AppState,
    watering, zones,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/zone/:id/status/",
            get(zone_status).fallback(method_not_allowed),
        )
        .route(
            "/api/zone/:id/readings/",
            post(record_reading).fallback(method_not_allowed),
        )
        .route(
            "/api/schedule/:id/toggle/",
            post(toggle_schedule).fallback(method_not_allowed),
        )
}

async fn method_not_allowed() -> ApiError {
    ApiError(AppError::MethodNotAllowed)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn zone_status(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(zone_id): ApiPath<Uuid>,
) -> ApiResult<Json<ZoneStatusResponse>> {
    let zone = zones::repo::find_owned(&state.db, user.id, zone_id).await?;
    let reading = sensors::repo::latest_for_zone(&state.db, zone.id).await?;
    let last = watering::repo::last_for_zone(&state.db, zone.id).await?;
    let schedules_count = schedules::repo::count_active_for_zone(&state.db, zone.id).await?;

    Ok(Json(ZoneStatusResponse {
        zone_id: zone.id,
        zone_name: zone.name,
        soil_moisture: reading.as_ref().and_then(|r| r.soil_moisture),
        temperature: reading.as_ref().and_then(|r| r.temperature),
        humidity: reading.as_ref().and_then(|r| r.humidity),
        last_watering: last,
        schedules_count,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn toggle_schedule(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(schedule_id): ApiPath<Uuid>,
) -> ApiResult<Json<ToggleResponse>> {
    let is_active = schedules::repo::toggle(&state.db, user.id, schedule_id).await?;
    info!(schedule_id = %schedule_id, is_active, "schedule toggled");
    Ok(Json(ToggleResponse::new(schedule_id, is_active)))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn record_reading(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(zone_id): ApiPath<Uuid>,
    Json(body): Json<ReadingRequest>,
) -> ApiResult<Response> {
    let zone = zones::repo::find_owned(&state.db, user.id, zone_id).await?;
    let reading = match body.validate() {
        Ok(r) => r,
        Err(errors) => {
            warn!(?errors, zone_id = %zone.id, "sensor reading rejected");
            let body = json!({ "error": "Invalid reading", "fields": errors });
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response());
        }
    };
    let stored = sensors::repo::insert(&state.db, zone.id, &reading).await?;
    info!(reading_id = %stored.id, zone_id = %zone.id, "sensor reading stored");
    Ok((StatusCode::CREATED, Json(ReadingResponse::from(stored))).into_response())
}
