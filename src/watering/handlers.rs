use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::{cookie::CookieJar, Form};
use minijinja::context;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{HistoryQuery, ManualWateringForm},
    repo, services,
};
use crate::{
    auth::extractors::CurrentUser,
    error::AppResult,
    forms::FormErrors,
    state::AppState,
    views::{flash, page, FlashLevel},
    zones::{self, repo_types::GardenZone},
};

pub fn watering_routes() -> Router<AppState> {
    Router::new()
        .route("/zone/:id/water/", get(start_page).post(start))
        .route("/history/", get(history))
}

fn render_start(
    state: &AppState,
    jar: CookieJar,
    user: &CurrentUser,
    zone: &GardenZone,
    form: &ManualWateringForm,
    errors: &FormErrors,
    status: StatusCode,
) -> AppResult<Response> {
    let res = page(
        &state.templates,
        jar,
        Some(user),
        "start_watering.html",
        context! {
            zone => zone,
            form => form,
            errors => errors,
            water_rate => state.config.water_rate_lpm,
        },
    )?;
    Ok((status, res).into_response())
}

#[instrument(skip(state, jar, user), fields(user_id = %user.id))]
pub async fn start_page(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Path(zone_id): Path<Uuid>,
) -> AppResult<Response> {
    let zone = zones::repo::find_owned(&state.db, user.id, zone_id).await?;
    let form = ManualWateringForm::initial(zone.watering_duration);
    render_start(&state, jar, &user, &zone, &form, &FormErrors::new(), StatusCode::OK)
}

#[instrument(skip(state, jar, user, form), fields(user_id = %user.id))]
pub async fn start(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Path(zone_id): Path<Uuid>,
    Form(form): Form<ManualWateringForm>,
) -> AppResult<Response> {
    let zone = zones::repo::find_owned(&state.db, user.id, zone_id).await?;
    let duration = match form.validate() {
        Ok(d) => d,
        Err(errors) => {
            warn!(?errors, zone_id = %zone.id, "manual watering rejected");
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return render_start(&state, jar, &user, &zone, &form, &errors, status);
        }
    };

    let litres = services::water_used(duration, state.config.water_rate_lpm);
    let (log_id, total) =
        repo::record_manual(&state.db, user.id, zone.id, duration, litres).await?;
    info!(
        log_id = %log_id,
        zone_id = %zone.id,
        duration,
        water_used = litres,
        total_water_used = total,
        "manual watering recorded"
    );

    let jar = flash(
        jar,
        FlashLevel::Success,
        format!("Watering of zone {} started for {duration} minutes.", zone.name),
    );
    Ok((jar, Redirect::to("/dashboard/")).into_response())
}

#[instrument(skip(state, jar, user, q), fields(user_id = %user.id))]
pub async fn history(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Query(q): Query<HistoryQuery>,
) -> AppResult<Response> {
    let selected = q.zone.as_deref().map(str::trim).filter(|z| !z.is_empty());
    let logs = match selected {
        None => repo::history(&state.db, user.id, None).await?,
        Some(raw) => match raw.parse::<Uuid>() {
            Ok(zone_id) => repo::history(&state.db, user.id, Some(zone_id)).await?,
            Err(_) => {
                warn!(zone = %raw, "unparseable history filter");
                Vec::new()
            }
        },
    };
    let zones = zones::repo::list_by_user(&state.db, user.id).await?;
    page(
        &state.templates,
        jar,
        Some(&user),
        "watering_history.html",
        context! {
            logs => logs,
            zones => zones,
            selected_zone => selected,
        },
    )
}
