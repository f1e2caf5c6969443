use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::{cookie::CookieJar, Form};
use minijinja::context;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{dto::ScheduleForm, repo, repo_types::ScheduleView, weekdays};
use crate::{
    auth::extractors::CurrentUser,
    error::AppResult,
    forms::FormErrors,
    state::AppState,
    views::{flash, page, FlashLevel},
    zones::{self, repo_types::GardenZone},
};

pub fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/zone/:id/schedule/create/", get(create_page).post(create))
        .route("/schedule/:id/delete/", get(delete_page).post(delete))
}

fn render_form(
    state: &AppState,
    jar: CookieJar,
    user: &CurrentUser,
    zone: &GardenZone,
    form: &ScheduleForm,
    errors: &FormErrors,
    status: StatusCode,
) -> AppResult<Response> {
    let res = page(
        &state.templates,
        jar,
        Some(user),
        "schedule_form.html",
        context! {
            title => "New schedule",
            zone => zone,
            form => form,
            errors => errors,
            day_choices => weekdays::choices(),
        },
    )?;
    Ok((status, res).into_response())
}

#[instrument(skip(state, jar, user), fields(user_id = %user.id))]
pub async fn create_page(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Path(zone_id): Path<Uuid>,
) -> AppResult<Response> {
    let zone = zones::repo::find_owned(&state.db, user.id, zone_id).await?;
    render_form(
        &state,
        jar,
        &user,
        &zone,
        &ScheduleForm::initial(),
        &FormErrors::new(),
        StatusCode::OK,
    )
}

#[instrument(skip(state, jar, user, form), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Path(zone_id): Path<Uuid>,
    Form(form): Form<ScheduleForm>,
) -> AppResult<Response> {
    let zone = zones::repo::find_owned(&state.db, user.id, zone_id).await?;
    let input = match form.validate() {
        Ok(i) => i,
        Err(errors) => {
            warn!(?errors, zone_id = %zone.id, "schedule form rejected");
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return render_form(&state, jar, &user, &zone, &form, &errors, status);
        }
    };
    let schedule = repo::create(&state.db, zone.id, &input).await?;
    info!(
        schedule_id = %schedule.id,
        zone_id = %zone.id,
        days = %schedule.days_of_week,
        "schedule created"
    );
    let jar = flash(jar, FlashLevel::Success, "Schedule added.");
    Ok((jar, Redirect::to("/dashboard/")).into_response())
}

#[instrument(skip(state, jar, user), fields(user_id = %user.id))]
pub async fn delete_page(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let schedule = repo::find_owned(&state.db, user.id, id).await?;
    let zone = zones::repo::find_owned(&state.db, user.id, schedule.zone_id).await?;
    page(
        &state.templates,
        jar,
        Some(&user),
        "schedule_confirm_delete.html",
        context! { schedule => ScheduleView::from(&schedule), zone => zone },
    )
}

#[instrument(skip(state, jar, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    repo::delete_owned(&state.db, user.id, id).await?;
    info!(schedule_id = %id, "schedule deleted");
    let jar = flash(jar, FlashLevel::Success, "Schedule deleted.");
    Ok((jar, Redirect::to("/dashboard/")).into_response())
}
