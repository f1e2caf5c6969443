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

use super::{dto::ZoneForm, repo, repo_types::GardenZone};
use crate::{
    auth::extractors::CurrentUser,
    error::AppResult,
    forms::FormErrors,
    state::AppState,
    views::{flash, page, FlashLevel},
};

pub fn zone_routes() -> Router<AppState> {
    Router::new()
        .route("/zone/create/", get(create_page).post(create))
        .route("/zone/:id/edit/", get(edit_page).post(edit))
        .route("/zone/:id/delete/", get(delete_page).post(delete))
}

struct FormPage<'a> {
    title: &'static str,
    button_text: &'static str,
    zone: Option<&'a GardenZone>,
}

const CREATE: FormPage<'static> = FormPage {
    title: "New zone",
    button_text: "Create",
    zone: None,
};

fn render_form(
    state: &AppState,
    jar: CookieJar,
    user: &CurrentUser,
    meta: &FormPage<'_>,
    form: &ZoneForm,
    errors: &FormErrors,
    status: StatusCode,
) -> AppResult<Response> {
    let res = page(
        &state.templates,
        jar,
        Some(user),
        "zone_form.html",
        context! {
            title => meta.title,
            button_text => meta.button_text,
            zone => meta.zone,
            form => form,
            errors => errors,
        },
    )?;
    Ok((status, res).into_response())
}

#[instrument(skip(state, jar, user), fields(user_id = %user.id))]
pub async fn create_page(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
) -> AppResult<Response> {
    render_form(
        &state,
        jar,
        &user,
        &CREATE,
        &ZoneForm::default(),
        &FormErrors::new(),
        StatusCode::OK,
    )
}

#[instrument(skip(state, jar, user, form), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Form(form): Form<ZoneForm>,
) -> AppResult<Response> {
    let input = match form.validate() {
        Ok(i) => i,
        Err(errors) => {
            warn!(?errors, "zone form rejected");
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return render_form(&state, jar, &user, &CREATE, &form, &errors, status);
        }
    };
    let zone = repo::create(&state.db, user.id, &input).await?;
    info!(zone_id = %zone.id, "zone created");
    let jar = flash(
        jar,
        FlashLevel::Success,
        format!("Zone {} created.", zone.name),
    );
    Ok((jar, Redirect::to("/dashboard/")).into_response())
}

#[instrument(skip(state, jar, user), fields(user_id = %user.id))]
pub async fn edit_page(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let zone = repo::find_owned(&state.db, user.id, id).await?;
    let meta = FormPage {
        title: "Edit zone",
        button_text: "Save",
        zone: Some(&zone),
    };
    let form = ZoneForm::from(&zone);
    render_form(&state, jar, &user, &meta, &form, &FormErrors::new(), StatusCode::OK)
}

#[instrument(skip(state, jar, user, form), fields(user_id = %user.id))]
pub async fn edit(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Form(form): Form<ZoneForm>,
) -> AppResult<Response> {
    let zone = repo::find_owned(&state.db, user.id, id).await?;
    let input = match form.validate() {
        Ok(i) => i,
        Err(errors) => {
            warn!(?errors, zone_id = %id, "zone form rejected");
            let meta = FormPage {
                title: "Edit zone",
                button_text: "Save",
                zone: Some(&zone),
            };
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return render_form(&state, jar, &user, &meta, &form, &errors, status);
        }
    };
    let zone = repo::update(&state.db, user.id, zone.id, &input).await?;
    info!(zone_id = %zone.id, "zone updated");
    let jar = flash(
        jar,
        FlashLevel::Success,
        format!("Zone {} updated.", zone.name),
    );
    Ok((jar, Redirect::to("/dashboard/")).into_response())
}

#[instrument(skip(state, jar, user), fields(user_id = %user.id))]
pub async fn delete_page(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let zone = repo::find_owned(&state.db, user.id, id).await?;
    page(
        &state.templates,
        jar,
        Some(&user),
        "zone_confirm_delete.html",
        context! { zone => zone },
    )
}

#[instrument(skip(state, jar, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let zone = repo::find_owned(&state.db, user.id, id).await?;
    repo::delete(&state.db, user.id, zone.id).await?;
    info!(zone_id = %zone.id, "zone deleted");
    let jar = flash(
        jar,
        FlashLevel::Success,
        format!("Zone {} deleted.", zone.name),
    );
    Ok((jar, Redirect::to("/dashboard/")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn anonymous_visitor_is_sent_to_login() {
        let app = zone_routes().with_state(AppState::fake());
        let res = app
            .oneshot(Request::get("/zone/create/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers()[axum::http::header::LOCATION],
            "/login/?next=/zone/create/"
        );
    }
}
