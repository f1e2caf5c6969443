use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::{cookie::CookieJar, Form};
use minijinja::context;
use tracing::{info, instrument, warn};

use super::{dto::ProfileForm, repo, repo_types::UserProfile};
use crate::{
    auth::{extractors::CurrentUser, repo_types::User},
    error::{AppError, AppResult},
    forms::FormErrors,
    state::AppState,
    views::{flash, page, FlashLevel},
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile/", get(profile_page).post(update_profile))
}

struct Account {
    user: User,
    profile: UserProfile,
}

async fn load_account(state: &AppState, current: &CurrentUser) -> AppResult<Account> {
    let user = User::find_by_id(&state.db, current.id)
        .await?
        .ok_or(AppError::NotFound)?;
    let profile = repo::get_or_create(&state.db, current.id).await?;
    Ok(Account { user, profile })
}

fn render(
    state: &AppState,
    jar: CookieJar,
    current: &CurrentUser,
    account: &Account,
    form: &ProfileForm,
    errors: &FormErrors,
    status: StatusCode,
) -> AppResult<Response> {
    let res = page(
        &state.templates,
        jar,
        Some(current),
        "profile.html",
        context! {
            account => account.user,
            profile => account.profile,
            form => form,
            errors => errors,
        },
    )?;
    Ok((status, res).into_response())
}

#[instrument(skip(state, jar, user), fields(user_id = %user.id))]
pub async fn profile_page(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
) -> AppResult<Response> {
    let account = load_account(&state, &user).await?;
    let form = ProfileForm::from(&account.profile);
    render(&state, jar, &user, &account, &form, &FormErrors::new(), StatusCode::OK)
}

#[instrument(skip(state, jar, user, form), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    let input = match form.validate() {
        Ok(i) => i,
        Err(errors) => {
            warn!(?errors, "profile form rejected");
            let account = load_account(&state, &user).await?;
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return render(&state, jar, &user, &account, &form, &errors, status);
        }
    };
    repo::update(&state.db, user.id, &input).await?;
    info!("profile updated");
    let jar = flash(jar, FlashLevel::Success, "Profile updated.");
    Ok((jar, Redirect::to("/profile/")).into_response())
}
