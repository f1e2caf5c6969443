use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    Form,
};
use minijinja::context;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{LoginForm, NextQuery, RegisterForm},
    extractors::{safe_next, CurrentUser, SESSION_COOKIE},
    jwt::SessionKeys,
    password::{hash_password, verify_password},
    repo::{self, is_unique_violation},
    repo_types::{NewUser, User},
};
use crate::{
    error::AppResult,
    forms::{FormErrors, NON_FIELD},
    state::AppState,
    views::{flash, page, FlashLevel},
};

const UNPROCESSABLE: StatusCode = StatusCode::UNPROCESSABLE_ENTITY;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register/", get(register_page).post(register))
        .route("/login/", get(login_page).post(login))
        .route("/logout/", get(logout).post(logout))
}

/// Open a server-side session and hand its token to the browser.
async fn start_session(
    state: &AppState,
    jar: CookieJar,
    user_id: Uuid,
) -> AppResult<CookieJar> {
    let keys = SessionKeys::from_ref(state);
    let expires_at = keys.expires_at(OffsetDateTime::now_utc());
    let session = repo::create_session(&state.db, user_id, expires_at).await?;
    let token = keys.sign(user_id, session.id, session.expires_at)?;
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.session.cookie_secure)
        .expires(session.expires_at)
        .build();
    Ok(jar.add(cookie))
}

fn render_register(
    state: &AppState,
    jar: CookieJar,
    form: &RegisterForm,
    errors: &FormErrors,
    status: StatusCode,
) -> AppResult<Response> {
    let res = page(
        &state.templates,
        jar,
        None,
        "register.html",
        context! { form => form, errors => errors },
    )?;
    Ok((status, res).into_response())
}

#[instrument(skip(state, jar, user))]
pub async fn register_page(
    State(state): State<AppState>,
    jar: CookieJar,
    user: Option<CurrentUser>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    render_register(
        &state,
        jar,
        &RegisterForm::default(),
        &FormErrors::new(),
        StatusCode::OK,
    )
}

#[instrument(skip(state, jar, user, form))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    user: Option<CurrentUser>,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let reg = match form.validate() {
        Ok(r) => r,
        Err(errors) => {
            warn!(?errors, "registration rejected");
            let jar = flash(jar, FlashLevel::Error, "Please correct the errors below.");
            return render_register(&state, jar, &form, &errors, UNPROCESSABLE);
        }
    };

    if User::username_taken(&state.db, &reg.username).await? {
        let mut errors = FormErrors::new();
        errors.add("username", "A user with that username already exists.");
        return render_register(&state, jar, &form, &errors, UNPROCESSABLE);
    }

    let hash = hash_password(&reg.password)?;
    let new = NewUser {
        username: &reg.username,
        email: &reg.email,
        first_name: &reg.first_name,
        last_name: &reg.last_name,
        password_hash: &hash,
    };
    let user = match repo::register_user(&state.db, &new).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            let mut errors = FormErrors::new();
            errors.add("username", "A user with that username already exists.");
            return render_register(&state, jar, &form, &errors, UNPROCESSABLE);
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(e.into());
        }
    };

    let jar = start_session(&state, jar, user.id).await?;
    let jar = flash(jar, FlashLevel::Success, "Registration successful. Welcome!");
    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((jar, Redirect::to("/")).into_response())
}

fn render_login(
    state: &AppState,
    jar: CookieJar,
    form: &LoginForm,
    errors: &FormErrors,
    next: Option<&str>,
    status: StatusCode,
) -> AppResult<Response> {
    let res = page(
        &state.templates,
        jar,
        None,
        "login.html",
        context! { form => form, errors => errors, next => next },
    )?;
    Ok((status, res).into_response())
}

#[instrument(skip(state, jar, user))]
pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    user: Option<CurrentUser>,
    Query(q): Query<NextQuery>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let next = q.next.as_deref().and_then(safe_next);
    render_login(
        &state,
        jar,
        &LoginForm::default(),
        &FormErrors::new(),
        next,
        StatusCode::OK,
    )
}

#[instrument(skip(state, jar, user, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    user: Option<CurrentUser>,
    Query(q): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let next = q.next.as_deref().and_then(safe_next);

    let invalid = |jar| {
        let mut errors = FormErrors::new();
        errors.add(NON_FIELD, "Invalid username or password.");
        render_login(&state, jar, &form, &errors, next, StatusCode::UNAUTHORIZED)
    };

    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return invalid(jar);
    }

    let user = match User::find_by_username(&state.db, username).await? {
        Some(u) => u,
        None => {
            warn!(username = %username, "login unknown username");
            return invalid(jar);
        }
    };

    if !verify_password(&form.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return invalid(jar);
    }

    let jar = start_session(&state, jar, user.id).await?;
    let jar = flash(
        jar,
        FlashLevel::Success,
        format!("Welcome, {}!", user.username),
    );
    info!(user_id = %user.id, "user logged in");
    Ok((jar, Redirect::to(next.unwrap_or("/"))).into_response())
}

#[instrument(skip(state, jar, user))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    user: Option<CurrentUser>,
) -> AppResult<Response> {
    if let Some(user) = user {
        repo::delete_session(&state.db, user.session_id).await?;
        info!(user_id = %user.id, "user logged out");
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    let jar = flash(jar, FlashLevel::Info, "You have been logged out.");
    Ok((jar, Redirect::to("/")).into_response())
}
