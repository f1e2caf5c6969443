use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use super::{jwt::SessionKeys, repo};
use crate::{
    error::{ApiError, AppError},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "gardenflow_session";

/// The authenticated user behind a live session.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    #[serde(skip)]
    pub session_id: Uuid,
}

/// Sent instead of the handler when no live session is present.
#[derive(Debug)]
pub enum AuthRejection {
    /// HTML pages bounce through the login form and come back afterwards.
    Login { next: String },
    Api,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Login { next } => {
                Redirect::to(&format!("/login/?next={next}")).into_response()
            }
            AuthRejection::Api => ApiError(AppError::Unauthorized).into_response(),
        }
    }
}

fn session_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(c) = jar.get(SESSION_COOKIE) {
        return Some(c.value().to_string());
    }
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Only plain local paths survive as a post-login target.
pub fn safe_next(path: &str) -> Option<&str> {
    let ok = path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/-_.".contains(c));
    ok.then_some(path)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path();
        let rejection = if path.starts_with("/api/") {
            AuthRejection::Api
        } else {
            AuthRejection::Login {
                next: safe_next(path).unwrap_or("/").to_string(),
            }
        };

        let Some(token) = session_token(parts) else {
            return Err(rejection);
        };

        let keys = SessionKeys::from_ref(state);
        let claims = match keys.verify(&token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired session token");
                return Err(rejection);
            }
        };

        match repo::find_session_user(&state.db, claims.sid, claims.sub).await {
            Ok(Some((id, username))) => Ok(CurrentUser {
                id,
                username,
                session_id: claims.sid,
            }),
            Ok(None) => {
                warn!(user_id = %claims.sub, "session revoked or expired");
                Err(rejection)
            }
            Err(e) => {
                error!(error = %e, "session lookup failed");
                Err(rejection)
            }
        }
    }
}
