use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Request-scoped failures. Nothing here is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing object or one owned by another user; the two are indistinguishable.
    #[error("not found")]
    NotFound,
    #[error("authentication required")]
    Unauthorized,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Database(_) | AppError::Template(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message; server-side details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::NotFound => "Not found",
            AppError::Unauthorized => "Authentication required",
            AppError::MethodNotAllowed => "Method not allowed",
            _ => "Internal server error",
        }
    }

    fn log(&self) {
        if self.status().is_server_error() {
            error!(error = %self, "request failed");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let body = format!(
            "<!doctype html><html><head><title>{code}</title></head>\
             <body><h1>{code} {msg}</h1><p><a href=\"/\">Back to home</a></p></body></html>",
            code = status.as_u16(),
            msg = self.public_message(),
        );
        (status, Html(body)).into_response()
    }
}

/// JSON flavour of [`AppError`] for the `/api` routes.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(e: E) -> Self {
        ApiError(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.log();
        let status = self.0.status();
        (status, Json(json!({ "error": self.0.public_message() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_errors_do_not_leak_details() {
        let err = AppError::Internal(anyhow::anyhow!("password for db is hunter2"));
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[tokio::test]
    async fn api_error_renders_json_body() {
        let res = ApiError(AppError::NotFound).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["error"], "Not found");
    }
}
