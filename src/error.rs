use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Business-level failures surfaced to clients as stable string codes.
///
/// The client maps codes to user-facing copy; anything it does not recognize
/// falls back to a generic message, so codes are the contract, not the
/// `Display` text.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no valid session or no matching user record")]
    Unauthenticated,

    #[error("caller lacks required ownership or role")]
    Forbidden,

    #[error("recommendation not found")]
    NotFound,

    #[error("title is empty")]
    TitleRequired,
    #[error("title exceeds maximum length")]
    TitleTooLong,
    #[error("blurb is empty")]
    BlurbRequired,
    #[error("blurb exceeds maximum length")]
    BlurbTooLong,
    #[error("link exceeds maximum length")]
    LinkTooLong,
    #[error("link is not an absolute http(s) URL")]
    InvalidUrl,

    #[error("pagination cursor could not be decoded")]
    InvalidCursor,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::TitleRequired => "TITLE_REQUIRED",
            Self::TitleTooLong => "TITLE_TOO_LONG",
            Self::BlurbRequired => "BLURB_REQUIRED",
            Self::BlurbTooLong => "BLURB_TOO_LONG",
            Self::LinkTooLong => "LINK_TOO_LONG",
            Self::InvalidUrl => "INVALID_URL",
            Self::InvalidCursor => "INVALID_CURSOR",
            Self::Database(_) => "INTERNAL",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::TitleRequired
            | Self::TitleTooLong
            | Self::BlurbRequired
            | Self::BlurbTooLong
            | Self::LinkTooLong
            | Self::InvalidUrl
            | Self::InvalidCursor => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Database(e) = &self {
            // Log the real failure; the client only ever sees the code.
            error!(error = %e, "database error");
        }
        (self.status_code(), Json(ErrorBody { code: self.code() })).into_response()
    }
}
