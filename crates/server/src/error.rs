use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::case_events::CaseEventError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    CaseEvent(#[from] CaseEventError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::CaseEvent(CaseEventError::CaseNotFound)
            | ApiError::CaseEvent(CaseEventError::LawsuitNotFound)
            | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::CaseEvent(CaseEventError::Validation(_))
            | ApiError::CaseEvent(CaseEventError::ParentLawsuitMismatch)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::CaseEvent(CaseEventError::Database(e)) | ApiError::Database(e) => {
                database_status(e)
            }
        }
    }
}

/// Constraint violations come from bad references in the request body.
fn database_status(error: &sqlx::Error) -> StatusCode {
    match error {
        sqlx::Error::Database(db_err)
            if db_err.is_foreign_key_violation()
                || db_err.is_unique_violation()
                || db_err.is_check_violation() =>
        {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed");
            "internal server error".to_string()
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
            self.to_string()
        };
        (status, Json(ApiResponse::<()>::error(&message))).into_response()
    }
}
