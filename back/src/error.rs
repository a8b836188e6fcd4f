use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use studyhub_api::v1::{CohortError, CollectionError, EventError};
use tracing::warn;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, err: impl ToString) -> Self {
        Self {
            status,
            message: err.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, error = %self.message, "rejected request");

        let body = ErrorBody {
            error: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<CollectionError> for ApiError {
    fn from(err: CollectionError) -> Self {
        let status = match err {
            CollectionError::NotFound(_) => StatusCode::NOT_FOUND,
            CollectionError::DuplicateId(_) => StatusCode::CONFLICT,
            CollectionError::WrongKind { .. } | CollectionError::Item(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };

        Self::new(status, err)
    }
}

impl From<CohortError> for ApiError {
    fn from(err: CohortError) -> Self {
        let status = match err {
            CohortError::NotFound(_) => StatusCode::NOT_FOUND,
            CohortError::DuplicateId(_) | CohortError::AllSubmitted { .. } => {
                StatusCode::CONFLICT
            }
            CohortError::EmptyDescription
            | CohortError::TooManySubmissions { .. }
            | CohortError::Item(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        Self::new(status, err)
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }
}
