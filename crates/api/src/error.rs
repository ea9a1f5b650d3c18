//! HTTP mapping of service failures

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use predictor::{ErrorKind, ServiceError};

/// Handler error; renders as `{success: false, error, error_type}`
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::NoData | ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ValidationError
            | ErrorKind::MalformedIdentifier
            | ErrorKind::MalformedInput => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::InferenceError | ErrorKind::PersistenceError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(ServiceError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(ServiceError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(ServiceError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let failure = self.0.to_failure();

        if status.is_server_error() {
            tracing::error!(
                error_type = failure.error_type.as_str(),
                status_code = status.as_u16(),
                message = %failure.error,
                "Request failed"
            );
        } else {
            tracing::warn!(
                error_type = failure.error_type.as_str(),
                status_code = status.as_u16(),
                message = %failure.error,
                "Request rejected"
            );
        }

        (status, Json(failure)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ServiceError::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
            (ServiceError::NotFound(3), StatusCode::NOT_FOUND),
            (
                ServiceError::Validation("age".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::MalformedIdentifier("code".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::Persistence("down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServiceError::Inference("shape".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status_code(), status);
        }
    }
}
