use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use carvalue_core::errors::Error as CoreError;
use carvalue_core::valuation::ValuationError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not enough comparable listings to estimate: found {found}, need {required}")]
    InsufficientData { found: usize, required: usize },
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    found: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<usize>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                CoreError::Valuation(ValuationError::ImputationFailure { .. }) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                CoreError::Valuation(ValuationError::StoreUnavailable(_))
                | CoreError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        }
        let (found, required) = match &self {
            ApiError::InsufficientData { found, required } => (Some(*found), Some(*required)),
            _ => (None, None),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
            found,
            required,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
