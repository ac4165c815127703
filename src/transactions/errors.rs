use axum::http::StatusCode;

use crate::app::models::api_error::ApiError;

#[derive(Debug)]
pub enum TransactionsApiError {
    InvalidPayload,
    QueueNotFound,
}

impl TransactionsApiError {
    pub fn value(&self) -> ApiError {
        match *self {
            Self::InvalidPayload => ApiError {
                code: StatusCode::BAD_REQUEST,
                message: "Invalid request payload.".to_string(),
            },
            Self::QueueNotFound => ApiError {
                code: StatusCode::BAD_REQUEST,
                message: "Queue not found.".to_string(),
            },
        }
    }
}
