use axum::http::StatusCode;

use super::models::api_error::ApiError;

#[derive(Debug)]
pub enum DefaultApiError {
    InternalServerError,
    PermissionDenied,
}

impl DefaultApiError {
    pub fn value(&self) -> ApiError {
        match *self {
            // 500s never carry detail back to the caller
            Self::InternalServerError => ApiError {
                code: StatusCode::INTERNAL_SERVER_ERROR,
                message: String::new(),
            },
            Self::PermissionDenied => ApiError {
                code: StatusCode::UNAUTHORIZED,
                message: "Unauthorized.".to_string(),
            },
        }
    }
}
