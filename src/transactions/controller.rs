use std::sync::Arc;

use axum::{
    extract::{rejection::BytesRejection, Query, State},
    http::{HeaderMap, StatusCode},
};
use axum_macros::debug_handler;
use bytes::Bytes;
use validator::Validate;

use crate::{
    app::{
        errors::DefaultApiError,
        models::api_error::ApiError,
        util::function_key::{self, FunctionKeyQuery},
    },
    AppState,
};

use super::{
    dtos::send_message_dto::{validation_messages, SendMessageDto},
    errors::TransactionsApiError,
    service,
};

#[debug_handler]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<FunctionKeyQuery>,
    body: Result<Bytes, BytesRejection>,
) -> Result<String, ApiError> {
    function_key::authorize(&headers, &query, &state.envy)?;

    tracing::info!("Processing message to send.");

    let body = match body {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read request body.");
            return Err(match e.status() {
                StatusCode::PAYLOAD_TOO_LARGE => ApiError {
                    code: StatusCode::PAYLOAD_TOO_LARGE,
                    message: String::new(),
                },
                _ => DefaultApiError::InternalServerError.value(),
            });
        }
    };

    let dto = match SendMessageDto::from_json(&body) {
        Ok(Some(dto)) => dto,
        Ok(None) => {
            tracing::error!("Invalid request payload. Transaction object could not be deserialized.");
            return Err(TransactionsApiError::InvalidPayload.value());
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid request payload. Transaction object could not be deserialized.");
            return Err(TransactionsApiError::InvalidPayload.value());
        }
    };

    if state.envy.strict_validation() {
        if let Err(e) = dto.validate() {
            return Err(ApiError {
                code: StatusCode::BAD_REQUEST,
                message: validation_messages(&e),
            });
        }
    }

    let message = service::send_message(&dto, &state).await?;

    Ok(format!("Message sent: {}", message))
}
