use crate::{
    app::{errors::DefaultApiError, models::api_error::ApiError},
    AppState,
};

use super::{dtos::send_message_dto::SendMessageDto, errors::TransactionsApiError, QUEUE_NAME};

/// Publishes the transaction summary, returning the message that was queued.
pub async fn send_message(dto: &SendMessageDto, state: &AppState) -> Result<String, ApiError> {
    let message = dto.message();

    let Some(queue_service) = &state.queue_service else {
        tracing::error!("Connection string for AzureWebJobsStorage is not configured.");
        return Err(DefaultApiError::InternalServerError.value());
    };

    if let Err(e) = queue_service.create_queue_if_not_exists(QUEUE_NAME).await {
        tracing::error!(error = %e, "Failed to create queue {}.", QUEUE_NAME);
        return Err(DefaultApiError::InternalServerError.value());
    }

    match queue_service.queue_exists(QUEUE_NAME).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::error!("Queue does not exist.");
            return Err(TransactionsApiError::QueueNotFound.value());
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to check queue {}.", QUEUE_NAME);
            return Err(DefaultApiError::InternalServerError.value());
        }
    }

    match queue_service.send_message(QUEUE_NAME, &message).await {
        Ok(_) => {
            tracing::info!("Message successfully sent to the queue.");
            Ok(message)
        }
        Err(e) => {
            tracing::error!(error = %e, "Error sending message to the queue.");
            Err(DefaultApiError::InternalServerError.value())
        }
    }
}
