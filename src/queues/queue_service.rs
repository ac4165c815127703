use async_trait::async_trait;

use super::errors::QueueError;

/// The slice of a queue backend the intake handler needs.
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Creates the queue, treating an already existing queue as success.
    async fn create_queue_if_not_exists(&self, queue_name: &str) -> Result<(), QueueError>;

    async fn queue_exists(&self, queue_name: &str) -> Result<bool, QueueError>;

    async fn send_message(&self, queue_name: &str, message: &str) -> Result<(), QueueError>;
}
