use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{errors::QueueError, queue_service::QueueService};

/// Test double with switches for each failure the handler has to cope with.
#[derive(Debug, Default)]
pub struct InMemoryQueueService {
    pub queues: RwLock<HashMap<String, Vec<String>>>,
    pub create_calls: AtomicUsize,
    pub fail_create: bool,
    pub fail_exists: bool,
    pub fail_send: bool,
    /// Makes `queue_exists` lie after a successful create.
    pub never_exists: bool,
}

impl InMemoryQueueService {
    pub async fn messages(&self, queue_name: &str) -> Vec<String> {
        self.queues
            .read()
            .await
            .get(queue_name)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl QueueService for InMemoryQueueService {
    async fn create_queue_if_not_exists(&self, queue_name: &str) -> Result<(), QueueError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_create {
            return Err(QueueError::UnexpectedStatus {
                status: 403,
                body: "AuthenticationFailed".to_string(),
            });
        }

        self.queues
            .write()
            .await
            .entry(queue_name.to_string())
            .or_default();

        Ok(())
    }

    async fn queue_exists(&self, queue_name: &str) -> Result<bool, QueueError> {
        if self.fail_exists {
            return Err(QueueError::UnexpectedStatus {
                status: 500,
                body: "InternalError".to_string(),
            });
        }

        if self.never_exists {
            return Ok(false);
        }

        Ok(self.queues.read().await.contains_key(queue_name))
    }

    async fn send_message(&self, queue_name: &str, message: &str) -> Result<(), QueueError> {
        if self.fail_send {
            return Err(QueueError::UnexpectedStatus {
                status: 503,
                body: "ServerBusy: the server is currently unable to receive requests".to_string(),
            });
        }

        match self.queues.write().await.get_mut(queue_name) {
            Some(messages) => {
                messages.push(message.to_string());
                Ok(())
            }
            None => Err(QueueError::UnexpectedStatus {
                status: 404,
                body: "QueueNotFound".to_string(),
            }),
        }
    }
}
