use anyhow::{Error, Result};
use async_trait::async_trait;

use crate::models::push::{BatchResponse, MulticastMessage, PushMessage};

/// Push delivery backend. One instance is built at startup and shared by
/// every in-flight dispatch, so implementations must be safe for concurrent use.
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Sends to a single token and returns the provider's message id.
    async fn send(&self, message: &PushMessage) -> Result<String, Error>;

    /// Sends to every token in `message.tokens`. `Err` means the whole batch
    /// failed; per-token rejections are counted in the response instead.
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse, Error>;

    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}
