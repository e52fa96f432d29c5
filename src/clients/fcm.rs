use std::sync::Arc;

use anyhow::{Context, Error, Result, anyhow};
use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use gcp_auth::TokenProvider;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::{
    clients::provider::NotificationProvider,
    config::Config,
    models::{
        fcm::{FcmRequest, FcmResponse},
        push::{BatchResponse, MulticastMessage, PushMessage},
    },
};

const FCM_SCOPES: &[&str] = &["https://www.googleapis.com/auth/firebase.messaging"];

pub struct FcmClient {
    http_client: Client,
    token_provider: Arc<dyn TokenProvider>,
    send_url: String,
    multicast_concurrency: usize,
}

impl FcmClient {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let token_provider = gcp_auth::provider()
            .await
            .context("Failed to initialize GCP credentials")?;

        Ok(Self::with_token_provider(config, token_provider))
    }

    pub fn with_token_provider(config: &Config, token_provider: Arc<dyn TokenProvider>) -> Self {
        info!(project_id = %config.fcm_project_id, "FCM client initialized");

        Self {
            http_client: Client::new(),
            token_provider,
            send_url: format!(
                "{}/v1/projects/{}/messages:send",
                config.fcm_base_url.trim_end_matches('/'),
                config.fcm_project_id
            ),
            multicast_concurrency: config.multicast_concurrency,
        }
    }

    async fn access_token(&self) -> Result<String, Error> {
        let token = self
            .token_provider
            .token(FCM_SCOPES)
            .await
            .context("Failed to obtain FCM access token")?;
        Ok(token.as_str().to_string())
    }

    async fn send_once(&self, access_token: &str, message: &PushMessage) -> Result<String, Error> {
        let request = FcmRequest::from(message);

        let response = self
            .http_client
            .post(&self.send_url)
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .context("FCM request failed")?;

        if response.status().is_success() {
            let body: FcmResponse = response
                .json()
                .await
                .context("Failed to parse FCM response")?;
            Ok(body.name)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            Err(anyhow!("FCM returned {}: {}", status, error_text))
        }
    }
}

#[async_trait]
impl NotificationProvider for FcmClient {
    async fn send(&self, message: &PushMessage) -> Result<String, Error> {
        debug!(device_token = %message.token, "Sending FCM push notification");

        let access_token = self.access_token().await?;
        let message_id = self.send_once(&access_token, message).await?;

        info!(message_id = %message_id, "FCM push notification sent successfully");
        Ok(message_id)
    }

    async fn send_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse, Error> {
        // The v1 API has no multicast endpoint; every token gets its own send
        // under one shared access token.
        let access_token = self.access_token().await?;

        let results: Vec<bool> = stream::iter(message.tokens.iter().cloned())
            .map(|token| {
                let push = message.for_token(&token);
                let access_token = access_token.as_str();
                async move {
                    match self.send_once(access_token, &push).await {
                        Ok(_) => true,
                        Err(e) => {
                            debug!(device_token = %push.token, error = %e, "FCM token rejected");
                            false
                        }
                    }
                }
            })
            .buffer_unordered(self.multicast_concurrency)
            .collect()
            .await;

        let success_count = results.iter().filter(|ok| **ok).count();
        let response = BatchResponse {
            success_count,
            failure_count: results.len() - success_count,
        };

        if response.failure_count > 0 {
            warn!(
                success = response.success_count,
                failure = response.failure_count,
                "FCM multicast finished with rejected tokens"
            );
        }

        Ok(response)
    }

    async fn health_check(&self) -> Result<(), Error> {
        self.access_token().await.map(|_| ())
    }
}
