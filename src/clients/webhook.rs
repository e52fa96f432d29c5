use anyhow::{Context, Error, Result, anyhow};
use reqwest::{Client, StatusCode, Url, header::CONTENT_TYPE};
use tracing::{debug, info};

use crate::{config::Config, models::webhook::CompletionCallback, utils::compute_hmac256};

pub const SIGNATURE_HEADER: &str = "X-GCP-CF-HMAC-SHA256";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Reports completed sends to the send-timestamp webhook.
#[derive(Clone)]
pub struct WebhookClient {
    http_client: Client,
    base_url: Url,
    secret: String,
}

impl WebhookClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(config.webhook_timeout())
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        let base_url = Url::parse(&config.webhook_url)
            .with_context(|| format!("Invalid WEBHOOK_URL {}", config.webhook_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("WEBHOOK_URL {} cannot take a path", base_url));
        }

        info!(base_url = %base_url, "Webhook client initialized");

        Ok(Self {
            http_client,
            base_url,
            secret: config.webhook_secret.clone(),
        })
    }

    pub async fn notify(&self, callback: &CompletionCallback) -> Result<(), Error> {
        let url = self.callback_url(callback)?;
        let body = serde_json::to_vec(callback).context("Failed to serialize webhook body")?;
        let signature = compute_hmac256("POST", &body, JSON_CONTENT_TYPE, &self.secret)?;

        debug!(url = %url, noti_type = callback.notification_category.as_str(), "Calling send-timestamp webhook");

        let response = self
            .http_client
            .post(url.clone())
            .header(SIGNATURE_HEADER, signature)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .with_context(|| format!("Webhook request to {} failed", url))?;

        let status = response.status();
        if status != StatusCode::OK {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Received response status code {}: {}",
                status.as_u16(),
                error_text
            ));
        }

        info!(
            noti_type = callback.notification_category.as_str(),
            show_id = %callback.reference_id,
            "Send timestamp webhook acknowledged"
        );
        Ok(())
    }

    /// Appends the callback path to the base URL, percent-encoding the show
    /// id so a `/`, `?` or `#` in it stays inside its segment.
    fn callback_url(&self, callback: &CompletionCallback) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("WEBHOOK_URL {} cannot take a path", self.base_url))?
            .pop_if_empty()
            .extend(callback.path_segments());
        Ok(url)
    }
}
