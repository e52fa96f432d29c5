use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use push_fanout::{
    api::{AppState, run_api_server},
    clients::{fcm::FcmClient, webhook::WebhookClient},
    config::Config,
    utils::init_tracing,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;
    init_tracing();

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    let provider = Arc::new(FcmClient::new(&config).await?);
    let webhook_client = WebhookClient::new(&config)?;
    let state = Arc::new(AppState::new(provider, webhook_client, &config));

    info!(
        port = config.listen_port(),
        max_batch_size = config.max_batch_size,
        "Configuration validated. Server is ready to start."
    );

    run_api_server(config, state).await
}
