use std::{sync::Arc, time::Instant};

use tracing::{debug, warn};

use crate::{
    clients::provider::NotificationProvider,
    models::health::{HealthReport, ProviderCheck},
};

pub struct HealthChecker {
    provider: Arc<dyn NotificationProvider>,
    max_batch_size: usize,
}

impl HealthChecker {
    pub fn new(provider: Arc<dyn NotificationProvider>, max_batch_size: usize) -> Self {
        Self {
            provider,
            max_batch_size,
        }
    }

    pub async fn check(&self) -> HealthReport {
        HealthReport::new(self.check_provider().await, self.max_batch_size)
    }

    async fn check_provider(&self) -> ProviderCheck {
        let start = Instant::now();

        match self.provider.health_check().await {
            Ok(()) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(latency_ms = elapsed, "Notification provider health check passed");
                ProviderCheck::passed(elapsed)
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Notification provider health check failed");
                ProviderCheck::failed(format!("{:#}", e))
            }
        }
    }
}
