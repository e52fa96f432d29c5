use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of asking the push provider for credentials.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderCheck {
    pub status: HealthStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderCheck {
    pub fn passed(latency_ms: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            error: Some(error),
        }
    }
}

/// Body of `GET /health`. The service is only as healthy as its provider;
/// the webhook is not checked since its failures never fail a send.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
    pub max_batch_size: usize,
    pub provider: ProviderCheck,
}

impl HealthReport {
    pub fn new(provider: ProviderCheck, max_batch_size: usize) -> Self {
        Self {
            status: provider.status,
            checked_at: Utc::now(),
            max_batch_size,
            provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_follows_provider_status() {
        let report = HealthReport::new(ProviderCheck::failed("no credentials".to_string()), 500);
        assert_eq!(report.status, HealthStatus::Unhealthy);

        let report = HealthReport::new(ProviderCheck::passed(12), 500);
        assert_eq!(report.status, HealthStatus::Healthy);
    }

    #[test]
    fn test_report_omits_empty_fields() {
        let report = HealthReport::new(ProviderCheck::passed(3), 250);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["status"], "healthy");
        assert_eq!(value["max_batch_size"], 250);
        assert_eq!(value["provider"]["latency_ms"], 3);
        assert!(value["provider"].get("error").is_none());
    }
}
