use std::{
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use push_fanout::{
    clients::provider::NotificationProvider,
    config::Config,
    models::{
        message::{BroadcastNotification, DirectNotification, Recipient},
        push::{BatchResponse, MulticastMessage, PushMessage},
    },
};

/// In-memory provider. Tokens prefixed `bad-` are rejected individually; a
/// batch containing `failing_token` fails as a whole.
#[derive(Default)]
pub struct FakeProvider {
    pub multicast_calls: Mutex<Vec<MulticastMessage>>,
    pub direct_calls: Mutex<Vec<PushMessage>>,
    pub failing_token: Option<String>,
    pub panicking_token: Option<String>,
    pub slow_token: Option<String>,
    pub fail_direct: bool,
    pub fail_health: bool,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeProvider {
    pub fn multicast_sizes(&self) -> Vec<usize> {
        let mut calls = self.multicast_calls.lock().unwrap().clone();
        calls.sort_by_key(|m| token_index(&m.tokens[0]));
        calls.iter().map(|m| m.tokens.len()).collect()
    }

    pub fn multicast_tokens_in_order(&self) -> Vec<String> {
        let mut calls = self.multicast_calls.lock().unwrap().clone();
        calls.sort_by_key(|m| token_index(&m.tokens[0]));
        calls.into_iter().flat_map(|m| m.tokens).collect()
    }
}

fn token_index(token: &str) -> usize {
    token
        .rsplit('-')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(usize::MAX)
}

#[async_trait]
impl NotificationProvider for FakeProvider {
    async fn send(&self, message: &PushMessage) -> Result<String, Error> {
        self.direct_calls.lock().unwrap().push(message.clone());

        if self.fail_direct {
            return Err(anyhow!("provider unavailable"));
        }
        Ok(format!("projects/test/messages/{}", message.token))
    }

    async fn send_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse, Error> {
        self.multicast_calls.lock().unwrap().push(message.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let contains = |needle: &Option<String>| {
            needle
                .as_ref()
                .is_some_and(|t| message.tokens.iter().any(|token| token == t))
        };

        if contains(&self.slow_token) {
            tokio::time::sleep(Duration::from_millis(100)).await;
        } else {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if contains(&self.panicking_token) {
            panic!("worker blew up");
        }
        if contains(&self.failing_token) {
            return Err(anyhow!("transport error: connection reset"));
        }

        let failure_count = message
            .tokens
            .iter()
            .filter(|t| t.starts_with("bad-"))
            .count();

        Ok(BatchResponse {
            success_count: message.tokens.len() - failure_count,
            failure_count,
        })
    }

    async fn health_check(&self) -> Result<(), Error> {
        if self.fail_health {
            return Err(anyhow!("no credentials"));
        }
        Ok(())
    }
}

pub fn test_config(webhook_url: &str) -> Config {
    Config::from_iter(vec![
        ("WEBHOOK_URL".to_string(), webhook_url.to_string()),
        ("WEBHOOK_SECRET".to_string(), "top-secret".to_string()),
        ("FCM_PROJECT_ID".to_string(), "muselive".to_string()),
        ("WEBHOOK_TIMEOUT_SECONDS".to_string(), "2".to_string()),
    ])
    .expect("test config should load")
}

pub fn tokens(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("token-{}", i)).collect()
}

pub fn broadcast(tokens: Vec<String>) -> BroadcastNotification {
    BroadcastNotification {
        sender_id: "performer-1".to_string(),
        title: "Show starting".to_string(),
        body: "Your favourite performer is live".to_string(),
        category: "scheduled-show".to_string(),
        recipients: tokens
            .into_iter()
            .enumerate()
            .map(|(i, delivery_token)| Recipient {
                id: i as i64,
                display_name: format!("fan-{}", i),
                delivery_token,
            })
            .collect(),
        hall_id: "hall-7".to_string(),
        show_id: "show-42".to_string(),
    }
}

pub fn direct(token: &str) -> DirectNotification {
    DirectNotification {
        sender_id: "performer-1".to_string(),
        title: "Your show".to_string(),
        body: "Starts in 10 minutes".to_string(),
        category: "my-show".to_string(),
        delivery_token: token.to_string(),
        hall_id: "hall-7".to_string(),
        show_id: "show-43".to_string(),
    }
}
