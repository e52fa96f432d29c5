//! Batched multicast dispatch.
//!
//! A broadcast is split into consecutive token batches of at most
//! `max_batch_size`. Every batch is spawned as its own task before any result
//! is awaited, and each task reports exactly one tagged [`BatchReport`] into a
//! single channel sized to the batch count. The aggregator drains that channel
//! in arrival order, so a slow or failing batch never blocks the others.
//!
//! Batch tasks are detached: if the caller is dropped mid-dispatch, the
//! provider calls already in flight still run to completion.

use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Error, Result, anyhow};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::{
    clients::provider::NotificationProvider,
    config::Config,
    models::{
        dispatch::{BatchReport, DispatchOutcome},
        message::{BroadcastNotification, DirectNotification},
        push::{MulticastMessage, PushContent, PushMessage},
    },
};

/// Number of batches needed for `len` tokens.
pub fn batch_count(len: usize, max_batch_size: usize) -> usize {
    len.div_ceil(max_batch_size)
}

/// Partitions `tokens` into consecutive slices of at most `max_batch_size`.
/// An empty input yields no batches.
pub fn split_batches<T>(tokens: &[T], max_batch_size: usize) -> Vec<&[T]> {
    if max_batch_size == 0 {
        return Vec::new();
    }
    tokens.chunks(max_batch_size).collect()
}

pub struct DispatchEngine {
    provider: Arc<dyn NotificationProvider>,
    max_batch_size: usize,
    apns_category: String,
}

impl DispatchEngine {
    pub fn new(
        provider: Arc<dyn NotificationProvider>,
        max_batch_size: usize,
        apns_category: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            max_batch_size,
            apns_category: apns_category.into(),
        }
    }

    pub fn from_config(provider: Arc<dyn NotificationProvider>, config: &Config) -> Self {
        Self::new(provider, config.max_batch_size, config.apns_category.clone())
    }

    fn content(&self, title: &str, body: &str, data: HashMap<String, String>) -> PushContent {
        PushContent {
            title: title.to_string(),
            body: body.to_string(),
            data,
            apns_category: self.apns_category.clone(),
        }
    }

    pub async fn dispatch_broadcast(
        &self,
        notification: &BroadcastNotification,
    ) -> Result<DispatchOutcome, Error> {
        if self.max_batch_size == 0 {
            return Err(anyhow!("Batch size must be at least 1"));
        }

        let tokens = notification.delivery_tokens();
        let total = tokens.len();
        let expected = batch_count(total, self.max_batch_size);

        let mut outcome = DispatchOutcome::new(total);
        if expected == 0 {
            info!(show_id = %notification.show_id, "No recipients, nothing to dispatch");
            return Ok(outcome);
        }

        let batches = split_batches(&tokens, self.max_batch_size);
        debug_assert_eq!(batches.len(), expected);

        let content = self.content(
            &notification.title,
            &notification.body,
            notification.data_payload(),
        );

        let (tx, mut rx) = mpsc::channel::<BatchReport>(expected);

        for (index, batch) in batches.into_iter().enumerate() {
            let message = MulticastMessage {
                tokens: batch.to_vec(),
                content: content.clone(),
            };
            let provider = Arc::clone(&self.provider);
            let tx = tx.clone();

            tokio::spawn(async move {
                let size = message.tokens.len();
                let result = provider
                    .send_multicast(&message)
                    .await
                    .with_context(|| format!("Multicast send for batch {} failed", index));

                // Capacity equals the batch count, so this never waits.
                let _ = tx.send(BatchReport { index, size, result }).await;
            });
        }
        drop(tx);

        let mut reported = vec![false; expected];
        while let Some(report) = rx.recv().await {
            if let Some(seen) = reported.get_mut(report.index) {
                *seen = true;
            }
            if let Err(e) = &report.result {
                error!(batch = report.index, size = report.size, error = ?e, "Batch dispatch failed");
            }
            outcome.record(report);
        }

        // A worker that panicked drops its sender without reporting.
        for (index, _) in reported.iter().enumerate().filter(|(_, seen)| !**seen) {
            let size = batch_size_at(total, self.max_batch_size, index);
            warn!(batch = index, size, "Batch worker exited without reporting");
            outcome.record_error(index, size, "batch worker exited without reporting".to_string());
        }

        info!(
            show_id = %notification.show_id,
            success = outcome.success_count,
            failure = outcome.failure_count,
            total = outcome.total_recipients,
            batches = expected,
            failed_batches = outcome.dispatch_errors.len(),
            status = %outcome.status(),
            "Message sending complete"
        );

        Ok(outcome)
    }

    pub async fn send_direct(&self, notification: &DirectNotification) -> Result<String, Error> {
        let message = PushMessage {
            token: notification.delivery_token.clone(),
            content: self.content(
                &notification.title,
                &notification.body,
                notification.data_payload(),
            ),
        };

        let message_id = self
            .provider
            .send(&message)
            .await
            .with_context(|| format!("Direct send for show {} failed", notification.show_id))?;

        info!(show_id = %notification.show_id, message_id = %message_id, "Direct notification sent");
        Ok(message_id)
    }
}

fn batch_size_at(total: usize, max_batch_size: usize, index: usize) -> usize {
    let start = index * max_batch_size;
    total.saturating_sub(start).min(max_batch_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_count_uses_ceiling() {
        assert_eq!(batch_count(0, 500), 0);
        assert_eq!(batch_count(1, 500), 1);
        assert_eq!(batch_count(500, 500), 1);
        assert_eq!(batch_count(501, 500), 2);
        assert_eq!(batch_count(1200, 500), 3);
    }

    #[test]
    fn test_split_partitions_in_order() {
        for max in 1..=7 {
            for len in 0..=30 {
                let tokens: Vec<usize> = (0..len).collect();
                let batches = split_batches(&tokens, max);

                assert_eq!(batches.len(), batch_count(len, max), "len={} max={}", len, max);
                assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= max));
                assert!(batches.iter().rev().skip(1).all(|b| b.len() == max));
                assert_eq!(batches.concat(), tokens);
            }
        }
    }

    #[test]
    fn test_split_edges() {
        let empty: Vec<String> = Vec::new();
        assert!(split_batches(&empty, 500).is_empty());

        let exact: Vec<u32> = (0..500).collect();
        let batches = split_batches(&exact, 500);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 500);

        let over: Vec<u32> = (0..501).collect();
        let sizes: Vec<usize> = split_batches(&over, 500).iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![500, 1]);
    }

    #[test]
    fn test_split_is_deterministic() {
        let tokens: Vec<u32> = (0..1234).collect();
        assert_eq!(split_batches(&tokens, 500), split_batches(&tokens, 500));
    }

    #[test]
    fn test_batch_size_at() {
        assert_eq!(batch_size_at(1200, 500, 0), 500);
        assert_eq!(batch_size_at(1200, 500, 1), 500);
        assert_eq!(batch_size_at(1200, 500, 2), 200);
    }
}
