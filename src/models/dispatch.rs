use std::fmt::{Display, Formatter};

use anyhow::Error;

use crate::models::{push::BatchResponse, status::DeliveryStatus};

/// What one batch worker reports back to the aggregator.
#[derive(Debug)]
pub struct BatchReport {
    pub index: usize,
    pub size: usize,
    pub result: Result<BatchResponse, Error>,
}

/// A batch whose provider call failed outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    pub index: usize,
    pub size: usize,
    pub message: String,
}

impl Display for BatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "batch {} ({} tokens) failed: {}",
            self.index, self.size, self.message
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub success_count: usize,
    pub failure_count: usize,
    pub total_recipients: usize,
    pub dispatch_errors: Vec<BatchError>,
}

impl DispatchOutcome {
    pub fn new(total_recipients: usize) -> Self {
        Self {
            total_recipients,
            ..Default::default()
        }
    }

    pub fn record(&mut self, report: BatchReport) {
        match report.result {
            Ok(response) => {
                self.success_count += response.success_count;
                self.failure_count += response.failure_count;
            }
            Err(e) => self.record_error(report.index, report.size, format!("{:#}", e)),
        }
    }

    pub fn record_error(&mut self, index: usize, size: usize, message: String) {
        self.dispatch_errors.push(BatchError {
            index,
            size,
            message,
        });
    }

    /// Tokens that never got a per-token verdict because their batch failed.
    pub fn undelivered_tokens(&self) -> usize {
        self.dispatch_errors.iter().map(|e| e.size).sum()
    }

    pub fn status(&self) -> DeliveryStatus {
        if self.dispatch_errors.is_empty() && self.failure_count == 0 {
            DeliveryStatus::Success
        } else {
            DeliveryStatus::PartialFailure
        }
    }
}
