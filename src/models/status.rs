use std::fmt::{Display, Formatter, Result};

/// Terminal state of a dispatch that returned an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Success,
    PartialFailure,
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            DeliveryStatus::Success => write!(f, "success"),
            DeliveryStatus::PartialFailure => write!(f, "partial_failure"),
        }
    }
}
