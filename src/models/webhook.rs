use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    ScheduledShow,
    MyShow,
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::ScheduledShow => "scheduled-show",
            NotificationKind::MyShow => "my-show",
        }
    }
}

/// Body reported to the send-timestamp webhook once a send has completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCallback {
    #[serde(rename = "notiType")]
    pub notification_category: NotificationKind,

    #[serde(rename = "showId")]
    pub reference_id: String,
}

impl CompletionCallback {
    pub fn new(notification_category: NotificationKind, reference_id: impl Into<String>) -> Self {
        Self {
            notification_category,
            reference_id: reference_id.into(),
        }
    }

    /// Unescaped path segments below the webhook base URL:
    /// `noti/{notiType}/send-timestamp/{showId}`.
    pub fn path_segments(&self) -> [&str; 4] {
        [
            "noti",
            self.notification_category.as_str(),
            "send-timestamp",
            &self.reference_id,
        ]
    }
}
