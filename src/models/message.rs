use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Missing fields decode to their zero value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipient {
    pub id: i64,

    #[serde(rename = "alias")]
    pub display_name: String,

    #[serde(rename = "fcmToken")]
    pub delivery_token: String,
}

/// Where a notification points in the app: the hall and the show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContext {
    pub hall_id: String,
    pub show_id: String,
}

/// Scheduled-show notification fanned out to every follower of a performer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BroadcastNotification {
    #[serde(rename = "performerId")]
    pub sender_id: String,
    pub title: String,
    pub body: String,
    pub category: String,

    /// `null` and a missing list both mean no recipients.
    #[serde(rename = "followers", deserialize_with = "null_as_empty")]
    pub recipients: Vec<Recipient>,

    pub hall_id: String,
    pub show_id: String,
}

/// Notification addressed to a single device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectNotification {
    #[serde(rename = "performerId")]
    pub sender_id: String,
    pub title: String,
    pub body: String,
    pub category: String,

    #[serde(rename = "fcmToken")]
    pub delivery_token: String,

    pub hall_id: String,
    pub show_id: String,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn data_payload(sender_id: &str, hall_id: &str, show_id: &str) -> HashMap<String, String> {
    HashMap::from([
        ("performerId".to_string(), sender_id.to_string()),
        ("hallId".to_string(), hall_id.to_string()),
        ("showId".to_string(), show_id.to_string()),
    ])
}

impl BroadcastNotification {
    pub fn data_payload(&self) -> HashMap<String, String> {
        data_payload(&self.sender_id, &self.hall_id, &self.show_id)
    }

    pub fn context(&self) -> NotificationContext {
        NotificationContext {
            hall_id: self.hall_id.clone(),
            show_id: self.show_id.clone(),
        }
    }

    pub fn delivery_tokens(&self) -> Vec<String> {
        self.recipients
            .iter()
            .map(|r| r.delivery_token.clone())
            .collect()
    }
}

impl DirectNotification {
    pub fn data_payload(&self) -> HashMap<String, String> {
        data_payload(&self.sender_id, &self.hall_id, &self.show_id)
    }

    pub fn context(&self) -> NotificationContext {
        NotificationContext {
            hall_id: self.hall_id.clone(),
            show_id: self.show_id.clone(),
        }
    }
}
