use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::push::PushMessage;

#[derive(Debug, Clone, Serialize)]
pub struct FcmRequest {
    pub message: FcmMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmMessage {
    pub token: String,
    pub notification: FcmNotification,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns: Option<ApnsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Clone, Serialize)]
pub struct Aps {
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmResponse {
    pub name: String,
}

impl From<&PushMessage> for FcmRequest {
    fn from(message: &PushMessage) -> Self {
        let content = &message.content;

        let data = if content.data.is_empty() {
            None
        } else {
            Some(content.data.clone())
        };

        Self {
            message: FcmMessage {
                token: message.token.clone(),
                notification: FcmNotification {
                    title: content.title.clone(),
                    body: content.body.clone(),
                },
                data,
                apns: Some(ApnsConfig {
                    payload: ApnsPayload {
                        aps: Aps {
                            category: content.apns_category.clone(),
                        },
                    },
                }),
            },
        }
    }
}
