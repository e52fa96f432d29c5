use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PushContent {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
    pub apns_category: String,
}

/// A push addressed to one device token.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub token: String,
    pub content: PushContent,
}

/// A push addressed to a bounded list of device tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct MulticastMessage {
    pub tokens: Vec<String>,
    pub content: PushContent,
}

impl MulticastMessage {
    pub fn for_token(&self, token: &str) -> PushMessage {
        PushMessage {
            token: token.to_string(),
            content: self.content.clone(),
        }
    }
}

/// Per-token delivery counts for one multicast call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResponse {
    pub success_count: usize,
    pub failure_count: usize,
}
