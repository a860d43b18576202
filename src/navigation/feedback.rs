use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Oldest messages are dropped beyond this.
pub const MAX_MESSAGES: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackMessage {
    pub role: MessageRole,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Assistant conversation shown next to the camera view.
#[derive(Debug, Clone, Default)]
pub struct FeedbackLog {
    messages: VecDeque<FeedbackMessage>,
}

impl FeedbackLog {
    pub fn push(&mut self, role: MessageRole, text: impl Into<String>) -> FeedbackMessage {
        let message = FeedbackMessage {
            role,
            text: text.into(),
            at: Utc::now(),
        };
        if self.messages.len() == MAX_MESSAGES {
            self.messages.pop_front();
        }
        self.messages.push_back(message.clone());
        message
    }

    pub fn assistant(&mut self, text: impl Into<String>) -> FeedbackMessage {
        self.push(MessageRole::Assistant, text)
    }

    pub fn messages(&self) -> Vec<FeedbackMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
