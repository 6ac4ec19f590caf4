use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Agent => write!(f, "agent"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub sent_at: DateTime<Utc>,
}

/// Append-only message log written by the orchestrator and read by the UI.
pub trait ConversationSink: Send + Sync {
    fn append(&self, text: &str, sender: Sender) -> Message;
}

pub struct ConversationLog {
    messages: RwLock<Vec<Message>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        match self.messages.read() {
            Ok(list) => list.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages appended after the first `offset` entries.
    pub fn since(&self, offset: usize) -> Vec<Message> {
        match self.messages.read() {
            Ok(list) => list.iter().skip(offset).cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().skip(offset).cloned().collect(),
        }
    }

    pub fn last(&self) -> Option<Message> {
        match self.messages.read() {
            Ok(list) => list.last().cloned(),
            Err(poisoned) => poisoned.into_inner().last().cloned(),
        }
    }

    pub fn len(&self) -> usize {
        match self.messages.read() {
            Ok(list) => list.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSink for ConversationLog {
    fn append(&self, text: &str, sender: Sender) -> Message {
        let mut list = match self.messages.write() {
            Ok(list) => list,
            Err(poisoned) => poisoned.into_inner(),
        };
        let message = Message {
            id: list.len() as u64 + 1,
            text: text.to_string(),
            sender,
            sent_at: Utc::now(),
        };
        list.push(message.clone());
        message
    }
}
