use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{MentorError, Result};
use crate::settings::MentorConfig;

pub const CANNED_REPLIES: [&str; 5] = [
    "Good question! Let me explain that part in more detail.",
    "I'm looking for the answer to that. Just a moment!",
    "Interesting point of view. How about looking at it from another angle too?",
    "If that part feels hard, let's go through it step by step from the basics.",
    "Walking through a real example should make it easier to understand.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    pub sender: Sender,
}

/// Append-only chat log.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn push(&mut self, sender: Sender, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            content: content.into(),
            sender,
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

/// Source of bot replies. The canned table is the only one today; a model-backed
/// strategy slots in here without touching the view controller.
#[async_trait]
pub trait ResponseStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn reply(&self, history: &[ChatMessage], message: &str) -> Result<String>;
}

/// Picks one of [`CANNED_REPLIES`] at random after a fixed delay. The message
/// text is ignored.
pub struct CannedReplies {
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl CannedReplies {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    #[cfg(test)]
    pub fn with_seed(delay: Duration, seed: u64) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl ResponseStrategy for CannedReplies {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn reply(&self, history: &[ChatMessage], message: &str) -> Result<String> {
        debug!(
            history = history.len(),
            chars = message.chars().count(),
            "preparing canned reply"
        );
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let picked = CANNED_REPLIES[..]
            .choose(&mut *self.rng.lock())
            .copied()
            .unwrap_or(CANNED_REPLIES[0]);
        Ok(picked.to_string())
    }
}

pub fn strategy_from_config(cfg: &MentorConfig) -> Result<Arc<dyn ResponseStrategy>> {
    match cfg.strategy.as_str() {
        "canned" => Ok(Arc::new(CannedReplies::new(cfg.reply_delay()))),
        other => Err(MentorError::Config(format!(
            "unknown response strategy '{other}' (available: canned)"
        ))),
    }
}
