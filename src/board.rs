use async_trait::async_trait;
use dashmap::DashMap;

use crate::data_models::{ChannelId, MessageId, UserId};
use crate::error::{BotError, Result};
use crate::presenter::DisplayPayload;
use crate::target::RenderTarget;

/// Undelivered notices kept per user; older ones are dropped first.
pub const MAX_NOTICES_PER_USER: usize = 20;

#[derive(Debug, Clone)]
pub struct PostedMessage {
    pub channel: ChannelId,
    pub payload: DisplayPayload,
}

/// In-process message board: the render target behind the HTTP host adapter.
#[derive(Default)]
pub struct MessageBoard {
    messages: DashMap<MessageId, PostedMessage>,
    notices: DashMap<UserId, Vec<String>>,
}

impl MessageBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<PostedMessage> {
        self.messages.get(id).map(|m| m.value().clone())
    }

    /// Messages posted to `channel`, in no particular order.
    pub fn in_channel(&self, channel: &str) -> Vec<(MessageId, PostedMessage)> {
        self.messages
            .iter()
            .filter(|m| m.value().channel == channel)
            .map(|m| (m.key().clone(), m.value().clone()))
            .collect()
    }

    pub fn delete(&self, id: &str) -> bool {
        self.messages.remove(id).is_some()
    }

    /// Drains the notices queued for `user`.
    pub fn take_notices(&self, user: &str) -> Vec<String> {
        self.notices
            .remove(user)
            .map(|(_, notices)| notices)
            .unwrap_or_default()
    }
}

#[async_trait]
impl RenderTarget for MessageBoard {
    async fn post(&self, channel: &ChannelId, payload: DisplayPayload) -> Result<MessageId> {
        let id = nanoid::nanoid!();
        self.messages.insert(
            id.clone(),
            PostedMessage {
                channel: channel.clone(),
                payload,
            },
        );
        Ok(id)
    }

    async fn edit(&self, message: &MessageId, payload: DisplayPayload) -> Result<()> {
        match self.messages.get_mut(message) {
            Some(mut posted) => {
                posted.payload = payload;
                Ok(())
            }
            None => Err(BotError::RenderTargetGone(message.clone())),
        }
    }

    async fn notify(&self, user: &UserId, text: &str) -> Result<()> {
        let mut queue = self.notices.entry(user.clone()).or_default();
        queue.push(text.to_string());
        if queue.len() > MAX_NOTICES_PER_USER {
            let overflow = queue.len() - MAX_NOTICES_PER_USER;
            queue.drain(..overflow);
        }
        Ok(())
    }
}
