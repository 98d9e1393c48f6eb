use async_trait::async_trait;

use crate::data_models::{ChannelId, MessageId, UserId};
use crate::error::Result;
use crate::presenter::DisplayPayload;

/// Where replies are rendered: the chat host, or anything standing in for it.
#[async_trait]
pub trait RenderTarget: Send + Sync {
    /// Posts a new reply and returns its identity.
    async fn post(&self, channel: &ChannelId, payload: DisplayPayload) -> Result<MessageId>;

    /// Replaces a reply in place. Fails with `RenderTargetGone` once the reply is gone.
    async fn edit(&self, message: &MessageId, payload: DisplayPayload) -> Result<()>;

    /// Ephemeral notice visible only to `user`.
    async fn notify(&self, user: &UserId, text: &str) -> Result<()>;
}
