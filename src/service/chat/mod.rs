pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{errors::PostError, types::Reply};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for replying on chat platforms
/// like Slack. Implementing this trait allows different chat services to be used
/// with the memory-lane-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Returns the unique identifier for the bot in the chat platform,
    /// which is used to strip the bot's own mention from prompts.
    fn bot_user_id(&self) -> &str;

    /// Post a reply into a channel thread.
    ///
    /// Text replies are posted as messages; image replies are uploaded as files
    /// with the user's prompt as the caption.
    async fn post_reply(&self, channel_id: &str, thread_ts: &str, reply: &Reply) -> Result<(), PostError>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
