//! Runtime services and shared state for the memory-lane-bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    server,
    service::{chat::ChatClient, image::ImageClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the image client, chat client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The image generation client instance.
    pub image: ImageClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the image client.
        let image = ImageClient::replicate(&config)?;

        // Initialize the chat client.
        let chat = ChatClient::slack(&config).await?;

        Ok(Self { config, image, chat })
    }

    /// Serve the webhook until shutdown.
    pub async fn start(&self) -> Void {
        server::serve(self.clone()).await
    }
}
