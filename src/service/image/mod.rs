pub mod replicate;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{errors::GenerationError, types::GenerationRequest};

// Traits.

/// Generic image generation trait that clients must implement.
///
/// This trait defines the one thing the bot needs from an image provider:
/// turn a prompt into an image reference. Implementing this trait allows
/// different hosted providers to be used with the memory-lane-bot.
#[async_trait]
pub trait GenericImageClient: Send + Sync + 'static {
    /// Generate an image and wait for it to finish.
    ///
    /// Submits a generation job and waits until the job reaches a terminal state
    /// or the configured ceiling elapses. Returns the URL of the resulting image.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

// Structs.

/// Image client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ImageClient {
    inner: Arc<dyn GenericImageClient>,
}

impl Deref for ImageClient {
    type Target = dyn GenericImageClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ImageClient {
    pub fn new(inner: Arc<dyn GenericImageClient>) -> Self {
        Self { inner }
    }
}
