//! Library root for `memory-lane-bot`.
//!
//! Memory-lane-bot turns Slack mentions into "childhood photos":
//! - Receives signed `app_mention` events over the Slack Events API
//! - Wraps the user's description with the LoRA trigger word
//! - Generates the image on Replicate and waits for it to finish
//! - Uploads the result into the thread the mention came from
//!
//! The architecture is built around small client traits for the image
//! provider and the chat platform, so either side can be swapped or mocked.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod server;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::{info, warn};

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the memory-lane-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with image and chat clients
/// - Serves the webhook until shutdown
pub async fn start(config: Config) -> Void {
    info!("Starting memory-lane-bot ...");

    info!("Slack bot token loaded: {}", !config.slack_bot_token.is_empty());
    info!("Replicate API token loaded: {}", !config.replicate_api_token.is_empty());
    info!("Replicate model: {}", config.replicate_model);
    info!("LoRA weights: {}", config.lora_weights_url.as_deref().unwrap_or("<none>"));
    info!("Trigger word: {}", config.trigger_word);

    // Start the crypto provider.
    if crypto::aws_lc_rs::default_provider().install_default().is_err() {
        warn!("A crypto provider was already installed.");
    }

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
