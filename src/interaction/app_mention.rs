//! Turns an app mention into a generated image in the same thread.

use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        prompts,
        types::{GenerationRequest, MentionEvent, Reply},
    },
    service::{chat::ChatClient, image::ImageClient},
};

/// What a mention ended up producing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionOutcome {
    /// Nothing to draw; a usage hint was posted.
    Usage,
    /// The image was generated and handed to the chat client.
    Image,
    /// Generation failed and a notice was handed to the chat client.
    Failed,
}

/// Handles an app mention in the background.
///
/// Returns immediately; the spawned task generates the image and replies in the
/// mention's thread.
#[instrument(skip_all)]
pub fn handle_app_mention(event: MentionEvent, config: Config, image: ImageClient, chat: ChatClient) -> JoinHandle<MentionOutcome> {
    tokio::spawn(async move { handle_app_mention_internal(&event, &config, &image, &chat).in_current_span().await })
}

#[instrument(skip_all, fields(channel = %event.channel, thread_ts = %event.reply_thread_ts()))]
async fn handle_app_mention_internal(event: &MentionEvent, config: &Config, image: &ImageClient, chat: &ChatClient) -> MentionOutcome {
    let channel_id = event.channel.as_str();
    let thread_ts = event.reply_thread_ts();

    info!("Received mention from {}: {}", event.user.as_deref().unwrap_or("unknown"), event.text);

    // Pull the description out of the mention.

    let user_prompt = prompts::extract_prompt(&event.text, chat.bot_user_id());

    if user_prompt.is_empty() {
        post(chat, channel_id, thread_ts, &Reply::Text(prompts::USAGE_MESSAGE.to_string())).await;
        return MentionOutcome::Usage;
    }

    // Let the user know this will take a while.

    post(chat, channel_id, thread_ts, &Reply::Text(prompts::WORKING_MESSAGE.to_string())).await;

    // Generate.

    let request = GenerationRequest {
        prompt: prompts::enhance_prompt(&config.trigger_word, &user_prompt),
        trigger_word: config.trigger_word.clone(),
        model: config.replicate_model.clone(),
        lora_weights_url: config.lora_weights_url.clone(),
    };

    info!("Generating with prompt: {}", request.prompt);

    match image.generate(&request).await {
        Ok(image_url) => {
            info!("Image generated: {}", image_url);
            post(chat, channel_id, thread_ts, &Reply::Image { image_url, prompt: user_prompt }).await;
            MentionOutcome::Image
        }
        Err(err) => {
            warn!("Error while generating: {}", err);
            post(chat, channel_id, thread_ts, &Reply::Text(prompts::failure_message(&err))).await;
            MentionOutcome::Failed
        }
    }
}

/// Post a reply; there is nowhere else to report a failure, so it is only logged.
async fn post(chat: &ChatClient, channel_id: &str, thread_ts: &str, reply: &Reply) {
    if let Err(err) = chat.post_reply(channel_id, thread_ts, reply).await {
        error!("Error while posting reply: {}", err);
    }
}
