use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

// Inbound Slack payloads.

/// The outer envelope Slack posts to the events endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEnvelope {
    /// Sent once when the request URL is registered.
    UrlVerification { challenge: String },
    /// A subscribed event.
    EventCallback {
        #[serde(default)]
        event_id: Option<String>,
        event: SlackInnerEvent,
    },
    /// Anything else (e.g., `app_rate_limited`).
    #[serde(other)]
    Other,
}

/// The inner event of an `event_callback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackInnerEvent {
    AppMention(MentionEvent),
    #[serde(other)]
    Other,
}

/// A user invoking the bot in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionEvent {
    pub channel: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
}

impl MentionEvent {
    /// The thread the reply belongs in: the existing thread if there is one, otherwise the mention itself.
    pub fn reply_thread_ts(&self) -> &str {
        self.thread_ts.as_deref().unwrap_or(&self.ts)
    }
}

// Image generation.

/// A single, immutable request for an image.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// The fully enhanced prompt, trigger word included.
    pub prompt: String,
    /// The trigger word baked into the model.
    pub trigger_word: String,
    /// `owner/name` or `owner/name:version`.
    pub model: String,
    /// Optional LoRA weights to apply.
    pub lora_weights_url: Option<String>,
}

/// Lifecycle of a provider-side generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl GenerationStatus {
    /// Whether the job will not change state any more.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

// Outbound replies.

/// What gets posted back into the originating thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A generated image, captioned with the user's own prompt.
    Image { image_url: String, prompt: String },
    /// A plain text notice (usage hints, progress, failures).
    Text(String),
}
