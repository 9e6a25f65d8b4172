//! Slack integration for memory-lane-bot.
//!
//! This module provides the outbound half of the Slack conversation:
//! - Resolving the bot's own user ID
//! - Posting text replies into threads
//! - Uploading generated images into threads
//!
//! Inbound events arrive over HTTP and are handled by the `server` module.

use crate::base::{
    config::Config,
    errors::PostError,
    prompts,
    types::{Reply, Res},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument};

use std::{ops::Deref, sync::Arc, time::Duration};

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

/// Used when the image host does not report a content type.
const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/webp";

/// Upper bound for fetching a generated image from the provider's CDN.
const IMAGE_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub bot_token: SlackApiToken,
    pub bot_user_id: String,
    pub client: Arc<FullClient>,
    pub http: reqwest::Client,
}

impl Deref for SlackChatClient {
    type Target = FullClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        // Initialize tokens.

        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            bot_token,
            bot_user_id,
            client,
            http: reqwest::Client::builder().timeout(IMAGE_DOWNLOAD_TIMEOUT).build()?,
        })
    }

    /// Post a plain text message in a thread.
    #[instrument(skip(self))]
    async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Result<(), PostError> {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message).with_thread_ts(SlackTs(thread_ts.to_string()));

        let session = self.client.open_session(&self.bot_token);

        session.chat_post_message(&request).await?;

        Ok(())
    }

    /// Download the generated image and upload it as a file in a thread.
    #[instrument(skip(self))]
    async fn upload_image(&self, channel_id: &str, thread_ts: &str, image_url: &str, prompt: &str) -> Result<(), PostError> {
        // Download the image.

        let (bytes, content_type) = download_image(&self.http, image_url).await?;

        // Upload it through the external upload flow.

        let session = self.client.open_session(&self.bot_token);

        let upload = session
            .get_upload_url_external(&SlackApiFilesGetUploadUrlExternalRequest::new(prompts::IMAGE_FILENAME.to_string(), bytes.len()))
            .await?;

        session
            .files_upload_via_url(&SlackApiFilesUploadViaUrlRequest::new(upload.upload_url, bytes, content_type))
            .await?;

        let file = SlackApiFilesComplete::new(upload.file_id).with_title(prompts::IMAGE_TITLE.to_string());
        let request = SlackApiFilesCompleteUploadExternalRequest::new(vec![file])
            .with_channel_id(SlackChannelId(channel_id.to_string()))
            .with_thread_ts(SlackTs(thread_ts.to_string()))
            .with_initial_comment(prompts::image_caption(prompt));

        session.files_complete_upload_external(&request).await?;

        info!("Image posted to Slack.");

        Ok(())
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn post_reply(&self, channel_id: &str, thread_ts: &str, reply: &Reply) -> Result<(), PostError> {
        match reply {
            Reply::Text(text) => self.send_message(channel_id, thread_ts, text).await,
            Reply::Image { image_url, prompt } => self.upload_image(channel_id, thread_ts, image_url, prompt).await,
        }
    }
}

// Helpers.

/// Fetch an image, returning its bytes and content type.
async fn download_image(http: &reqwest::Client, image_url: &str) -> Result<(Vec<u8>, String), PostError> {
    let response = http.get(image_url).send().await?.error_for_status()?;
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_IMAGE_CONTENT_TYPE)
        .to_string();
    let bytes = response.bytes().await?.to_vec();

    debug!("Downloaded {} bytes ({})", bytes.len(), content_type);

    Ok((bytes, content_type))
}

// Tests.
