//! Error kinds that the request pipeline handles locally.
//!
//! None of these ever escape a request: signature failures turn into a 401,
//! generation failures turn into a notice in the thread, and post failures are
//! logged.

use std::time::Duration;

use slack_morphism::errors::SlackClientError;
use thiserror::Error;

/// An inbound request could not be authenticated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Missing `{0}` header")]
    MissingHeader(&'static str),

    #[error("Request timestamp `{0}` is not a unix timestamp")]
    MalformedTimestamp(String),

    #[error("Request timestamp is outside the replay window ({age_secs}s from now)")]
    Stale { age_secs: i64 },

    #[error("Request signature does not match")]
    Mismatch,
}

/// The image provider rejected, failed, or did not finish a job.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to reach the image provider: {0}")]
    Http(String),

    #[error("Image provider returned {status}: {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Image generation failed: {0}")]
    Failed(String),

    #[error("Image generation was canceled")]
    Canceled,

    #[error("Image provider returned no usable output: {0}")]
    MissingOutput(String),

    #[error("Image generation timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

impl From<reqwest::Error> for GenerationError {
    fn from(error: reqwest::Error) -> Self {
        GenerationError::Http(error.to_string())
    }
}

/// A reply could not be delivered to the chat provider.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("Failed to access Slack API: {0}")]
    Api(String),

    #[error("Failed to download generated image: {0}")]
    Download(String),
}

impl From<SlackClientError> for PostError {
    fn from(error: SlackClientError) -> Self {
        PostError::Api(error.to_string())
    }
}

impl From<reqwest::Error> for PostError {
    fn from(error: reqwest::Error) -> Self {
        PostError::Download(error.to_string())
    }
}
