//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc, time::Duration};

use serde::Deserialize;

use super::types::Res;

/// Default Replicate model (flux-dev with LoRA support).
fn default_replicate_model() -> String {
    "lucataco/flux-dev-lora:a22c463f11808638ad5e2ebd582e07a469031f48dd567366fb4c6fdab91d614d".to_string()
}

/// Default Replicate API base URL.
fn default_replicate_api_base() -> String {
    "https://api.replicate.com/v1".to_string()
}

/// Default trigger word the LoRA was trained on.
fn default_trigger_word() -> String {
    "VISHYFACE".to_string()
}

/// Default address for the HTTP listener.
fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

/// Default ceiling for a single generation job, in seconds.
fn default_generation_timeout_secs() -> u64 {
    120
}

/// Default delay between prediction status polls, in milliseconds.
fn default_poll_interval_ms() -> u64 {
    1000
}

/// Default replay-protection window for signed requests, in seconds.
fn default_signature_max_age_secs() -> u64 {
    300
}

/// Configuration for the memory-lane-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Slack signing secret (`SLACK_SIGNING_SECRET`).
    pub slack_signing_secret: String,
    /// Replicate API token (`REPLICATE_API_TOKEN`).
    pub replicate_api_token: String,
    /// Replicate model, either `owner/name` or `owner/name:version` (`REPLICATE_MODEL`).
    #[serde(default = "default_replicate_model")]
    pub replicate_model: String,
    /// Replicate API base URL (`REPLICATE_API_BASE`).
    #[serde(default = "default_replicate_api_base")]
    pub replicate_api_base: String,
    /// Trained LoRA weights passed to the model as `hf_lora` (`LORA_WEIGHTS_URL`).
    #[serde(default)]
    pub lora_weights_url: Option<String>,
    /// Token the LoRA was trained on; injected into every prompt (`TRIGGER_WORD`).
    #[serde(default = "default_trigger_word")]
    pub trigger_word: String,
    /// Address the HTTP server binds to (`BIND_ADDRESS`).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Generation ceiling in seconds (`GENERATION_TIMEOUT_SECS`).
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
    /// Prediction poll interval in milliseconds (`POLL_INTERVAL_MS`).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Maximum age of a signed Slack request in seconds (`SIGNATURE_MAX_AGE_SECS`).
    #[serde(default = "default_signature_max_age_secs")]
    pub signature_max_age_secs: u64,
}

impl ConfigInner {
    /// The generation ceiling as a [`Duration`].
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// The poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        // Environment wins over the file.
        cfg = cfg.add_source(config::Environment::default());

        let inner: ConfigInner = cfg.build()?.try_deserialize()?;
        let result = Config::from(inner);

        result.validate()?;

        Ok(result)
    }

    /// Check the loaded values for obvious mistakes.
    pub fn validate(&self) -> Res<()> {
        if self.slack_bot_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Slack bot token must be set."));
        }

        if self.slack_signing_secret.trim().is_empty() {
            return Err(anyhow::anyhow!("Slack signing secret must be set."));
        }

        if self.replicate_api_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Replicate API token must be set."));
        }

        if self.trigger_word.trim().is_empty() {
            return Err(anyhow::anyhow!("Trigger word must not be empty."));
        }

        if self.generation_timeout_secs < 1 {
            return Err(anyhow::anyhow!("Generation timeout must be at least 1 second."));
        }

        if self.poll_interval_ms < 100 {
            return Err(anyhow::anyhow!("Poll interval must be at least 100 milliseconds."));
        }

        Ok(())
    }
}
