//! Replicate-backed image generation.
//!
//! Uses the HTTP predictions API directly: create a prediction, then poll it
//! until it reaches a terminal state or the generation ceiling elapses.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::base::{
    config::Config,
    errors::GenerationError,
    types::{GenerationRequest, GenerationStatus, Res},
};

use super::{GenericImageClient, ImageClient};

/// Upper bound for any single HTTP call to the provider.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Extra methods on `ImageClient` applied by the replicate implementation.

impl ImageClient {
    pub fn replicate(config: &Config) -> Res<Self> {
        let client = ReplicateImageClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Wire types.

/// A prediction as returned by the create and get endpoints.
#[derive(Debug, Clone, Deserialize)]
struct Prediction {
    id: String,
    status: GenerationStatus,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Where to send a create-prediction call for a given model identifier.
#[derive(Debug, PartialEq, Eq)]
struct PredictionTarget {
    path: String,
    version: Option<String>,
}

// Specific implementations.

/// Replicate image client implementation.
#[derive(Clone)]
pub struct ReplicateImageClient {
    http: reqwest::Client,
    api_base: String,
    api_token: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl ReplicateImageClient {
    /// Create a new Replicate image client.
    #[instrument(name = "ReplicateImageClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            api_base: config.replicate_api_base.trim_end_matches('/').to_string(),
            api_token: config.replicate_api_token.clone(),
            timeout: config.generation_timeout(),
            poll_interval: config.poll_interval(),
        })
    }

    /// Create a prediction for the request.
    #[instrument(name = "ReplicateImageClient::create_prediction", skip_all)]
    async fn create_prediction(&self, request: &GenerationRequest) -> Result<Prediction, GenerationError> {
        let target = prediction_target(&request.model);
        let input = build_input(request);

        let body = match &target.version {
            Some(version) => json!({ "version": version, "input": input }),
            None => json!({ "input": input }),
        };

        let url = format!("{}{}", self.api_base, target.path);
        debug!("Creating prediction at {}", url);

        let response = self.http.post(&url).bearer_auth(&self.api_token).json(&body).send().await?;

        read_prediction(response).await
    }

    /// Fetch the current state of a prediction.
    async fn get_prediction(&self, id: &str) -> Result<Prediction, GenerationError> {
        let url = format!("{}/predictions/{}", self.api_base, id);
        let response = self.http.get(&url).bearer_auth(&self.api_token).send().await?;

        read_prediction(response).await
    }

    /// Ask the provider to stop a prediction we are no longer waiting for.
    async fn cancel_prediction(&self, id: &str) {
        let url = format!("{}/predictions/{}/cancel", self.api_base, id);

        match self.http.post(&url).bearer_auth(&self.api_token).send().await {
            Ok(r) if r.status().is_success() => info!("Canceled prediction {}", id),
            Ok(r) => warn!("Cancel of prediction {} returned {}", id, r.status()),
            Err(e) => warn!("Cancel of prediction {} failed: {}", id, e),
        }
    }

    /// Poll until the prediction is terminal.
    async fn wait_for(&self, mut prediction: Prediction) -> Result<Prediction, GenerationError> {
        while !prediction.status.is_terminal() {
            tokio::time::sleep(self.poll_interval).await;
            prediction = self.get_prediction(&prediction.id).await?;
            debug!("Prediction {} is {:?}", prediction.id, prediction.status);
        }

        Ok(prediction)
    }
}

#[async_trait]
impl GenericImageClient for ReplicateImageClient {
    #[instrument(skip_all)]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        // Submission and polling share one ceiling.
        let deadline = Instant::now() + self.timeout;

        let prediction = match tokio::time::timeout_at(deadline, self.create_prediction(request)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Prediction was not created within {:?}", self.timeout);
                return Err(GenerationError::TimedOut(self.timeout));
            }
        };
        let id = prediction.id.clone();

        info!("Created prediction {} ({:?})", id, prediction.status);

        let prediction = match tokio::time::timeout_at(deadline, self.wait_for(prediction)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Prediction {} did not finish within {:?}", id, self.timeout);
                self.cancel_prediction(&id).await;
                return Err(GenerationError::TimedOut(self.timeout));
            }
        };

        match prediction.status {
            GenerationStatus::Succeeded => {
                let output = prediction.output.unwrap_or(Value::Null);
                extract_output_url(&output).ok_or_else(|| GenerationError::MissingOutput(output.to_string()))
            }
            GenerationStatus::Canceled => Err(GenerationError::Canceled),
            _ => Err(GenerationError::Failed(describe_error(prediction.error.as_ref()))),
        }
    }
}

// Helpers.

/// Map a model identifier onto the create-prediction endpoint.
///
/// `owner/name:version` and bare version ids go to `/predictions`; `owner/name`
/// goes to the model's own endpoint, which runs its latest version.
fn prediction_target(model: &str) -> PredictionTarget {
    match model.split_once(':') {
        Some((_, version)) => PredictionTarget {
            path: "/predictions".to_string(),
            version: Some(version.to_string()),
        },
        None if model.contains('/') => PredictionTarget {
            path: format!("/models/{model}/predictions"),
            version: None,
        },
        None => PredictionTarget {
            path: "/predictions".to_string(),
            version: Some(model.to_string()),
        },
    }
}

/// Build the model input for a request.
fn build_input(request: &GenerationRequest) -> Value {
    let mut input = json!({
        "prompt": request.prompt,
        "num_outputs": 1,
        "aspect_ratio": "1:1",
        "output_format": "webp",
        "guidance_scale": 3.5,
        "num_inference_steps": 28,
    });

    if let Some(lora) = request.lora_weights_url.as_deref().filter(|l| !l.is_empty()) {
        input["hf_lora"] = Value::String(lora.to_string());
    }

    input
}

/// Take the first image URL out of a prediction output.
fn extract_output_url(output: &Value) -> Option<String> {
    match output {
        Value::String(url) => Some(url.clone()),
        Value::Array(items) => items.iter().find_map(|i| i.as_str()).map(str::to_string),
        _ => None,
    }
}

/// Render the provider's error field into something readable.
fn describe_error(error: Option<&Value>) -> String {
    match error {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown error".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Turn an HTTP response into a prediction, surfacing provider detail on failure.
async fn read_prediction(response: reqwest::Response) -> Result<Prediction, GenerationError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);

        return Err(GenerationError::Rejected { status: status.as_u16(), detail });
    }

    Ok(response.json::<Prediction>().await?)
}

// Tests.
