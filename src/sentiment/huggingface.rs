use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::ClassScore;
use crate::sentiment::parser::parse_model_response;
use crate::sentiment::provider::SentimentModel;

const INFERENCE_ENDPOINT: &str = "https://api-inference.huggingface.co/models";

/// Hosted text-classification model behind the Hugging Face inference API.
pub struct HuggingFaceModel {
    client: Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a [String],
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceParameters {
    /// `None` asks for every class score instead of the top one.
    top_k: Option<u32>,
    truncation: bool,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

impl HuggingFaceModel {
    pub fn new(api_token: &str, model: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(api_token, model, INFERENCE_ENDPOINT)
    }

    pub fn with_endpoint(
        api_token: &str,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_token))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.endpoint, self.model)
    }
}

#[async_trait]
impl SentimentModel for HuggingFaceModel {
    async fn predict(&self, texts: &[String]) -> Result<Vec<Vec<ClassScore>>> {
        tracing::debug!("Sending {} texts to {}", texts.len(), self.model);

        let request_body = InferenceRequest {
            inputs: texts,
            parameters: InferenceParameters {
                top_k: None,
                truncation: true,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let response = self
            .client
            .post(self.url())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Inference(format!(
                "Inference API error ({}): {}",
                status, body
            )));
        }

        parse_model_response(&body, texts.len())
    }

    fn name(&self) -> &str {
        &self.model
    }
}
