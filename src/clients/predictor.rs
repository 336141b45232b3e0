//! HTTP client for the FastAPI classification service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::models::PredictOutcome;
use crate::domain::ports::{Predictor, PredictorError};

/// Label reported for verdicts until the upstream starts echoing which model
/// answered.
const MODEL_NAME: &str = "BERT_LSTM";

#[derive(Debug, Clone)]
pub struct FastApiPredictor {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    prediction: String,
    // Older deployments omit the probability; treat their answers as certain.
    confidence: Option<f32>,
}

impl FastApiPredictor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Predictor for FastApiPredictor {
    async fn predict(&self, text: &str) -> Result<PredictOutcome, PredictorError> {
        let url = format!("{}/predict", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&PredictRequest { text })
            .send()
            .await
            .map_err(|e| PredictorError(e.to_string()))?
            .error_for_status()
            .map_err(|e| PredictorError(e.to_string()))?;

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| PredictorError(e.to_string()))?;

        tracing::debug!(label = %body.prediction, "classifier answered");
        Ok(PredictOutcome {
            model: MODEL_NAME.to_string(),
            label: body.prediction,
            confidence: body.confidence.unwrap_or(1.0),
        })
    }
}
