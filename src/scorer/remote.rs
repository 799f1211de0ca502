//! Remote classifier backend: per-frame scoring over HTTP.
//!
//! Alternate deployment of the same adapter interface — the scoring
//! artifacts live behind a service instead of in-process. A slow or failed
//! call must only cost that frame's label, so the client carries a short
//! timeout and every error is returned to the caller as a per-frame skip.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::LetterScorer;
use crate::types::ModelMode;

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(800);

#[derive(Serialize)]
struct ScoreRequest<'a> {
    model_type: &'static str,
    features: &'a [f32],
}

#[derive(Deserialize)]
struct ScoreResponse {
    scores: Vec<f32>,
}

pub struct RemoteScorer {
    client: Client,
    endpoint: String,
    mode: ModelMode,
}

impl RemoteScorer {
    pub fn new(mode: ModelMode, endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(mode, endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        mode: ModelMode,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build scoring HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            mode,
        })
    }
}

impl LetterScorer for RemoteScorer {
    fn score(&mut self, features: &[f32]) -> Result<Vec<f32>> {
        let request = ScoreRequest {
            model_type: self.mode.label(),
            features,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .with_context(|| format!("scoring request to {} failed", self.endpoint))?
            .error_for_status()
            .context("scoring service rejected the request")?;

        let parsed: ScoreResponse = response
            .json()
            .context("scoring service returned malformed JSON")?;
        Ok(parsed.scores)
    }

    fn transport(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_mode_and_features() {
        let request = ScoreRequest {
            model_type: ModelMode::Bisindo.label(),
            features: &[0.0, 0.5, 1.0],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model_type"], "bisindo");
        assert_eq!(json["features"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn response_parses_score_array() {
        let parsed: ScoreResponse =
            serde_json::from_str(r#"{"scores": [0.1, 0.8, 0.1]}"#).unwrap();
        assert_eq!(parsed.scores, vec![0.1, 0.8, 0.1]);
    }

    #[test]
    fn unreachable_endpoint_errors_instead_of_blocking() {
        // Port 1 is closed; the call must come back as an error promptly.
        let mut scorer = RemoteScorer::with_timeout(
            ModelMode::Sibi,
            "http://127.0.0.1:1/api/predict",
            Duration::from_millis(200),
        )
        .unwrap();
        assert!(scorer.score(&[0.0; 3]).is_err());
    }
}
