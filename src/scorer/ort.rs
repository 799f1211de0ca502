//! In-process classifier backend: one ONNX session per alphabet standard.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;

use super::{LetterScorer, ScorerError, SCORE_COUNT};
use crate::types::ModelMode;

pub struct OrtScorer {
    session: Session,
    input_len: usize,
    mode: ModelMode,
}

impl OrtScorer {
    /// Loads the classifier artifact for `mode`. Failure here is terminal
    /// for the mode — surface it at startup instead of erroring per frame.
    pub fn load(mode: ModelMode, model_path: &Path) -> Result<Self, ScorerError> {
        let session = build_session(model_path).map_err(|source| ScorerError::ModelLoad {
            mode: mode.label(),
            source,
        })?;

        log::info!(
            "{} ORT classifier ready using {}",
            mode.label(),
            model_path.display()
        );

        Ok(Self {
            session,
            input_len: mode.feature_len(),
            mode,
        })
    }
}

fn build_session(model_path: &Path) -> Result<Session> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(2)?
        .commit_from_file(model_path)
        .with_context(|| format!("failed to load ORT session from {}", model_path.display()))
}

impl LetterScorer for OrtScorer {
    fn score(&mut self, features: &[f32]) -> Result<Vec<f32>> {
        let input = Array2::from_shape_vec((1, self.input_len), features.to_vec())
            .context("feature vector does not fit the classifier input shape")?;
        let tensor = Tensor::from_array(input)?;

        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .with_context(|| format!("failed to run {} classifier", self.mode.label()))?;

        // Exported classifiers disagree on output layout: plain score
        // tensors put the 26 floats first, sklearn-style exports emit an
        // int64 label tensor before the probabilities. Take the first f32
        // output wide enough to hold one score per letter.
        for idx in 0..outputs.len() {
            if let Ok(values) = outputs[idx].try_extract_array::<f32>() {
                if values.len() >= SCORE_COUNT {
                    return Ok(values.iter().copied().take(SCORE_COUNT).collect());
                }
            }
        }

        Err(anyhow!(
            "{} classifier produced no usable score output",
            self.mode.label()
        ))
    }

    fn transport(&self) -> &'static str {
        "ort"
    }
}
