//! Classifier adapter: precomputed per-letter scoring functions behind one
//! trait, with per-mode dispatch.
//!
//! A deployment picks one transport — in-process ONNX ([`ort::OrtScorer`])
//! or a remote scoring service ([`remote::RemoteScorer`]) — but the
//! interface is identical either way: feature vector in, 26 letter scores
//! out, possibly failing.

pub mod ort;
pub mod remote;

use thiserror::Error;

use crate::decoder::ALPHABET;
use crate::types::ModelMode;

/// Letters scored per classifier invocation.
pub const SCORE_COUNT: usize = ALPHABET.len();

#[derive(Debug, Error)]
pub enum ScorerError {
    /// The classifier artifact for a mode could not be loaded. Fatal at
    /// startup for that mode; the mode is disabled, not defaulted away.
    #[error("failed to load {mode} classifier artifact: {source}")]
    ModelLoad {
        mode: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The requested mode has no loaded classifier.
    #[error("no classifier loaded for mode {mode}")]
    ModeUnavailable { mode: &'static str },

    /// The feature vector's width does not match the mode's classifier.
    #[error("{mode} classifier expects {expected} features, got {got}")]
    FeatureWidthMismatch {
        mode: &'static str,
        expected: usize,
        got: usize,
    },

    /// A single scoring call failed (remote timeout, session error). The
    /// caller skips this frame's label update and keeps going.
    #[error("scoring failed for mode {mode}: {source}")]
    Scoring {
        mode: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The backend produced something other than one score per letter.
    #[error("classifier returned {got} scores, expected {SCORE_COUNT}")]
    MalformedScores { got: usize },
}

/// One precomputed letter-scoring function. Implementations are opaque
/// artifacts loaded at startup; the core never trains or updates them.
pub trait LetterScorer: Send {
    fn score(&mut self, features: &[f32]) -> anyhow::Result<Vec<f32>>;

    /// Short transport tag for logs ("ort", "remote", ...).
    fn transport(&self) -> &'static str;
}

/// The per-mode classifier registry the scanner dispatches through.
///
/// A mode whose artifact failed to load is simply absent; scoring it yields
/// [`ScorerError::ModeUnavailable`] instead of silently falling back to the
/// other alphabet.
#[derive(Default)]
pub struct ScorerSet {
    sibi: Option<Box<dyn LetterScorer>>,
    bisindo: Option<Box<dyn LetterScorer>>,
}

impl ScorerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scorer(mut self, mode: ModelMode, scorer: Box<dyn LetterScorer>) -> Self {
        self.insert(mode, scorer);
        self
    }

    pub fn insert(&mut self, mode: ModelMode, scorer: Box<dyn LetterScorer>) {
        log::info!(
            "registered {} classifier ({} transport)",
            mode.label(),
            scorer.transport()
        );
        match mode {
            ModelMode::Sibi => self.sibi = Some(scorer),
            ModelMode::Bisindo => self.bisindo = Some(scorer),
        }
    }

    pub fn supports(&self, mode: ModelMode) -> bool {
        self.slot(mode).is_some()
    }

    /// Scores a feature vector with the classifier for `mode`, enforcing
    /// the mode's feature width on the way in and the 26-score shape on the
    /// way out.
    pub fn score(&mut self, mode: ModelMode, features: &[f32]) -> Result<Vec<f32>, ScorerError> {
        let expected = mode.feature_len();
        if features.len() != expected {
            return Err(ScorerError::FeatureWidthMismatch {
                mode: mode.label(),
                expected,
                got: features.len(),
            });
        }

        let scorer = match mode {
            ModelMode::Sibi => self.sibi.as_mut(),
            ModelMode::Bisindo => self.bisindo.as_mut(),
        }
        .ok_or(ScorerError::ModeUnavailable { mode: mode.label() })?;

        let scores = scorer.score(features).map_err(|source| ScorerError::Scoring {
            mode: mode.label(),
            source,
        })?;

        if scores.len() != SCORE_COUNT {
            return Err(ScorerError::MalformedScores { got: scores.len() });
        }
        Ok(scores)
    }

    fn slot(&self, mode: ModelMode) -> Option<&dyn LetterScorer> {
        match mode {
            ModelMode::Sibi => self.sibi.as_deref(),
            ModelMode::Bisindo => self.bisindo.as_deref(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Scores every input as a one-hot vector at a fixed index.
    pub struct OneHotScorer {
        pub winner: usize,
    }

    impl LetterScorer for OneHotScorer {
        fn score(&mut self, _features: &[f32]) -> anyhow::Result<Vec<f32>> {
            let mut scores = vec![0.0; SCORE_COUNT];
            scores[self.winner] = 1.0;
            Ok(scores)
        }

        fn transport(&self) -> &'static str {
            "stub"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::OneHotScorer;
    use super::*;
    use crate::features::{SINGLE_HAND_FEATURES, TWO_HAND_FEATURES};

    struct FailingScorer;

    impl LetterScorer for FailingScorer {
        fn score(&mut self, _features: &[f32]) -> anyhow::Result<Vec<f32>> {
            anyhow::bail!("remote scoring timed out")
        }

        fn transport(&self) -> &'static str {
            "stub"
        }
    }

    struct ShortScorer;

    impl LetterScorer for ShortScorer {
        fn score(&mut self, _features: &[f32]) -> anyhow::Result<Vec<f32>> {
            Ok(vec![1.0; 5])
        }

        fn transport(&self) -> &'static str {
            "stub"
        }
    }

    #[test]
    fn dispatches_by_mode() {
        let mut set = ScorerSet::new()
            .with_scorer(ModelMode::Sibi, Box::new(OneHotScorer { winner: 0 }))
            .with_scorer(ModelMode::Bisindo, Box::new(OneHotScorer { winner: 25 }));

        let sibi = set
            .score(ModelMode::Sibi, &vec![0.0; SINGLE_HAND_FEATURES])
            .unwrap();
        let bisindo = set
            .score(ModelMode::Bisindo, &vec![0.0; TWO_HAND_FEATURES])
            .unwrap();
        assert_eq!(sibi[0], 1.0);
        assert_eq!(bisindo[25], 1.0);
    }

    #[test]
    fn missing_mode_is_reported_not_defaulted() {
        let mut set =
            ScorerSet::new().with_scorer(ModelMode::Sibi, Box::new(OneHotScorer { winner: 0 }));

        assert!(set.supports(ModelMode::Sibi));
        assert!(!set.supports(ModelMode::Bisindo));

        let err = set
            .score(ModelMode::Bisindo, &vec![0.0; TWO_HAND_FEATURES])
            .unwrap_err();
        assert!(matches!(err, ScorerError::ModeUnavailable { .. }));
    }

    #[test]
    fn rejects_wrong_feature_width() {
        let mut set =
            ScorerSet::new().with_scorer(ModelMode::Sibi, Box::new(OneHotScorer { winner: 0 }));

        let err = set
            .score(ModelMode::Sibi, &vec![0.0; TWO_HAND_FEATURES])
            .unwrap_err();
        assert!(matches!(
            err,
            ScorerError::FeatureWidthMismatch {
                expected: SINGLE_HAND_FEATURES,
                ..
            }
        ));
    }

    #[test]
    fn backend_failure_is_a_transient_scoring_error() {
        let mut set = ScorerSet::new().with_scorer(ModelMode::Sibi, Box::new(FailingScorer));
        let err = set
            .score(ModelMode::Sibi, &vec![0.0; SINGLE_HAND_FEATURES])
            .unwrap_err();
        assert!(matches!(err, ScorerError::Scoring { .. }));
    }

    #[test]
    fn short_score_vector_is_malformed() {
        let mut set = ScorerSet::new().with_scorer(ModelMode::Sibi, Box::new(ShortScorer));
        let err = set
            .score(ModelMode::Sibi, &vec![0.0; SINGLE_HAND_FEATURES])
            .unwrap_err();
        assert!(matches!(err, ScorerError::MalformedScores { got: 5 }));
    }
}
