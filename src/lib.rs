//! Real-time hand-gesture-to-letter recognition for the SIBI (one-hand)
//! and BISINDO (two-hand) sign alphabets.
//!
//! The crate turns per-frame hand landmarks from an external detector into
//! throttled letter predictions: landmarks → normalized pairwise-distance
//! features → per-letter classifier → argmax letter. The surrounding
//! application supplies video frames, a [`pipeline::HandDetector`]
//! implementation, and a sink for [`types::ScannerUpdate`]s; camera
//! capture, scheduling UI, chat, and transport of the predicted label to
//! other participants stay outside this crate.

pub mod artifacts;
pub mod decoder;
pub mod features;
pub mod pipeline;
pub mod scorer;
pub mod types;

pub use decoder::{decode, ALPHABET};
pub use features::{
    compose_two_hand_features, extract_distances, SINGLE_HAND_FEATURES, TWO_HAND_FEATURES,
};
pub use pipeline::{
    HandDetector, ScannerConfig, ScannerController, ScannerState, StartError, DEFAULT_THROTTLE,
};
pub use scorer::{ort::OrtScorer, remote::RemoteScorer, LetterScorer, ScorerError, ScorerSet};
pub use types::{
    DetectedHand, Frame, FrameObservation, Handedness, Landmark, ModelMode, PredictionLabel,
    ScannerUpdate, LANDMARK_COUNT,
};
