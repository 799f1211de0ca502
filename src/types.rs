use std::fmt;
use std::time::Instant;

/// Landmarks per detected hand in the detector's skeleton convention
/// (index 0 = wrist, 4/8/12/16/20 = fingertips).
pub const LANDMARK_COUNT: usize = 21;

/// One detected keypoint in the detector's normalized image space
/// (x/y roughly in 0..1, z relative to the wrist).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
    Unknown,
}

impl Handedness {
    pub fn label(&self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
            Handedness::Unknown => "unknown",
        }
    }
}

/// One hand as reported by the external landmark detector for a single
/// frame. `landmarks` is well-formed at exactly [`LANDMARK_COUNT`] entries;
/// any other length is treated as a degenerate detection downstream.
#[derive(Clone, Debug)]
pub struct DetectedHand {
    pub landmarks: Vec<Landmark>,
    pub handedness: Handedness,
    pub score: f32,
}

impl DetectedHand {
    pub fn is_well_formed(&self) -> bool {
        self.landmarks.len() == LANDMARK_COUNT
    }
}

/// Everything the detector reported for one video frame: zero, one, or two
/// hands in detector order. Consumed once by the scanner, then discarded.
#[derive(Clone, Debug, Default)]
pub struct FrameObservation {
    pub hands: Vec<DetectedHand>,
}

impl FrameObservation {
    pub fn has_hands(&self) -> bool {
        !self.hands.is_empty()
    }
}

/// A raw RGBA video frame handed to the detector seam.
#[derive(Clone, Debug)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

/// The active alphabet standard. SIBI signs with one hand (210 features),
/// BISINDO with up to two (420 features).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelMode {
    Sibi,
    Bisindo,
}

impl ModelMode {
    pub fn label(&self) -> &'static str {
        match self {
            ModelMode::Sibi => "sibi",
            ModelMode::Bisindo => "bisindo",
        }
    }

    /// Feature width the classifier for this mode expects.
    pub fn feature_len(&self) -> usize {
        match self {
            ModelMode::Sibi => crate::features::SINGLE_HAND_FEATURES,
            ModelMode::Bisindo => crate::features::TWO_HAND_FEATURES,
        }
    }
}

/// The decoded per-frame output: a letter, or one of two sentinels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictionLabel {
    Letter(char),
    NoHand,
    Unrecognized,
}

impl PredictionLabel {
    pub fn as_letter(&self) -> Option<char> {
        match self {
            PredictionLabel::Letter(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionLabel::Letter(c) => write!(f, "{c}"),
            PredictionLabel::NoHand => write!(f, "..."),
            PredictionLabel::Unrecognized => write!(f, "?"),
        }
    }
}

/// What the scanner publishes to its sink for one processed frame.
///
/// `label` is `None` on frames where the throttle suppressed scoring; the
/// overlay is still populated so visual feedback keeps up with the camera.
#[derive(Clone, Debug)]
pub struct ScannerUpdate {
    pub label: Option<PredictionLabel>,
    pub mode: ModelMode,
    /// Normalized landmarks per detected hand, for skeleton drawing.
    pub overlay: Vec<Vec<Landmark>>,
    pub timestamp: Instant,
}

impl ScannerUpdate {
    pub fn hand_count(&self) -> usize {
        self.overlay.len()
    }

    pub fn display_text(&self) -> String {
        match &self.label {
            Some(label) => label.to_string(),
            None => String::new(),
        }
    }
}
