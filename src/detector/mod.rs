use crate::config::DetectorSettings;
use crate::error::DetectorError;
use async_trait::async_trait;
use image::DynamicImage;
use tracing::debug;

/// Landmark index of the wrist in the upstream hand model's 21-point set.
pub const WRIST: usize = 0;
pub const LANDMARK_COUNT: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

/// One landmark in normalized image coordinates, both axes in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

/// One detected hand: handedness classification plus the ordered landmark
/// list. Lives only for the processing cycle that produced it.
#[derive(Debug, Clone)]
pub struct Detection {
    pub handedness: Handedness,
    pub score: f32,
    pub landmarks: Vec<Landmark>,
}

impl Detection {
    pub fn wrist(&self) -> Option<Landmark> {
        self.landmarks.get(WRIST).copied()
    }
}

/// Knobs forwarded to whatever model implementation backs the trait.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    pub max_num_hands: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.7,
            max_num_hands: 1,
        }
    }
}

impl From<&DetectorSettings> for DetectorConfig {
    fn from(settings: &DetectorSettings) -> Self {
        Self {
            min_detection_confidence: settings.min_detection_confidence,
            min_tracking_confidence: settings.min_tracking_confidence,
            max_num_hands: settings.max_num_hands,
        }
    }
}

/// The hand-pose model, treated as an opaque collaborator: hand it an image,
/// get back zero or more detections. Model internals are out of scope here.
#[async_trait]
pub trait LandmarkDetector: Send + Sync {
    async fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, DetectorError>;
}

/// Detector stub that never sees a hand. Lets the service run headless when
/// no model is attached; the pipeline exercises every other stage as usual.
pub struct NullDetector;

impl NullDetector {
    pub fn new(config: DetectorConfig) -> Self {
        debug!(
            "Null detector configured: min_detection_confidence={}, min_tracking_confidence={}, max_num_hands={}",
            config.min_detection_confidence, config.min_tracking_confidence, config.max_num_hands
        );
        Self
    }
}

#[async_trait]
impl LandmarkDetector for NullDetector {
    async fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>, DetectorError> {
        Ok(Vec::new())
    }
}
