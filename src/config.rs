use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Runtime settings, merged from defaults, an optional `config` file and
/// `SWIPE_RELAY__*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub classifier: ClassifierSettings,
    pub pipeline: PipelineSettings,
    pub detector: DetectorSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub frames_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    /// Minimum wrist displacement, in pixels, between two consecutive
    /// samples for the motion to count as a swipe.
    pub swipe_threshold: f32,
    /// Minimum quiet period between two emitted events.
    pub debounce_ms: u64,
}

impl ClassifierSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// How long the consumer sleeps when the store is empty.
    pub idle_backoff_ms: u64,
}

impl PipelineSettings {
    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorSettings {
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    pub max_num_hands: usize,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8765_i64)?
            .set_default("store.frames_dir", "images")?
            .set_default("classifier.swipe_threshold", 70.0)?
            .set_default("classifier.debounce_ms", 500_i64)?
            .set_default("pipeline.idle_backoff_ms", 100_i64)?
            .set_default("detector.min_detection_confidence", 0.7)?
            .set_default("detector.min_tracking_confidence", 0.7)?
            .set_default("detector.max_num_hands", 1_i64)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("SWIPE_RELAY").separator("__"))
            .build()?
            .try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8765,
            },
            store: StoreSettings {
                frames_dir: "images".to_string(),
            },
            classifier: ClassifierSettings {
                swipe_threshold: 70.0,
                debounce_ms: 500,
            },
            pipeline: PipelineSettings {
                idle_backoff_ms: 100,
            },
            detector: DetectorSettings {
                min_detection_confidence: 0.7,
                min_tracking_confidence: 0.7,
                max_num_hands: 1,
            },
        }
    }
}
