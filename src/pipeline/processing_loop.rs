use crate::detector::{Handedness, LandmarkDetector};
use crate::error::AppError;
use crate::hub::BroadcastHub;
use crate::pipeline::classifier::{MotionSample, SwipeClassifier};
use crate::store::{FrameStore, StoredFrame};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The single consumer of the frame store.
///
/// Each iteration pops the newest pending frame, runs it through the
/// detector and classifier, publishes any emitted event, and deletes the
/// frame whether or not processing succeeded. A bad frame is logged and
/// dropped; nothing on this path terminates the loop.
pub struct ProcessingLoop {
    store: Arc<dyn FrameStore>,
    detector: Arc<dyn LandmarkDetector>,
    classifier: SwipeClassifier,
    hub: Arc<BroadcastHub>,
    idle_backoff: Duration,
}

impl ProcessingLoop {
    pub fn new(
        store: Arc<dyn FrameStore>,
        detector: Arc<dyn LandmarkDetector>,
        classifier: SwipeClassifier,
        hub: Arc<BroadcastHub>,
        idle_backoff: Duration,
    ) -> Self {
        Self {
            store,
            detector,
            classifier,
            hub,
            idle_backoff,
        }
    }

    /// Runs until the token is cancelled. Production never cancels; the
    /// token exists so tests can wind the task down.
    pub async fn run(mut self, cancel_token: CancellationToken) {
        info!("Starting swipe detection loop");
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    info!("Processing loop stopped");
                    break;
                }
                _ = self.tick() => {}
            }
        }
    }

    async fn tick(&mut self) {
        match self.store.pop_newest().await {
            Ok(Some(frame)) => {
                let id = frame.id.clone();
                if let Err(e) = self.process_frame(frame).await {
                    warn!("Dropping frame {}: {}", id, e);
                }
                // Single-use frames: consumed means gone, success or not.
                if let Err(e) = self.store.delete(&id).await {
                    warn!("Failed to delete consumed frame {}: {}", id, e);
                }
            }
            Ok(None) => {
                tokio::time::sleep(self.idle_backoff).await;
            }
            Err(e) => {
                warn!("Failed to fetch frame: {}", e);
                tokio::time::sleep(self.idle_backoff).await;
            }
        }
    }

    async fn process_frame(&mut self, frame: StoredFrame) -> Result<(), AppError> {
        let image = image::load_from_memory(&frame.bytes)
            .map_err(crate::error::DecodeError::Image)?;
        let width = image.width() as f32;
        let now = Instant::now();

        let detections = self.detector.detect(&image).await?;
        debug!("Frame {}: {} detection(s)", frame.id, detections.len());

        for detection in detections
            .iter()
            .filter(|d| d.handedness == Handedness::Left)
        {
            let Some(wrist) = detection.wrist() else {
                continue;
            };
            let sample = MotionSample {
                at: now,
                x: wrist.x * width,
            };
            if let Some(event) = self.classifier.classify(sample) {
                let delivered = self.hub.publish(event);
                info!("{} swipe detected, delivered to {} subscriber(s)", event, delivered);
            }
        }
        Ok(())
    }
}
