use crate::config::Settings;
use crate::detector::{DetectorConfig, LandmarkDetector, NullDetector};
use crate::error::AppError;
use crate::hub::BroadcastHub;
use crate::pipeline::{ProcessingLoop, SwipeClassifier};
use crate::server::{self, AppState};
use crate::store::{DirFrameStore, FrameStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Owns the wired-up service: the spawned processing task plus everything
/// the HTTP surface needs. `run` serves until process termination.
pub struct Coordinator {
    settings: Settings,
    state: AppState,
    pipeline_task: tokio::task::JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl Coordinator {
    pub async fn run(self) -> Result<(), AppError> {
        let addr = format!(
            "{}:{}",
            self.settings.server.host, self.settings.server.port
        );
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Bind(e, addr.clone()))?;
        info!("Listening on {}", addr);

        let app = server::router(self.state);
        axum::serve(listener, app).await.map_err(AppError::Serve)?;
        Ok(())
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    pub async fn join(self) {
        let _ = self.pipeline_task.await;
    }
}

pub struct CoordinatorBuilder {
    settings: Settings,
    store: Option<Arc<dyn FrameStore>>,
    detector: Option<Arc<dyn LandmarkDetector>>,
}

impl CoordinatorBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            store: None,
            detector: None,
        }
    }

    // Overrides the directory-backed default store.
    pub fn store(mut self, store: Arc<dyn FrameStore>) -> Self {
        self.store = Some(store);
        self
    }

    // Overrides the headless default detector.
    pub fn detector(mut self, detector: Arc<dyn LandmarkDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub async fn build(self) -> Result<Coordinator, AppError> {
        let settings = self.settings;

        let store: Arc<dyn FrameStore> = match self.store {
            Some(store) => store,
            None => Arc::new(DirFrameStore::new(settings.store.frames_dir.clone()).await?),
        };
        let detector: Arc<dyn LandmarkDetector> = match self.detector {
            Some(detector) => detector,
            None => Arc::new(NullDetector::new(DetectorConfig::from(&settings.detector))),
        };
        let hub = Arc::new(BroadcastHub::new());
        let classifier = SwipeClassifier::new(
            settings.classifier.swipe_threshold,
            settings.classifier.debounce(),
        );

        let pipeline = ProcessingLoop::new(
            store.clone(),
            detector,
            classifier,
            hub.clone(),
            settings.pipeline.idle_backoff(),
        );
        let cancel_token = CancellationToken::new();
        let pipeline_task = tokio::spawn(pipeline.run(cancel_token.clone()));

        Ok(Coordinator {
            settings,
            state: AppState { store, hub },
            pipeline_task,
            cancel_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryFrameStore;

    #[tokio::test]
    async fn builder_wires_the_pipeline_and_stop_winds_it_down() {
        let coordinator = CoordinatorBuilder::new(Settings::default())
            .store(Arc::new(MemoryFrameStore::new()))
            .build()
            .await
            .expect("Failed to build coordinator");
        coordinator.stop();
        coordinator.join().await;
    }
}
