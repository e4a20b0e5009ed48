use swipe_relay::config::Settings;
use swipe_relay::coordinator::CoordinatorBuilder;
use swipe_relay::error::AppError;
use tracing::Level;

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();
    let settings = Settings::load()?;
    let coordinator = CoordinatorBuilder::new(settings).build().await?;
    coordinator.run().await
}
