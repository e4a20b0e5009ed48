pub mod config;
pub mod coordinator;
pub mod detector;
pub mod error;
pub mod hub;
pub mod pipeline;
pub mod server;
pub mod store;

pub use error::{AppError, DecodeError, DetectorError, StoreError};

pub use hub::BroadcastHub;
pub use pipeline::{SwipeClassifier, SwipeEvent};
