pub mod classifier;
pub mod processing_loop;

pub use classifier::{MotionSample, SwipeClassifier, SwipeEvent};
pub use processing_loop::ProcessingLoop;
