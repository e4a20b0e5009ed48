use thiserror::Error;

// Main application error type. Everything below the upload boundary is
// recovered in place; only startup failures propagate out of main.

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store Error: {0}")]
    Store(#[from] StoreError),
    #[error("Decode Error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Detector Error: {0}")]
    Detector(#[from] DetectorError),
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Failed to bind to {1}: {0}")]
    Bind(std::io::Error, String),
    #[error("Server Error: {0}")]
    Serve(std::io::Error),
}

// Frame store I/O. The frame name rides along so a dropped frame can be
// identified in the logs after the fact.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write frame: {0}")]
    Write(std::io::Error),
    #[error("Failed to list frames: {0}")]
    List(std::io::Error),
    #[error("Failed to read frame {0}: {1}")]
    Read(String, std::io::Error),
    #[error("Failed to delete frame {0}: {1}")]
    Delete(String, std::io::Error),
    #[error("No frame stored under {0}")]
    Missing(String),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Unreadable image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Detector failure: {0}")]
    Inference(String),
}
