mod dir_store;
mod memory_store;

pub use dir_store::DirFrameStore;
pub use memory_store::MemoryFrameStore;

use crate::error::StoreError;
use async_trait::async_trait;

/// Identifier assigned to a frame on arrival. Identifiers sort in arrival
/// order, which is what `pop_newest` relies on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(String);

impl FrameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One frame handed to the consumer: the assigned id plus the encoded
/// image bytes exactly as uploaded.
#[derive(Debug, Clone)]
pub struct StoredFrame {
    pub id: FrameId,
    pub bytes: Vec<u8>,
}

/// Ordered drop-box between the upload path and the processing loop.
///
/// `pop_newest` hands out the most recently arrived frame without removing
/// it; the consumer must `delete` every frame it dequeues, whether or not
/// processing succeeded. Older frames stay in place until they are polled
/// again (the loop cares about the current hand position, not replay).
#[async_trait]
pub trait FrameStore: Send + Sync {
    /// Persists a frame and assigns it a strictly increasing id. Safe to
    /// call concurrently from many upload handlers.
    async fn put(&self, bytes: Vec<u8>) -> Result<FrameId, StoreError>;

    /// Returns the frame with the greatest arrival order, or `None` when
    /// the store is empty. An unreadable frame is removed on the spot and
    /// reported as `StoreError::Read` so the consumer can move on.
    async fn pop_newest(&self) -> Result<Option<StoredFrame>, StoreError>;

    async fn delete(&self, id: &FrameId) -> Result<(), StoreError>;

    /// Number of frames currently pending.
    async fn len(&self) -> Result<usize, StoreError>;
}
