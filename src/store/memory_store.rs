use crate::error::StoreError;
use crate::store::{FrameId, FrameStore, StoredFrame};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// In-memory frame store. Satisfies the same ordered-queue contract as the
/// directory backend; used for ephemeral deployments and by the tests.
pub struct MemoryFrameStore {
    frames: Mutex<BTreeMap<u64, Vec<u8>>>,
    seq: AtomicU64,
}

impl MemoryFrameStore {
    pub fn new() -> Self {
        Self {
            frames: Mutex::new(BTreeMap::new()),
            seq: AtomicU64::new(0),
        }
    }

    fn parse_id(id: &FrameId) -> Result<u64, StoreError> {
        id.as_str()
            .parse()
            .map_err(|_| StoreError::Missing(id.to_string()))
    }
}

impl Default for MemoryFrameStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameStore for MemoryFrameStore {
    async fn put(&self, bytes: Vec<u8>) -> Result<FrameId, StoreError> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.frames.lock().unwrap().insert(seq, bytes);
        Ok(FrameId::new(format!("{seq:020}")))
    }

    async fn pop_newest(&self) -> Result<Option<StoredFrame>, StoreError> {
        let frames = self.frames.lock().unwrap();
        Ok(frames.last_key_value().map(|(seq, bytes)| StoredFrame {
            id: FrameId::new(format!("{seq:020}")),
            bytes: bytes.clone(),
        }))
    }

    async fn delete(&self, id: &FrameId) -> Result<(), StoreError> {
        let seq = Self::parse_id(id)?;
        self.frames
            .lock()
            .unwrap()
            .remove(&seq)
            .map(|_| ())
            .ok_or_else(|| StoreError::Missing(id.to_string()))
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.frames.lock().unwrap().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn newest_wins_and_delete_is_exact() {
        let store = MemoryFrameStore::new();
        let a = store.put(b"a".to_vec()).await.unwrap();
        let b = store.put(b"b".to_vec()).await.unwrap();
        assert!(a < b);

        let frame = store.pop_newest().await.unwrap().unwrap();
        assert_eq!(frame.id, b);
        store.delete(&frame.id).await.unwrap();

        let frame = store.pop_newest().await.unwrap().unwrap();
        assert_eq!(frame.id, a);
    }

    #[tokio::test]
    async fn deleting_missing_frame_is_an_error() {
        let store = MemoryFrameStore::new();
        let err = store.delete(&FrameId::new("42")).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));
    }
}
