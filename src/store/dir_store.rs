use crate::error::StoreError;
use crate::store::{FrameId, FrameStore, StoredFrame};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

/// Directory-backed frame store: one file per frame, named so that a
/// lexicographic sort of the listing is arrival order. The sequence
/// counter disambiguates frames that land within the same timestamp tick.
pub struct DirFrameStore {
    dir: PathBuf,
    seq: AtomicU64,
}

impl DirFrameStore {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(StoreError::Write)?;
        Ok(Self {
            dir,
            seq: AtomicU64::new(0),
        })
    }

    async fn list_names(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = fs::read_dir(&self.dir).await.map_err(StoreError::List)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(StoreError::List)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            // Only fully landed frames: staged uploads and foreign files
            // must never reach the consumer.
            if name.starts_with("frame-")
                && entry
                    .file_type()
                    .await
                    .map_err(StoreError::List)?
                    .is_file()
            {
                names.push(name);
            }
        }
        Ok(names)
    }
}

#[async_trait]
impl FrameStore for DirFrameStore {
    async fn put(&self, bytes: Vec<u8>) -> Result<FrameId, StoreError> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let name = format!(
            "frame-{}-{:08}.jpg",
            Utc::now().format("%Y%m%d%H%M%S%6f"),
            seq
        );
        // Stage under a name pop_newest ignores, then rename into place:
        // the consumer never observes a partially written frame.
        let staged = self.dir.join(format!(".{name}.tmp"));
        fs::write(&staged, bytes).await.map_err(StoreError::Write)?;
        fs::rename(&staged, self.dir.join(&name))
            .await
            .map_err(StoreError::Write)?;
        Ok(FrameId::new(name))
    }

    async fn pop_newest(&self) -> Result<Option<StoredFrame>, StoreError> {
        let Some(name) = self.list_names().await?.into_iter().max() else {
            return Ok(None);
        };
        match fs::read(self.dir.join(&name)).await {
            Ok(bytes) => Ok(Some(StoredFrame {
                id: FrameId::new(name),
                bytes,
            })),
            Err(e) => {
                // Unreadable frame: drop it here so the next poll does not
                // trip over the same file.
                let _ = fs::remove_file(self.dir.join(&name)).await;
                Err(StoreError::Read(name, e))
            }
        }
    }

    async fn delete(&self, id: &FrameId) -> Result<(), StoreError> {
        fs::remove_file(self.dir.join(id.as_str()))
            .await
            .map_err(|e| StoreError::Delete(id.to_string(), e))
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.list_names().await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn pop_newest_returns_latest_arrival() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirFrameStore::new(dir.path()).await.unwrap();

        store.put(b"first".to_vec()).await.unwrap();
        store.put(b"second".to_vec()).await.unwrap();
        let latest = store.put(b"third".to_vec()).await.unwrap();

        let frame = store.pop_newest().await.unwrap().unwrap();
        assert_eq!(frame.id, latest);
        assert_eq!(frame.bytes, b"third");
    }

    #[tokio::test]
    async fn deleted_frame_is_never_returned_again() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirFrameStore::new(dir.path()).await.unwrap();

        let older = store.put(b"older".to_vec()).await.unwrap();
        let newest = store.put(b"newest".to_vec()).await.unwrap();

        let frame = store.pop_newest().await.unwrap().unwrap();
        assert_eq!(frame.id, newest);
        store.delete(&frame.id).await.unwrap();

        let frame = store.pop_newest().await.unwrap().unwrap();
        assert_eq!(frame.id, older);
        store.delete(&frame.id).await.unwrap();

        assert!(store.pop_newest().await.unwrap().is_none());
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_puts_assign_unique_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DirFrameStore::new(dir.path()).await.unwrap());

        let mut tasks = Vec::new();
        for n in 0..20u8 {
            let store = store.clone();
            tasks.push(tokio::spawn(
                async move { store.put(vec![n]).await.unwrap() },
            ));
        }

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
        assert_eq!(store.len().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn staged_and_foreign_files_are_invisible() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirFrameStore::new(dir.path()).await.unwrap();
        let id = store.put(b"real".to_vec()).await.unwrap();

        // An upload mid-write plus an unrelated file that would win a
        // naive lexicographic max over the raw listing.
        tokio::fs::write(dir.path().join(".frame-99999999999999999999.jpg.tmp"), b"part")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("zzz-not-a-frame"), b"junk")
            .await
            .unwrap();

        let frame = store.pop_newest().await.unwrap().unwrap();
        assert_eq!(frame.id, id);
        assert_eq!(frame.bytes, b"real");
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_store_pops_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirFrameStore::new(dir.path()).await.unwrap();
        assert!(store.pop_newest().await.unwrap().is_none());
    }
}
