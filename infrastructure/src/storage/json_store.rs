//! JSON file conversation store
//!
//! One file per conversation, `<id>.json` under the data directory.
//! Writes go through a temp file and rename, so a crash mid-write leaves
//! the previous version intact rather than a truncated file.

use async_trait::async_trait;
use council_application::ports::conversation_store::{ConversationStore, StorageError};
use council_domain::{Conversation, ConversationId, ConversationSummary, Message};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// File-backed implementation of the [`ConversationStore`] port
pub struct JsonConversationStore {
    dir: PathBuf,
    // Disambiguates ids created within the same millisecond
    sequence: AtomicU64,
}

impl JsonConversationStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(Self {
            dir,
            sequence: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_id(&self) -> ConversationId {
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S%3f");
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        ConversationId::new(format!("{}-{:04}", stamp, seq))
    }

    fn file_path(&self, id: &ConversationId) -> Result<PathBuf, StorageError> {
        // Ids come from next_id(), but callers may pass arbitrary strings
        let raw = id.as_str();
        if raw.is_empty()
            || raw.contains(['/', '\\'])
            || raw.contains("..")
        {
            return Err(StorageError::NotFound(id.clone()));
        }
        Ok(self.dir.join(format!("{}.json", raw)))
    }

    async fn read(&self, id: &ConversationId) -> Result<Conversation, StorageError> {
        let path = self.file_path(id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(id.clone()));
            }
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };
        serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn write(&self, conversation: &Conversation) -> Result<(), StorageError> {
        let path = self.file_path(&conversation.id)?;
        let json = serde_json::to_vec_pretty(conversation)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        debug!("Persisted conversation {}", conversation.id);
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for JsonConversationStore {
    async fn create(&self) -> Result<Conversation, StorageError> {
        let conversation = Conversation::new(self.next_id());
        self.write(&conversation).await?;
        Ok(conversation)
    }

    async fn get(&self, id: &ConversationId) -> Result<Conversation, StorageError> {
        self.read(id).await
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>, StorageError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        let mut summaries = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_slice::<Conversation>(&bytes) {
                Ok(conversation) => summaries.push(conversation.summary()),
                Err(e) => warn!("Skipping malformed file {}: {}", path.display(), e),
            }
        }

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn append_message(
        &self,
        id: &ConversationId,
        message: Message,
    ) -> Result<(), StorageError> {
        let mut conversation = self.read(id).await?;
        conversation.push(message);
        self.write(&conversation).await
    }

    async fn set_title(&self, id: &ConversationId, title: &str) -> Result<(), StorageError> {
        let mut conversation = self.read(id).await?;
        conversation.title = title.to_string();
        self.write(&conversation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, JsonConversationStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonConversationStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let (_dir, store) = store();
        let created = store.create().await.unwrap();
        let loaded = store.get(&created.id).await.unwrap();
        assert_eq!(created, loaded);
        assert_eq!(loaded.title, "New Conversation");
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let (_dir, store) = store();
        let result = store.get(&ConversationId::from("nope")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_ids_rejected() {
        let (_dir, store) = store();
        let result = store.get(&ConversationId::from("../../etc/passwd")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_append_and_set_title_persist() {
        let (_dir, store) = store();
        let created = store.create().await.unwrap();

        store
            .append_message(&created.id, Message::user("hello", vec![]))
            .await
            .unwrap();
        store.set_title(&created.id, "Greetings").await.unwrap();

        let loaded = store.get(&created.id).await.unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.title, "Greetings");
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (_dir, store) = store();
        let first = store.create().await.unwrap();
        let second = store.create().await.unwrap();

        let summaries = store.list().await.unwrap();
        assert_eq!(summaries.len(), 2);
        // Same-millisecond creations still order by id sequence; both
        // ids are distinct
        assert_ne!(first.id, second.id);
        assert!(summaries[0].created_at >= summaries[1].created_at);
    }

    #[tokio::test]
    async fn test_list_skips_malformed_files() {
        let (dir, store) = store();
        store.create().await.unwrap();
        std::fs::write(dir.path().join("broken.json"), b"not json").unwrap();

        let summaries = store.list().await.unwrap();
        assert_eq!(summaries.len(), 1);
    }
}
