/// Bookmark store.
///
/// Bookmarks are plain string ids: a standard slug, or `<slug>-<sectionId>` for a section.
/// The set is read from storage once when the store is opened and written back in full after
/// every toggle (last write wins). Storage failures are logged and never surface to callers;
/// the in-memory set stays authoritative for the session.
use std::future::Future;

use pm_common::redis::RedisStore;
use tracing::{info, warn};

pub const DEFAULT_STORAGE_KEY: &str = "standards-bookmarks";

/// Durable home of the JSON-encoded bookmark list.
pub trait BookmarkStorage {
    fn load(&self, key: &str) -> impl Future<Output = Option<String>> + Send;
    fn save(&self, key: &str, value: &str) -> impl Future<Output = bool> + Send;
}

impl BookmarkStorage for RedisStore {
    async fn load(&self, key: &str) -> Option<String> {
        self.get(key).await
    }

    async fn save(&self, key: &str, value: &str) -> bool {
        self.set(key, value).await
    }
}

/// Composite bookmark id for a standard or one of its sections.
pub fn bookmark_id(standard_slug: &str, section_id: Option<&str>) -> String {
    match section_id {
        Some(section) => format!("{standard_slug}-{section}"),
        None => standard_slug.to_string(),
    }
}

pub struct BookmarkStore<S> {
    storage: S,
    key: String,
    /// Insertion-ordered; never holds duplicates
    ids: Vec<String>,
}

impl<S: BookmarkStorage> BookmarkStore<S> {
    /// Open the store, loading whatever list is saved under `key`.
    ///
    /// A missing or unreadable entry starts an empty set.
    pub async fn open(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let ids = match storage.load(&key).await {
            Some(json) => serde_json::from_str::<Vec<String>>(&json)
                .inspect_err(|e| warn!(error = %e, key = %key, "stored bookmarks unreadable, starting empty"))
                .map(dedup)
                .unwrap_or_default(),
            None => Vec::new(),
        };
        info!(key = %key, bookmarks = ids.len(), "bookmarks loaded");
        Self { storage, key, ids }
    }

    pub fn has(&self, id: &str) -> bool {
        self.ids.iter().any(|b| b == id)
    }

    /// Add `id` if absent, remove it if present. Returns whether it is bookmarked afterwards.
    pub async fn toggle(&mut self, id: &str) -> bool {
        let bookmarked = match self.ids.iter().position(|b| b == id) {
            Some(pos) => {
                self.ids.remove(pos);
                false
            }
            None => {
                self.ids.push(id.to_string());
                true
            }
        };
        self.persist().await;
        bookmarked
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    async fn persist(&self) {
        let Ok(json) = serde_json::to_string(&self.ids) else {
            return;
        };
        if !self.storage.save(&self.key, &json).await {
            warn!(key = %self.key, "bookmarks not persisted, keeping in-memory state");
        }
    }
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct MemoryStorage {
        entries: Arc<Mutex<HashMap<String, String>>>,
    }

    impl BookmarkStorage for MemoryStorage {
        async fn load(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        async fn save(&self, key: &str, value: &str) -> bool {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            true
        }
    }

    #[test]
    fn composite_ids() {
        assert_eq!(bookmark_id("pmbok7", None), "pmbok7");
        assert_eq!(bookmark_id("pmbok7", Some("4.8")), "pmbok7-4.8");
    }

    #[tokio::test]
    async fn toggle_twice_restores_membership() {
        let mut store = BookmarkStore::open(MemoryStorage::default(), DEFAULT_STORAGE_KEY).await;
        assert!(!store.has("prince2-9"));
        assert!(store.toggle("prince2-9").await);
        assert!(store.has("prince2-9"));
        assert!(!store.toggle("prince2-9").await);
        assert!(!store.has("prince2-9"));
    }

    #[tokio::test]
    async fn every_toggle_is_written_back() {
        let storage = MemoryStorage::default();
        let mut store = BookmarkStore::open(storage.clone(), DEFAULT_STORAGE_KEY).await;
        store.toggle("pmbok7").await;
        store.toggle("iso21500-4.6").await;
        assert_eq!(
            storage.load(DEFAULT_STORAGE_KEY).await.as_deref(),
            Some(r#"["pmbok7","iso21500-4.6"]"#)
        );

        let reopened = BookmarkStore::open(storage, DEFAULT_STORAGE_KEY).await;
        assert_eq!(reopened.ids(), ["pmbok7", "iso21500-4.6"]);
    }

    #[tokio::test]
    async fn unreadable_entry_starts_empty() {
        let storage = MemoryStorage::default();
        storage.save(DEFAULT_STORAGE_KEY, "not json").await;
        let store = BookmarkStore::open(storage, DEFAULT_STORAGE_KEY).await;
        assert!(store.ids().is_empty());
    }

    #[tokio::test]
    async fn stored_duplicates_collapse() {
        let storage = MemoryStorage::default();
        storage.save(DEFAULT_STORAGE_KEY, r#"["a","b","a"]"#).await;
        let store = BookmarkStore::open(storage, DEFAULT_STORAGE_KEY).await;
        assert_eq!(store.ids(), ["a", "b"]);
    }

    #[tokio::test]
    async fn works_without_redis() {
        let mut store = BookmarkStore::open(RedisStore::disabled(), DEFAULT_STORAGE_KEY).await;
        assert!(store.toggle("pmbok7").await);
        assert!(store.has("pmbok7"));
    }
}
