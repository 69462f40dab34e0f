use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo_types::HistoryEntry;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn put(&self, entry: &HistoryEntry) -> anyhow::Result<()>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<HistoryEntry>>;
    /// Newest first.
    async fn list_recent(&self) -> anyhow::Result<Vec<HistoryEntry>>;
    /// Returns the removed entry, if it existed.
    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<HistoryEntry>>;
    /// Removes everything and returns what was removed.
    async fn clear(&self) -> anyhow::Result<Vec<HistoryEntry>>;
    /// Case-insensitive substring over label and display name, newest first.
    async fn search_by_name(&self, query: &str) -> anyhow::Result<Vec<HistoryEntry>>;
}

/// Process-local history, used when no database is configured.
#[derive(Default)]
pub struct MemoryHistoryStore {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn put(&self, entry: &HistoryEntry) -> anyhow::Result<()> {
        let mut entries = self.entries.write().await;
        anyhow::ensure!(
            entries.iter().all(|e| e.id != entry.id),
            "history entry {} already exists",
            entry.id
        );
        entries.push(entry.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<HistoryEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    async fn list_recent(&self) -> anyhow::Result<Vec<HistoryEntry>> {
        let entries = self.entries.read().await;
        Ok(newest_first(entries.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<HistoryEntry>> {
        let mut entries = self.entries.write().await;
        Ok(entries
            .iter()
            .position(|e| e.id == id)
            .map(|idx| entries.remove(idx)))
    }

    async fn clear(&self) -> anyhow::Result<Vec<HistoryEntry>> {
        let mut entries = self.entries.write().await;
        Ok(std::mem::take(&mut *entries))
    }

    async fn search_by_name(&self, query: &str) -> anyhow::Result<Vec<HistoryEntry>> {
        let entries = self.entries.read().await;
        let hits = entries
            .iter()
            .filter(|e| e.matches_name(query))
            .cloned()
            .collect();
        Ok(newest_first(hits))
    }
}


#[cfg(test)]
mod memory_store_tests {
    use super::test_support::entry;
    use super::*;

    #[tokio::test]
    async fn lists_newest_first() {
        let store = MemoryHistoryStore::new();
        let old = entry("Apple", 30);
        let new = entry("Banana", 1);
        let mid = entry("Pizza", 10);
        for e in [&old, &new, &mid] {
            store.put(e).await.unwrap();
        }
        let names: Vec<_> = store
            .list_recent()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.display_name)
            .collect();
        assert_eq!(names, ["Banana", "Pizza", "Apple"]);
    }

    #[tokio::test]
    async fn rejects_duplicate_ids() {
        let store = MemoryHistoryStore::new();
        let e = entry("Apple", 0);
        store.put(&e).await.unwrap();
        assert!(store.put(&e).await.is_err());
    }

    #[tokio::test]
    async fn delete_returns_removed_entry_once() {
        let store = MemoryHistoryStore::new();
        let e = entry("Apple", 0);
        store.put(&e).await.unwrap();
        assert_eq!(store.delete(e.id).await.unwrap(), Some(e.clone()));
        assert_eq!(store.delete(e.id).await.unwrap(), None);
        assert!(store.get(e.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_empties_the_store() {
        let store = MemoryHistoryStore::new();
        store.put(&entry("Apple", 0)).await.unwrap();
        store.put(&entry("Pizza", 0)).await.unwrap();
        assert_eq!(store.clear().await.unwrap().len(), 2);
        assert!(store.list_recent().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let store = MemoryHistoryStore::new();
        store.put(&entry("Pepperoni Pizza", 5)).await.unwrap();
        store.put(&entry("Apple", 3)).await.unwrap();
        store.put(&entry("Pizza Margherita", 1)).await.unwrap();
        let hits: Vec<_> = store
            .search_by_name("PIZZA")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.display_name)
            .collect();
        assert_eq!(hits, ["Pizza Margherita", "Pepperoni Pizza"]);
        assert!(store.search_by_name("sushi").await.unwrap().is_empty());
    }
}
