use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::HistoryEntry;
use crate::portions::calculator::{calories_for, macros_for};
use crate::portions::editor::PortionSpec;
use crate::state::AppState;

const THUMBNAIL_URL_TTL_SECS: u64 = 10 * 60;

pub struct Thumbnail {
    pub body: Bytes,
    pub content_type: String,
}

pub struct NewEntry {
    pub food: String,
    pub display_name: Option<String>,
    pub portion: PortionSpec,
    pub confidence: f64,
    pub thumbnail: Option<Thumbnail>,
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

async fn upload_thumbnail(st: &AppState, id: Uuid, thumb: Thumbnail) -> anyhow::Result<String> {
    let storage = st
        .storage
        .as_ref()
        .context("thumbnail storage is not configured")?;
    let ext = ext_from_mime(&thumb.content_type).unwrap_or("bin");
    let key = format!("history/{}.{}", id, ext);
    storage
        .put_object(&key, thumb.body, &thumb.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    Ok(key)
}

async fn remove_thumbnails(st: &AppState, entries: &[HistoryEntry]) {
    let Some(storage) = st.storage.as_ref() else {
        return;
    };
    for key in entries.iter().filter_map(|e| e.thumbnail_key.as_deref()) {
        if let Err(e) = storage.delete_object(key).await {
            warn!(error = %e, %key, "thumbnail cleanup failed");
        }
    }
}

/// Resolves nutrition, computes the portion and stores a new entry.
pub async fn record_entry(st: &AppState, new: NewEntry) -> anyhow::Result<HistoryEntry> {
    let food_label = new.food.trim().to_string();
    anyhow::ensure!(!food_label.is_empty(), "food is required");

    let nutrition = st.resolver.resolve(&food_label).await;
    let grams = new.portion.grams;
    let id = Uuid::new_v4();

    let thumbnail_key = match new.thumbnail {
        Some(thumb) => Some(upload_thumbnail(st, id, thumb).await?),
        None => None,
    };

    let display_name = new
        .display_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| food_label.clone());

    let entry = HistoryEntry {
        id,
        created_at: OffsetDateTime::now_utc(),
        food_label,
        display_name,
        portion: new.portion,
        calories: calories_for(&nutrition, grams),
        macros: macros_for(&nutrition, grams),
        nutrition_source: nutrition.source(),
        thumbnail_key,
        confidence: new.confidence,
    };

    if let Err(e) = st.history.put(&entry).await {
        remove_thumbnails(st, std::slice::from_ref(&entry)).await;
        return Err(e);
    }

    info!(entry_id = %entry.id, food = %entry.food_label, calories = entry.calories, "history entry saved");
    Ok(entry)
}

pub async fn delete_entry(st: &AppState, id: Uuid) -> anyhow::Result<bool> {
    match st.history.delete(id).await? {
        Some(entry) => {
            remove_thumbnails(st, std::slice::from_ref(&entry)).await;
            info!(entry_id = %id, "history entry deleted");
            Ok(true)
        }
        None => Ok(false),
    }
}

pub async fn clear_history(st: &AppState) -> anyhow::Result<usize> {
    let removed = st.history.clear().await?;
    remove_thumbnails(st, &removed).await;
    info!(count = removed.len(), "history cleared");
    Ok(removed.len())
}

/// `Ok(None)` when the entry is unknown or has no thumbnail.
pub async fn thumbnail_url(st: &AppState, id: Uuid) -> anyhow::Result<Option<String>> {
    let Some(key) = st.history.get(id).await?.and_then(|e| e.thumbnail_key) else {
        return Ok(None);
    };
    let storage = st
        .storage
        .as_ref()
        .context("thumbnail storage is not configured")?;
    let url = storage
        .presign_get(&key, THUMBNAIL_URL_TTL_SECS)
        .await
        .with_context(|| format!("presign url for {}", key))?;
    Ok(Some(url))
}

#[cfg(test)]
mod history_service_tests {
    use super::*;
    use crate::nutrition::record::NutritionSource;
    use crate::storage::StorageClient;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingStorage {
        puts: Mutex<Vec<String>>,
        deletes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl StorageClient for RecordingStorage {
        async fn put_object(&self, k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
            self.puts.lock().unwrap().push(k.to_string());
            Ok(())
        }
        async fn delete_object(&self, k: &str) -> anyhow::Result<()> {
            self.deletes.lock().unwrap().push(k.to_string());
            Ok(())
        }
        async fn presign_get(&self, k: &str, s: u64) -> anyhow::Result<String> {
            Ok(format!("https://signed.local/{}?ttl={}", k, s))
        }
    }

    fn state_with(storage: Arc<RecordingStorage>) -> AppState {
        let mut st = AppState::fake();
        st.storage = Some(storage as Arc<dyn StorageClient>);
        st
    }

    fn apple(grams: f64) -> NewEntry {
        NewEntry {
            food: " apple ".into(),
            display_name: None,
            portion: PortionSpec::from_grams(grams),
            confidence: 0.91,
            thumbnail: None,
        }
    }

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[tokio::test]
    async fn record_computes_from_resolved_nutrition() {
        let st = AppState::fake();
        let e = record_entry(&st, apple(250.0)).await.unwrap();
        assert_eq!(e.food_label, "apple");
        assert_eq!(e.display_name, "apple");
        assert_eq!(e.calories, 130);
        assert_eq!(e.macros.protein, 0.8);
        assert_eq!(e.macros.carbs, 35.0);
        assert_eq!(e.macros.fat, 0.5);
        assert_eq!(e.nutrition_source, NutritionSource::Local);
        assert_eq!(st.history.list_recent().await.unwrap(), vec![e]);
    }

    #[tokio::test]
    async fn blank_food_is_rejected() {
        let st = AppState::fake();
        let mut new = apple(100.0);
        new.food = "  ".into();
        assert!(record_entry(&st, new).await.is_err());
        assert!(st.history.list_recent().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn thumbnail_is_uploaded_presigned_and_removed() {
        let storage = Arc::new(RecordingStorage::default());
        let st = state_with(storage.clone());
        let mut new = apple(100.0);
        new.thumbnail = Some(Thumbnail {
            body: Bytes::from_static(b"\xff\xd8\xff"),
            content_type: "image/jpeg".into(),
        });

        let e = record_entry(&st, new).await.unwrap();
        let key = format!("history/{}.jpg", e.id);
        assert_eq!(e.thumbnail_key.as_deref(), Some(key.as_str()));
        assert_eq!(*storage.puts.lock().unwrap(), vec![key.clone()]);

        let url = thumbnail_url(&st, e.id).await.unwrap().unwrap();
        assert_eq!(url, format!("https://signed.local/{}?ttl=600", key));

        assert!(delete_entry(&st, e.id).await.unwrap());
        assert_eq!(*storage.deletes.lock().unwrap(), vec![key]);
        assert!(!delete_entry(&st, e.id).await.unwrap());
    }

    #[tokio::test]
    async fn thumbnail_without_storage_fails() {
        let mut st = AppState::fake();
        st.storage = None;
        let mut new = apple(100.0);
        new.thumbnail = Some(Thumbnail {
            body: Bytes::from_static(b"png"),
            content_type: "image/png".into(),
        });
        assert!(record_entry(&st, new).await.is_err());
    }

    #[tokio::test]
    async fn clear_removes_all_entries_and_thumbnails() {
        let storage = Arc::new(RecordingStorage::default());
        let st = state_with(storage.clone());
        record_entry(&st, apple(100.0)).await.unwrap();
        let mut with_thumb = apple(200.0);
        with_thumb.thumbnail = Some(Thumbnail {
            body: Bytes::from_static(b"x"),
            content_type: "image/webp".into(),
        });
        record_entry(&st, with_thumb).await.unwrap();

        assert_eq!(clear_history(&st).await.unwrap(), 2);
        assert!(st.history.list_recent().await.unwrap().is_empty());
        assert_eq!(storage.deletes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn thumbnail_url_is_none_without_thumbnail() {
        let st = AppState::fake();
        let e = record_entry(&st, apple(100.0)).await.unwrap();
        assert!(thumbnail_url(&st, e.id).await.unwrap().is_none());
        assert!(thumbnail_url(&st, Uuid::new_v4()).await.unwrap().is_none());
    }
}
