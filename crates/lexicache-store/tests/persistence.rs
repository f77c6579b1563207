use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use lexicache_bundle::{LocaleCode, TreeNode, parse_bundle};
use lexicache_store::{
    DEFAULT_STORAGE_KEY, FileKeyValueStore, KeyValueStore, LocaleStore, MemoryKeyValueStore,
    RegistrySnapshot, StoreError, StoreResult,
};

struct FlakyStore {
    inner: MemoryKeyValueStore,
    failing: AtomicBool,
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend {
                operation: "set",
                message: "disk full".to_string(),
            });
        }
        self.inner.set(key, value).await
    }
}

fn canonical() -> Result<TreeNode> {
    Ok(parse_bundle(
        r#"{"greeting": "Hello", "farewell": "Bye", "nav": {"home": "Home"}}"#,
    )?)
}

fn hindi_snapshot() -> Result<RegistrySnapshot> {
    let hi = LocaleCode::parse("hi")?;
    let mut snapshot = RegistrySnapshot::empty(hi.clone());
    snapshot.bundles.insert(
        hi,
        Arc::new(parse_bundle(
            r#"{"greeting": "नमस्ते", "farewell": "अलविदा"}"#,
        )?),
    );
    Ok(snapshot)
}

#[tokio::test]
async fn snapshot_survives_reload_from_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let en = LocaleCode::parse("en")?;
    let snapshot = hindi_snapshot()?;

    let writer = LocaleStore::new(
        Arc::new(FileKeyValueStore::new(dir.path())),
        DEFAULT_STORAGE_KEY,
        en.clone(),
    );
    writer.save(&snapshot).await?;

    let reader = LocaleStore::new(
        Arc::new(FileKeyValueStore::new(dir.path())),
        DEFAULT_STORAGE_KEY,
        en,
    );
    let restored = reader.load(&canonical()?).await;
    assert_eq!(restored, snapshot);
    assert!(dir.path().join("lexicache.registry.json").exists());
    Ok(())
}

#[tokio::test]
async fn missing_file_loads_canonical_only() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = LocaleStore::new(
        Arc::new(FileKeyValueStore::new(dir.path().join("never-written"))),
        DEFAULT_STORAGE_KEY,
        LocaleCode::parse("en")?,
    );
    let restored = store.load(&canonical()?).await;
    assert_eq!(restored, RegistrySnapshot::empty(LocaleCode::parse("en")?));
    Ok(())
}

#[tokio::test]
async fn failed_save_is_retried_by_flush() -> Result<()> {
    let backend = Arc::new(FlakyStore {
        inner: MemoryKeyValueStore::new(),
        failing: AtomicBool::new(true),
    });
    let en = LocaleCode::parse("en")?;
    let store = LocaleStore::new(backend.clone(), DEFAULT_STORAGE_KEY, en);
    let snapshot = hindi_snapshot()?;

    let err = store.save(&snapshot).await.err();
    assert!(matches!(err, Some(StoreError::Backend { .. })));
    assert!(store.has_pending().await);
    assert_eq!(backend.get(DEFAULT_STORAGE_KEY).await?, None);

    backend.failing.store(false, Ordering::SeqCst);
    assert!(store.flush().await?);
    assert!(!store.has_pending().await);
    assert_eq!(store.load(&canonical()?).await, snapshot);
    Ok(())
}
