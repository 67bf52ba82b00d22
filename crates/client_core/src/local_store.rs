use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use storage::{origin_of, Storage};
use tokio::sync::Mutex;

use crate::PersistencePort;

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

#[async_trait]
impl PersistencePort for MemoryStore {
    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }
}

/// SQLite-backed store bound to the origin of one server.
#[derive(Clone)]
pub struct DurableLocalStore {
    store: Storage,
    origin: String,
}

impl DurableLocalStore {
    pub async fn open(database_url: &str, server_url: &str) -> Result<Self> {
        let store = Storage::new(database_url)
            .await
            .with_context(|| format!("failed to initialize local storage at '{database_url}'"))?;
        Self::new(store, server_url)
    }

    pub fn new(store: Storage, server_url: &str) -> Result<Self> {
        let origin = origin_of(server_url)?;
        Ok(Self { store, origin })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn storage(&self) -> &Storage {
        &self.store
    }
}

#[async_trait]
impl PersistencePort for DurableLocalStore {
    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.store.set_item(&self.origin, key, value).await
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.store.get_item(&self.origin, key).await
    }
}
