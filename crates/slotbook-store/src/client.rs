//! Async bridge from the synchronous SQLite store to the engine port.
//!
//! SQLite calls are blocking, so reads run on the tokio blocking pool with
//! the connection behind a `parking_lot::Mutex`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Weekday;
use parking_lot::Mutex;

use slotbook_engine::ports::TemplateStore;
use slotbook_engine::{EngineError, Result, SlotTemplate};

use crate::store::SqliteTemplateStore;

/// Shareable, engine-facing handle over a [`SqliteTemplateStore`].
#[derive(Clone)]
pub struct TemplateDb {
    store: Arc<Mutex<SqliteTemplateStore>>,
}

impl TemplateDb {
    pub fn new(store: SqliteTemplateStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// The underlying store, for seeding and administration.
    pub fn store(&self) -> Arc<Mutex<SqliteTemplateStore>> {
        self.store.clone()
    }
}

impl std::fmt::Debug for TemplateDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TemplateDb").finish()
    }
}

#[async_trait]
impl TemplateStore for TemplateDb {
    async fn all_templates(&self) -> Result<Vec<SlotTemplate>> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            store
                .lock()
                .list_templates()
                .map_err(|e| EngineError::store(e.to_string()))
        })
        .await
        .map_err(|e| EngineError::store(e.to_string()))?
    }

    async fn templates_for_weekday(&self, weekday: Weekday) -> Result<Vec<SlotTemplate>> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            store
                .lock()
                .templates_for_weekday(weekday)
                .map_err(|e| EngineError::store(e.to_string()))
        })
        .await
        .map_err(|e| EngineError::store(e.to_string()))?
    }
}
