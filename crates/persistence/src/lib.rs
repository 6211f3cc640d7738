//! Session persistence for the hotel voice line
//!
//! Provides:
//! - The `SessionStore` trait the turn controller works against
//! - `InMemorySessionStore` for single-instance deployments and tests
//! - `FileSessionStore`, one JSON document per call, written atomically
//! - Per-call locking so concurrent turns of one call never interleave

pub mod error;
pub mod file;
pub mod locks;
pub mod memory;

pub use error::StoreError;
pub use file::FileSessionStore;
pub use locks::{CallGuard, CallLocks};
pub use memory::InMemorySessionStore;

use async_trait::async_trait;
use std::sync::Arc;

use hotel_voice_config::{PersistenceConfig, StoreBackend};
use hotel_voice_core::Session;

/// Keyed storage of call sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stored session, `None` if the call has none
    async fn load(&self, call_id: &str) -> Result<Option<Session>, StoreError>;

    /// Insert or overwrite the session under its call id
    async fn put(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove a call's session; absent is not an error
    async fn delete(&self, call_id: &str) -> Result<(), StoreError>;

    /// Exclusive access to one call until the guard drops
    async fn lock(&self, call_id: &str) -> CallGuard;

    /// Backend name for logs and readiness output
    fn backend_name(&self) -> &'static str;

    /// Stored session, or a fresh one at the greeting stage
    async fn get(&self, call_id: &str) -> Result<Session, StoreError> {
        Ok(self
            .load(call_id)
            .await?
            .unwrap_or_else(|| Session::new(call_id)))
    }
}

/// Build the store selected by configuration
pub fn init(config: &PersistenceConfig) -> Result<Arc<dyn SessionStore>, StoreError> {
    let store: Arc<dyn SessionStore> = match config.backend {
        StoreBackend::Memory => Arc::new(InMemorySessionStore::new()),
        StoreBackend::File => Arc::new(FileSessionStore::open(&config.directory)?),
    };

    tracing::info!(backend = store.backend_name(), "Session store ready");
    Ok(store)
}
