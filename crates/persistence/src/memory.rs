//! In-process session store

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use hotel_voice_core::Session;

use crate::{CallGuard, CallLocks, SessionStore, StoreError};

/// Sessions kept in a map; lost on restart
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    locks: CallLocks,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, call_id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().get(call_id).cloned())
    }

    async fn put(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions
            .write()
            .insert(session.call_id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, call_id: &str) -> Result<(), StoreError> {
        self.sessions.write().remove(call_id);
        Ok(())
    }

    async fn lock(&self, call_id: &str) -> CallGuard {
        self.locks.acquire(call_id).await
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
