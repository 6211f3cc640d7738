//! Shared test doubles

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hotel_voice_agent::{AgentConfig, TurnController};
use hotel_voice_config::HotelCatalog;
use hotel_voice_core::{Message, Session};
use hotel_voice_llm::{GenerationResult, LlmBackend, LlmError};
use hotel_voice_persistence::{CallGuard, CallLocks, InMemorySessionStore, SessionStore, StoreError};

pub const KNOWN_CALLER: &str = "+19496693870";
pub const UNKNOWN_CALLER: &str = "+15550001111";

pub enum Step {
    Reply(&'static str),
    Fail,
    Hang,
}

/// Backend that plays back scripted steps, then a default reply
pub struct ScriptedBackend {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedBackend {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<Vec<Message>> {
        self.seen.lock().last().cloned()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(messages.to_vec());

        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Reply(text)) => Ok(GenerationResult::text(text)),
            Some(Step::Fail) => Err(LlmError::Network("connection reset".into())),
            Some(Step::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(GenerationResult::text("too late"))
            },
            None => Ok(GenerationResult::text("Certainly, right away.")),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Store whose reads or writes fail on demand
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemorySessionStore,
    pub locks: CallLocks,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

fn outage() -> StoreError {
    StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk unavailable"))
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn load(&self, call_id: &str) -> Result<Option<Session>, StoreError> {
        if self.fail_reads {
            return Err(outage());
        }
        self.inner.load(call_id).await
    }

    async fn put(&self, session: &Session) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(outage());
        }
        self.inner.put(session).await
    }

    async fn delete(&self, call_id: &str) -> Result<(), StoreError> {
        self.inner.delete(call_id).await
    }

    async fn lock(&self, call_id: &str) -> CallGuard {
        self.locks.acquire(call_id).await
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}

pub struct Harness {
    pub controller: TurnController,
    pub store: Arc<InMemorySessionStore>,
    pub backend: Arc<ScriptedBackend>,
    pub catalog: Arc<HotelCatalog>,
}

pub fn harness(steps: Vec<Step>) -> Harness {
    harness_with(steps, AgentConfig::default())
}

pub fn harness_with(steps: Vec<Step>, config: AgentConfig) -> Harness {
    let catalog = Arc::new(HotelCatalog::builtin().unwrap());
    let store = Arc::new(InMemorySessionStore::new());
    let backend = ScriptedBackend::new(steps);
    let controller = TurnController::new(
        catalog.clone(),
        store.clone(),
        backend.clone(),
        config,
    )
    .unwrap();

    Harness {
        controller,
        store,
        backend,
        catalog,
    }
}
