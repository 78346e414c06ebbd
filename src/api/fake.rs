//! In-process fake session service for unit tests
//!
//! [`FakeSessionApi`] keeps an authoritative store in memory and applies
//! mutations to it exactly like the real backend would. Tests can queue
//! failures, count calls, and hold responses behind a gate to observe
//! in-flight state or exercise cancellation.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use crate::api::{ApiResult, Operation, SessionApi};
use crate::session::{Session, SessionId, SessionPatch};

/// In-memory stand-in for the remote session service
#[derive(Debug, Default)]
pub struct FakeSessionApi {
    store: Mutex<Vec<Session>>,
    failures: Mutex<VecDeque<Option<String>>>,
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl FakeSessionApi {
    /// Create a fake whose store holds `sessions`
    pub fn with_sessions(sessions: Vec<Session>) -> Self {
        Self {
            store: Mutex::new(sessions),
            ..Default::default()
        }
    }

    /// Make every call wait for a permit on the returned semaphore
    ///
    /// Each `add_permits(1)` releases exactly one pending call.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    /// Queue a failure for the next call
    ///
    /// `Some(message)` simulates a server error body, `None` a failure with
    /// no usable message.
    pub fn fail_next(&self, message: Option<&str>) {
        self.failures
            .lock()
            .unwrap()
            .push_back(message.map(str::to_string));
    }

    /// Replace the authoritative store
    pub fn set_sessions(&self, sessions: Vec<Session>) {
        *self.store.lock().unwrap() = sessions;
    }

    /// Snapshot of the authoritative store
    pub fn server_sessions(&self) -> Vec<Session> {
        self.store.lock().unwrap().clone()
    }

    /// Number of calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, operation: Operation) -> ApiResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| operation.fail("gate closed"))?;
            permit.forget();
        }
        let next = self.failures.lock().unwrap().pop_front();
        match next {
            Some(Some(message)) => Err(operation.fail(message)),
            Some(None) => Err(operation.fail(operation.fallback_message())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl SessionApi for FakeSessionApi {
    async fn list_sessions(&self, _token: &str) -> ApiResult<Vec<Session>> {
        self.enter(Operation::Fetch).await?;
        Ok(self.server_sessions())
    }

    async fn delete_session(&self, id: &SessionId, _token: &str) -> ApiResult<()> {
        self.enter(Operation::Delete).await?;
        self.store.lock().unwrap().retain(|s| &s.id != id);
        Ok(())
    }

    async fn update_session(
        &self,
        id: &SessionId,
        patch: &SessionPatch,
        _token: &str,
    ) -> ApiResult<()> {
        self.enter(Operation::Update).await?;
        if let Some(session) = self.store.lock().unwrap().iter_mut().find(|s| &s.id == id) {
            session.apply_patch(patch);
        }
        Ok(())
    }
}
