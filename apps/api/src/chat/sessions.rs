//! Session-to-thread registry.
//!
//! Maps a client-supplied session id to the agent thread backing it. Lookup-or-create:
//! a session gets exactly one thread for as long as its entry lives, even when several
//! first requests for it race. Entries never expire; they go away only on reset.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::agent::{AgentError, AgentService};

/// Per-session guard held while that session's first thread is being created.
type CreationGuard = Arc<Mutex<()>>;

#[derive(Default)]
struct Sessions {
    threads: HashMap<String, String>,
    creating: HashMap<String, CreationGuard>,
}

impl Sessions {
    /// Drops the session's creation guard once nobody else is waiting on it.
    /// The map holds one reference and the caller another.
    fn release(&mut self, session_id: &str, guard: &CreationGuard) {
        let idle = self
            .creating
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, guard) && Arc::strong_count(guard) <= 2);
        if idle {
            self.creating.remove(session_id);
        }
    }
}

/// The map lock is never held across an agent call, so lookups, resets and the
/// health count never wait on a slow agent.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<Sessions>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session's thread, creating one through the agent on first use.
    ///
    /// Only callers for the same session wait on each other. A failed creation leaves
    /// no mapping so the next request tries again.
    pub async fn get_or_create_thread(
        &self,
        session_id: &str,
        agent: &dyn AgentService,
    ) -> Result<String, AgentError> {
        if let Some(thread_id) = self.thread_for(session_id).await {
            return Ok(thread_id);
        }

        let guard = {
            let mut inner = self.inner.lock().await;
            inner
                .creating
                .entry(session_id.to_string())
                .or_default()
                .clone()
        };
        let _creating = guard.lock().await;

        {
            let mut inner = self.inner.lock().await;
            if let Some(thread_id) = inner.threads.get(session_id).cloned() {
                inner.release(session_id, &guard);
                return Ok(thread_id);
            }
        }

        let created = agent.create_thread().await;

        let mut inner = self.inner.lock().await;
        inner.release(session_id, &guard);
        let thread_id = created?;
        inner
            .threads
            .insert(session_id.to_string(), thread_id.clone());
        info!("Session {session_id} bound to agent thread {thread_id}");
        Ok(thread_id)
    }

    /// Forgets the session's thread. Returns whether a thread was mapped.
    pub async fn delete_session(&self, session_id: &str) -> bool {
        let existed = self.inner.lock().await.threads.remove(session_id).is_some();
        if existed {
            info!("Session {session_id} reset");
        }
        existed
    }

    pub async fn thread_for(&self, session_id: &str) -> Option<String> {
        self.inner.lock().await.threads.get(session_id).cloned()
    }

    /// Number of sessions currently bound to a thread. Creations still in flight
    /// are not counted.
    pub async fn bound_count(&self) -> usize {
        self.inner.lock().await.threads.len()
    }
}
