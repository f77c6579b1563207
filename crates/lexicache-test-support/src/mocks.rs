//! Fake collaborators for exercising the fill and persistence paths.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use lexicache_bundle::LocaleCode;
use lexicache_fill::{FillClient, FillError, FillResult};
use lexicache_store::{KeyValueStore, MemoryKeyValueStore, StoreError, StoreResult};
use tokio::sync::{Notify, Semaphore};

/// One recorded `translate_batch` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Source texts in request order.
    pub texts: Vec<String>,
    /// Requested target locale.
    pub target: String,
}

/// Scripted reply for the next call.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return these values verbatim.
    Translate(Vec<String>),
    /// Fail the batch with a provider error.
    Fail(String),
    /// Panic inside the provider call.
    Panic,
}

/// [`FillClient`] that replays scripted replies and records every call.
///
/// With an empty script the client echoes `"[<target>] <text>"`. A gated
/// client parks each call until [`ScriptedFillClient::release`] is called,
/// which lets tests observe a fill while it is in flight.
#[derive(Debug, Default)]
pub struct ScriptedFillClient {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Semaphore>,
    entered: Notify,
}

impl ScriptedFillClient {
    /// Client that echoes every input.
    #[must_use]
    pub fn echo() -> Self {
        Self::default()
    }

    /// Client whose calls block until released.
    #[must_use]
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    /// Queue a successful reply.
    #[must_use]
    pub fn then_translate(self, values: &[&str]) -> Self {
        self.lock_replies().push_back(ScriptedReply::Translate(
            values.iter().map(ToString::to_string).collect(),
        ));
        self
    }

    /// Queue a failing reply.
    #[must_use]
    pub fn then_fail(self, message: &str) -> Self {
        self.lock_replies()
            .push_back(ScriptedReply::Fail(message.to_string()));
        self
    }

    /// Queue a reply that panics mid-call.
    #[must_use]
    pub fn then_panic(self) -> Self {
        self.lock_replies().push_back(ScriptedReply::Panic);
        self
    }

    /// Let `count` gated calls proceed.
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// Wait until at least `count` calls have entered the client.
    pub async fn wait_for_calls(&self, count: usize) {
        while self.call_count() < count {
            self.entered.notified().await;
        }
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lock_replies(&self) -> MutexGuard<'_, VecDeque<ScriptedReply>> {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl FillClient for ScriptedFillClient {
    async fn translate_batch(
        &self,
        texts: &[String],
        target: &LocaleCode,
    ) -> FillResult<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                texts: texts.to_vec(),
                target: target.to_string(),
            });
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| FillError::provider("gate closed"))?;
            permit.forget();
        }

        let reply = self.lock_replies().pop_front();
        match reply {
            Some(ScriptedReply::Translate(values)) => Ok(values),
            Some(ScriptedReply::Fail(message)) => Err(FillError::provider(message)),
            Some(ScriptedReply::Panic) => panic!("scripted provider panic"),
            None => Ok(texts
                .iter()
                .map(|text| format!("[{target}] {text}"))
                .collect()),
        }
    }
}

/// In-memory [`KeyValueStore`] whose writes can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyKeyValueStore {
    inner: MemoryKeyValueStore,
    failing: AtomicBool,
}

impl FlakyKeyValueStore {
    /// Store that starts out failing every write.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            inner: MemoryKeyValueStore::new(),
            failing: AtomicBool::new(true),
        }
    }

    /// Toggle write failures.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for FlakyKeyValueStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend {
                operation: "kv.set",
                message: "write rejected".to_string(),
            });
        }
        self.inner.set(key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[tokio::test]
    async fn scripted_replies_are_consumed_in_order() -> Result<()> {
        let client = ScriptedFillClient::echo()
            .then_translate(&["uno"])
            .then_fail("quota");
        let es = LocaleCode::parse("es")?;
        let texts = vec!["one".to_string()];

        assert_eq!(client.translate_batch(&texts, &es).await?, ["uno"]);
        assert!(client.translate_batch(&texts, &es).await.is_err());
        assert_eq!(client.translate_batch(&texts, &es).await?, ["[es] one"]);
        assert_eq!(client.call_count(), 3);
        Ok(())
    }
}
