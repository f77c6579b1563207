#![forbid(unsafe_code)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]

//! Locale lifecycle event bus.
//!
//! The bus carries fill and switch notifications for observers such as the
//! CLI or a UI shell. It wraps `tokio::broadcast` with a bounded replay ring;
//! when either overflows the oldest events are dropped. Publishing never
//! blocks and never fails, even with no subscribers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, Receiver, Sender};

/// Identifier assigned to each published event.
pub type EventId = u64;

const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// Typed locale lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocaleEvent {
    /// A fill batch is about to be requested.
    FillStarted {
        /// Locale being filled.
        locale: String,
        /// Number of keys in the batch.
        missing: usize,
    },
    /// A fill batch was merged into the locale bundle.
    FillCompleted {
        /// Locale that was filled.
        locale: String,
        /// Keys that received a value.
        filled: usize,
        /// Keys still missing afterwards.
        remaining: usize,
    },
    /// A fill batch failed and the bundle was left untouched.
    FillFailed {
        /// Locale whose fill failed.
        locale: String,
        /// Machine-readable failure kind.
        reason: String,
    },
    /// The active locale changed.
    LocaleSwitched {
        /// Previously active locale.
        from: String,
        /// Newly active locale.
        to: String,
    },
    /// Persisting the registry failed; state continues in memory.
    PersistFailed {
        /// Operation that attempted the write.
        operation: String,
    },
}

impl LocaleEvent {
    /// Machine-friendly discriminator.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FillStarted { .. } => "fill_started",
            Self::FillCompleted { .. } => "fill_completed",
            Self::FillFailed { .. } => "fill_failed",
            Self::LocaleSwitched { .. } => "locale_switched",
            Self::PersistFailed { .. } => "persist_failed",
        }
    }
}

/// Event plus its sequence id and emission time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Sequential identifier.
    pub id: EventId,
    /// Emission timestamp.
    pub timestamp: DateTime<Utc>,
    /// Event payload.
    pub event: LocaleEvent,
}

/// Cloneable handle to the shared bus.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    buffer: Arc<Mutex<VecDeque<EventEnvelope>>>,
    next_id: Arc<AtomicU64>,
    replay_capacity: usize,
}

impl EventBus {
    /// Construct a bus whose broadcast channel and replay ring hold `capacity`
    /// events. A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            next_id: Arc::new(AtomicU64::new(1)),
            replay_capacity: capacity,
        }
    }

    /// Construct a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish an event and return its identifier.
    pub fn publish(&self, event: LocaleEvent) -> EventId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };

        {
            let mut buffer = self.buffer();
            if buffer.len() == self.replay_capacity {
                buffer.pop_front();
            }
            buffer.push_back(envelope.clone());
        }

        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe, replaying buffered events newer than `since_id` first.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<EventId>) -> EventStream {
        let backlog = since_id.map_or_else(VecDeque::new, |since| {
            self.buffer()
                .iter()
                .filter(|item| item.id > since)
                .cloned()
                .collect()
        });
        EventStream {
            backlog,
            receiver: self.sender.subscribe(),
        }
    }

    /// Events currently held in the replay ring, oldest first.
    #[must_use]
    pub fn recent(&self) -> Vec<EventEnvelope> {
        self.buffer().iter().cloned().collect()
    }

    fn buffer(&self) -> MutexGuard<'_, VecDeque<EventEnvelope>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream yielding replayed events, then live ones.
pub struct EventStream {
    backlog: VecDeque<EventEnvelope>,
    receiver: Receiver<EventEnvelope>,
}

impl EventStream {
    /// Receive the next event. Lagged receivers skip ahead; `None` once the
    /// bus is dropped.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switched(to: &str) -> LocaleEvent {
        LocaleEvent::LocaleSwitched {
            from: "en".to_string(),
            to: to.to_string(),
        }
    }

    #[tokio::test]
    async fn sequential_ids_and_replay() {
        let bus = EventBus::with_capacity(8);
        let mut last = 0;
        for locale in ["hi", "fr", "de", "es"] {
            last = bus.publish(switched(locale));
        }
        assert_eq!(last, 4);

        let mut stream = bus.subscribe(Some(2));
        let third = stream.next().await.map(|envelope| envelope.id);
        let fourth = stream.next().await.map(|envelope| envelope.id);
        assert_eq!((third, fourth), (Some(3), Some(4)));
    }

    #[test]
    fn replay_ring_drops_oldest() {
        let bus = EventBus::with_capacity(2);
        for locale in ["hi", "fr", "de"] {
            bus.publish(switched(locale));
        }
        let ids: Vec<EventId> = bus.recent().iter().map(|envelope| envelope.id).collect();
        assert_eq!(ids, [2, 3]);
    }

    #[test]
    fn events_serialise_with_snake_case_tags() -> Result<(), serde_json::Error> {
        let event = LocaleEvent::FillFailed {
            locale: "hi".to_string(),
            reason: "transport".to_string(),
        };
        let json = serde_json::to_value(&event)?;
        assert_eq!(json["type"], "fill_failed");
        assert_eq!(event.kind(), "fill_failed");
        Ok(())
    }
}
