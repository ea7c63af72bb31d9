//! `MemoryStore`: an in-process `StoreAdapter`.
//!
//! A `DashMap`-backed handle, cheap to `Clone`, shared by every actor in
//! the process. Lists use a `parking_lot::Mutex` guarding a `VecDeque`
//! (list operations are short critical sections, not worth a lock-free
//! structure); hashes use nested `DashMap`s; pub/sub uses one
//! `tokio::sync::broadcast` channel per topic, created lazily on first
//! publish or subscribe.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;

// Layer 3: Internal module imports
use crate::error::StoreError;
use crate::store::traits::{HashOverwrite, StoreAdapter, Subscription};

/// Channel buffer for each topic's broadcast sender. Wakeup notifications
/// are hints re-checked against the store, so a lagging receiver
/// dropping an old notification is harmless.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Default)]
struct Inner {
    lists: DashMap<String, Mutex<VecDeque<String>>>,
    hashes: DashMap<String, DashMap<String, String>>,
    channels: DashMap<String, broadcast::Sender<String>>,
}

/// In-process store backend: lists, hashes, atomic claim, and pub/sub,
/// all held in memory for the lifetime of the process.
///
/// Cloning a `MemoryStore` is cheap — it shares the same underlying state
/// via `Arc`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(&self, topic: &str) -> broadcast::Sender<String> {
        self.inner
            .channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

/// Subscription handle over a `MemoryStore` topic.
pub struct MemorySubscription {
    receiver: broadcast::Receiver<String>,
}

#[async_trait]
impl Subscription for MemorySubscription {
    async fn recv(&mut self) -> Option<String> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                // A slow subscriber missed some notifications; they are
                // hints only, so skip ahead and keep waiting.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[async_trait]
impl StoreAdapter for MemoryStore {
    type Subscription = MemorySubscription;

    async fn list_push_tail(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.inner
            .lists
            .entry(key.to_string())
            .or_default()
            .lock()
            .push_back(value);
        Ok(())
    }

    async fn list_push_head(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.inner
            .lists
            .entry(key.to_string())
            .or_default()
            .lock()
            .push_front(value);
        Ok(())
    }

    async fn list_pop_tail(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .inner
            .lists
            .get(key)
            .and_then(|list| list.lock().pop_back()))
    }

    async fn list_length(&self, key: &str) -> Result<usize, StoreError> {
        Ok(self
            .inner
            .lists
            .get(key)
            .map(|list| list.lock().len())
            .unwrap_or(0))
    }

    async fn hash_set(
        &self,
        key: &str,
        field: &str,
        value: String,
        policy: HashOverwrite,
    ) -> Result<(), StoreError> {
        let hash = self.inner.hashes.entry(key.to_string()).or_default();
        match policy {
            HashOverwrite::Always => {
                hash.insert(field.to_string(), value);
            }
            HashOverwrite::IfAbsent => {
                hash.entry(field.to_string()).or_insert(value);
            }
        }
        Ok(())
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .inner
            .hashes
            .get(key)
            .and_then(|hash| hash.get(field).map(|v| v.clone())))
    }

    async fn hash_delete(&self, key: &str, field: &str) -> Result<(), StoreError> {
        if let Some(hash) = self.inner.hashes.get(key) {
            hash.remove(field);
        }
        Ok(())
    }

    async fn hash_scan(&self, key: &str) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .inner
            .hashes
            .get(key)
            .map(|hash| {
                hash.iter()
                    .map(|entry| (entry.key().clone(), entry.value().clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn claim(
        &self,
        inbox_key: &str,
        pipeline_key: &str,
        pipeline_id: &str,
    ) -> Result<Option<String>, StoreError> {
        // The whole operation holds the inbox list's lock for its duration,
        // giving the same atomicity the claim script (store/script.rs)
        // gets from server-side execution: pop-then-record never interleaves
        // with another claim on the same inbox.
        let list = self.inner.lists.entry(inbox_key.to_string()).or_default();
        let mut guard = list.lock();
        let popped = guard.pop_front();
        drop(guard);

        if let Some(value) = &popped {
            self.inner
                .hashes
                .entry(pipeline_key.to_string())
                .or_default()
                .insert(pipeline_id.to_string(), value.clone());
        }
        Ok(popped)
    }

    async fn publish(&self, channel: &str, message: String) -> Result<(), StoreError> {
        // No subscribers yet is not an error: notifications are hints,
        // so a missed publish before anyone subscribed is fine.
        let _ = self.channel(channel).send(message);
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<Self::Subscription, StoreError> {
        Ok(MemorySubscription {
            receiver: self.channel(channel).subscribe(),
        })
    }
}
