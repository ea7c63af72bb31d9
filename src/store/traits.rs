//! The `StoreAdapter` trait: the only interface the core depends on.
//!
//! A generic constraint over a concrete async implementation, not a
//! `dyn` trait object. The operations are a key-value + pub/sub
//! vocabulary (lists, hashes, atomic scripts, channels) rather than an
//! in-process routing table, because the mailbox this runtime
//! implements is durable and shared across worker processes.

// Layer 1: Standard library imports
use std::fmt::Debug;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::error::StoreError;

/// Overwrite policy for `HashSet`.
///
/// The mailbox protocol only ever needs unconditional overwrite, but the
/// trait exposes the policy explicitly so a future caller cannot
/// accidentally clobber a value it meant to set once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashOverwrite {
    /// Always write, replacing any existing value.
    Always,
    /// Write only if the field is currently absent.
    IfAbsent,
}

/// A live subscription to a pub/sub topic.
///
/// Dropping a `Subscription` unsubscribes. Adapters implement this over
/// whatever their underlying transport offers (a `broadcast::Receiver` for
/// `MemoryStore`; a dedicated connection for a networked store).
#[async_trait]
pub trait Subscription: Send {
    /// Wait for the next published message on this topic.
    ///
    /// Returns `None` once the topic is closed (store shutdown, or the
    /// publisher side dropped with no buffered messages left).
    async fn recv(&mut self) -> Option<String>;
}

/// Operations the mailbox protocol and dispatcher require of the store.
/// All operations are asynchronous; implementations must be safe under
/// concurrent use from many actors in the same process.
#[async_trait]
pub trait StoreAdapter: Send + Sync + Clone + 'static {
    /// Concrete subscription handle returned by [`subscribe`](Self::subscribe).
    type Subscription: Subscription;

    /// Append `value` at the tail of the list at `key` (normal-priority
    /// post; FIFO delivery order).
    async fn list_push_tail(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Prepend `value` at the head of the list at `key` (high-priority
    /// post; claimed before any normal-priority entry currently queued).
    async fn list_push_head(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Remove and return the newest (most recently pushed) value from the
    /// tail of the list at `key`, or `None` if empty.
    ///
    /// This is the generic pop primitive; the mailbox protocol's own
    /// intake does not use it (that goes through
    /// [`claim`](Self::claim)'s atomic pop-and-record instead). It backs
    /// operator-facing draining of append-only lists such as `errors`.
    async fn list_pop_tail(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Current length of the list at `key`.
    async fn list_length(&self, key: &str) -> Result<usize, StoreError>;

    /// Write `value` into the hash at `key` under `field`.
    async fn hash_set(
        &self,
        key: &str,
        field: &str,
        value: String,
        policy: HashOverwrite,
    ) -> Result<(), StoreError>;

    /// Read `field` from the hash at `key`, or `None` if absent.
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;

    /// Remove `field` from the hash at `key`.
    async fn hash_delete(&self, key: &str, field: &str) -> Result<(), StoreError>;

    /// All `(field, value)` pairs currently in the hash at `key`.
    ///
    /// Used only for crash recovery: scanning `pipeline` at `Start` to
    /// find envelopes left in-flight by a prior process.
    async fn hash_scan(&self, key: &str) -> Result<Vec<(String, String)>, StoreError>;

    /// Atomically pop the next envelope from `inbox_key` and, if one
    /// exists, record it under `pipeline_id` in `pipeline_key` — the
    /// claim script, executed as a single round trip so a crash between
    /// the two steps is impossible.
    async fn claim(
        &self,
        inbox_key: &str,
        pipeline_key: &str,
        pipeline_id: &str,
    ) -> Result<Option<String>, StoreError>;

    /// Publish `message` on `channel`.
    async fn publish(&self, channel: &str, message: String) -> Result<(), StoreError>;

    /// Subscribe to `channel`, returning a handle that yields each
    /// published message in order.
    async fn subscribe(&self, channel: &str) -> Result<Self::Subscription, StoreError>;
}
