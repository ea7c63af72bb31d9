//! Crate-wide error types.
//!
//! Three layers mirror the three layers of the system: store I/O,
//! mailbox protocol, and actor-facing usage. Each wraps the one below it
//! via `#[from]` so a caller only ever needs to match the outermost type.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use thiserror::Error;

// Layer 3: Internal
// (none)

/// Errors from the [`crate::store::StoreAdapter`] boundary.
///
/// `MemoryStore` only ever produces [`StoreError::Closed`]; the other
/// variants exist for adapters backed by a real external store, where
/// connection and protocol failures are possible.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store connection or subscription has been shut down.
    #[error("store connection closed")]
    Closed,

    /// A round trip to the store failed (network, protocol, etc.).
    #[error("store I/O failed: {0}")]
    Io(String),

    /// The server-side atomic script failed or returned an unexpected shape.
    #[error("store script evaluation failed: {0}")]
    Script(String),
}

impl StoreError {
    /// Transient failures are worth retrying without operator intervention.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Closed)
    }
}

/// Errors from the mailbox protocol layer (claim / commit / recovery).
#[derive(Debug, Error)]
pub enum MailboxError {
    /// The underlying store failed during a mailbox operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A `pipeline` entry recovered at `Start` could not be deserialized.
    #[error("malformed pipeline entry {pipeline_id}: {reason}")]
    Malformed {
        pipeline_id: String,
        reason: String,
    },
}

impl MailboxError {
    pub fn is_transient(&self) -> bool {
        matches!(self, MailboxError::Store(e) if e.is_transient())
    }

    pub fn is_fatal(&self) -> bool {
        match self {
            MailboxError::Store(e) => e.is_fatal(),
            MailboxError::Malformed { .. } => false,
        }
    }
}

/// Top-level errors surfaced by the actor facade and the request/reply
/// coordinator.
///
/// Usage errors and timeouts are synchronous failures surfaced to the
/// caller; computation failures never reach here (they are recorded to
/// `errors` and routed to the error-handler actor instead); store
/// failures propagate and terminate the dispatcher loop.
#[derive(Debug, Error)]
pub enum ActorError {
    /// `Start` was called without a computation, or an operation was
    /// attempted in a state that does not support it.
    #[error("usage error: {0}")]
    Usage(String),

    /// The actor has been disposed; no further operations are valid.
    #[error("actor {0} has been disposed")]
    Disposed(String),

    /// `PostAndReply` did not receive a result within its timeout.
    #[error("timed out after {0:?} waiting for a reply")]
    Timeout(Duration),

    /// The mailbox protocol failed (wraps a store failure or a malformed
    /// recovered entry).
    #[error("mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    /// The computation failed during `PostAndReply`'s local-bypass path.
    /// The error has already been recorded to `errors` and routed to the
    /// error-handler, same as the asynchronous dispatcher path; this
    /// variant exists only because the local-bypass caller is waiting
    /// synchronously and needs to be told.
    #[error("computation failed: {0}")]
    Computation(String),
}

impl ActorError {
    /// Timeouts are the only variant a caller can usefully retry; the
    /// underlying message may still complete and land in `results`.
    pub fn is_transient(&self) -> bool {
        match self {
            ActorError::Timeout(_) => true,
            ActorError::Mailbox(e) => e.is_transient(),
            _ => false,
        }
    }

    pub fn is_fatal(&self) -> bool {
        match self {
            ActorError::Disposed(_) => true,
            ActorError::Mailbox(e) => e.is_fatal(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_io_is_transient_not_fatal() {
        let e = StoreError::Io("timeout".into());
        assert!(e.is_transient());
        assert!(!e.is_fatal());
    }

    #[test]
    fn store_closed_is_fatal_not_transient() {
        let e = StoreError::Closed;
        assert!(e.is_fatal());
        assert!(!e.is_transient());
    }

    #[test]
    fn mailbox_error_propagates_store_classification() {
        let e = MailboxError::from(StoreError::Closed);
        assert!(e.is_fatal());
    }

    #[test]
    fn actor_timeout_is_transient() {
        let e = ActorError::Timeout(Duration::from_millis(10));
        assert!(e.is_transient());
        assert!(!e.is_fatal());
    }

    #[test]
    fn actor_disposed_is_fatal() {
        let e = ActorError::Disposed("echo".into());
        assert!(e.is_fatal());
    }

    #[test]
    fn actor_error_display_contains_context() {
        let e = ActorError::Usage("Start requires a computation".into());
        assert!(e.to_string().contains("Start requires a computation"));
    }

    #[test]
    fn mailbox_error_from_store_error_display() {
        let e: MailboxError = StoreError::Io("boom".into()).into();
        assert!(e.to_string().contains("boom"));
    }
}
