//! Message envelope and error envelope.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::util::CorrelationId;

/// Priority of a post, controlling which end of `inbox` it enters at:
/// normal posts push at the tail (FIFO), high-priority posts push at
/// the head and are claimed ahead of everything currently queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    Normal,
    High,
}

/// Payload plus optional correlation id carried through the mailbox.
///
/// An empty `correlation_id` means fire-and-forget; any other value means
/// the producer is awaiting a reply keyed by that id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<I> {
    pub payload: I,
    pub correlation_id: CorrelationId,
}

impl<I> Envelope<I> {
    /// A fire-and-forget envelope: `correlation_id` is the none marker.
    pub fn fire_and_forget(payload: I) -> Self {
        Self {
            payload,
            correlation_id: CorrelationId::none(),
        }
    }

    /// An envelope awaiting a reply under a fresh correlation id.
    pub fn awaiting_reply(payload: I) -> (Self, CorrelationId) {
        let correlation_id = CorrelationId::new();
        (
            Self {
                payload,
                correlation_id: correlation_id.clone(),
            },
            correlation_id,
        )
    }
}

/// Appended to `errors` on any computation failure, and posted to the
/// error-handler actor if one is bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<I> {
    pub actor_id: String,
    pub payload: I,
    pub error: String,
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "unwrap acceptable in test code")]
mod tests {
    use super::*;

    #[test]
    fn fire_and_forget_has_no_correlation_id() {
        let envelope = Envelope::fire_and_forget(42);
        assert!(envelope.correlation_id.is_none());
    }

    #[test]
    fn awaiting_reply_shares_correlation_id_with_envelope() {
        let (envelope, cid) = Envelope::awaiting_reply("hi".to_string());
        assert_eq!(envelope.correlation_id, cid);
        assert!(!cid.is_none());
    }

    #[test]
    fn envelope_round_trips_through_json() {
        let envelope = Envelope::fire_and_forget(vec![1, 2, 3]);
        let json = serde_json::to_string(&envelope).unwrap();
        let back: Envelope<Vec<i32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.payload, vec![1, 2, 3]);
    }
}
