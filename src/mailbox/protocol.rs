//! The durable intake/commit/ack pipeline — the heart of the mailbox
//! protocol, expressed as free functions over a [`StoreAdapter`]
//! and a [`MailboxKeys`] so the dispatcher, the local-bypass coordinator
//! path, and the recovery scan at `Start` all share one implementation of
//! "how an envelope moves through the store".

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::de::DeserializeOwned;
use serde::Serialize;

// Layer 3: Internal module imports
use crate::config::ResultRetention;
use crate::error::MailboxError;
use crate::mailbox::envelope::{Envelope, ErrorEnvelope, Priority};
use crate::mailbox::keys::MailboxKeys;
use crate::store::{HashOverwrite, StoreAdapter};
use crate::util::{CorrelationId, PipelineId};

fn encode<T: Serialize>(value: &T) -> Result<String, MailboxError> {
    serde_json::to_string(value)
        .map_err(|e| MailboxError::Malformed {
            pipeline_id: String::new(),
            reason: format!("failed to encode: {e}"),
        })
}

fn decode<T: DeserializeOwned>(pipeline_id: &str, raw: &str) -> Result<T, MailboxError> {
    serde_json::from_str(raw).map_err(|e| MailboxError::Malformed {
        pipeline_id: pipeline_id.to_string(),
        reason: e.to_string(),
    })
}

/// Empty-payload notification: "mailbox may be non-empty".
pub const MAILBOX_SIGNAL: &str = "";

/// Push `envelope` into `inbox` at the end its [`Priority`] selects, then
/// publish the mailbox-readable notification. This is the shared
/// implementation behind `Post` and `PostAndReply`'s remote path.
pub async fn post<S: StoreAdapter, I: Serialize>(
    store: &S,
    keys: &MailboxKeys,
    envelope: &Envelope<I>,
    priority: Priority,
) -> Result<(), MailboxError> {
    let encoded = encode(envelope)?;
    match priority {
        Priority::Normal => store.list_push_tail(&keys.inbox, encoded).await?,
        Priority::High => store.list_push_head(&keys.inbox, encoded).await?,
    }
    store
        .publish(&keys.channel, MAILBOX_SIGNAL.to_string())
        .await?;
    Ok(())
}

/// Record `envelope` in `pipeline` under `pipeline_id` without touching
/// `inbox` — used by `PostAndReply`'s local-bypass path, which executes
/// the computation directly on the caller's task but still needs the
/// in-flight envelope visible to crash recovery.
pub async fn record_pipeline_entry<S: StoreAdapter, I: Serialize>(
    store: &S,
    keys: &MailboxKeys,
    pipeline_id: &PipelineId,
    envelope: &Envelope<I>,
) -> Result<(), MailboxError> {
    let encoded = encode(envelope)?;
    store
        .hash_set(
            &keys.pipeline,
            pipeline_id.as_str(),
            encoded,
            HashOverwrite::Always,
        )
        .await?;
    Ok(())
}

/// Atomically claim the next envelope from `inbox` into `pipeline`.
/// Returns `None` if the inbox was empty.
pub async fn claim<S: StoreAdapter, I: DeserializeOwned>(
    store: &S,
    keys: &MailboxKeys,
) -> Result<Option<(PipelineId, Envelope<I>)>, MailboxError> {
    let pipeline_id = PipelineId::new();
    let raw = store
        .claim(&keys.inbox, &keys.pipeline, pipeline_id.as_str())
        .await?;
    match raw {
        Some(raw) => {
            let envelope = decode(pipeline_id.as_str(), &raw)?;
            Ok(Some((pipeline_id, envelope)))
        }
        None => Ok(None),
    }
}

/// Scan `pipeline` for envelopes left in-flight by a prior process and
/// return them for re-execution.
pub async fn recover<S: StoreAdapter, I: DeserializeOwned>(
    store: &S,
    keys: &MailboxKeys,
) -> Result<Vec<(PipelineId, Envelope<I>)>, MailboxError> {
    let entries = store.hash_scan(&keys.pipeline).await?;
    entries
        .into_iter()
        .map(|(pipeline_id, raw)| {
            let envelope = decode(&pipeline_id, &raw)?;
            Ok((PipelineId::from(pipeline_id), envelope))
        })
        .collect()
}

/// Remove a pipeline entry after it has been dealt with, successfully or
/// not — the failure path deletes too, so a deterministically failing
/// envelope is not retried forever by a future recovery scan.
pub async fn delete_pipeline_entry<S: StoreAdapter>(
    store: &S,
    keys: &MailboxKeys,
    pipeline_id: &PipelineId,
) -> Result<(), MailboxError> {
    store
        .hash_delete(&keys.pipeline, pipeline_id.as_str())
        .await?;
    Ok(())
}

/// Write a successful result and notify waiters. A no-op when
/// `correlation_id` is the fire-and-forget marker.
pub async fn write_result<S: StoreAdapter, O: Serialize>(
    store: &S,
    keys: &MailboxKeys,
    correlation_id: &CorrelationId,
    output: &O,
) -> Result<(), MailboxError> {
    if correlation_id.is_none() {
        return Ok(());
    }
    let encoded = encode(output)?;
    store
        .hash_set(
            &keys.results,
            correlation_id.as_str(),
            encoded,
            HashOverwrite::Always,
        )
        .await?;
    store
        .publish(&keys.channel, correlation_id.as_str().to_string())
        .await?;
    Ok(())
}

/// Read a result for `correlation_id`, honoring [`ResultRetention`].
pub async fn read_result<S: StoreAdapter, O: DeserializeOwned>(
    store: &S,
    keys: &MailboxKeys,
    correlation_id: &CorrelationId,
    retention: ResultRetention,
) -> Result<Option<O>, MailboxError> {
    let raw = store
        .hash_get(&keys.results, correlation_id.as_str())
        .await?;
    match raw {
        Some(raw) => {
            let output = decode(correlation_id.as_str(), &raw)?;
            if retention == ResultRetention::DeleteOnRead {
                store
                    .hash_delete(&keys.results, correlation_id.as_str())
                    .await?;
            }
            Ok(Some(output))
        }
        None => Ok(None),
    }
}

/// Append a failure to `errors`.
pub async fn record_error<S: StoreAdapter, I: Serialize>(
    store: &S,
    keys: &MailboxKeys,
    error_envelope: &ErrorEnvelope<I>,
) -> Result<(), MailboxError> {
    let encoded = encode(error_envelope)?;
    store.list_push_tail(&keys.errors, encoded).await?;
    Ok(())
}

/// All error envelopes currently recorded, oldest first — a read helper
/// for tests and operator inspection, not part of the hot path. Drains
/// `errors` entirely via repeated [`StoreAdapter::list_pop_tail`] and
/// reverses the result, since popping the tail repeatedly yields
/// newest-first order.
pub async fn drain_errors<S: StoreAdapter, I: DeserializeOwned>(
    store: &S,
    keys: &MailboxKeys,
) -> Result<Vec<ErrorEnvelope<I>>, MailboxError> {
    let mut newest_first = Vec::new();
    while let Some(raw) = store.list_pop_tail(&keys.errors).await? {
        newest_first.push(decode("error", &raw)?);
    }
    newest_first.reverse();
    Ok(newest_first)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "unwrap acceptable in test code")]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn keys() -> MailboxKeys {
        MailboxKeys::for_actor("echo", "{id}:Mailbox:")
    }

    #[tokio::test]
    async fn post_then_claim_round_trips_payload() {
        let store = MemoryStore::new();
        let keys = keys();
        let envelope = Envelope::fire_and_forget(42i32);

        post(&store, &keys, &envelope, Priority::Normal)
            .await
            .unwrap();

        let (_pid, claimed): (_, Envelope<i32>) = claim(&store, &keys).await.unwrap().unwrap();
        assert_eq!(claimed.payload, 42);
    }

    #[tokio::test]
    async fn claim_on_empty_inbox_is_none() {
        let store = MemoryStore::new();
        let keys = keys();
        let claimed: Option<(PipelineId, Envelope<i32>)> = claim(&store, &keys).await.unwrap();
        assert!(claimed.is_none());
    }

    #[tokio::test]
    async fn write_result_then_read_result_delete_on_read() {
        let store = MemoryStore::new();
        let keys = keys();
        let cid = CorrelationId::new();

        write_result(&store, &keys, &cid, &"value".to_string())
            .await
            .unwrap();

        let first: Option<String> =
            read_result(&store, &keys, &cid, ResultRetention::DeleteOnRead)
                .await
                .unwrap();
        assert_eq!(first, Some("value".to_string()));

        let second: Option<String> =
            read_result(&store, &keys, &cid, ResultRetention::DeleteOnRead)
                .await
                .unwrap();
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn write_result_then_read_result_keep_until_purged() {
        let store = MemoryStore::new();
        let keys = keys();
        let cid = CorrelationId::new();

        write_result(&store, &keys, &cid, &"value".to_string())
            .await
            .unwrap();

        for _ in 0..2 {
            let read: Option<String> =
                read_result(&store, &keys, &cid, ResultRetention::KeepUntilPurged)
                    .await
                    .unwrap();
            assert_eq!(read, Some("value".to_string()));
        }
    }

    #[tokio::test]
    async fn fire_and_forget_result_write_is_noop() {
        let store = MemoryStore::new();
        let keys = keys();
        write_result(&store, &keys, &CorrelationId::none(), &"value".to_string())
            .await
            .unwrap();
        assert_eq!(store.list_length(&keys.results).await.unwrap_or(0), 0);
    }

    #[tokio::test]
    async fn record_error_then_drain() {
        let store = MemoryStore::new();
        let keys = keys();
        let err = ErrorEnvelope {
            actor_id: "boom".to_string(),
            payload: "hi".to_string(),
            error: "always fails".to_string(),
            occurred_at: chrono::Utc::now(),
        };
        record_error(&store, &keys, &err).await.unwrap();

        let drained: Vec<ErrorEnvelope<String>> = drain_errors(&store, &keys).await.unwrap();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].payload, "hi");
    }

    #[tokio::test]
    async fn recover_returns_leftover_pipeline_entries() {
        let store = MemoryStore::new();
        let keys = keys();
        let envelope = Envelope::fire_and_forget(7i32);
        let raw = serde_json::to_string(&envelope).unwrap();
        store
            .hash_set(&keys.pipeline, "leftover-1", raw, HashOverwrite::Always)
            .await
            .unwrap();

        let recovered: Vec<(PipelineId, Envelope<i32>)> =
            recover(&store, &keys).await.unwrap();
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0].1.payload, 7);
    }

    #[tokio::test]
    async fn delete_pipeline_entry_removes_it() {
        let store = MemoryStore::new();
        let keys = keys();
        store
            .hash_set(&keys.pipeline, "pid", "raw".into(), HashOverwrite::Always)
            .await
            .unwrap();

        delete_pipeline_entry(&store, &keys, &PipelineId::from("pid".to_string()))
            .await
            .unwrap();

        assert_eq!(store.hash_get(&keys.pipeline, "pid").await.unwrap(), None);
    }
}
