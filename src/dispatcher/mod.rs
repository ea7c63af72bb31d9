//! The Dispatcher: the per-actor claim loop bounded by a process-wide
//! semaphore, and the commit/fan-out/error-routing sequence each claimed
//! envelope goes through.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::sync::Semaphore;

// Layer 3: Internal module imports
use crate::actor::computation::{ChildLink, Computation, ErrorSink};
use crate::config::RuntimeConfig;
use crate::error::ActorError;
use crate::mailbox::envelope::{Envelope, ErrorEnvelope};
use crate::mailbox::keys::MailboxKeys;
use crate::mailbox::protocol;
use crate::store::StoreAdapter;
use crate::util::{CancelToken, PipelineId};
use crate::wakeup::WakeupBus;

/// The state one dispatcher loop needs, shared with the facade that owns
/// the mutable children/error-handler maps.
pub(crate) struct DispatchContext<S: StoreAdapter, C: Computation> {
    pub actor_id: String,
    pub store: S,
    pub keys: MailboxKeys,
    pub computation: Arc<C>,
    pub children: Arc<Mutex<HashMap<String, Arc<dyn ChildLink<C::Output>>>>>,
    pub error_handler: Arc<Mutex<Option<Arc<dyn ErrorSink<C::Input>>>>>,
    pub config: RuntimeConfig,
}

impl<S: StoreAdapter, C: Computation> DispatchContext<S, C> {
    /// Run the computation for one claimed envelope and carry it through
    /// commit, fan-out, and error routing.
    ///
    /// Never returns an error: a computation failure is recorded and
    /// routed, never propagated — the dispatcher loop continues
    /// regardless.
    pub async fn execute_and_commit(&self, pipeline_id: PipelineId, envelope: Envelope<C::Input>) {
        let correlation_id = envelope.correlation_id.clone();
        match self.computation.call(envelope.payload.clone()).await {
            Ok(output) => {
                self.fan_out(&output).await;
                let _ = protocol::delete_pipeline_entry(&self.store, &self.keys, &pipeline_id)
                    .await;
                if let Err(e) = protocol::write_result(
                    &self.store,
                    &self.keys,
                    &correlation_id,
                    &output,
                )
                .await
                {
                    tracing::warn!(actor_id = %self.actor_id, error = %e, "failed to write result");
                }
            }
            Err(error) => {
                tracing::warn!(actor_id = %self.actor_id, %error, "computation failed");
                let error_envelope = ErrorEnvelope {
                    actor_id: self.actor_id.clone(),
                    payload: envelope.payload,
                    error,
                    occurred_at: chrono::Utc::now(),
                };
                if let Err(e) =
                    protocol::record_error(&self.store, &self.keys, &error_envelope).await
                {
                    tracing::warn!(actor_id = %self.actor_id, error = %e, "failed to record error");
                }
                let handler = self.error_handler.lock().clone();
                if let Some(handler) = handler {
                    if let Err(e) = handler.post_error(error_envelope).await {
                        tracing::warn!(actor_id = %self.actor_id, error = %e, "error-handler post failed");
                    }
                }
                // Delete after recording: a deterministically failing
                // message must not be retried forever on the next `Start`.
                let _ = protocol::delete_pipeline_entry(&self.store, &self.keys, &pipeline_id)
                    .await;
            }
        }
    }

    async fn fan_out(&self, output: &C::Output) {
        let children: Vec<_> = self.children.lock().values().cloned().collect();
        for child in children {
            if let Err(e) = child.post(output.clone()).await {
                tracing::warn!(actor_id = %self.actor_id, error = %e, "fan-out post failed");
            }
        }
    }

    /// Run the computation directly on the caller's task, bypassing
    /// `inbox` entirely. Still records the envelope in `pipeline` for
    /// crash recovery and still fans out to children and routes failures
    /// to the error-handler, but never touches `results` — the caller
    /// already holds the output.
    pub async fn execute_local(&self, input: C::Input) -> Result<C::Output, ActorError> {
        let pipeline_id = PipelineId::new();
        let envelope = Envelope::fire_and_forget(input.clone());
        protocol::record_pipeline_entry(&self.store, &self.keys, &pipeline_id, &envelope).await?;

        match self.computation.call(input.clone()).await {
            Ok(output) => {
                self.fan_out(&output).await;
                protocol::delete_pipeline_entry(&self.store, &self.keys, &pipeline_id).await?;
                Ok(output)
            }
            Err(error) => {
                tracing::warn!(actor_id = %self.actor_id, %error, "computation failed (local bypass)");
                let error_envelope = ErrorEnvelope {
                    actor_id: self.actor_id.clone(),
                    payload: input,
                    error: error.clone(),
                    occurred_at: chrono::Utc::now(),
                };
                if let Err(e) =
                    protocol::record_error(&self.store, &self.keys, &error_envelope).await
                {
                    tracing::warn!(actor_id = %self.actor_id, error = %e, "failed to record error");
                }
                let handler = self.error_handler.lock().clone();
                if let Some(handler) = handler {
                    if let Err(e) = handler.post_error(error_envelope).await {
                        tracing::warn!(actor_id = %self.actor_id, error = %e, "error-handler post failed");
                    }
                }
                protocol::delete_pipeline_entry(&self.store, &self.keys, &pipeline_id).await?;
                Err(ActorError::Computation(error))
            }
        }
    }
}

/// Scan `pipeline` for envelopes left in-flight by a prior process and
/// re-execute each one. Called once at `Start`, before the claim loop
/// begins. Re-executions are bounded by the same semaphore as
/// steady-state dispatch, so a large recovery backlog does not exceed the
/// process-wide concurrency cap.
pub(crate) async fn recover<S: StoreAdapter, C: Computation>(
    ctx: Arc<DispatchContext<S, C>>,
    semaphore: Arc<Semaphore>,
) {
    let leftovers = match protocol::recover::<S, C::Input>(&ctx.store, &ctx.keys).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(actor_id = %ctx.actor_id, error = %e, "pipeline recovery scan failed");
            return;
        }
    };
    for (pipeline_id, envelope) in leftovers {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };
        tracing::info!(actor_id = %ctx.actor_id, pipeline_id = %pipeline_id, "recovering in-flight envelope");
        let ctx = ctx.clone();
        tokio::spawn(async move {
            ctx.execute_and_commit(pipeline_id, envelope).await;
            drop(permit);
        });
    }
}

/// The claim loop: acquire a permit, claim, spawn the computation as an
/// independent task holding that permit until it completes, loop.
pub(crate) async fn run_loop<S: StoreAdapter, C: Computation>(
    ctx: Arc<DispatchContext<S, C>>,
    semaphore: Arc<Semaphore>,
    wakeup: Arc<WakeupBus>,
    cancel: CancelToken,
) {
    loop {
        let permit = tokio::select! {
            _ = cancel.cancelled() => break,
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let claimed = protocol::claim::<S, C::Input>(&ctx.store, &ctx.keys).await;
        match claimed {
            Ok(Some((pipeline_id, envelope))) => {
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    ctx.execute_and_commit(pipeline_id, envelope).await;
                    drop(permit);
                });
            }
            Ok(None) => {
                drop(permit);
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = wakeup.wait_for_message() => {}
                }
            }
            Err(e) => {
                tracing::error!(actor_id = %ctx.actor_id, error = %e, "claim failed, dispatcher stopping");
                drop(permit);
                break;
            }
        }
    }
    tracing::debug!(actor_id = %ctx.actor_id, "dispatcher loop exited");
}
