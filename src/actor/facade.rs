//! The Actor Facade: the public surface a caller drives — `Start`/`Stop`/
//! `Dispose`, `Post`/`PostAndReply`, linking, and the error-handler
//! accessor — over the mailbox protocol, wakeup bus, and dispatcher
//! underneath.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::time::Instant;

// Layer 3: Internal module imports
use crate::actor::computation::{ChildLink, Computation, ErrorSink, Payload};
use crate::actor::state::ActorState;
use crate::config::RuntimeConfig;
use crate::dispatcher::{self, DispatchContext};
use crate::error::ActorError;
use crate::mailbox::keys::MailboxKeys;
use crate::mailbox::{protocol, Envelope, ErrorEnvelope, Priority};
use crate::store::StoreAdapter;
use crate::util::CancelToken;
use crate::wakeup::WakeupBus;

/// A running (or not-yet-started, or stopped, or disposed) actor: a
/// stable identity, a durable store-backed mailbox, and an optional
/// computation.
///
/// Constructed only through [`crate::Runtime::actor`], never directly,
/// so the process-wide semaphore and store handle are never duplicated.
pub struct Actor<S: StoreAdapter, C: Computation> {
    id: String,
    store: S,
    keys: MailboxKeys,
    config: RuntimeConfig,
    semaphore: Arc<Semaphore>,
    computation: Option<Arc<C>>,
    children: Arc<Mutex<HashMap<String, Arc<dyn ChildLink<C::Output>>>>>,
    error_handler: Arc<Mutex<Option<Arc<dyn ErrorSink<C::Input>>>>>,
    state: Mutex<ActorState>,
    bus: Arc<WakeupBus>,
    bus_cancel: CancelToken,
    dispatcher_cancel: Mutex<Option<CancelToken>>,
}

impl<S: StoreAdapter, C: Computation> Actor<S, C> {
    /// Construct an actor and start listening on its wakeup channel.
    /// The wakeup subscription is live from construction, independent of
    /// `Start`, so `PostAndReply` works before the actor has ever run —
    /// valid in `Created` as well as `Running`/`Stopped`.
    pub(crate) async fn new(
        id: impl Into<String>,
        store: S,
        config: RuntimeConfig,
        semaphore: Arc<Semaphore>,
        computation: Option<Arc<C>>,
    ) -> Result<Arc<Self>, ActorError> {
        let id = id.into();
        let keys = MailboxKeys::for_actor(&id, &config.key_prefix_template);
        let bus_cancel = CancelToken::new();
        let bus = WakeupBus::spawn(&store, &keys.channel, bus_cancel.clone()).await?;

        Ok(Arc::new(Self {
            id,
            store,
            keys,
            config,
            semaphore,
            computation,
            children: Arc::new(Mutex::new(HashMap::new())),
            error_handler: Arc::new(Mutex::new(None)),
            state: Mutex::new(ActorState::Created),
            bus: Arc::new(bus),
            bus_cancel,
            dispatcher_cancel: Mutex::new(None),
        }))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn state(&self) -> ActorState {
        *self.state.lock()
    }

    /// Current length of `inbox` — an approximation the moment it's read.
    pub async fn queue_length(&self) -> Result<usize, ActorError> {
        let length = self
            .store
            .list_length(&self.keys.inbox)
            .await
            .map_err(crate::error::MailboxError::from)?;
        Ok(length)
    }

    /// Identities of currently linked children.
    pub fn children(&self) -> Vec<String> {
        self.children.lock().keys().cloned().collect()
    }

    /// Link `child` under `child_id`; its output type must match this
    /// actor's computation output.
    pub fn link(&self, child_id: impl Into<String>, child: Arc<dyn ChildLink<C::Output>>) {
        self.children.lock().insert(child_id.into(), child);
    }

    pub fn unlink(&self, child_id: &str) {
        self.children.lock().remove(child_id);
    }

    /// Bind (or clear, with `None`) the actor that failed computations
    /// are routed to.
    pub fn set_error_handler(&self, handler: Option<Arc<dyn ErrorSink<C::Input>>>) {
        *self.error_handler.lock() = handler;
    }

    fn dispatch_context(&self, computation: Arc<C>) -> DispatchContext<S, C> {
        DispatchContext {
            actor_id: self.id.clone(),
            store: self.store.clone(),
            keys: self.keys.clone(),
            computation,
            children: self.children.clone(),
            error_handler: self.error_handler.clone(),
            config: self.config.clone(),
        }
    }

    /// Begin claiming and executing. Requires a computation; scans
    /// `pipeline` for envelopes a prior process left in flight before the
    /// claim loop starts.
    pub async fn start(self: &Arc<Self>) -> Result<(), ActorError> {
        let computation = self
            .computation
            .clone()
            .ok_or_else(|| ActorError::Usage("Start requires a computation".to_string()))?;

        {
            let mut state = self.state.lock();
            if state.is_disposed() {
                return Err(ActorError::Disposed(self.id.clone()));
            }
            *state = ActorState::Running;
        }

        let cancel = CancelToken::new();
        *self.dispatcher_cancel.lock() = Some(cancel.clone());

        let ctx = Arc::new(self.dispatch_context(computation));
        dispatcher::recover(ctx.clone(), self.semaphore.clone()).await;

        let semaphore = self.semaphore.clone();
        let wakeup = self.bus.clone();
        tokio::spawn(dispatcher::run_loop(ctx, semaphore, wakeup, cancel));

        Ok(())
    }

    /// Cancel the dispatcher loop. `inbox` is left untouched and may
    /// still be posted to or recovered by a future `Start`; the wakeup
    /// bus stays alive so `PostAndReply`'s remote path keeps working.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if state.is_disposed() {
            return;
        }
        if let Some(cancel) = self.dispatcher_cancel.lock().take() {
            cancel.cancel();
        }
        *state = ActorState::Stopped;
    }

    /// Terminal: cancels the dispatcher (if running) and the wakeup
    /// bus's subscription. The process-wide semaphore is never owned or
    /// torn down here — it belongs to the `Runtime` this actor was
    /// created through.
    pub fn dispose(&self) {
        let mut state = self.state.lock();
        if let Some(cancel) = self.dispatcher_cancel.lock().take() {
            cancel.cancel();
        }
        self.bus_cancel.cancel();
        *state = ActorState::Disposed;
    }

    /// Fire-and-forget post: valid in any state except `Disposed`.
    pub async fn post(&self, payload: C::Input, priority: Priority) -> Result<(), ActorError> {
        if self.state().is_disposed() {
            return Err(ActorError::Disposed(self.id.clone()));
        }
        let envelope = Envelope::fire_and_forget(payload);
        protocol::post(&self.store, &self.keys, &envelope, priority).await?;
        Ok(())
    }

    /// Post and await a single reply: local bypass when this actor is
    /// `Running` in this process, remote execution otherwise.
    pub async fn post_and_reply(
        &self,
        payload: C::Input,
        priority: Priority,
        timeout: Duration,
    ) -> Result<C::Output, ActorError> {
        if self.state().is_disposed() {
            return Err(ActorError::Disposed(self.id.clone()));
        }
        if self.state().is_running() {
            return self.post_and_reply_local(payload, timeout).await;
        }
        self.post_and_reply_remote(payload, priority, timeout).await
    }

    /// The local-bypass path is wrapped in the same timeout as the
    /// remote path: the timeout applies to the total wait. Timing out
    /// drops the in-progress computation future; the
    /// pipeline entry recorded before it ran is left for the next
    /// `Start`'s recovery scan to pick up, rather than silently lost.
    ///
    /// A permit from the process-wide semaphore is held for the duration
    /// of the computation, same as `run_loop`'s spawned task — the bypass
    /// still runs a computation and must count against the global
    /// in-flight bound, not just claims that went through `inbox`.
    async fn post_and_reply_local(
        &self,
        payload: C::Input,
        timeout: Duration,
    ) -> Result<C::Output, ActorError> {
        let computation = self
            .computation
            .clone()
            .ok_or_else(|| ActorError::Usage("local bypass requires a computation".to_string()))?;
        let ctx = self.dispatch_context(computation);
        let semaphore = self.semaphore.clone();
        let bounded = async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| ActorError::Disposed(ctx.actor_id.clone()))?;
            ctx.execute_local(payload).await
        };
        match tokio::time::timeout(timeout, bounded).await {
            Ok(result) => result,
            Err(_) => Err(ActorError::Timeout(timeout)),
        }
    }

    async fn post_and_reply_remote(
        &self,
        payload: C::Input,
        priority: Priority,
        timeout: Duration,
    ) -> Result<C::Output, ActorError> {
        let (envelope, correlation_id) = Envelope::awaiting_reply(payload);
        protocol::post(&self.store, &self.keys, &envelope, priority).await?;

        let deadline = Instant::now() + timeout;
        loop {
            let read = protocol::read_result::<S, C::Output>(
                &self.store,
                &self.keys,
                &correlation_id,
                self.config.result_retention,
            )
            .await?;
            if let Some(output) = read {
                return Ok(output);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ActorError::Timeout(timeout));
            }
            if tokio::time::timeout(remaining, self.bus.wait_for_result())
                .await
                .is_err()
            {
                return Err(ActorError::Timeout(timeout));
            }
        }
    }
}

/// Lets one actor's output fan out into another: `Arc<Actor<S, C>>` is a
/// valid `Link` target whenever its input type matches the producing
/// actor's output type.
#[async_trait]
impl<S, C> ChildLink<C::Input> for Actor<S, C>
where
    S: StoreAdapter,
    C: Computation,
{
    async fn post(&self, payload: C::Input) -> Result<(), String> {
        Actor::post(self, payload, Priority::Normal)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Lets one actor serve as another's bound error-handler: valid
/// whenever its computation's input is the error envelope of the type
/// the failing actor carries.
#[async_trait]
impl<S, C, X> ErrorSink<X> for Actor<S, C>
where
    S: StoreAdapter,
    C: Computation<Input = ErrorEnvelope<X>>,
    X: Payload,
{
    async fn post_error(&self, envelope: ErrorEnvelope<X>) -> Result<(), String> {
        Actor::post(self, envelope, Priority::Normal)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "unwrap acceptable in test code")]
mod tests {
    use super::*;
    use crate::actor::computation::FnComputation;
    use crate::store::MemoryStore;
    use std::time::Duration;

    async fn echo_actor() -> Arc<Actor<MemoryStore, FnComputation<fn(i32) -> Result<i32, String>>>>
    {
        let store = MemoryStore::new();
        let semaphore = Arc::new(Semaphore::new(4));
        let computation: fn(i32) -> Result<i32, String> = |x| Ok(x);
        Actor::new(
            "echo",
            store,
            RuntimeConfig::default(),
            semaphore,
            Some(Arc::new(FnComputation::new(computation))),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn id_and_initial_queue_length() {
        let actor = echo_actor().await;
        assert_eq!(actor.id(), "echo");
        assert_eq!(actor.queue_length().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn start_without_computation_is_usage_error() {
        let store = MemoryStore::new();
        let semaphore = Arc::new(Semaphore::new(4));
        let computation: Option<Arc<FnComputation<fn(i32) -> Result<i32, String>>>> = None;
        let actor = Actor::new("noop", store, RuntimeConfig::default(), semaphore, computation)
            .await
            .unwrap();

        let result = actor.start().await;
        assert!(matches!(result, Err(ActorError::Usage(_))));
    }

    #[tokio::test]
    async fn local_bypass_round_trips_when_running() {
        let actor = echo_actor().await;
        actor.start().await.unwrap();

        let output = actor
            .post_and_reply(42, Priority::Normal, Duration::from_millis(200))
            .await
            .unwrap();
        assert_eq!(output, 42);
        assert_eq!(actor.queue_length().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn remote_path_round_trips_via_background_worker() {
        let store = MemoryStore::new();
        let semaphore = Arc::new(Semaphore::new(4));
        let computation: fn(i32) -> Result<i32, String> = |x| Ok(x);
        let actor = Actor::new(
            "remote-echo",
            store.clone(),
            RuntimeConfig::default(),
            semaphore,
            Some(Arc::new(FnComputation::new(computation))),
        )
        .await
        .unwrap();

        // Never `start()`ed: the actor stays `Created`, so `PostAndReply`
        // takes the remote path. A stand-in for a worker process claims
        // and completes the envelope directly against the same store.
        let keys =
            MailboxKeys::for_actor("remote-echo", &RuntimeConfig::default().key_prefix_template);
        let worker_store = store.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(Some((pipeline_id, envelope))) =
                    protocol::claim::<MemoryStore, i32>(&worker_store, &keys).await
                {
                    protocol::delete_pipeline_entry(&worker_store, &keys, &pipeline_id)
                        .await
                        .unwrap();
                    protocol::write_result(
                        &worker_store,
                        &keys,
                        &envelope.correlation_id,
                        &envelope.payload,
                    )
                    .await
                    .unwrap();
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        let output = actor
            .post_and_reply(9, Priority::Normal, Duration::from_millis(500))
            .await
            .unwrap();
        assert_eq!(output, 9);
    }

    #[tokio::test]
    async fn remote_path_times_out_with_no_running_actor() {
        let store = MemoryStore::new();
        let semaphore = Arc::new(Semaphore::new(4));
        let computation: fn(i32) -> Result<i32, String> = |x| Ok(x);
        let actor = Actor::new(
            "idle",
            store,
            RuntimeConfig::default(),
            semaphore,
            Some(Arc::new(FnComputation::new(computation))),
        )
        .await
        .unwrap();

        let result = actor
            .post_and_reply(1, Priority::Normal, Duration::from_millis(0))
            .await;
        assert!(matches!(result, Err(ActorError::Timeout(_))));
    }

    #[tokio::test]
    async fn disposed_actor_rejects_post() {
        let actor = echo_actor().await;
        actor.dispose();

        let result = actor.post(1, Priority::Normal).await;
        assert!(matches!(result, Err(ActorError::Disposed(_))));
    }

    #[tokio::test]
    async fn stop_cancels_dispatcher_but_leaves_remote_path_usable() {
        let actor = echo_actor().await;
        actor.start().await.unwrap();
        actor.stop();

        actor.post(5, Priority::Normal).await.unwrap();
        let result = actor
            .post_and_reply(1, Priority::Normal, Duration::from_millis(50))
            .await;
        assert!(result.is_ok() || matches!(result, Err(ActorError::Timeout(_))));
    }

    #[tokio::test]
    async fn link_and_unlink_track_children() {
        let actor = echo_actor().await;
        let child = echo_actor().await;
        actor.link("child", child.clone());
        assert_eq!(actor.children(), vec!["child".to_string()]);

        actor.unlink("child");
        assert!(actor.children().is_empty());
    }
}
