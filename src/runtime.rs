//! The Runtime Handle: a thin public entry point that bundles the store
//! handle, process-wide semaphore, and configuration so actors are
//! spawned *through* it rather than assembling their own copies of
//! shared state.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tokio::sync::Semaphore;

// Layer 3: Internal module imports
use crate::actor::{Actor, Computation};
use crate::config::RuntimeConfig;
use crate::error::ActorError;
use crate::store::StoreAdapter;

/// One process's handle onto the shared store, carrying the
/// process-wide concurrency bound every actor's dispatcher shares: the
/// global in-flight count never exceeds the semaphore bound.
///
/// Cloning a `Runtime` shares the same semaphore and store handle; it
/// does not create a second independent runtime.
///
/// # Examples
///
/// ```rust,ignore
/// use actorq_rt::prelude::*;
///
/// # async fn run() -> Result<(), ActorError> {
/// let runtime = Runtime::new(MemoryStore::new(), RuntimeConfig::default());
/// let echo = runtime
///     .actor("echo", Some(Arc::new(FnComputation::new(|x: i32| Ok(x)))))
///     .await?;
/// echo.start().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Runtime<S: StoreAdapter> {
    store: S,
    config: RuntimeConfig,
    semaphore: Arc<Semaphore>,
}

impl<S: StoreAdapter> Runtime<S> {
    /// Construct a runtime over `store`, sizing the process-wide
    /// semaphore from `config.semaphore_capacity`.
    pub fn new(store: S, config: RuntimeConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.semaphore_capacity));
        Self {
            store,
            config,
            semaphore,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Create an actor identified by `id`, optionally carrying
    /// `computation`. The actor's wakeup subscription is live
    /// immediately; `Start` is a separate call.
    pub async fn actor<C: Computation>(
        &self,
        id: impl Into<String>,
        computation: Option<Arc<C>>,
    ) -> Result<Arc<Actor<S, C>>, ActorError> {
        Actor::new(
            id,
            self.store.clone(),
            self.config.clone(),
            self.semaphore.clone(),
            computation,
        )
        .await
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "unwrap acceptable in test code")]
mod tests {
    use super::*;
    use crate::actor::FnComputation;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn runtime_spawns_actors_sharing_one_semaphore() {
        let runtime = Runtime::new(MemoryStore::new(), RuntimeConfig::default());
        let double: fn(i32) -> Result<i32, String> = |x| Ok(x * 2);
        let actor = runtime
            .actor("double", Some(Arc::new(FnComputation::new(double))))
            .await
            .unwrap();
        assert_eq!(actor.id(), "double");
    }

    #[tokio::test]
    async fn config_reflects_constructor_argument() {
        let config = RuntimeConfig::builder().semaphore_capacity(5).build();
        let runtime = Runtime::new(MemoryStore::new(), config);
        assert_eq!(runtime.config().semaphore_capacity, 5);
    }
}
