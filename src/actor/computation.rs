//! The `Computation` trait: the user-supplied input→output transform an
//! actor optionally carries.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

// Layer 3: Internal module imports
// (none)

/// A value an actor can carry through its mailbox: serializable (to cross
/// the store boundary), cloneable (fan-out posts the same output to every
/// linked child), and safe to move across tasks.
pub trait Payload: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}
impl<T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static> Payload for T {}

/// The user-supplied computation an actor transforms messages with: an
/// optional transform from an input message to an output message.
///
/// # Idempotence
///
/// Crash recovery re-executes a computation for any envelope still in
/// `pipeline` at `Start`. A computation that is not idempotent will
/// observe at-least-once delivery rather than exactly-once.
#[async_trait]
pub trait Computation: Send + Sync + 'static {
    type Input: Payload;
    type Output: Payload;

    /// Transform one input into one output, or fail with a description
    /// that becomes the `error` field of an [`crate::mailbox::ErrorEnvelope`].
    async fn call(&self, input: Self::Input) -> Result<Self::Output, String>;
}

/// An `impl Fn`-backed computation for simple stateless transforms, e.g.
/// `x ↦ x` or `x ↦ 2x`.
pub struct FnComputation<F> {
    f: F,
}

impl<F> FnComputation<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<I, O, F> Computation for FnComputation<F>
where
    I: Payload,
    O: Payload,
    F: Fn(I) -> Result<O, String> + Send + Sync + 'static,
{
    type Input = I;
    type Output = O;

    async fn call(&self, input: I) -> Result<O, String> {
        (self.f)(input)
    }
}

/// A handle the dispatcher uses to fan a produced output out to a linked
/// child via the child's own `post`, without the parent owning the
/// child's lifecycle.
///
/// This is the one place the crate reaches for a trait object: children
/// of the same actor are heterogeneous (different computations, same
/// input type), so a generic constraint cannot name them all at once.
#[async_trait]
pub trait ChildLink<I: Payload>: Send + Sync {
    async fn post(&self, payload: I) -> Result<(), String>;
}

/// A handle the dispatcher uses to forward a failed envelope to the bound
/// error-handler actor, whose `Computation::Input` is the error envelope
/// type.
#[async_trait]
pub trait ErrorSink<I: Payload>: Send + Sync {
    async fn post_error(
        &self,
        envelope: crate::mailbox::ErrorEnvelope<I>,
    ) -> Result<(), String>;
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "unwrap acceptable in test code")]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fn_computation_runs_closure() {
        let double = FnComputation::new(|x: i32| Ok::<_, String>(x * 2));
        assert_eq!(double.call(21).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn fn_computation_propagates_error() {
        let boom = FnComputation::new(|_: i32| Err::<i32, _>("always fails".to_string()));
        let err = boom.call(1).await.unwrap_err();
        assert_eq!(err, "always fails");
    }
}
