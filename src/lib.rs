//! # actorq-rt — a distributed actor runtime over a shared store
//!
//! Each actor has a stable identity, a private durable mailbox in a
//! shared key-value + pub/sub store, and an optional user-supplied
//! computation that transforms an input message into an output message.
//! Actors may run on any process holding the actor's identity and store
//! credentials: any such process can post to an actor, and any process
//! that has registered the computation can execute it. Actors chain —
//! an actor's output is automatically posted to linked children, forming
//! pipelines — and support request/reply, where a caller posts a message
//! and awaits a single result keyed by a correlation id.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use actorq_rt::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ActorError> {
//!     let runtime = Runtime::new(MemoryStore::new(), RuntimeConfig::default());
//!
//!     let echo = runtime
//!         .actor("echo", Some(Arc::new(FnComputation::new(|x: i32| Ok(x)))))
//!         .await?;
//!     echo.start().await?;
//!
//!     let reply = echo
//!         .post_and_reply(42, Priority::Normal, Duration::from_secs(1))
//!         .await?;
//!     assert_eq!(reply, 42);
//!     Ok(())
//! }
//! ```
//!
//! # The Core
//!
//! The hard and interesting part of this crate is the actor's mailbox
//! and execution protocol on top of the store: the durable
//! intake/commit/ack pipeline that survives worker crashes, the
//! concurrency control that bounds global in-flight work, the
//! request/reply correlation and wakeup protocol built from store
//! commands plus a pub/sub channel, the parent/child fan-out, and the
//! error-handling dataflow (errors themselves become messages to an
//! error-handler actor). Connection bootstrapping, value serialization,
//! and logging are kept at the edges, behind [`store::StoreAdapter`] and
//! the `tracing` facade, so they can be swapped without touching the
//! core.
//!
//! # Module Organization
//!
//! - [`actor`] - the facade (`Actor<S, C>`), lifecycle state, and the
//!   `Computation`/`ChildLink`/`ErrorSink` traits
//! - [`mailbox`] - envelope shapes, per-actor key layout, and the
//!   claim/commit/recovery operations
//! - [`dispatcher`] - the per-actor claim loop and the semaphore-bounded
//!   commit/fan-out/error-routing sequence
//! - [`wakeup`] - the two-signal notification bus built on one pub/sub
//!   subscription
//! - [`store`] - the `StoreAdapter` trait and the in-memory
//!   implementation
//! - [`runtime`] - the process-wide handle actors are spawned through
//! - [`config`] - `RuntimeConfig` and its defaults
//! - [`error`] - the crate's error taxonomy
//! - [`util`] - identifiers and the cooperative cancellation token
//!
//! # Standards
//!
//! - 3-layer import organization (std → third-party → internal) in
//!   every module
//! - `thiserror` for every public error type; no stringly-typed errors
//!   on a public path
//! - `tracing` for every log line; no dependency on a particular
//!   subscriber
//! - `clippy::unwrap_used`, `clippy::expect_used`, and `clippy::panic`
//!   are denied outside test code

pub mod actor;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod mailbox;
pub mod prelude;
pub mod runtime;
pub mod store;
pub mod util;
pub mod wakeup;

pub use actor::{Actor, ChildLink, Computation, ErrorSink, FnComputation};
pub use config::{ResultRetention, RuntimeConfig};
pub use error::{ActorError, MailboxError, StoreError};
pub use mailbox::{Envelope, ErrorEnvelope, Priority};
pub use runtime::Runtime;
pub use store::{MemoryStore, StoreAdapter};
