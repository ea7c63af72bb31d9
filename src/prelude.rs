//! Prelude module for convenient imports.
//!
//! Re-exports the surface most callers need to spawn and drive actors:
//!
//! ```rust,ignore
//! use actorq_rt::prelude::*;
//! ```
//!
//! # What's Included
//!
//! ## Runtime
//! - [`Runtime`] - process-wide store + semaphore + config handle
//! - [`RuntimeConfig`] - semaphore capacity, result retention, key template
//! - [`ResultRetention`] - whether `results[cid]` is deleted on read
//!
//! ## Actors
//! - [`Actor`] - the facade: `start`/`stop`/`dispose`/`post`/`post_and_reply`
//! - [`Computation`] - the user-supplied input→output transform
//! - [`FnComputation`] - wraps a plain closure as a `Computation`
//! - [`ChildLink`] / [`ErrorSink`] - fan-out and error-routing targets
//!
//! ## Messaging
//! - [`Envelope`] - payload plus correlation id
//! - [`ErrorEnvelope`] - a failed computation's payload plus its error
//! - [`Priority`] - `Normal` (FIFO) or `High` (claimed next)
//!
//! ## Store
//! - [`StoreAdapter`] - the trait any backing store implements
//! - [`MemoryStore`] - the in-process implementation
//!
//! ## Errors
//! - [`ActorError`] - top-level facade error

pub use crate::actor::{Actor, ChildLink, Computation, ErrorSink, FnComputation};
pub use crate::config::{ResultRetention, RuntimeConfig};
pub use crate::error::ActorError;
pub use crate::mailbox::{Envelope, ErrorEnvelope, Priority};
pub use crate::runtime::Runtime;
pub use crate::store::{MemoryStore, StoreAdapter};
