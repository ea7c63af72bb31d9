//! The Actor Facade and its supporting types: the lifecycle state
//! machine, the user-supplied `Computation` trait, and the
//! `Actor<S, C>` struct a caller drives.

pub mod computation;
pub mod facade;
pub mod state;

pub use computation::{ChildLink, Computation, ErrorSink, FnComputation, Payload};
pub use facade::Actor;
pub use state::ActorState;
