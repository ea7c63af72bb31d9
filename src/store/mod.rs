//! Store Adapter: the thin abstract interface over the shared key-value +
//! pub/sub store that backs every actor's mailbox.
//!
//! All I/O the core performs goes through [`StoreAdapter`]. The crate ships
//! exactly one implementation, [`MemoryStore`], used both as the default
//! single-process backend and as the test double for every other module.

pub mod memory;
pub mod script;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::{HashOverwrite, StoreAdapter, Subscription};
