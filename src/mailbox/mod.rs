//! The Mailbox Protocol: key layout, envelope shapes, and the atomic
//! claim/commit/recovery operations built on top of a
//! [`crate::store::StoreAdapter`].

pub mod envelope;
pub mod keys;
pub mod protocol;

pub use envelope::{Envelope, ErrorEnvelope, Priority};
pub use keys::MailboxKeys;
