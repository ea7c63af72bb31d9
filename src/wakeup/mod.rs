//! The Wakeup Bus: two local edge-triggered signals per actor, fed from
//! one pub/sub subscription that demultiplexes on payload emptiness.
//!
//! Built on `tokio::sync::Notify` for wakeup signaling, adapted from a
//! one-shot-per-request shape to two long-lived, many-times-fired signals
//! shared by every waiter on one actor.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tokio::sync::Notify;

// Layer 3: Internal module imports
use crate::error::MailboxError;
use crate::store::StoreAdapter;
use crate::util::{CancelToken, CorrelationId};

/// A parsed notification payload — the wire format is still one string,
/// but parsing happens once, here, rather than being re-derived by every
/// waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Empty payload: the mailbox may now be non-empty.
    MailboxReadable,
    /// Non-empty payload: a result may have arrived for this correlation id.
    ResultReady(CorrelationId),
}

impl Notification {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            Notification::MailboxReadable
        } else {
            Notification::ResultReady(CorrelationId::from(raw.to_string()))
        }
    }
}

/// Two edge-triggered signals per actor, kept live by a background task
/// subscribed to the actor's notification channel.
///
/// Waiters treat these as hints, not delivery: every wait is followed by
/// re-reading the store, so a missed or coalesced notification never
/// causes a stuck waiter, only an extra store round trip on the next
/// wakeup.
pub struct WakeupBus {
    message_arrived: Arc<Notify>,
    result_arrived: Arc<Notify>,
}

impl WakeupBus {
    /// Subscribe to `channel` and start demultiplexing notifications.
    /// The background task exits when `cancel` fires or the subscription
    /// closes.
    pub async fn spawn<S: StoreAdapter>(
        store: &S,
        channel: &str,
        cancel: CancelToken,
    ) -> Result<Self, MailboxError> {
        let mut subscription = store.subscribe(channel).await?;
        let message_arrived = Arc::new(Notify::new());
        let result_arrived = Arc::new(Notify::new());

        let message_arrived_task = message_arrived.clone();
        let result_arrived_task = result_arrived.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    message = subscription.recv() => {
                        match message {
                            Some(raw) => match Notification::parse(&raw) {
                                Notification::MailboxReadable => {
                                    message_arrived_task.notify_waiters();
                                }
                                Notification::ResultReady(_) => {
                                    result_arrived_task.notify_waiters();
                                }
                            },
                            None => break,
                        }
                    }
                }
            }
            tracing::debug!("wakeup bus subscription ended");
        });

        Ok(Self {
            message_arrived,
            result_arrived,
        })
    }

    /// Wait until a "mailbox may be non-empty" hint arrives.
    pub async fn wait_for_message(&self) {
        self.message_arrived.notified().await;
    }

    /// Wait until a "result may have arrived" hint arrives.
    pub async fn wait_for_result(&self) {
        self.result_arrived.notified().await;
    }
}
