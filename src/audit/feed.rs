//! Live audit fan-out
//!
//! Each subscriber owns an unbounded channel: publishing never waits on a
//! subscriber and never drops an event for one that is slow. Late subscribers
//! get no replay.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::audit::AuditEvent;

#[derive(Debug, Clone, Default)]
pub struct AuditFeed {
    subscribers: Arc<Mutex<Vec<UnboundedSender<AuditEvent>>>>,
}

impl AuditFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver to every current subscriber. Having none is not an error.
    ///
    /// Subscribers whose receiving side is gone are released here.
    pub fn publish(&self, event: AuditEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
    }

    pub fn subscribe(&self) -> AuditSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender);
        AuditSubscription { receiver }
    }

    /// Invoke `callback` for every event published from now on.
    ///
    /// Runs on the current tokio runtime; delivery stops when the returned
    /// handle is unsubscribed or dropped.
    pub fn subscribe_with<F>(&self, mut callback: F) -> AuditSubscriptionHandle
    where
        F: FnMut(AuditEvent) + Send + 'static,
    {
        let mut subscription = self.subscribe();
        let task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                callback(event);
            }
        });
        AuditSubscriptionHandle { task: Some(task) }
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|sender| !sender.is_closed());
        subscribers.len()
    }
}

/// Pull-style subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct AuditSubscription {
    receiver: UnboundedReceiver<AuditEvent>,
}

impl AuditSubscription {
    /// Wait for the next event; `None` once the feed is gone.
    pub async fn recv(&mut self) -> Option<AuditEvent> {
        self.receiver.recv().await
    }

    /// Next already-delivered event, without waiting.
    pub fn try_recv(&mut self) -> Option<AuditEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Handle for a callback subscription.
#[derive(Debug)]
pub struct AuditSubscriptionHandle {
    task: Option<JoinHandle<()>>,
}

impl AuditSubscriptionHandle {
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for AuditSubscriptionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
