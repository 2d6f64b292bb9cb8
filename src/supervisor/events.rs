// src/supervisor/events.rs

//! Typed publish/subscribe hub for process lifecycle events.
//!
//! Subscribers register under a label and receive every subsequent
//! [`ProcessEvent`] on an unbounded channel. Labels allow removing a named
//! subset of subscribers (or all of them) at any point, without the
//! supervisor depending on who is listening.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use crate::supervisor::ProcessEvent;

type Subscribers = HashMap<String, Vec<mpsc::UnboundedSender<ProcessEvent>>>;

#[derive(Debug, Clone, Default)]
pub struct SubscriberHub {
    inner: Arc<Mutex<Subscribers>>,
}

impl SubscriberHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber under `label` and return its receiving end.
    ///
    /// Multiple subscribers may share a label; `remove(Some(label))` drops
    /// them all at once.
    pub fn subscribe(&self, label: impl Into<String>) -> mpsc::UnboundedReceiver<ProcessEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().entry(label.into()).or_default().push(tx);
        rx
    }

    /// Drop the subscribers registered under `label`, or every subscriber
    /// when `label` is `None`.
    pub fn remove(&self, label: Option<&str>) {
        let mut subs = self.lock();
        match label {
            Some(label) => {
                subs.remove(label);
            }
            None => subs.clear(),
        }
    }

    /// Deliver an event to all current subscribers.
    ///
    /// Senders whose receiver has been dropped are pruned as a side effect.
    pub fn publish(&self, event: &ProcessEvent) {
        let mut subs = self.lock();
        for senders in subs.values_mut() {
            senders.retain(|tx| tx.send(event.clone()).is_ok());
        }
        subs.retain(|_, senders| !senders.is_empty());
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
