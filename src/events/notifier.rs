// src/events/notifier.rs
//
// Change notifier
//
// DESIGN PRINCIPLES:
// 1. Registry of listeners keyed by id, each with an interest set
// 2. publish() is called by the writer after commit, under the writer lock,
//    so sequence order equals commit order
// 3. Delivery is a non-blocking try_send into a one-slot queue; a listener
//    holds at most one pending signal, closed listeners are pruned
// 4. Every publish is logged

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::events::change::{EntityKinds, StoreChange};

pub type ListenerId = u64;

struct Listener {
    interest: EntityKinds,
    label: String,
    sender: mpsc::Sender<StoreChange>,
}

pub struct ChangeNotifier {
    listeners: RwLock<HashMap<ListenerId, Listener>>,
    next_listener: AtomicU64,
    sequence: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_listener: AtomicU64::new(1),
            sequence: AtomicU64::new(0),
        }
    }

    /// Register interest in a set of entity kinds.
    ///
    /// The receiver is signalled on changes whose kinds intersect `interest`,
    /// until `unregister` is called or the receiver is dropped. Signals are
    /// coalesced: while one is pending, later changes are not queued behind it.
    pub fn register(
        &self,
        label: impl Into<String>,
        interest: EntityKinds,
    ) -> (ListenerId, mpsc::Receiver<StoreChange>) {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(1);
        let label = label.into();

        log::debug!("Listener {} registered for {} ({})", id, interest, label);

        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Listener {
                    interest,
                    label,
                    sender,
                },
            );

        (id, receiver)
    }

    /// Returns false when the listener was already gone
    pub fn unregister(&self, id: ListenerId) -> bool {
        let removed = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);

        if let Some(listener) = &removed {
            log::debug!("Listener {} unregistered ({})", id, listener.label);
        }
        removed.is_some()
    }

    /// Broadcast one committed change to every interested listener
    pub fn publish(&self, operation: &str, kinds: EntityKinds) -> StoreChange {
        let change = StoreChange {
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst) + 1,
            kinds,
            operation: operation.to_string(),
            committed_at: Utc::now(),
        };

        let mut notified = 0usize;
        let mut closed = Vec::new();
        {
            let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
            for (id, listener) in listeners.iter() {
                if !listener.interest.intersects(kinds) {
                    continue;
                }
                match listener.sender.try_send(change.clone()) {
                    Ok(()) | Err(TrySendError::Full(_)) => notified += 1,
                    Err(TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
            for id in &closed {
                listeners.remove(id);
            }
        }

        log::debug!(
            "[CHANGE] #{} {} by {} | {} listeners notified",
            change.sequence,
            change.kinds,
            change.operation,
            notified
        );

        change
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Sequence number of the last published change (0 before any)
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
