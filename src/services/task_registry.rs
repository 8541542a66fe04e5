// src/services/task_registry.rs
//
// Task Registry - owns the background work of one owner (a view model)
//
// CRITICAL RULES:
// - cancel() aborts every task and subscription, never blocks, and is idempotent
// - A cancelled registry refuses new work
// - Dropping the registry cancels it

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::task::JoinHandle;

use crate::stream::{QueryStream, SubscriptionHandle};

#[derive(Default)]
struct RegistryState {
    cancelled: bool,
    tasks: Vec<JoinHandle<()>>,
    subscriptions: Vec<SubscriptionHandle>,
}

pub struct TaskRegistry {
    label: String,
    state: Mutex<RegistryState>,
}

impl TaskRegistry {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Spawn `future` on the runtime. Returns false if the registry is cancelled.
    pub fn spawn<F>(&self, future: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.cancelled {
            log::debug!("{}: refusing task after cancel", self.label);
            return false;
        }

        state.tasks.retain(|task| !task.is_finished());
        state.tasks.push(tokio::spawn(future));
        true
    }

    /// Drive `stream`, handing each value to `on_next`.
    ///
    /// A terminal stream error is logged; it does not cancel the registry.
    pub fn subscribe<T, C>(&self, mut stream: QueryStream<T>, mut on_next: C) -> bool
    where
        T: Send + 'static,
        C: FnMut(T) + Send + 'static,
    {
        let handle = stream.handle();
        let label = self.label.clone();

        let spawned = self.spawn(async move {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(value) => on_next(value),
                    Err(e) => log::error!("{}: live query failed: {}", label, e),
                }
            }
        });

        if spawned {
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .subscriptions
                .push(handle);
        } else {
            handle.cancel();
        }
        spawned
    }

    pub fn cancel(&self) {
        let (tasks, subscriptions) = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            (
                std::mem::take(&mut state.tasks),
                std::mem::take(&mut state.subscriptions),
            )
        };

        log::debug!(
            "{}: cancelling {} tasks, {} subscriptions",
            self.label,
            tasks.len(),
            subscriptions.len()
        );

        for subscription in subscriptions {
            subscription.cancel();
        }
        for task in tasks {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancelled
    }

    /// Tasks spawned and not yet finished
    pub fn active_tasks(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tasks
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }
}

impl Drop for TaskRegistry {
    fn drop(&mut self) {
        self.cancel();
    }
}
