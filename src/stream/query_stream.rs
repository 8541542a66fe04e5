// src/stream/query_stream.rs
//
// Query Stream - a live query as a cancellable sequence of values
//
// CRITICAL RULES:
// - The change listener is registered BEFORE the first evaluation, so no
//   commit between the two can be missed
// - One background task per stream; it alone evaluates, filters and sends,
//   so deliveries are ordered and never concurrent
// - Queued change signals are drained before re-evaluating; the newest
//   snapshot wins
// - A failed evaluation is delivered once, then the stream ends
// - Cancelling is idempotent; dropping the stream cancels it

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::db::ConnectionPool;
use crate::error::{AppError, AppResult};
use crate::events::{ChangeNotifier, ListenerId};
use crate::store::{run_query, Query};
use crate::stream::dedup::DuplicateFilter;

struct HandleInner {
    cancelled: AtomicBool,
    listener: ListenerId,
    notifier: Arc<ChangeNotifier>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Cloneable cancel token for one stream
#[derive(Clone)]
pub struct SubscriptionHandle {
    inner: Arc<HandleInner>,
}

impl SubscriptionHandle {
    fn new(listener: ListenerId, notifier: Arc<ChangeNotifier>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                cancelled: AtomicBool::new(false),
                listener,
                notifier,
                task: Mutex::new(None),
            }),
        }
    }

    fn attach(&self, task: JoinHandle<()>) {
        let mut slot = self.inner.task.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_cancelled() {
            task.abort();
        } else {
            *slot = Some(task);
        }
    }

    /// Stop deliveries and tear down the change listener. Never blocks.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        self.inner.notifier.unregister(self.inner.listener);

        let task = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }
}

pub struct QueryStream<T> {
    receiver: mpsc::Receiver<AppResult<T>>,
    handle: SubscriptionHandle,
    finished: bool,
}

impl<T> QueryStream<T> {
    /// Next value, the terminal error, or `None` once the stream is over
    pub async fn next(&mut self) -> Option<AppResult<T>> {
        if self.finished || self.handle.is_cancelled() {
            return None;
        }

        let item = self.receiver.recv().await;
        self.settle(item)
    }

    /// Like `next`, without waiting. `None` also means "nothing ready yet".
    pub fn try_next(&mut self) -> Option<AppResult<T>> {
        if self.finished || self.handle.is_cancelled() {
            return None;
        }

        match self.receiver.try_recv() {
            Ok(item) => self.settle(Some(item)),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => self.settle(None),
        }
    }

    fn settle(&mut self, item: Option<AppResult<T>>) -> Option<AppResult<T>> {
        if self.handle.is_cancelled() {
            self.finished = true;
            return None;
        }

        match item {
            Some(Ok(value)) => Some(Ok(value)),
            Some(Err(e)) => {
                self.finished = true;
                Some(Err(e))
            }
            None => {
                self.finished = true;
                None
            }
        }
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.finished || self.handle.is_cancelled()
    }
}

impl<T> Drop for QueryStream<T> {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

/// Start a live query. Must be called from within a tokio runtime.
///
/// The first evaluation is delivered unless it equals `initial`; later
/// evaluations are delivered only when the projected value changed.
pub fn spawn_query_stream<Q, T, F>(
    pool: Arc<ConnectionPool>,
    notifier: Arc<ChangeNotifier>,
    query: Q,
    initial: Option<T>,
    transform: F,
) -> QueryStream<T>
where
    Q: Query,
    T: PartialEq + Clone + Send + 'static,
    F: Fn(Q::Output) -> T + Send + Sync + 'static,
{
    let label = query.describe();
    let (listener, mut changes) = notifier.register(label.clone(), query.interest());
    let (sender, receiver) = mpsc::channel(1);
    let handle = SubscriptionHandle::new(listener, Arc::clone(&notifier));

    let query = Arc::new(query);
    let transform = Arc::new(transform);

    let task = tokio::spawn(async move {
        let mut filter = DuplicateFilter::new(initial);

        loop {
            let pool = Arc::clone(&pool);
            let query = Arc::clone(&query);
            let transform = Arc::clone(&transform);

            let evaluated = tokio::task::spawn_blocking(move || {
                run_query(&pool, query.as_ref()).map(|output| (*transform)(output))
            })
            .await
            .unwrap_or_else(|e| Err(AppError::from(e)));

            match evaluated {
                Ok(value) => {
                    if let Some(value) = filter.admit(value) {
                        if sender.send(Ok(value)).await.is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    log::error!("Live query {} failed: {}", label, e);
                    let _ = sender.send(Err(e)).await;
                    break;
                }
            }

            if changes.recv().await.is_none() {
                break;
            }
            while changes.try_recv().is_ok() {}
        }

        notifier.unregister(listener);
    });

    handle.attach(task);

    QueryStream {
        receiver,
        handle,
        finished: false,
    }
}
