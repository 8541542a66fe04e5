// src/services/write_coordinator.rs
//
// Write Coordinator - the single writer
//
// CRITICAL RULES:
// - Every mutation of the record store goes through perform()
// - One writer at a time: an async mutex whose owned guard moves into the
//   blocking task, so a caller that stops awaiting cannot release it early
// - One IMMEDIATE transaction per operation; any error rolls it back
// - Commit, then publish, both under the writer lock

use std::sync::Arc;

use rusqlite::{Connection, TransactionBehavior};
use tokio::sync::Mutex;

use crate::db::{get_connection, ConnectionPool};
use crate::error::AppResult;
use crate::events::{ChangeNotifier, EntityKind, EntityKinds};
use crate::repositories::{CategoryRepository, IngredientRepository, MealRepository};

/// Handle given to a write operation for the duration of its transaction
pub struct WriteContext<'c> {
    conn: &'c Connection,
    changed: EntityKinds,
}

impl<'c> WriteContext<'c> {
    fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            changed: EntityKinds::NONE,
        }
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }

    pub fn categories(&self) -> CategoryRepository<'c> {
        CategoryRepository::new(self.conn)
    }

    pub fn meals(&self) -> MealRepository<'c> {
        MealRepository::new(self.conn)
    }

    pub fn ingredients(&self) -> IngredientRepository<'c> {
        IngredientRepository::new(self.conn)
    }

    /// Record that rows of `kind` really changed. Only marked kinds are published.
    pub fn mark_changed(&mut self, kind: EntityKind) {
        self.changed.insert(kind);
    }

    pub fn changed(&self) -> EntityKinds {
        self.changed
    }
}

pub struct WriteCoordinator {
    pool: Arc<ConnectionPool>,
    notifier: Arc<ChangeNotifier>,
    lock: Arc<Mutex<()>>,
}

impl WriteCoordinator {
    pub fn new(pool: Arc<ConnectionPool>, notifier: Arc<ChangeNotifier>) -> Self {
        Self {
            pool,
            notifier,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run `op` as one atomic write.
    ///
    /// Writers are served in arrival order. The operation commits or rolls
    /// back before the next writer starts, even if the returned future is
    /// dropped. Listeners are notified once per commit that changed rows.
    pub async fn perform<F, R>(&self, name: impl Into<String>, op: F) -> AppResult<R>
    where
        F: FnOnce(&mut WriteContext<'_>) -> AppResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let name = name.into();
        let guard = Arc::clone(&self.lock).lock_owned().await;
        let pool = Arc::clone(&self.pool);
        let notifier = Arc::clone(&self.notifier);

        tokio::task::spawn_blocking(move || {
            let _writer = guard;
            run_write(&pool, &notifier, &name, op)
        })
        .await?
    }
}

fn run_write<F, R>(pool: &ConnectionPool, notifier: &ChangeNotifier, name: &str, op: F) -> AppResult<R>
where
    F: FnOnce(&mut WriteContext<'_>) -> AppResult<R>,
{
    log::debug!("Will perform {}", name);

    let mut conn = get_connection(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut ctx = WriteContext::new(&tx);
    let result = op(&mut ctx);
    let changed = ctx.changed();

    match result {
        Ok(value) => {
            tx.commit()?;
            log::debug!("Did perform {} (changed: {})", name, changed);

            if !changed.is_empty() {
                notifier.publish(name, changed);
            }
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback() {
                log::error!("Rollback of {} failed: {}", name, rollback_err);
            }
            log::error!("Failed to perform {}, rolled back: {}", name, e);
            Err(e)
        }
    }
}
