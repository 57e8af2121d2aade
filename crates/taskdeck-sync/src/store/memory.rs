use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use taskdeck_core::{TaskdeckError, TaskdeckResult};
use taskdeck_domain::{Container, PositionDelta, Positioned};
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-memory row store implementing `RemoteStore`, standing in for the
/// hosted backend in tests and local runs. Cloning yields a handle to the
/// same rows.
#[derive(Debug, Clone)]
pub struct InMemoryStore<T> {
    rows: Arc<Mutex<HashMap<Uuid, T>>>,
    fail_next_apply: Arc<AtomicBool>,
    apply_delay: Arc<Mutex<Option<Duration>>>,
}

impl<T: Positioned + Clone + Send + Sync> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
            fail_next_apply: Arc::new(AtomicBool::new(false)),
            apply_delay: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn seed(&self, rows: Vec<T>) {
        let mut guard = self.rows.lock().await;
        for row in rows {
            guard.insert(row.id(), row);
        }
    }

    pub async fn row(&self, id: Uuid) -> Option<T> {
        self.rows.lock().await.get(&id).cloned()
    }

    /// Fault injection: make the next `apply_deltas` call fail without
    /// touching any row.
    pub fn fail_next_apply(&self) {
        self.fail_next_apply.store(true, Ordering::SeqCst);
    }

    /// Fault injection: delay every `apply_deltas` call, for exercising the
    /// reconciler's write timeout.
    pub async fn set_apply_delay(&self, delay: Option<Duration>) {
        *self.apply_delay.lock().await = delay;
    }
}

#[async_trait]
impl<T> crate::traits::RemoteStore<T> for InMemoryStore<T>
where
    T: Positioned + Clone + Send + Sync,
{
    async fn apply_deltas(&self, deltas: &[PositionDelta]) -> TaskdeckResult<()> {
        let delay = *self.apply_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_next_apply.swap(false, Ordering::SeqCst) {
            return Err(TaskdeckError::Persistence(
                "injected apply failure".to_string(),
            ));
        }

        let mut rows = self.rows.lock().await;
        // Reject the whole batch before mutating anything.
        for delta in deltas {
            if !rows.contains_key(&delta.item_id) {
                return Err(TaskdeckError::NotFound(format!(
                    "row {} does not exist",
                    delta.item_id
                )));
            }
        }
        for delta in deltas {
            if let Some(row) = rows.get_mut(&delta.item_id) {
                row.set_position(delta.new_position);
                if let Some(container_id) = delta.new_container_id {
                    row.set_container_id(container_id);
                }
            }
        }
        tracing::debug!(count = deltas.len(), "applied position deltas");
        Ok(())
    }

    async fn fetch_container(&self, container_id: Uuid) -> TaskdeckResult<Container<T>> {
        let rows = self.rows.lock().await;
        let members: Vec<T> = rows
            .values()
            .filter(|row| row.container_id() == container_id)
            .cloned()
            .collect();
        Ok(Container::from_rows(container_id, members))
    }
}
