use std::time::Duration;

use taskdeck_core::{AppConfig, TaskdeckError, TaskdeckResult};
use taskdeck_domain::{compute_reorder, Arrangement, MoveInstruction, Positioned};
use tracing::{debug, info, warn};

use crate::cache::OptimisticCache;
use crate::traits::RemoteStore;

const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the reconciler is in the per-move state machine.
/// `Applying` covers the window between staging the speculative
/// arrangement and resolving the remote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Applying,
}

/// Terminal state of one move operation.
#[derive(Debug)]
pub enum CommitOutcome {
    /// Writes landed; the speculative arrangement is the new baseline.
    Committed,
    /// The write failed or timed out; the speculative arrangement was
    /// discarded and the touched containers refetched from the store.
    RolledBack { error: TaskdeckError },
}

/// Drives a move through `Idle -> Applying -> {Committed | RolledBack} ->
/// Idle`. Owns the optimistic cache; nothing else writes positions.
///
/// Operations serialize through `&mut self`, so within one reconciler the
/// resolution of move N always completes before move N+1 issues writes.
pub struct Reconciler<T, S> {
    cache: OptimisticCache<T>,
    store: S,
    phase: SyncPhase,
    write_timeout: Duration,
}

impl<T, S> Reconciler<T, S>
where
    T: Positioned + Clone + Send + Sync,
    S: RemoteStore<T>,
{
    pub fn new(store: S, baseline: Arrangement<T>) -> Self {
        Self {
            cache: OptimisticCache::new(baseline),
            store,
            phase: SyncPhase::Idle,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    pub fn from_config(store: S, baseline: Arrangement<T>, config: &AppConfig) -> Self {
        Self::new(store, baseline).with_write_timeout(config.effective_write_timeout())
    }

    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// The arrangement to render right now: speculative while `Applying`,
    /// confirmed otherwise.
    pub fn current(&self) -> &Arrangement<T> {
        self.cache.current()
    }

    pub fn baseline(&self) -> &Arrangement<T> {
        self.cache.baseline()
    }

    /// Execute one move end to end: compute the reorder, render it
    /// optimistically, persist the deltas, then commit or roll back.
    pub async fn move_item(
        &mut self,
        instruction: &MoveInstruction,
    ) -> TaskdeckResult<CommitOutcome> {
        if self.phase == SyncPhase::Applying {
            return Err(TaskdeckError::OperationInFlight(
                "previous move is still applying".to_string(),
            ));
        }

        let outcome = compute_reorder(self.cache.current(), instruction)?;
        if outcome.deltas.is_empty() {
            debug!(item = %instruction.item_id, "move is a no-op, skipping write");
            return Ok(CommitOutcome::Committed);
        }

        self.phase = SyncPhase::Applying;
        if let Err(error) = self.cache.stage(outcome.arrangement) {
            self.phase = SyncPhase::Idle;
            return Err(error);
        }

        let write = tokio::time::timeout(
            self.write_timeout,
            self.store.apply_deltas(&outcome.deltas),
        )
        .await;
        let resolution = self.resolve(write, instruction).await;
        self.phase = SyncPhase::Idle;
        resolution
    }

    async fn resolve(
        &mut self,
        write: Result<TaskdeckResult<()>, tokio::time::error::Elapsed>,
        instruction: &MoveInstruction,
    ) -> TaskdeckResult<CommitOutcome> {
        match write {
            Ok(Ok(())) => {
                self.cache.commit()?;
                info!(item = %instruction.item_id, "move committed");
                Ok(CommitOutcome::Committed)
            }
            Ok(Err(error)) => {
                warn!(item = %instruction.item_id, %error, "remote write failed, rolling back");
                self.rollback(instruction).await?;
                Ok(CommitOutcome::RolledBack { error })
            }
            Err(_) => {
                // The write may still land server-side; refetching instead
                // of retrying avoids double-applying positions.
                let error = TaskdeckError::Persistence(format!(
                    "remote write timed out after {:?}",
                    self.write_timeout
                ));
                warn!(item = %instruction.item_id, %error, "rolling back");
                self.rollback(instruction).await?;
                Ok(CommitOutcome::RolledBack { error })
            }
        }
    }

    /// Discard the speculative arrangement and adopt the store's truth for
    /// every container the move touched. No partial-patch recovery.
    async fn rollback(&mut self, instruction: &MoveInstruction) -> TaskdeckResult<()> {
        self.cache.rollback();
        for container_id in instruction.touched_containers() {
            let truth = self.store.fetch_container(container_id).await?;
            self.cache.replace_container(truth);
        }
        Ok(())
    }
}
