use taskdeck_core::{TaskdeckError, TaskdeckResult};
use taskdeck_domain::{Arrangement, Container, Positioned};

/// Last-known-good arrangement plus at most one speculative arrangement
/// awaiting persistence. The view layer always renders `current()`.
#[derive(Debug, Clone)]
pub struct OptimisticCache<T> {
    baseline: Arrangement<T>,
    pending: Option<Arrangement<T>>,
}

impl<T: Positioned + Clone> OptimisticCache<T> {
    pub fn new(baseline: Arrangement<T>) -> Self {
        Self {
            baseline,
            pending: None,
        }
    }

    /// The arrangement to render: speculative if one is staged, else the
    /// confirmed baseline.
    pub fn current(&self) -> &Arrangement<T> {
        self.pending.as_ref().unwrap_or(&self.baseline)
    }

    pub fn baseline(&self) -> &Arrangement<T> {
        &self.baseline
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Stage a speculative arrangement. A second stage while one is already
    /// pending would interleave partial writes, so it is refused.
    pub fn stage(&mut self, speculative: Arrangement<T>) -> TaskdeckResult<()> {
        if self.pending.is_some() {
            return Err(TaskdeckError::OperationInFlight(
                "a speculative arrangement is already staged".to_string(),
            ));
        }
        self.pending = Some(speculative);
        Ok(())
    }

    /// Promote the pending arrangement to the new baseline.
    pub fn commit(&mut self) -> TaskdeckResult<()> {
        match self.pending.take() {
            Some(arrangement) => {
                self.baseline = arrangement;
                Ok(())
            }
            None => Err(TaskdeckError::Internal(
                "commit with no staged arrangement".to_string(),
            )),
        }
    }

    /// Discard the pending arrangement, reverting `current()` to baseline.
    pub fn rollback(&mut self) {
        self.pending = None;
    }

    /// Install a refetched container into the baseline, replacing the stale
    /// copy. Used after rollback to adopt the server's truth.
    pub fn replace_container(&mut self, container: Container<T>) {
        self.baseline.replace_container(container);
    }
}
