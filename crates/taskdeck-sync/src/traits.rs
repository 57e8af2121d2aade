use async_trait::async_trait;
use taskdeck_core::TaskdeckResult;
use taskdeck_domain::{Container, PositionDelta, Positioned};
use uuid::Uuid;

/// Row-level access to the hosted backend, reduced to the two operations
/// the reconciler needs: apply a delta list, and refetch one container's
/// true ordered state. The backend's schema and wire format stay behind
/// this seam.
#[async_trait]
pub trait RemoteStore<T: Positioned>: Send + Sync {
    /// Persist every delta, updating position and (where present) the
    /// container foreign key of each row.
    async fn apply_deltas(&self, deltas: &[PositionDelta]) -> TaskdeckResult<()>;

    /// Fetch the rows of one container ordered by stored position. An
    /// unknown container comes back empty, like a select with no rows.
    async fn fetch_container(&self, container_id: Uuid) -> TaskdeckResult<Container<T>>;
}
