pub mod cache;
pub mod reconciler;
pub mod store;
pub mod traits;

pub use cache::OptimisticCache;
pub use reconciler::{CommitOutcome, Reconciler, SyncPhase};
pub use store::InMemoryStore;
pub use traits::RemoteStore;
