pub mod arrangement;
pub mod board;
pub mod card;
pub mod deadline;
pub mod lifecycle;
pub mod list;
pub mod profile;
pub mod reorder;

pub use arrangement::{Arrangement, Container, Positioned};
pub use board::{Board, BoardId};
pub use card::{Card, CardId};
pub use deadline::{due_notices, DueNotice};
pub use list::{List, ListId};
pub use profile::{Profile, UserId};
pub use reorder::{compute_reorder, MoveInstruction, PositionDelta, ReorderOutcome};
