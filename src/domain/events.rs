// State-change records produced by one simulation tick.

use crate::domain::entity::{DestroyCause, EntityId, EntityKind};
use crate::domain::vector::Vec3;

/// One outward-facing state change. The engine never touches rendering or
/// audio; the presentation adapter consumes these instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldEvent {
    Spawned {
        id: EntityId,
        kind: EntityKind,
        position: Vec3,
    },
    Moved {
        id: EntityId,
        position: Vec3,
    },
    Damaged {
        id: EntityId,
        health: i32,
    },
    Destroyed {
        id: EntityId,
        kind: EntityKind,
        cause: DestroyCause,
    },
    ScoreChanged {
        score: u32,
    },
    PlayerHealthChanged {
        health: i32,
    },
    GameOver,
    /// All entities cleared and the anchor replaced; emitted on session
    /// restarts, including peer-initiated ones.
    WorldReset,
}
