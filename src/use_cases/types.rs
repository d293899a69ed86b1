// Use-case level inputs/outputs for the simulation loop.

use crate::domain::{Vec3, WorldAnchorSnapshot, WorldEvent};

/// Inputs queued from the network and applied at the start of the next tick,
/// never mid-tick.
#[derive(Debug, Clone)]
pub enum SimCommand {
    PoseUpdate { position: Vec3, forward: Vec3 },
    Fire,
    StartSession,
    EndSession,
    /// Serialize the current world anchor and broadcast it to peers.
    ShareWorld,
    /// Full reset seeded with a snapshot received from a peer.
    RestartWithAnchor(WorldAnchorSnapshot),
}

/// High-level session lifecycle exposed to presentation clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    GameOver,
}

/// State changes produced by one tick, broadcast to all clients.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<WorldEvent>,
}
