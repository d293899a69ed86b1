use crate::use_cases::{PeerRoster, SessionState, SimCommand, TickReport};
use axum::extract::ws::Utf8Bytes;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // Inputs flowing from the network into the simulation loop.
    pub command_tx: mpsc::Sender<SimCommand>,
    // Tick reports produced by the simulation loop (domain structs).
    pub report_tx: broadcast::Sender<TickReport>,
    // Serialized tick reports, shared across all connections.
    pub report_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Latest serialized report for lag recovery.
    pub report_latest_tx: watch::Sender<Utf8Bytes>,
    // High-level session state (idle/running/game over).
    pub session_state_tx: watch::Sender<SessionState>,
    // Outbound world-anchor snapshots fanned out to connected peers.
    pub snapshot_tx: broadcast::Sender<Utf8Bytes>,
    // Connected peer roster for the sync service.
    pub peers: Arc<PeerRoster>,
}
