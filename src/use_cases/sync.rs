// Peer snapshot exchange: opaque blobs on the wire, JSON inside.

use crate::domain::WorldAnchorSnapshot;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Errors surfaced by snapshot handling.
#[derive(Debug)]
pub enum SyncError {
    /// Payload did not decode as a world-anchor snapshot. The event is
    /// dropped; the engine state is never touched.
    MalformedSnapshot(serde_json::Error),
}

pub fn decode_snapshot(payload: &[u8]) -> Result<WorldAnchorSnapshot, SyncError> {
    serde_json::from_slice(payload).map_err(SyncError::MalformedSnapshot)
}

pub fn encode_snapshot(snapshot: &WorldAnchorSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Connected peers by connection id. Last-snapshot-wins across peers is the
/// documented conflict policy; the roster never arbitrates.
#[derive(Debug, Default)]
pub struct PeerRoster {
    peers: RwLock<HashMap<u64, String>>,
}

impl PeerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a peer and returns the updated device list.
    pub async fn register(&self, conn_id: u64, name: String) -> Vec<String> {
        let mut peers = self.peers.write().await;
        peers.insert(conn_id, name);
        let mut names: Vec<String> = peers.values().cloned().collect();
        names.sort();
        names
    }

    /// Removes a peer and returns the updated device list.
    pub async fn unregister(&self, conn_id: u64) -> Vec<String> {
        let mut peers = self.peers.write().await;
        peers.remove(&conn_id);
        let mut names: Vec<String> = peers.values().cloned().collect();
        names.sort();
        names
    }

    pub async fn connected_count(&self) -> usize {
        self.peers.read().await.len()
    }
}
