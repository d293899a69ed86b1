// Peer sync socket: opaque world-anchor snapshot blobs in and out.
//
// A connection is Connecting during the HTTP upgrade and Connected once the
// socket is established and registered in the roster. Multiple peers may be
// connected at once; inbound snapshots are applied last-one-wins.

use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::conn_id;
use crate::use_cases::sync::{SyncError, decode_snapshot};
use crate::use_cases::SimCommand;

use futures_util::SinkExt;

use axum::{
    extract::{
        Query, State,
        ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc};
use tracing::{info, info_span, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);

#[derive(Debug, serde::Deserialize)]
pub struct PeerQuery {
    // Peer display name, used only for roster logs.
    #[serde(default)]
    name: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeerQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_peer(socket, state, query.name))
}

async fn handle_peer(mut socket: WebSocket, state: Arc<AppState>, name: Option<String>) {
    let conn_id = conn_id();
    let name = name.unwrap_or_else(|| format!("peer-{conn_id}"));
    let span = info_span!("peer", conn_id, name = %name);
    let _enter = span.enter();

    // Subscribe before registering so this peer sees every snapshot
    // broadcast from the moment it counts as connected.
    let mut snapshot_rx = state.snapshot_tx.subscribe();

    let devices = state.peers.register(conn_id, name.clone()).await;
    info!(connected = ?devices, "peer connected");

    run_peer_loop(&mut socket, &state.command_tx, &mut snapshot_rx).await;

    let devices = state.peers.unregister(conn_id).await;
    info!(connected = ?devices, "peer disconnected");
    let _ = socket.close().await;
}

async fn run_peer_loop(
    socket: &mut WebSocket,
    command_tx: &mpsc::Sender<SimCommand>,
    snapshot_rx: &mut broadcast::Receiver<Utf8Bytes>,
) {
    let mut last_malformed_log = Instant::now() - LOG_THROTTLE;

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        handle_snapshot_payload(
                            text.as_bytes(),
                            command_tx,
                            &mut last_malformed_log,
                        );
                    }
                    Some(Ok(Message::Binary(payload))) => {
                        handle_snapshot_payload(&payload, command_tx, &mut last_malformed_log);
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(error = %e, "peer websocket recv error");
                        break;
                    }
                }
            }

            outbound = snapshot_rx.recv() => {
                match outbound {
                    Ok(bytes) => {
                        if let Err(e) = socket.send(Message::Text(bytes)).await {
                            warn!(error = %e, "failed to send snapshot to peer");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Only the most recent anchor matters; skip ahead.
                        warn!(missed = n, "peer snapshot stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

/// Decodes an inbound blob and queues a session restart. Malformed payloads
/// are dropped without touching the engine.
fn handle_snapshot_payload(
    payload: &[u8],
    command_tx: &mpsc::Sender<SimCommand>,
    last_malformed_log: &mut Instant,
) {
    match decode_snapshot(payload) {
        Ok(snapshot) => {
            info!("received world snapshot from peer");
            if command_tx
                .try_send(SimCommand::RestartWithAnchor(snapshot))
                .is_err()
            {
                warn!("command channel unavailable; snapshot dropped");
            }
        }
        Err(SyncError::MalformedSnapshot(e)) => {
            if last_malformed_log.elapsed() >= LOG_THROTTLE {
                *last_malformed_log = Instant::now();
                warn!(error = %e, bytes = payload.len(), "malformed snapshot dropped");
            }
        }
    }
}
