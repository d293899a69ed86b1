use super::sync::encode_snapshot;
use super::types::{SessionState, SimCommand, TickReport};
use crate::domain::tuning::WorldTuning;
use crate::domain::{World, WorldEvent};
use axum::extract::ws::Utf8Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info};

/// The authoritative simulation loop. Exactly one task owns the [`World`];
/// commands are drained at the top of each tick so network input never lands
/// mid-step.
pub async fn world_task(
    mut command_rx: mpsc::Receiver<SimCommand>,
    report_tx: broadcast::Sender<TickReport>,
    session_state_tx: watch::Sender<SessionState>,
    snapshot_tx: broadcast::Sender<Utf8Bytes>,
    tick_interval: Duration,
    spawn_seed: u64,
    shutdown: Arc<tokio::sync::Notify>,
) {
    let mut world = World::new(spawn_seed, WorldTuning::default());
    let mut session = SessionState::Idle;

    // Drive the fixed-step simulation at the configured tick rate.
    let mut interval = tokio::time::interval(tick_interval);
    let dt = tick_interval.as_secs_f32();

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                // Exit cleanly when the server shuts down.
                break;
            }
            _ = interval.tick() => {}
        }

        while let Ok(command) = command_rx.try_recv() {
            apply_command(command, &mut world, &mut session, &session_state_tx, &snapshot_tx);
        }

        if session == SessionState::Idle {
            continue;
        }

        let events = world.step(dt);
        if events.contains(&WorldEvent::GameOver) {
            session = SessionState::GameOver;
            let _ = session_state_tx.send(SessionState::GameOver);
        }

        let _ = report_tx.send(TickReport {
            tick: world.tick(),
            events,
        });
    }
}

fn apply_command(
    command: SimCommand,
    world: &mut World,
    session: &mut SessionState,
    session_state_tx: &watch::Sender<SessionState>,
    snapshot_tx: &broadcast::Sender<Utf8Bytes>,
) {
    match command {
        SimCommand::PoseUpdate { position, forward } => {
            world.set_player_pose(position, forward);
        }
        SimCommand::Fire => {
            world.player_fire();
        }
        SimCommand::StartSession => {
            info!("session started");
            world.restart();
            *session = SessionState::Running;
            let _ = session_state_tx.send(SessionState::Running);
        }
        SimCommand::EndSession => {
            info!("session ended");
            world.end_session();
            *session = SessionState::Idle;
            let _ = session_state_tx.send(SessionState::Idle);
        }
        SimCommand::ShareWorld => {
            let snapshot = world.snapshot();
            let txt = match encode_snapshot(&snapshot) {
                Ok(txt) => txt,
                Err(e) => {
                    error!(error = ?e, "failed to serialize world snapshot");
                    return;
                }
            };
            // Zero connected peers is a no-op, not an error.
            match snapshot_tx.send(Utf8Bytes::from(txt)) {
                Ok(peers) => info!(peers, "snapshot broadcast to peers"),
                Err(_) => debug!("no peers connected; snapshot not sent"),
            }
        }
        SimCommand::RestartWithAnchor(snapshot) => {
            info!("restarting session from peer snapshot");
            world.restart_with_anchor(snapshot);
            *session = SessionState::Running;
            let _ = session_state_tx.send(SessionState::Running);
        }
    }
}
