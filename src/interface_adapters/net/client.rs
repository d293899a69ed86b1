// Presentation adapter socket: pose and fire intents in, tick reports out.

use crate::domain::Vec3;
use crate::interface_adapters::protocol::{ClientMessage, PoseDto, ServerMessage, TickReportDto};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::conn_id;
use crate::use_cases::{SessionState, SimCommand, TickReport};

use futures_util::SinkExt;

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Connection lifecycle failures, split so callers can pick a policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    CommandsClosed,
    ReportsClosed,
    SessionStateClosed,
    JoinRequired,
    JoinTimeout,
    ClosedBeforeJoin,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const JOIN_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Serializes each tick report once and broadcasts the shared bytes to all
/// presentation connections.
pub async fn report_serializer(
    mut report_rx: broadcast::Receiver<TickReport>,
    report_bytes_tx: broadcast::Sender<Utf8Bytes>,
    report_latest_tx: watch::Sender<Utf8Bytes>,
) {
    loop {
        match report_rx.recv().await {
            Ok(report) => {
                let msg = ServerMessage::Tick(TickReportDto::from(report));
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize tick report");
                        continue;
                    }
                };

                let bytes = Utf8Bytes::from(txt);
                // Keep the newest report around for lag recovery.
                let _ = report_latest_tx.send(bytes.clone());
                let _ = report_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "report serializer lagged; skipping to latest");
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("tick report channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    // Connection id for correlating logs across the session.
    let conn_id = conn_id();
    let span = info_span!("conn", conn_id);
    let _enter = span.enter();

    let mut ctx = match bootstrap_connection(&mut socket, &state, conn_id).await {
        Ok(ctx) => ctx,
        Err(NetError::ClosedBeforeJoin) => {
            info!("client disconnected before join handshake");
            return;
        }
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "bootstrap failed".into(),
                })))
                .await;
            let _ = socket.close().await;
            return;
        }
    };

    info!(device_name = %ctx.device_name, "client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

struct ConnCtx {
    pub conn_id: u64,
    pub device_name: String,
    pub command_tx: mpsc::Sender<SimCommand>,
    pub report_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    pub report_latest_rx: watch::Receiver<Utf8Bytes>,
    pub session_state_rx: watch::Receiver<SessionState>,
    // How many lag recovery reports this connection has received.
    pub lag_recovery_count: u64,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,

    pub last_command_full_log: Instant,
    pub last_report_lag_log: Instant,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    state: &Arc<AppState>,
    conn_id: u64,
) -> Result<ConnCtx, NetError> {
    // Subscribe to updates *before* any awaits so no report is missed.
    let report_bytes_rx = state.report_bytes_tx.subscribe();
    let report_latest_rx = state.report_latest_tx.subscribe();
    let session_state_rx = state.session_state_tx.subscribe();

    // The very first meaningful client message must be the Join handshake.
    let device_name = match timeout(JOIN_HANDSHAKE_TIMEOUT, read_join_handshake(socket)).await {
        Ok(result) => result?,
        Err(_) => {
            let _ = send_close_with_reason(socket, close_code::POLICY, "join timeout").await;
            return Err(NetError::JoinTimeout);
        }
    };

    let identity_msg = ServerMessage::Identity {
        client_id: conn_id.to_string(),
    };
    send_message(socket, &identity_msg).await?;

    // Initial session state so the client can render the right screen.
    // Clone as soon as we borrow to avoid holding the watch lock.
    let initial_state = session_state_rx.borrow().clone();
    send_message(socket, &ServerMessage::Session(initial_state.into())).await?;

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        conn_id,
        device_name,
        command_tx: state.command_tx.clone(),
        report_bytes_rx,
        report_latest_rx,
        session_state_rx,
        lag_recovery_count: 0,

        msgs_in: 1,
        msgs_out: 0,
        bytes_in: 0,
        bytes_out: 0,

        invalid_json: 0,

        last_command_full_log: now,
        last_report_lag_log: now,
        last_invalid_input_log: now,

        close_frame: None,
    })
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

async fn read_join_handshake(socket: &mut WebSocket) -> Result<String, NetError> {
    loop {
        let Some(incoming) = socket.recv().await else {
            return Err(NetError::ClosedBeforeJoin);
        };

        let message = incoming.map_err(NetError::Ws)?;
        match message {
            Message::Text(text) => {
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join(payload)) => {
                        let device_name = payload.device_name.trim().to_string();
                        if device_name.is_empty() {
                            let _ = send_close_with_reason(
                                socket,
                                close_code::POLICY,
                                "device name required",
                            )
                            .await;
                            return Err(NetError::JoinRequired);
                        }
                        return Ok(device_name);
                    }
                    Ok(_) | Err(_) => {
                        let _ =
                            send_close_with_reason(socket, close_code::POLICY, "join required")
                                .await;
                        return Err(NetError::JoinRequired);
                    }
                }
            }
            Message::Binary(_) => {
                let _ = send_close_with_reason(
                    socket,
                    close_code::UNSUPPORTED,
                    "binary messages not supported",
                )
                .await;
                return Err(NetError::JoinRequired);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Err(NetError::ClosedBeforeJoin),
        }
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

/// Rejects poses with NaN/inf components before they reach the simulation.
fn sanitize_pose(pose: &PoseDto) -> Option<(Vec3, Vec3)> {
    let position = Vec3::from(pose.position);
    let forward = Vec3::from(pose.forward);
    if !position.is_finite() || !forward.is_finite() {
        return None;
    }
    Some((position, forward))
}

fn queue_command(
    command_tx: &mpsc::Sender<SimCommand>,
    command: SimCommand,
    last_command_full_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match command_tx.try_send(command) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_cmd)) => {
            if should_log(last_command_full_log) {
                warn!("command channel full; dropping input");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_cmd)) => Err(NetError::CommandsClosed),
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    // Borrow the fields separately so the select arms can hold them at once.
    let ConnCtx {
        conn_id,
        command_tx,
        report_bytes_rx,
        report_latest_rx,
        session_state_rx,
        lag_recovery_count,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        last_command_full_log,
        last_report_lag_log,
        last_invalid_input_log,
        close_frame,
        ..
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        // Any arm can flag the connection for teardown.
        let disconnect: bool = tokio::select! {
            // Incoming message from the presentation client.
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    command_tx,
                    msgs_in,
                    bytes_in,
                    invalid_json,
                    last_command_full_log,
                    last_invalid_input_log,
                    close_frame,
                ) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing tick report.
            report = report_bytes_rx.recv() => {
                match report {
                    Ok(bytes) => match forward_bytes(bytes, socket, msgs_out, bytes_out).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(last_report_lag_log) {
                            warn!(missed = n, "tick reports lagged; sending latest");
                        }

                        // Resync strategy: send the latest serialized report.
                        let latest = report_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            false
                        } else {
                            *lag_recovery_count += 1;
                            let outcome = forward_bytes(latest, socket, msgs_out, bytes_out).await;
                            if should_log(last_report_lag_log) {
                                debug!(count = *lag_recovery_count, "sent lag recovery report");
                            }
                            match outcome {
                                LoopControl::Continue => false,
                                LoopControl::Disconnect => true,
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::ReportsClosed);
                        true
                    }
                }
            }

            // Outgoing session state change.
            changed_state = session_state_rx.changed() => {
                match changed_state {
                    Ok(()) => {
                        let st = session_state_rx.borrow().clone();
                        let msg = ServerMessage::Session(st.into());
                        match send_message(socket, &msg).await {
                            Ok(bytes) => {
                                *msgs_out += 1;
                                *bytes_out += bytes as u64;
                                false
                            }
                            Err(err) => {
                                warn!(error = ?err, "failed to send session state");
                                true
                            }
                        }
                    }
                    Err(_) => {
                        warn!("session state channel closed; disconnecting");
                        fatal = Some(NetError::SessionStateClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    debug!(
        conn_id = *conn_id,
        msgs_in = *msgs_in,
        msgs_out = *msgs_out,
        bytes_in = *bytes_in,
        bytes_out = *bytes_out,
        invalid_json = *invalid_json,
        lag_recovery_count = *lag_recovery_count,
        "connection stats"
    );
    info!("client disconnected");

    if let Some(err) = fatal { Err(err) } else { Ok(()) }
}

#[allow(clippy::too_many_arguments)]
fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    command_tx: &mpsc::Sender<SimCommand>,
    msgs_in: &mut u64,
    bytes_in: &mut u64,
    invalid_json: &mut u32,
    last_command_full_log: &mut Instant,
    last_invalid_input_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                *msgs_in += 1;
                *bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join(_)) => {
                        // Ignore repeated Join packets after bootstrap.
                        if should_log(last_invalid_input_log) {
                            warn!("duplicate join ignored");
                        }
                        Ok(LoopControl::Continue)
                    }
                    Ok(ClientMessage::Pose(pose)) => {
                        let Some((position, forward)) = sanitize_pose(&pose) else {
                            if should_log(last_invalid_input_log) {
                                warn!("invalid pose values (NaN/inf); dropping");
                            }
                            return Ok(LoopControl::Continue);
                        };
                        queue_command(
                            command_tx,
                            SimCommand::PoseUpdate { position, forward },
                            last_command_full_log,
                        )
                    }
                    Ok(ClientMessage::Fire) => {
                        queue_command(command_tx, SimCommand::Fire, last_command_full_log)
                    }
                    Ok(ClientMessage::Start) => {
                        queue_command(command_tx, SimCommand::StartSession, last_command_full_log)
                    }
                    Ok(ClientMessage::End) => {
                        queue_command(command_tx, SimCommand::EndSession, last_command_full_log)
                    }
                    Ok(ClientMessage::ShareWorld) => {
                        queue_command(command_tx, SimCommand::ShareWorld, last_command_full_log)
                    }
                    Err(parse_err) => {
                        *invalid_json += 1;
                        if should_log(last_invalid_input_log) {
                            warn!(
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if *invalid_json > MAX_INVALID_JSON {
                            *close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_bytes(
    payload: Utf8Bytes,
    socket: &mut WebSocket,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
) -> LoopControl {
    let bytes_len = payload.len();
    match socket.send(Message::Text(payload)).await.map_err(NetError::Ws) {
        Ok(()) => {
            *msgs_out += 1;
            *bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            warn!(error = ?err, "failed to send tick report");
            LoopControl::Disconnect
        }
    }
}
