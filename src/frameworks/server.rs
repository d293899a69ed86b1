// Framework bootstrap for the skirmish server runtime.

use crate::frameworks::config;
use crate::interface_adapters::net::{client, peer, report_serializer};
use crate::interface_adapters::state::AppState;
use crate::use_cases::game::world_task;
use crate::use_cases::{PeerRoster, SessionState, SimCommand, TickReport};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, broadcast, mpsc, watch};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();

    // Start the web server: one route for presentation clients, one for
    // sync peers.
    let app = Router::new()
        .route("/ws", get(client::ws_handler))
        .route("/peer", get(peer::ws_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    // Channel wiring for the single authoritative simulation loop.
    let (command_tx, command_rx) = mpsc::channel::<SimCommand>(config::COMMAND_CHANNEL_CAPACITY);
    let (report_tx, _report_rx) =
        broadcast::channel::<TickReport>(config::REPORT_BROADCAST_CAPACITY);
    let (report_bytes_tx, _report_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::REPORT_BROADCAST_CAPACITY);
    let (report_latest_tx, _report_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
    let (session_state_tx, _session_state_rx) =
        watch::channel::<SessionState>(SessionState::Idle);
    let (snapshot_tx, _snapshot_rx) =
        broadcast::channel::<Utf8Bytes>(config::SNAPSHOT_BROADCAST_CAPACITY);

    let shutdown = Arc::new(Notify::new());

    // Spawn the authoritative world loop.
    tokio::spawn(world_task(
        command_rx,
        report_tx.clone(),
        session_state_tx.clone(),
        snapshot_tx.clone(),
        config::TICK_INTERVAL,
        config::spawn_seed(),
        shutdown,
    ));

    // Spawn the tick report serializer in the adapter layer.
    tokio::spawn(report_serializer(
        report_tx.subscribe(),
        report_bytes_tx.clone(),
        report_latest_tx.clone(),
    ));

    Arc::new(AppState {
        command_tx,
        report_tx,
        report_bytes_tx,
        report_latest_tx,
        session_state_tx,
        snapshot_tx,
        peers: Arc::new(PeerRoster::new()),
    })
}
