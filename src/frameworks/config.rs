use std::{env, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("SKIRMISH_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

/// Seed for the spawn scheduler. Defaults to entropy; pin it via env for
/// reproducible sessions.
pub fn spawn_seed() -> u64 {
    env::var("SPAWN_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(rand::random)
}

pub const COMMAND_CHANNEL_CAPACITY: usize = 1024;
pub const REPORT_BROADCAST_CAPACITY: usize = 128;
// Snapshots are rare (one per share action); a small buffer suffices.
pub const SNAPSHOT_BROADCAST_CAPACITY: usize = 16;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 60);
