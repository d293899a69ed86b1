// Wire protocol DTOs and conversions for public server messages.

use crate::domain::{DestroyCause, EntityKind, Vec3, WorldEvent};
use crate::use_cases::{SessionState, TickReport};
use serde::{Deserialize, Serialize};

/// Messages the server sends to presentation clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Assigned identity for the connection after Join is accepted.
    Identity { client_id: String },
    // Batch of world state changes for a given tick.
    Tick(TickReportDto),
    // Session lifecycle transitions (idle, running, game over).
    Session(SessionStateDto),
}

/// Messages a presentation client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Initial handshake message with device metadata.
    Join(JoinPayload),
    // Viewer pose, once per render frame.
    Pose(PoseDto),
    // Discrete fire intent (tap gesture on the client).
    Fire,
    // Session lifecycle requests.
    Start,
    End,
    // Ask the server to broadcast the current world anchor to peers.
    ShareWorld,
}

/// Payload for the Join handshake.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinPayload {
    pub device_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vec3Dto {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3Dto> for Vec3 {
    fn from(v: Vec3Dto) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for Vec3Dto {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// Viewer pose payload sent by the client each frame.
#[derive(Debug, Clone, Deserialize)]
pub struct PoseDto {
    pub position: Vec3Dto,
    pub forward: Vec3Dto,
}

/// Per-tick event batch sent to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TickReportDto {
    pub tick: u64,
    pub events: Vec<WorldEventDto>,
}

impl From<TickReport> for TickReportDto {
    fn from(report: TickReport) -> Self {
        Self {
            tick: report.tick,
            events: report.events.iter().map(WorldEventDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum EntityKindDto {
    Base,
    User,
    Bullet,
}

impl From<EntityKind> for EntityKindDto {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Base => Self::Base,
            EntityKind::User => Self::User,
            EntityKind::Bullet => Self::Bullet,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum DestroyCauseDto {
    HealthDepleted,
    LifetimeExpired,
    Impact,
}

impl From<DestroyCause> for DestroyCauseDto {
    fn from(cause: DestroyCause) -> Self {
        match cause {
            DestroyCause::HealthDepleted => Self::HealthDepleted,
            DestroyCause::LifetimeExpired => Self::LifetimeExpired,
            DestroyCause::Impact => Self::Impact,
        }
    }
}

/// Flattened world event for wire transmission. Entity ids travel as strings
/// to stay safe for JSON consumers without 64-bit integers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum WorldEventDto {
    Spawned {
        id: String,
        kind: EntityKindDto,
        position: Vec3Dto,
    },
    Moved {
        id: String,
        position: Vec3Dto,
    },
    Damaged {
        id: String,
        health: i32,
    },
    Destroyed {
        id: String,
        kind: EntityKindDto,
        cause: DestroyCauseDto,
    },
    ScoreChanged {
        score: u32,
    },
    PlayerHealthChanged {
        health: i32,
    },
    GameOver,
    WorldReset,
}

impl From<&WorldEvent> for WorldEventDto {
    fn from(event: &WorldEvent) -> Self {
        match *event {
            WorldEvent::Spawned { id, kind, position } => Self::Spawned {
                id: id.to_string(),
                kind: kind.into(),
                position: position.into(),
            },
            WorldEvent::Moved { id, position } => Self::Moved {
                id: id.to_string(),
                position: position.into(),
            },
            WorldEvent::Damaged { id, health } => Self::Damaged {
                id: id.to_string(),
                health,
            },
            WorldEvent::Destroyed { id, kind, cause } => Self::Destroyed {
                id: id.to_string(),
                kind: kind.into(),
                cause: cause.into(),
            },
            WorldEvent::ScoreChanged { score } => Self::ScoreChanged { score },
            WorldEvent::PlayerHealthChanged { health } => Self::PlayerHealthChanged { health },
            WorldEvent::GameOver => Self::GameOver,
            WorldEvent::WorldReset => Self::WorldReset,
        }
    }
}

/// Session lifecycle state sent to clients for UI flow.
#[derive(Debug, Clone, Serialize)]
pub enum SessionStateDto {
    Idle,
    Running,
    GameOver,
}

impl From<SessionState> for SessionStateDto {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Idle => Self::Idle,
            SessionState::Running => Self::Running,
            SessionState::GameOver => Self::GameOver,
        }
    }
}
