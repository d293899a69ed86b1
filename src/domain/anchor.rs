// Shared spatial reference state exchanged between peers.

use crate::domain::vector::Vec3;
use serde::{Deserialize, Serialize};

/// World-space reference frame the session is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldAnchor {
    pub origin: Vec3,
    pub orientation: Vec3,
}

impl Default for WorldAnchor {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            orientation: Vec3::new(0.0, 0.0, -1.0),
        }
    }
}

/// Serialized payload sent between peers. Treated as an opaque blob by the
/// transport; only the sync use case reads its structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldAnchorSnapshot {
    pub anchor: WorldAnchor,
}
