/// Gameplay tuning for the player-controlled viewpoint.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer
/// sizes, etc.).

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Hit points the player starts a session with.
    pub max_health: i32,

    /// World-space collision radius in meters.
    pub radius: f32,

    /// Distance along the view direction at which fired bullets spawn.
    pub muzzle_offset: f32,

    /// Speed of player bullets in meters per second.
    pub bullet_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 7,
            radius: 0.2,
            muzzle_offset: 0.4,
            bullet_speed: 2.0,
        }
    }
}
