/// Placement policy tuning for the base spawn scheduler.

#[derive(Debug, Clone, Copy)]
pub struct SpawnTuning {
    /// Seconds to wait after session start before the first base appears,
    /// giving the player pose time to become available.
    pub startup_delay: f32,

    /// Distance in front of the player at which the first base spawns.
    pub first_spawn_distance: f32,

    /// Seconds between subsequent base spawns.
    pub interval: f32,

    /// Per-axis uniform sampling ranges for the spawn offset.
    pub offset_range_xz: (f32, f32),
    pub offset_range_y: (f32, f32),

    /// Minimum allowed magnitude of the spawn offset from the player.
    pub min_player_distance: f32,

    /// Rejection-sampling attempts before falling back to a fixed offset.
    pub max_sample_retries: u32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            startup_delay: 1.0,
            first_spawn_distance: 3.0,
            interval: 3.0,
            offset_range_xz: (-5.0, 5.0),
            offset_range_y: (-0.5, 0.5),
            min_player_distance: 1.0,
            max_sample_retries: 16,
        }
    }
}
