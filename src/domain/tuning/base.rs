/// Gameplay tuning for AI base emplacements.

#[derive(Debug, Clone, Copy)]
pub struct BaseTuning {
    /// Hit points a fresh base starts with.
    pub max_health: i32,

    /// World-space collision radius in meters.
    pub radius: f32,

    /// Seconds between shots once the base has a target.
    pub fire_interval: f32,

    /// Distance from the base center at which its bullets spawn.
    pub muzzle_offset: f32,

    /// Speed of bullets fired by the base, in meters per second.
    pub bullet_speed: f32,
}

impl Default for BaseTuning {
    fn default() -> Self {
        Self {
            max_health: 3,
            radius: 0.5,
            fire_interval: 4.3,
            muzzle_offset: 0.7,
            bullet_speed: 2.0,
        }
    }
}
