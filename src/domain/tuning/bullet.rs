/// Gameplay tuning shared by all bullets.

#[derive(Debug, Clone, Copy)]
pub struct BulletTuning {
    /// World-space collision radius in meters.
    pub radius: f32,

    /// Seconds a bullet lives before it is removed regardless of hits.
    pub life_time: f32,

    /// Seconds a hit entity ignores further hits (debounce window).
    pub hit_debounce: f32,
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            radius: 0.05,
            life_time: 10.0,
            hit_debounce: 0.1,
        }
    }
}
