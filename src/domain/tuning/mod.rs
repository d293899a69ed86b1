// Gameplay tuning tables, separate from runtime/server configuration.

pub mod base;
pub mod bullet;
pub mod player;
pub mod spawn;

pub use base::BaseTuning;
pub use bullet::BulletTuning;
pub use player::PlayerTuning;
pub use spawn::SpawnTuning;

/// Aggregated tuning handed to the world at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldTuning {
    pub base: BaseTuning,
    pub bullet: BulletTuning,
    pub player: PlayerTuning,
    pub spawn: SpawnTuning,
}
