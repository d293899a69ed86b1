// Bullet movement integration and lifetime expiry.

use crate::domain::entity::{BulletState, DestroyCause, EntityKind};
use crate::domain::events::WorldEvent;

/// Integrates bullet positions and retires bullets past their lifetime
/// ceiling. Runs before collision detection each tick.
pub fn tick_bullets(bullets: &mut Vec<BulletState>, dt: f32, events: &mut Vec<WorldEvent>) {
    for bullet in bullets.iter_mut() {
        bullet.position = bullet.position + dt * bullet.velocity;
        bullet.ttl -= dt;
        if bullet.ttl > 0.0 {
            events.push(WorldEvent::Moved {
                id: bullet.id,
                position: bullet.position,
            });
        } else {
            events.push(WorldEvent::Destroyed {
                id: bullet.id,
                kind: EntityKind::Bullet,
                cause: DestroyCause::LifetimeExpired,
            });
        }
    }

    bullets.retain(|b| b.ttl > 0.0);
}
