// Simulation entities and the damage bookkeeping they share.

use crate::domain::vector::Vec3;

pub type EntityId = u64;

/// Entity variants exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Base,
    User,
    Bullet,
}

/// Why an entity left the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyCause {
    /// Health reached zero.
    HealthDepleted,
    /// Bullet lifetime ceiling elapsed without a hit.
    LifetimeExpired,
    /// Bullet consumed by contact with a base or the user.
    Impact,
}

/// Viewer pose fed in by the presentation adapter once per tick.
#[derive(Debug, Clone, Copy)]
pub struct PlayerPose {
    pub position: Vec3,
    /// Unit view direction. Normalized on ingestion.
    pub forward: Vec3,
}

/// Result of applying a hit to a damageable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Hit landed inside the debounce window; no state change.
    Ignored,
    /// Health reduced; entity survives with the given health.
    Damaged(i32),
    /// Health reached zero; caller must remove the entity and emit its
    /// destroyed event exactly once.
    Destroyed,
}

/// Health plus the post-hit grace window shared by bases and the user.
///
/// State machine: healthy -> invulnerable on hit (health-1 > 0), healthy ->
/// destroyed on the final hit, invulnerable ignores hits until the window
/// runs out.
#[derive(Debug, Clone, Copy)]
pub struct Vitality {
    pub health: i32,
    debounce_left: f32,
}

impl Vitality {
    pub fn new(max_health: i32) -> Self {
        debug_assert!(max_health > 0);
        Self {
            health: max_health,
            debounce_left: 0.0,
        }
    }

    /// Counts the grace window down; call once per tick before collisions.
    pub fn tick(&mut self, dt: f32) {
        self.debounce_left = (self.debounce_left - dt).max(0.0);
    }

    pub fn is_invulnerable(&self) -> bool {
        self.debounce_left > 0.0
    }

    pub fn take_hit(&mut self, debounce_window: f32) -> HitOutcome {
        if self.debounce_left > 0.0 {
            return HitOutcome::Ignored;
        }
        debug_assert!(self.health > 0, "hit applied to a destroyed entity");

        self.health -= 1;
        self.debounce_left = debounce_window;
        if self.health > 0 {
            HitOutcome::Damaged(self.health)
        } else {
            HitOutcome::Destroyed
        }
    }
}

/// A stationary AI emplacement firing at the player on a fixed cadence.
#[derive(Debug, Clone)]
pub struct BaseState {
    pub id: EntityId,
    pub position: Vec3,
    pub vitality: Vitality,
    /// Seconds until the next shot.
    pub fire_timer: f32,
}

/// The player entity; position shadows the latest viewer pose.
#[derive(Debug, Clone)]
pub struct UserState {
    pub id: EntityId,
    pub position: Vec3,
    pub vitality: Vitality,
}

/// Which entity fired a bullet; the owner is exempt from its own hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletOwner {
    Player,
    Base(EntityId),
}

/// A point-mass projectile integrated each tick until impact or timeout.
#[derive(Debug, Clone)]
pub struct BulletState {
    pub id: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub owner: BulletOwner,
    /// Seconds of life remaining.
    pub ttl: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: f32 = 0.1;

    #[test]
    fn hits_deplete_health_one_per_window() {
        let mut v = Vitality::new(3);
        assert_eq!(v.take_hit(WINDOW), HitOutcome::Damaged(2));
        // Second hit inside the window is swallowed.
        assert_eq!(v.take_hit(WINDOW), HitOutcome::Ignored);
        assert_eq!(v.health, 2);
    }

    #[test]
    fn window_reopens_after_timeout() {
        let mut v = Vitality::new(2);
        assert_eq!(v.take_hit(WINDOW), HitOutcome::Damaged(1));
        v.tick(WINDOW);
        assert!(!v.is_invulnerable());
        assert_eq!(v.take_hit(WINDOW), HitOutcome::Destroyed);
        assert_eq!(v.health, 0);
    }

    #[test]
    fn exact_hit_count_to_destroy() {
        for max in [3, 7] {
            let mut v = Vitality::new(max);
            let mut hits = 0;
            loop {
                hits += 1;
                let outcome = v.take_hit(WINDOW);
                if outcome == HitOutcome::Destroyed {
                    break;
                }
                v.tick(WINDOW);
            }
            assert_eq!(hits, max);
        }
    }

    #[test]
    fn health_never_negative() {
        let mut v = Vitality::new(1);
        assert_eq!(v.take_hit(WINDOW), HitOutcome::Destroyed);
        assert_eq!(v.health, 0);
    }
}
