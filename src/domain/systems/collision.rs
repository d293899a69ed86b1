// Sphere-sphere contact detection between bullets and damageable entities.

use crate::domain::entity::{BaseState, BulletOwner, BulletState, EntityId, UserState};

#[derive(Debug, Clone, Copy)]
pub struct CollisionConfig {
    pub bullet_radius: f32,
    pub base_radius: f32,
    pub user_radius: f32,
}

/// The damageable entity a bullet struck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactTarget {
    Base(EntityId),
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub bullet_id: EntityId,
    pub target: ContactTarget,
}

/// Finds bullet contacts for this tick. Naive O(bullets * targets); entity
/// counts stay in the tens. Each bullet reports at most one contact (it is
/// consumed by the first hit); bullets never collide with other bullets and
/// skip the entity that fired them.
pub fn detect_contacts(
    bullets: &[BulletState],
    bases: &[BaseState],
    user: Option<&UserState>,
    cfg: CollisionConfig,
) -> Vec<Contact> {
    let base_hit_sq = {
        let r = cfg.bullet_radius + cfg.base_radius;
        r * r
    };
    let user_hit_sq = {
        let r = cfg.bullet_radius + cfg.user_radius;
        r * r
    };

    let mut contacts = Vec::new();
    for bullet in bullets {
        let mut hit = None;

        for base in bases {
            if bullet.owner == BulletOwner::Base(base.id) {
                continue;
            }
            let d = base.position - bullet.position;
            if d.magnitude_squared() <= base_hit_sq {
                hit = Some(ContactTarget::Base(base.id));
                break;
            }
        }

        if hit.is_none() && bullet.owner != BulletOwner::Player {
            if let Some(user) = user {
                let d = user.position - bullet.position;
                if d.magnitude_squared() <= user_hit_sq {
                    hit = Some(ContactTarget::User);
                }
            }
        }

        if let Some(target) = hit {
            contacts.push(Contact {
                bullet_id: bullet.id,
                target,
            });
        }
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Vitality;
    use crate::domain::vector::Vec3;

    fn cfg() -> CollisionConfig {
        CollisionConfig {
            bullet_radius: 0.05,
            base_radius: 0.5,
            user_radius: 0.2,
        }
    }

    fn base_at(id: EntityId, position: Vec3) -> BaseState {
        BaseState {
            id,
            position,
            vitality: Vitality::new(3),
            fire_timer: 4.3,
        }
    }

    fn bullet_at(id: EntityId, position: Vec3, owner: BulletOwner) -> BulletState {
        BulletState {
            id,
            position,
            velocity: Vec3::ZERO,
            owner,
            ttl: 10.0,
        }
    }

    fn user_at(position: Vec3) -> UserState {
        UserState {
            id: 0,
            position,
            vitality: Vitality::new(7),
        }
    }

    #[test]
    fn bullet_overlapping_base_registers_contact() {
        let bases = vec![base_at(10, Vec3::new(0.0, 0.0, 0.5))];
        let bullets = vec![bullet_at(20, Vec3::ZERO, BulletOwner::Player)];
        let contacts = detect_contacts(&bullets, &bases, None, cfg());
        assert_eq!(
            contacts,
            vec![Contact {
                bullet_id: 20,
                target: ContactTarget::Base(10),
            }]
        );
    }

    #[test]
    fn bullet_outside_radius_misses() {
        let bases = vec![base_at(10, Vec3::new(0.0, 0.0, 2.0))];
        let bullets = vec![bullet_at(20, Vec3::ZERO, BulletOwner::Player)];
        assert!(detect_contacts(&bullets, &bases, None, cfg()).is_empty());
    }

    #[test]
    fn base_is_exempt_from_its_own_bullets() {
        let bases = vec![base_at(10, Vec3::ZERO)];
        let bullets = vec![bullet_at(20, Vec3::ZERO, BulletOwner::Base(10))];
        assert!(detect_contacts(&bullets, &bases, None, cfg()).is_empty());
    }

    #[test]
    fn player_bullets_never_hit_the_user() {
        let user = user_at(Vec3::ZERO);
        let bullets = vec![bullet_at(20, Vec3::ZERO, BulletOwner::Player)];
        assert!(detect_contacts(&bullets, &[], Some(&user), cfg()).is_empty());
    }

    #[test]
    fn base_bullet_hits_the_user() {
        let user = user_at(Vec3::ZERO);
        let bullets = vec![bullet_at(20, Vec3::new(0.0, 0.0, 0.2), BulletOwner::Base(10))];
        let contacts = detect_contacts(&bullets, &[], Some(&user), cfg());
        assert_eq!(
            contacts,
            vec![Contact {
                bullet_id: 20,
                target: ContactTarget::User,
            }]
        );
    }

    #[test]
    fn simultaneous_contacts_resolve_independently() {
        let bases = vec![base_at(10, Vec3::ZERO), base_at(11, Vec3::new(5.0, 0.0, 0.0))];
        let bullets = vec![
            bullet_at(20, Vec3::ZERO, BulletOwner::Player),
            bullet_at(21, Vec3::new(5.0, 0.0, 0.0), BulletOwner::Player),
        ];
        let contacts = detect_contacts(&bullets, &bases, None, cfg());
        assert_eq!(contacts.len(), 2);
    }
}
