// Authoritative world state and the tick step that advances it.

use crate::domain::anchor::{WorldAnchor, WorldAnchorSnapshot};
use crate::domain::entity::{
    BaseState, BulletOwner, BulletState, DestroyCause, EntityId, EntityKind, HitOutcome,
    PlayerPose, UserState, Vitality,
};
use crate::domain::events::WorldEvent;
use crate::domain::systems::collision::{self, CollisionConfig, Contact, ContactTarget};
use crate::domain::systems::spawner::SpawnScheduler;
use crate::domain::systems::ballistics;
use crate::domain::tuning::WorldTuning;
use crate::domain::vector::Vec3;
use tracing::info;

/// The simulation engine. Owns every live entity and mutates them only from
/// within [`World::step`] or the discrete input operations below, so a single
/// logical timeline sees all changes and no locking is needed.
///
/// Events accumulate in an internal buffer and are drained by `step`, so
/// input operations applied between ticks surface in the next tick's report.
pub struct World {
    tuning: WorldTuning,
    next_id: EntityId,
    tick: u64,
    pose: Option<PlayerPose>,
    user: Option<UserState>,
    bases: Vec<BaseState>,
    bullets: Vec<BulletState>,
    score: u32,
    anchor: WorldAnchor,
    spawner: SpawnScheduler,
    game_over: bool,
    events: Vec<WorldEvent>,
}

impl World {
    pub fn new(spawn_seed: u64, tuning: WorldTuning) -> Self {
        Self {
            tuning,
            next_id: 1,
            tick: 0,
            pose: None,
            user: None,
            bases: Vec::new(),
            bullets: Vec::new(),
            score: 0,
            anchor: WorldAnchor::default(),
            spawner: SpawnScheduler::new(spawn_seed, tuning.spawn),
            game_over: false,
            events: Vec::new(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn anchor(&self) -> WorldAnchor {
        self.anchor
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Live entity count: bases, bullets, and the user if spawned.
    pub fn entity_count(&self) -> usize {
        self.bases.len() + self.bullets.len() + usize::from(self.user.is_some())
    }

    fn next_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Updates the cached viewer pose. Non-finite components and zero view
    /// directions are dropped; pose not yet established is a normal startup
    /// transient, never an error.
    pub fn set_player_pose(&mut self, position: Vec3, forward: Vec3) {
        if !position.is_finite() || !forward.is_finite() {
            return;
        }
        let Some(forward) = forward.normalized() else {
            return;
        };
        self.pose = Some(PlayerPose { position, forward });
    }

    /// Spawns a bullet along the current view direction. Silently a no-op
    /// when no pose is known yet.
    pub fn player_fire(&mut self) {
        if self.game_over {
            return;
        }
        let Some(pose) = self.pose else {
            return;
        };
        let tuning = self.tuning.player;
        self.spawn_bullet(
            pose.position + tuning.muzzle_offset * pose.forward,
            tuning.bullet_speed * pose.forward,
            BulletOwner::Player,
        );
    }

    /// Fires one bullet from a base toward the player's current position.
    /// Guards the undefined direction when the base sits exactly on the
    /// player.
    fn base_fire(&mut self, base_index: usize) {
        let Some(pose) = self.pose else {
            return;
        };
        let base_position = self.bases[base_index].position;
        let Some(direction) = (pose.position - base_position).normalized() else {
            return;
        };
        let tuning = self.tuning.base;
        let base_id = self.bases[base_index].id;
        self.spawn_bullet(
            base_position + tuning.muzzle_offset * direction,
            tuning.bullet_speed * direction,
            BulletOwner::Base(base_id),
        );
    }

    fn spawn_bullet(&mut self, position: Vec3, velocity: Vec3, owner: BulletOwner) {
        let id = self.next_id();
        self.bullets.push(BulletState {
            id,
            position,
            velocity,
            owner,
            ttl: self.tuning.bullet.life_time,
        });
        self.events.push(WorldEvent::Spawned {
            id,
            kind: EntityKind::Bullet,
            position,
        });
    }

    fn spawn_base(&mut self, position: Vec3) {
        let id = self.next_id();
        self.bases.push(BaseState {
            id,
            position,
            vitality: Vitality::new(self.tuning.base.max_health),
            fire_timer: self.tuning.base.fire_interval,
        });
        self.events.push(WorldEvent::Spawned {
            id,
            kind: EntityKind::Base,
            position,
        });
        info!(base_id = id, "base spawned");
    }

    fn spawn_user(&mut self, position: Vec3) {
        let id = self.next_id();
        self.user = Some(UserState {
            id,
            position,
            vitality: Vitality::new(self.tuning.player.max_health),
        });
        self.events.push(WorldEvent::Spawned {
            id,
            kind: EntityKind::User,
            position,
        });
    }

    /// Advances the simulation by `dt` seconds and returns every state
    /// change since the previous step (including ones queued by input
    /// operations in between). After game over the world is inert until a
    /// restart.
    pub fn step(&mut self, dt: f32) -> Vec<WorldEvent> {
        if self.game_over {
            return std::mem::take(&mut self.events);
        }

        self.tick += 1;

        // The user entity shadows the viewer pose.
        if let Some(pose) = self.pose {
            match &mut self.user {
                Some(user) => user.position = pose.position,
                None => self.spawn_user(pose.position),
            }
        }

        // Reopen debounce windows before resolving new contacts.
        if let Some(user) = &mut self.user {
            user.vitality.tick(dt);
        }
        for base in &mut self.bases {
            base.vitality.tick(dt);
        }

        let mut events = std::mem::take(&mut self.events);

        ballistics::tick_bullets(&mut self.bullets, dt, &mut events);

        let contacts = collision::detect_contacts(
            &self.bullets,
            &self.bases,
            self.user.as_ref(),
            CollisionConfig {
                bullet_radius: self.tuning.bullet.radius,
                base_radius: self.tuning.base.radius,
                user_radius: self.tuning.player.radius,
            },
        );
        for contact in contacts {
            self.resolve_contact(contact, &mut events);
        }

        // Base fire cadence, then the spawn schedule.
        for index in 0..self.bases.len() {
            self.bases[index].fire_timer -= dt;
            if self.bases[index].fire_timer <= 0.0 {
                self.bases[index].fire_timer += self.tuning.base.fire_interval;
                self.base_fire(index);
            }
        }

        if let Some(position) = self.spawner.poll(dt, self.pose.as_ref()) {
            self.spawn_base(position);
        }

        events.append(&mut self.events);
        events
    }

    /// Applies one contact: the bullet is always consumed; damage resolution
    /// on the target honors the debounce window.
    fn resolve_contact(&mut self, contact: Contact, events: &mut Vec<WorldEvent>) {
        let Some(index) = self.bullets.iter().position(|b| b.id == contact.bullet_id) else {
            return;
        };
        self.bullets.swap_remove(index);
        events.push(WorldEvent::Destroyed {
            id: contact.bullet_id,
            kind: EntityKind::Bullet,
            cause: DestroyCause::Impact,
        });

        let debounce = self.tuning.bullet.hit_debounce;
        match contact.target {
            ContactTarget::Base(base_id) => {
                let Some(base_index) = self.bases.iter().position(|b| b.id == base_id) else {
                    return;
                };
                match self.bases[base_index].vitality.take_hit(debounce) {
                    HitOutcome::Ignored => {}
                    HitOutcome::Damaged(health) => {
                        events.push(WorldEvent::Damaged {
                            id: base_id,
                            health,
                        });
                        info!(base_id, health, "base hit");
                    }
                    HitOutcome::Destroyed => {
                        self.bases.swap_remove(base_index);
                        self.score += 1;
                        events.push(WorldEvent::Destroyed {
                            id: base_id,
                            kind: EntityKind::Base,
                            cause: DestroyCause::HealthDepleted,
                        });
                        events.push(WorldEvent::ScoreChanged { score: self.score });
                        info!(base_id, score = self.score, "base destroyed");
                    }
                }
            }
            ContactTarget::User => {
                let Some(user) = &mut self.user else {
                    return;
                };
                let user_id = user.id;
                match user.vitality.take_hit(debounce) {
                    HitOutcome::Ignored => {}
                    HitOutcome::Damaged(health) => {
                        events.push(WorldEvent::Damaged {
                            id: user_id,
                            health,
                        });
                        events.push(WorldEvent::PlayerHealthChanged { health });
                        info!(health, "player hit");
                    }
                    HitOutcome::Destroyed => {
                        self.user = None;
                        self.game_over = true;
                        events.push(WorldEvent::PlayerHealthChanged { health: 0 });
                        events.push(WorldEvent::Destroyed {
                            id: user_id,
                            kind: EntityKind::User,
                            cause: DestroyCause::HealthDepleted,
                        });
                        events.push(WorldEvent::GameOver);
                        info!("player destroyed; game over");
                    }
                }
            }
        }
    }

    /// Clears every live entity and pending timer atomically with respect to
    /// the tick stream and rearms the spawn schedule. The cached pose is
    /// kept; the user respawns from it on the next step.
    pub fn restart(&mut self) {
        self.clear_entities();
        self.events.push(WorldEvent::WorldReset);
    }

    /// Restart seeded with an external world anchor received from a peer.
    pub fn restart_with_anchor(&mut self, snapshot: WorldAnchorSnapshot) {
        self.anchor = snapshot.anchor;
        self.restart();
    }

    /// Session teardown: like a restart, but the pose is also forgotten so a
    /// new session starts from a clean slate.
    pub fn end_session(&mut self) {
        self.clear_entities();
        self.pose = None;
        self.events.clear();
    }

    /// Snapshot of the current anchor for sharing with peers.
    pub fn snapshot(&self) -> WorldAnchorSnapshot {
        WorldAnchorSnapshot {
            anchor: self.anchor,
        }
    }

    fn clear_entities(&mut self) {
        self.bases.clear();
        self.bullets.clear();
        self.user = None;
        self.score = 0;
        self.game_over = false;
        self.spawner.reset();
    }
}
